//! Page navigation under paginated lists.

use serde::Serialize;

/// Pages kept at each end and around the current page.
const LEFT_EDGE: usize = 2;
const LEFT_CURRENT: usize = 2;
const RIGHT_CURRENT: usize = 4;
const RIGHT_EDGE: usize = 2;

/// Page numbers to show; `None` marks a gap.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One entry of the page navigation under a list. Gaps have no number.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub number: Option<usize>,
    pub href: Option<String>,
    pub active: bool,
}

/// Navigation for a collection; empty when there is a single page.
pub fn page_links(total_pages: usize, current_page: usize) -> Vec<PageLink> {
    if total_pages <= 1 {
        return vec![];
    }

    let current_page = if current_page == 0 { 1 } else { current_page };

    get_pages(
        total_pages,
        current_page,
        LEFT_EDGE,
        LEFT_CURRENT,
        RIGHT_CURRENT,
        RIGHT_EDGE,
    )
    .into_iter()
    .map(|number| PageLink {
        number,
        href: number.map(|number| format!("?page={number}")),
        active: number == Some(current_page),
    })
    .collect()
}
