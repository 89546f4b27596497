//! Table view of a collection whose columns come from the data itself.

use serde::Serialize;

use crate::domain::entity::{Collection, Entity, ID_KEY};
use crate::forms::engine::FormView;
use crate::pagination::{PageLink, page_links};
use crate::render::format::{Cell, FormatMap, default_text, render_cell};

/// Row link used when a page does not override it.
pub const DEFAULT_ROW_LINK: &str = "{id}/";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Row {
    /// Detail route; the first cell links to it.
    pub href: String,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListView {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub count: usize,
    pub page: usize,
    pub pages: Vec<PageLink>,
    /// Set instead of rows when the collection is empty.
    pub empty_message: Option<String>,
    /// The "add" dialog, shown below the table whatever the item count.
    pub add_form: Option<FormView>,
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How one collection is turned into a table.
#[derive(Clone, Copy, Debug)]
pub struct ListOptions<'a> {
    pub title: &'a str,
    pub formats: &'a FormatMap,
    pub row_link: &'a str,
    pub empty_message: &'a str,
}

/// Keys of the first item, minus `id` and suppressed fields.
pub fn columns(collection: &Collection, formats: &FormatMap) -> Vec<Column> {
    let Some(first) = collection.items.first() else {
        return vec![];
    };

    first
        .keys()
        .filter(|key| *key != ID_KEY && !formats.is_suppressed(key))
        .map(|key| Column {
            key: key.to_string(),
            label: formats.label(key),
        })
        .collect()
}

fn row(entity: &Entity, columns: &[Column], options: &ListOptions<'_>) -> Row {
    let cells = columns
        .iter()
        .map(|column| {
            let value = entity.get(&column.key).unwrap_or(&serde_json::Value::Null);
            render_cell(&column.key, value, entity, options.formats, default_text)
        })
        .collect();

    Row {
        href: entity.fill(options.row_link),
        cells,
    }
}

pub fn build_list_view(
    collection: &Collection,
    current_page: usize,
    options: &ListOptions<'_>,
) -> ListView {
    let columns = columns(collection, options.formats);
    let rows = collection
        .items
        .iter()
        .map(|entity| row(entity, &columns, options))
        .collect::<Vec<_>>();

    let current_page = current_page.max(1);

    ListView {
        title: options.title.to_string(),
        empty_message: rows
            .is_empty()
            .then(|| options.empty_message.to_string()),
        columns,
        rows,
        count: collection.count,
        page: current_page,
        pages: page_links(collection.pages, current_page),
        add_form: None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::render::format::{CHECK, DASH, FieldFormat, TIMES};

    fn collection(body: serde_json::Value) -> Collection {
        Collection::from_value(&body, "items").unwrap()
    }

    fn options(formats: &FormatMap) -> ListOptions<'_> {
        ListOptions {
            title: "Events",
            formats,
            row_link: DEFAULT_ROW_LINK,
            empty_message: "No events yet.",
        }
    }

    #[test]
    fn columns_follow_the_first_item_without_id() {
        let formats = FormatMap::new();
        let view = build_list_view(
            &collection(json!({"items": [{"id": 1, "a": "x", "b": "y"}], "count": 1, "pages": 1})),
            1,
            &options(&formats),
        );
        assert_eq!(
            view.columns.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(view.columns[0].label, "A");
    }

    #[test]
    fn suppressed_columns_are_dropped() {
        let formats = FormatMap::new().suppress("secret");
        let view = build_list_view(
            &collection(json!({"items": [{"id": 1, "name": "x", "secret": "y"}]})),
            1,
            &options(&formats),
        );
        assert_eq!(view.columns.len(), 1);
        assert_eq!(view.rows[0].cells.len(), 1);
    }

    #[test]
    fn default_cells_use_glyphs() {
        let formats = FormatMap::new();
        let view = build_list_view(
            &collection(json!({"items": [
                {"id": 7, "name": "Fete", "published": true, "sold_out": false, "venue": null}
            ]})),
            1,
            &options(&formats),
        );
        let cells = view.rows[0]
            .cells
            .iter()
            .map(|cell| cell.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(cells, vec!["Fete", CHECK, TIMES, DASH]);
        assert_eq!(view.rows[0].href, "7/");
    }

    #[test]
    fn row_link_and_formatters_are_configurable() {
        fn price(value: &serde_json::Value, _: &Entity) -> String {
            format!("£{}", default_text(value))
        }
        let formats = FormatMap::new().field("price", FieldFormat::new().title("Cost").render(price));
        let view = build_list_view(
            &collection(json!([{"id": 3, "price": 12}])),
            1,
            &ListOptions {
                row_link: "/events/{id}/",
                ..options(&formats)
            },
        );
        assert_eq!(view.columns[0].label, "Cost");
        assert_eq!(view.rows[0].cells[0].content, "£12");
        assert_eq!(view.rows[0].href, "/events/3/");
    }

    #[test]
    fn empty_collection_shows_the_message() {
        let formats = FormatMap::new();
        let view = build_list_view(&collection(json!({"items": []})), 1, &options(&formats));
        assert!(view.is_empty());
        assert!(view.columns.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some("No events yet."));
    }

    #[test]
    fn current_page_is_marked_active() {
        let formats = FormatMap::new();
        let view = build_list_view(
            &collection(json!({"items": [{"id": 1, "a": 1}], "count": 30, "pages": 3})),
            2,
            &options(&formats),
        );
        assert_eq!(
            view.pages.iter().map(|link| link.active).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_eq!(view.pages[2].href.as_deref(), Some("?page=3"));
        assert!(view.empty_message.is_none());
    }
}
