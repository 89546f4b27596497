//! Modal dialogs addressed by URL.
//!
//! A dialog is open exactly when the current path matches its regex, so
//! links, redirects and browser history control it as well as its own
//! buttons.

use std::fmt;

use regex::Regex;
use serde_json::Value;

use crate::domain::types::EntityId;

/// Suffix conventions for the two stock dialogs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalMode {
    Add,
    Edit,
}

impl ModalMode {
    pub fn pattern(self) -> &'static str {
        match self {
            ModalMode::Add => "add/$",
            ModalMode::Edit => "edit/$",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ModalRoute {
    regex: Regex,
}

impl ModalRoute {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn for_mode(mode: ModalMode) -> Result<Self, regex::Error> {
        Self::new(mode.pattern())
    }

    /// Matches exactly `<base><suffix>`, both taken literally. The suffix is
    /// captured so closing leads back to `base`.
    pub fn anchored(base: &str, suffix: &str) -> Result<Self, regex::Error> {
        Self::new(&format!(
            "^{}({})$",
            regex::escape(base),
            regex::escape(suffix)
        ))
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The part of `path` in front of the dialog suffix: where closing
    /// leads. The suffix is the first capture group when the pattern has
    /// one, the whole match otherwise.
    pub fn parent(&self, path: &str) -> Option<String> {
        let captures = self.regex.captures(path)?;
        let start = captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|found| found.start())?;
        Some(path[..start].to_string())
    }
}

/// Visibility is a pure function of the path.
pub fn visible(path: &str, route: &ModalRoute) -> bool {
    route.is_match(path)
}

type Subscriber<'a> = Box<dyn FnMut(&str) + 'a>;

/// One mounted dialog: `shown` is recomputed from the path on every route
/// change, never toggled by it.
pub struct ModalState<'a> {
    route: ModalRoute,
    path: String,
    shown: bool,
    subscribers: Vec<Subscriber<'a>>,
}

impl<'a> ModalState<'a> {
    pub fn mount(route: ModalRoute, path: &str) -> Self {
        let shown = visible(path, &route);
        Self {
            route,
            path: path.to_string(),
            shown,
            subscribers: Vec::new(),
        }
    }

    pub fn shown(&self) -> bool {
        self.shown
    }

    pub fn route(&self) -> &ModalRoute {
        &self.route
    }

    pub fn route_changed(&mut self, path: &str) {
        self.path = path.to_string();
        self.shown = visible(path, &self.route);
    }

    /// Runs on every toggle with the navigation target.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&str) + 'a) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Where "close" leads from the current path, plus `<id>/` when
    /// `result` carries an identifier.
    pub fn close_target(&self, result: Option<&Value>) -> String {
        let parent = self
            .route
            .parent(&self.path)
            .unwrap_or_else(|| self.path.clone());
        match result
            .and_then(|result| result.get("id"))
            .and_then(|id| EntityId::from_json(id).ok())
        {
            Some(id) => format!("{parent}{id}/"),
            None => parent,
        }
    }

    /// Flips visibility, notifies subscribers and returns the navigation
    /// target. The caller performs the navigation, after which
    /// [`ModalState::route_changed`] settles the state from the new path.
    pub fn toggle(&mut self, result: Option<&Value>) -> String {
        let target = self.close_target(result);
        self.shown = !self.shown;
        for subscriber in &mut self.subscribers {
            subscriber(&target);
        }
        target
    }
}

impl fmt::Debug for ModalState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalState")
            .field("route", &self.route.pattern())
            .field("path", &self.path)
            .field("shown", &self.shown)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    #[test]
    fn visibility_follows_the_path_whatever_caused_the_navigation() {
        let route = ModalRoute::new(r"edit/$").unwrap();
        let mut modal = ModalState::mount(route, "/dashboard/events/5/");
        assert!(!modal.shown());

        modal.route_changed("/dashboard/events/5/edit/");
        assert!(modal.shown());

        // Browser back: no toggle involved.
        modal.route_changed("/dashboard/events/5/");
        assert!(!modal.shown());

        modal.route_changed("/dashboard/events/5/edit/");
        assert!(modal.shown());

        // The dialog's own cancel button.
        let target = modal.toggle(None);
        assert_eq!(target, "/dashboard/events/5/");
        modal.route_changed(&target);
        assert!(!modal.shown());
    }

    #[test]
    fn mount_state_comes_from_the_initial_path() {
        let route = ModalRoute::for_mode(ModalMode::Add).unwrap();
        assert!(ModalState::mount(route.clone(), "/dashboard/events/add/").shown());
        assert!(!ModalState::mount(route, "/dashboard/events/").shown());
    }

    #[test]
    fn toggle_with_created_entity_targets_its_detail_page() {
        let route = ModalRoute::for_mode(ModalMode::Add).unwrap();
        let mut modal = ModalState::mount(route, "/dashboard/categories/add/");
        let target = modal.toggle(Some(&json!({"id": 17, "name": "Music"})));
        assert_eq!(target, "/dashboard/categories/17/");
        assert!(!modal.shown());
    }

    #[test]
    fn subscribers_see_every_toggle() {
        let seen = RefCell::new(Vec::new());
        {
            let route = ModalRoute::for_mode(ModalMode::Edit).unwrap();
            let mut modal = ModalState::mount(route, "/dashboard/users/3/edit/");
            modal.subscribe(|target| seen.borrow_mut().push(target.to_string()));
            modal.toggle(None);
        }
        assert_eq!(seen.into_inner(), vec!["/dashboard/users/3/".to_string()]);
    }

    #[test]
    fn anchored_routes_do_not_overlap() {
        let edit = ModalRoute::anchored("/dashboard/events/5/", "edit/").unwrap();
        let nested = ModalRoute::anchored("/dashboard/events/5/", "description/edit/").unwrap();

        assert!(edit.is_match("/dashboard/events/5/edit/"));
        assert!(!edit.is_match("/dashboard/events/5/description/edit/"));
        assert!(nested.is_match("/dashboard/events/5/description/edit/"));
        assert_eq!(
            nested.parent("/dashboard/events/5/description/edit/"),
            Some("/dashboard/events/5/".to_string())
        );
        assert_eq!(nested.parent("/dashboard/events/5/"), None);
    }

    #[test]
    fn anchored_dialogs_close_to_their_base() {
        let edit = ModalRoute::anchored("/dashboard/events/5/", "edit/").unwrap();
        let mut modal = ModalState::mount(edit, "/dashboard/events/5/edit/");
        assert!(modal.shown());
        assert_eq!(modal.toggle(None), "/dashboard/events/5/");

        let book = ModalRoute::anchored("/events/9/", "book/").unwrap();
        let modal = ModalState::mount(book, "/events/9/book/");
        assert_eq!(modal.close_target(None), "/events/9/");
    }
}
