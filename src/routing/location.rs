//! The path and query of the page being rendered.

use crate::domain::types::EntityId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: String,
}

impl Location {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
        }
    }

    /// Splits `/a/b/?page=2` into path and query.
    pub fn parse(uri: &str) -> Self {
        match uri.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(uri, ""),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// All query parameters named `name`, in order.
    pub fn params(&self, name: &str) -> Vec<String> {
        serde_html_form::from_str::<Vec<(String, String)>>(&self.query)
            .unwrap_or_default()
            .into_iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<String> {
        self.params(name).into_iter().next()
    }

    /// Current page from `?page=`; anything unusable means page 1.
    pub fn page(&self) -> usize {
        self.param("page")
            .and_then(|page| page.trim().parse::<usize>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }

    /// Identifier in the first path segment after `prefix`.
    pub fn entity_id(&self, prefix: &str) -> Option<EntityId> {
        self.path
            .strip_prefix(prefix)?
            .split('/')
            .find(|segment| !segment.is_empty())?
            .parse::<EntityId>()
            .ok()
    }

    /// `path?query` as shown in the address bar.
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}
