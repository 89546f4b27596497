//! Site configuration served by the backend.

use serde::{Deserialize, Serialize};

use crate::domain::types::EntityId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
}

/// Company/site settings shared by every page of a session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

fn default_currency() -> String {
    "GBP".to_string()
}

impl Company {
    /// Fallback used until (or when) the backend copy cannot be loaded.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currency: default_currency(),
            categories: Vec::new(),
        }
    }
}

impl Default for Company {
    fn default() -> Self {
        Self::named("eventdesk")
    }
}
