//! Schema-less backend records and the paginated collections that carry them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::{EntityId, TypeConstraintError};

/// Key under which every entity carries its identifier.
pub const ID_KEY: &str = "id";

/// Key rendered as the heading of a detail page instead of as a field.
pub const NAME_KEY: &str = "name";

/// One backend record as the front end sees it: an ordered JSON object.
///
/// The client only ever holds a transient copy fetched for the current
/// request; nothing is cached across navigations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    /// Wraps an already parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Accepts only JSON objects.
    pub fn from_value(value: Value) -> Result<Self, TypeConstraintError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(TypeConstraintError::UnexpectedShape(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.0.get(ID_KEY).and_then(|id| EntityId::from_json(id).ok())
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(NAME_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field names in the order the backend sent them.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Substitutes `{key}` placeholders with this entity's scalar fields.
    ///
    /// Unknown placeholders are left as they are.
    pub fn fill(&self, template: &str) -> String {
        let mut filled = template.to_string();
        for (key, value) in &self.0 {
            let placeholder = format!("{{{key}}}");
            if !filled.contains(&placeholder) {
                continue;
            }
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                _ => continue,
            };
            filled = filled.replace(&placeholder, &text);
        }
        filled
    }
}

/// A page of homogeneous entities returned by a list endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collection {
    pub items: Vec<Entity>,
    pub count: usize,
    pub pages: usize,
}

impl Collection {
    /// Reads `{<items_key>: [...], count, pages}`.
    ///
    /// A bare JSON array is accepted as a single page.
    pub fn from_value(value: &Value, items_key: &str) -> Result<Self, TypeConstraintError> {
        let (raw_items, count, pages) = match value {
            Value::Array(items) => (items, None, None),
            Value::Object(body) => {
                let items = body
                    .get(items_key)
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        TypeConstraintError::UnexpectedShape(format!(
                            "missing `{items_key}` list"
                        ))
                    })?;
                (
                    items,
                    body.get("count").and_then(Value::as_u64),
                    body.get("pages").and_then(Value::as_u64),
                )
            }
            other => {
                return Err(TypeConstraintError::UnexpectedShape(format!(
                    "expected a collection, got {other}"
                )));
            }
        };

        let items = raw_items
            .iter()
            .cloned()
            .map(Entity::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            count: count.map_or(items.len(), |count| count as usize),
            pages: pages.map_or(1, |pages| pages as usize),
            items,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn entity_keeps_backend_key_order() {
        let entity = Entity::from_value(json!({"id": 1, "zeta": 1, "alpha": 2})).unwrap();
        assert_eq!(entity.keys().collect::<Vec<_>>(), vec!["id", "zeta", "alpha"]);
        assert_eq!(entity.id().map(EntityId::get), Some(1));
    }

    #[test]
    fn entity_rejects_non_objects() {
        assert!(Entity::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn fill_replaces_known_placeholders() {
        let entity = Entity::from_value(json!({"id": 4, "slug": "fete", "meta": {}})).unwrap();
        assert_eq!(entity.fill("{id}/"), "4/");
        assert_eq!(entity.fill("/events/{slug}/{id}/"), "/events/fete/4/");
        assert_eq!(entity.fill("{meta}/{missing}"), "{meta}/{missing}");
    }

    #[test]
    fn collection_reads_items_count_and_pages() {
        let body = json!({"items": [{"id": 1}, {"id": 2}], "count": 12, "pages": 6});
        let collection = Collection::from_value(&body, "items").unwrap();
        assert_eq!(collection.items.len(), 2);
        assert_eq!(collection.count, 12);
        assert_eq!(collection.pages, 6);
    }

    #[test]
    fn collection_uses_custom_items_key_and_defaults() {
        let body = json!({"events": [{"id": 3}]});
        let collection = Collection::from_value(&body, "events").unwrap();
        assert_eq!(collection.count, 1);
        assert_eq!(collection.pages, 1);
        assert!(Collection::from_value(&body, "items").is_err());
    }
}
