//! Key/value view of a single entity.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::api::STATUS_KEY;
use crate::domain::entity::{Entity, ID_KEY, NAME_KEY};
use crate::forms::engine::FormView;
use crate::render::format::{Cell, FormatMap, humanized_text, render_cell};
use crate::render::list::ListView;

#[derive(Clone, Debug, Serialize)]
pub struct DetailRow {
    pub key: String,
    pub label: String,
    pub value: Cell,
    pub wide: bool,
    /// Nested form that edits just this field.
    pub edit_link: Option<String>,
}

impl fmt::Display for DetailRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value.content)
    }
}

/// A button under the field list.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub href: String,
    /// Confirm-gated buttons POST to `href` once the visitor agrees.
    pub confirm: Option<String>,
}

/// A sub-collection rendered under the entity.
#[derive(Clone, Debug, Serialize)]
pub struct Panel {
    pub list: ListView,
}

#[derive(Clone, Debug, Serialize)]
pub struct DetailView {
    pub id: Option<i64>,
    pub heading: Option<String>,
    /// Contextual notices shown above the fields.
    pub banners: Vec<String>,
    pub rows: Vec<DetailRow>,
    pub buttons: Vec<ButtonView>,
    pub panels: Vec<Panel>,
    pub forms: Vec<FormView>,
    /// Form to upload an image for this entity, if the page has one.
    pub upload: Option<String>,
}

fn is_reserved(key: &str) -> bool {
    key == ID_KEY || key == STATUS_KEY || key == NAME_KEY
}

/// Displayed field order: a stable sort by `index` (absent = 0) followed by
/// a stable sort that moves wide fields after narrow ones.
pub fn ordered_keys<'a>(entity: &'a Entity, formats: &FormatMap) -> Vec<&'a str> {
    let mut keys = entity
        .keys()
        .filter(|key| !is_reserved(key) && !formats.is_suppressed(key))
        .collect::<Vec<_>>();

    keys.sort_by_key(|key| formats.get(key).and_then(|format| format.index).unwrap_or(0));
    keys.sort_by_key(|key| formats.get(key).is_some_and(|format| format.wide));
    keys
}

/// `base` is the entity's own route, used to resolve edit links.
pub fn build_detail_view(entity: &Entity, formats: &FormatMap, base: &str) -> DetailView {
    let rows = ordered_keys(entity, formats)
        .into_iter()
        .map(|key| {
            let format = formats.get(key);
            let value = entity.get(key).unwrap_or(&Value::Null);
            DetailRow {
                key: key.to_string(),
                label: formats.label(key),
                value: render_cell(key, value, entity, formats, humanized_text),
                wide: format.is_some_and(|format| format.wide),
                edit_link: format
                    .and_then(|format| format.edit_link.as_deref())
                    .map(|link| format!("{base}{link}")),
            }
        })
        .collect();

    DetailView {
        id: entity.id().map(|id| id.get()),
        heading: entity.name().map(str::to_string),
        banners: Vec::new(),
        rows,
        buttons: Vec::new(),
        panels: Vec::new(),
        forms: Vec::new(),
        upload: None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::render::format::FieldFormat;

    fn entity(value: Value) -> Entity {
        Entity::from_value(value).unwrap()
    }

    #[test]
    fn index_then_wide_ordering() {
        let formats = FormatMap::new()
            .field("c", FieldFormat::new().index(1))
            .field("a", FieldFormat::new().wide());
        let entity = entity(json!({"id": 1, "a": 1, "b": 2, "c": 3}));

        assert_eq!(ordered_keys(&entity, &formats), vec!["b", "c", "a"]);
    }

    #[test]
    fn wide_fields_keep_their_index_order() {
        let formats = FormatMap::new()
            .field("notes", FieldFormat::new().wide().index(2))
            .field("summary", FieldFormat::new().wide().index(1))
            .field("venue", FieldFormat::new().index(-1));
        let entity = entity(json!({"notes": "", "summary": "", "date": "", "venue": ""}));

        assert_eq!(
            ordered_keys(&entity, &formats),
            vec!["venue", "date", "summary", "notes"]
        );
    }

    #[test]
    fn heading_and_title_cased_status() {
        let view = build_detail_view(
            &entity(json!({"id": 5, "name": "Summer Fete", "status": "pending"})),
            &FormatMap::new(),
            "/dashboard/events/5/",
        );

        assert_eq!(view.heading.as_deref(), Some("Summer Fete"));
        assert_eq!(view.id, Some(5));
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].to_string(), "Status: Pending");
    }

    #[test]
    fn reserved_and_suppressed_keys_are_excluded() {
        let formats = FormatMap::new().suppress("internal_notes");
        let view = build_detail_view(
            &entity(json!({"id": 5, "_status": 200, "name": "x", "internal_notes": "y", "capacity": 40})),
            &formats,
            "/dashboard/events/5/",
        );
        assert_eq!(
            view.rows.iter().map(|row| row.key.as_str()).collect::<Vec<_>>(),
            vec!["capacity"]
        );
        assert_eq!(view.rows[0].value.content, "40");
    }

    #[test]
    fn edit_links_are_resolved_against_the_entity_route() {
        let formats = FormatMap::new().field(
            "description",
            FieldFormat::new().title("About").wide().edit_link("description/edit/"),
        );
        let view = build_detail_view(
            &entity(json!({"id": 5, "description": "Cake and games"})),
            &formats,
            "/dashboard/events/5/",
        );
        assert_eq!(view.rows[0].label, "About");
        assert!(view.rows[0].wide);
        assert_eq!(
            view.rows[0].edit_link.as_deref(),
            Some("/dashboard/events/5/description/edit/")
        );
    }
}
