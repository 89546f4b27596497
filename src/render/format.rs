//! Per-field display overrides and the default value formatting shared by
//! the list and detail renderers.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::domain::entity::Entity;

/// Glyph shown for `true`.
pub const CHECK: &str = "✓";
/// Glyph shown for `false`.
pub const TIMES: &str = "✗";
/// Placeholder for missing values.
pub const DASH: &str = "—";

const DISPLAY_DATETIME: &str = "%d %b %Y %H:%M";

/// Custom cell renderer. The returned string is HTML and gets sanitized.
pub type RenderFn = fn(&Value, &Entity) -> String;

/// How one field is displayed.
#[derive(Clone, Debug, Default)]
pub struct FieldFormat {
    pub title: Option<String>,
    pub render: Option<RenderFn>,
    /// Wide fields are laid out after narrow ones, spanning the full row.
    pub wide: bool,
    pub index: Option<i32>,
    /// Route suffix (relative to the detail page) of a nested edit form.
    pub edit_link: Option<String>,
}

impl FieldFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn render(mut self, render: RenderFn) -> Self {
        self.render = Some(render);
        self
    }

    pub fn wide(mut self) -> Self {
        self.wide = true;
        self
    }

    pub fn index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn edit_link(mut self, link: impl Into<String>) -> Self {
        self.edit_link = Some(link.into());
        self
    }
}

#[derive(Clone, Debug)]
pub enum FormatEntry {
    /// The field is never displayed.
    Suppress,
    Show(FieldFormat),
}

/// Format overrides keyed by field name.
#[derive(Clone, Debug, Default)]
pub struct FormatMap(HashMap<String, FormatEntry>);

impl FormatMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, format: FieldFormat) -> Self {
        self.0.insert(key.into(), FormatEntry::Show(format));
        self
    }

    pub fn suppress(mut self, key: impl Into<String>) -> Self {
        self.0.insert(key.into(), FormatEntry::Suppress);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldFormat> {
        match self.0.get(key) {
            Some(FormatEntry::Show(format)) => Some(format),
            _ => None,
        }
    }

    pub fn is_suppressed(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(FormatEntry::Suppress))
    }

    /// Override title, or the key in title case.
    pub fn label(&self, key: &str) -> String {
        self.get(key)
            .and_then(|format| format.title.clone())
            .unwrap_or_else(|| title_case(key))
    }
}

/// Rendered value of one field.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Cell {
    pub content: String,
    /// `content` is sanitized HTML rather than plain text.
    pub html: bool,
}

impl Cell {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            html: false,
        }
    }

    pub fn html(content: &str) -> Self {
        Self {
            content: ammonia::clean(content),
            html: true,
        }
    }
}

/// Applies the field's renderer if one is configured, else `fallback`.
pub fn render_cell(
    key: &str,
    value: &Value,
    entity: &Entity,
    formats: &FormatMap,
    fallback: fn(&Value) -> String,
) -> Cell {
    match formats.get(key).and_then(|format| format.render) {
        Some(render) => Cell::html(&render(value, entity)),
        None => Cell::text(fallback(value)),
    }
}

/// Booleans as glyphs, null as a dash, strings verbatim, nested values as
/// compact JSON.
pub fn default_text(value: &Value) -> String {
    match value {
        Value::Bool(true) => CHECK.to_string(),
        Value::Bool(false) => TIMES.to_string(),
        Value::Null => DASH.to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        nested => nested.to_string(),
    }
}

/// Like [`default_text`] but identifier-like strings (`not_started`) read
/// as words (`Not Started`).
pub fn humanized_text(value: &Value) -> String {
    match value {
        Value::String(text) if is_identifier(text) => title_case(text),
        other => default_text(other),
    }
}

/// `start_date` → `Start Date`.
pub fn title_case(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `2026-06-01T10:00:00Z` → `01 Jun 2026 10:00`; other input unchanged.
pub fn datetime_text(value: &Value) -> String {
    let Some(raw) = value.as_str() else {
        return default_text(value);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map(|parsed| parsed.format(DISPLAY_DATETIME).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Renderer for timestamp fields.
pub fn render_datetime(value: &Value, _entity: &Entity) -> String {
    datetime_text(value)
}

/// Renderer for `{start, end}` ranges.
pub fn render_range(value: &Value, _entity: &Entity) -> String {
    match (value.get("start"), value.get("end")) {
        (Some(start), Some(end)) => format!("{} – {}", datetime_text(start), datetime_text(end)),
        _ => default_text(value),
    }
}

/// Renderer for `{lat, lng}` points.
pub fn render_location(value: &Value, _entity: &Entity) -> String {
    match (
        value.get("lat").and_then(Value::as_f64),
        value.get("lng").and_then(Value::as_f64),
    ) {
        (Some(lat), Some(lng)) => format!("{lat:.5}, {lng:.5}"),
        _ => default_text(value),
    }
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.starts_with(|c: char| c.is_ascii_lowercase())
        && text.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}
