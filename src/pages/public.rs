//! Visitor-facing pages built from the same renderers and forms.

use serde_json::Value;

use crate::domain::entity::{Collection, Entity};
use crate::forms::field::{Choice, Field, FieldType};
use crate::pages::{FormConfig, FormSlot};
use crate::render::format::{FieldFormat, FormatMap, render_location, render_range};

pub const EVENTS_ENDPOINT: &str = "public/events/";
pub const EVENTS_ITEMS_KEY: &str = "events";
pub const EVENT_LINK: &str = "/events/{id}/";

pub const DONATION_OPTIONS_ENDPOINT: &str = "public/donations/";
pub const DONATION_OPTIONS_KEY: &str = "options";
pub const DONATE_PATH: &str = "/donate/";

pub fn event_path(id: impl std::fmt::Display) -> String {
    format!("/events/{id}/")
}

pub fn event_list_formats() -> FormatMap {
    FormatMap::new()
        .suppress("description")
        .suppress("location")
        .suppress("published")
        .suppress("capacity")
        .field("when", FieldFormat::new().render(render_range))
}

pub fn event_detail_formats() -> FormatMap {
    FormatMap::new()
        .suppress("published")
        .suppress("capacity")
        .field("when", FieldFormat::new().render(render_range).index(-1))
        .field("location", FieldFormat::new().render(render_location))
        .field("description", FieldFormat::new().wide())
}

/// "Sold out" and similar notices for visitors.
pub fn event_banners(event: &Entity) -> Vec<String> {
    if event.get("sold_out") == Some(&Value::Bool(true)) {
        vec!["This event is sold out.".to_string()]
    } else {
        vec![]
    }
}

pub fn book_form() -> FormConfig {
    FormConfig::new(
        FormSlot::Named("book".to_string()),
        "Book tickets",
        "public/events/{id}/book/",
    )
    .fields([
        Field::text("name").required().max_length(120),
        Field::text("email").required().max_length(254),
        Field::new("quantity", FieldType::Integer)
            .required()
            .default(1)
            .min(1.0)
            .max(10.0),
    ])
    .blank()
    .submit_label("Book")
    .success_message("Booking confirmed. Check your inbox for the tickets.")
}

/// Donation form offering the active options as choices.
pub fn donate_form(options: &Collection) -> FormConfig {
    let choices = options
        .items
        .iter()
        .filter(|option| option.get("active") != Some(&Value::Bool(false)))
        .filter_map(|option| {
            let id = option.id()?;
            let label = match (option.name(), option.get("amount").and_then(Value::as_f64)) {
                (Some(name), Some(amount)) => format!("{name} ({amount:.2})"),
                (Some(name), None) => name.to_string(),
                (None, _) => id.to_string(),
            };
            Some(Choice::new(id.get(), label))
        });

    FormConfig::new(
        FormSlot::Named("donate".to_string()),
        "Donate",
        "public/donations/",
    )
    .fields([
        Field::new("option", FieldType::Select)
            .title("Donation")
            .required()
            .choices(choices),
        Field::text("name").required(),
        Field::text("email").required().max_length(254),
        Field::new("message", FieldType::Markdown).max_length(1000),
    ])
    .submit_label("Donate")
    .success_message("Thank you for your donation!")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn donate_form_skips_inactive_options() {
        let options = Collection::from_value(
            &json!({"options": [
                {"id": 1, "name": "Friend", "amount": 5},
                {"id": 2, "name": "Patron", "amount": 50, "active": false}
            ]}),
            DONATION_OPTIONS_KEY,
        )
        .unwrap();

        let form = donate_form(&options);
        assert_eq!(form.fields[0].choices, vec![Choice::new(1, "Friend (5.00)")]);
    }

    #[test]
    fn book_form_defaults_to_one_ticket() {
        let event = Entity::from_value(json!({"id": 5, "name": "Summer Fete"})).unwrap();
        let engine = book_form().engine(Some(&event)).unwrap();
        assert_eq!(engine.value("quantity"), Some(&json!(1)));
        assert_eq!(engine.value("name"), None);
    }
}
