use serde_json::Value;

use crate::domain::entity::Entity;
use crate::forms::field::{Field, FieldType};
use crate::pages::{ActionButton, FormConfig, FormSlot, PageConfig, PageKind, PanelConfig};
use crate::render::format::{
    FieldFormat, FormatMap, render_datetime, render_location, render_range,
};

/// Select field filled with the company's categories.
pub const CATEGORY_FIELD: &str = "category_id";

fn event_fields() -> Vec<Field> {
    vec![
        Field::text("name").required().max_length(120),
        Field::new(CATEGORY_FIELD, FieldType::Select).title("Category").required(),
        Field::new("when", FieldType::DateTimeRange).required(),
        Field::text("venue").placeholder("Village hall"),
        Field::new("location", FieldType::Geolocation)
            .help_text("Pin shown on the public map."),
        Field::new("capacity", FieldType::Integer).min(0.0),
        Field::new("price", FieldType::Number).min(0.0).step(0.01),
        Field::new("website", FieldType::Url),
        Field::new("published", FieldType::Boolean),
    ]
}

fn banners(event: &Entity) -> Vec<String> {
    let mut banners = Vec::new();
    if event.get("published") == Some(&Value::Bool(false)) {
        banners.push("This event is not yet published. Only staff can see it.".to_string());
    }
    if event.get("sold_out") == Some(&Value::Bool(true)) {
        banners.push("This event is sold out.".to_string());
    }
    banners
}

pub fn page() -> PageConfig {
    let mut page = PageConfig::new(PageKind::Events, "Events");
    page.empty_message = "No events yet. Add the first one below.".to_string();
    page.list_formats = FormatMap::new()
        .suppress("description")
        .suppress("location")
        .suppress("website")
        .field("when", FieldFormat::new().render(render_range))
        .field(CATEGORY_FIELD, FieldFormat::new().title("Category"));
    page.detail_formats = FormatMap::new()
        .field("when", FieldFormat::new().render(render_range).index(-1))
        .field("created_at", FieldFormat::new().title("Created").render(render_datetime).index(5))
        .field("location", FieldFormat::new().render(render_location))
        .field(CATEGORY_FIELD, FieldFormat::new().title("Category"))
        .field(
            "description",
            FieldFormat::new().wide().edit_link("description/edit/"),
        );
    page.buttons = vec![
        ActionButton::link("Public page", "/events/{id}/"),
        ActionButton::action(
            "publish",
            "Publish",
            "events/{id}/publish/",
            "Publish this event? It becomes visible to everyone.",
        )
        .success_message("Event published."),
        ActionButton::action(
            "delete",
            "Delete",
            "events/{id}/delete/",
            "Delete this event? This cannot be undone.",
        )
        .redirect(PageKind::Events.list_path())
        .success_message("Event deleted."),
    ];
    page.forms = vec![
        FormConfig::new(FormSlot::Add, "Add event", "events/")
            .fields(event_fields())
            .success_message("Event created."),
        FormConfig::new(FormSlot::Edit, "Edit event", "events/{id}/")
            .fields(event_fields())
            .success_message("Event saved."),
        FormConfig::new(
            FormSlot::Nested("description".to_string()),
            "Edit description",
            "events/{id}/",
        )
        .fields([Field::new("description", FieldType::Markdown)])
        .success_message("Description saved."),
    ];
    page.panels = vec![
        PanelConfig::new("Bookings", "events/{id}/bookings/")
            .formats(
                FormatMap::new()
                    .suppress("event_id")
                    .field("created_at", FieldFormat::new().title("Booked").render(render_datetime)),
            )
            .row_link("/dashboard/users/{user_id}/")
            .empty_message("No bookings for this event."),
    ];
    page.pre = Some(banners);
    page.upload = Some("events/{id}/image/".to_string());
    page
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unpublished_events_get_a_banner() {
        let event = Entity::from_value(json!({"id": 1, "published": false, "sold_out": true})).unwrap();
        assert_eq!(banners(&event).len(), 2);

        let event = Entity::from_value(json!({"id": 1, "published": true})).unwrap();
        assert!(banners(&event).is_empty());
    }

    #[test]
    fn delete_returns_to_the_list() {
        let page = page();
        match page.action("delete") {
            Some(ActionButton::Action { redirect, .. }) => {
                assert_eq!(redirect.as_deref(), Some("/dashboard/events/"));
            }
            other => panic!("unexpected button: {other:?}"),
        }
        assert!(page.action("archive").is_none());
    }
}
