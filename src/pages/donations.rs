use serde_json::Value;

use crate::domain::entity::Entity;
use crate::forms::field::{Field, FieldType};
use crate::pages::{ActionButton, FormConfig, FormSlot, PageConfig, PageKind};
use crate::render::format::{FieldFormat, FormatMap, default_text};

fn amount(value: &Value, _option: &Entity) -> String {
    match value.as_f64() {
        Some(amount) => format!("{amount:.2}"),
        None => default_text(value),
    }
}

fn inactive_banner(option: &Entity) -> Vec<String> {
    if option.get("active") == Some(&Value::Bool(false)) {
        vec!["This option is hidden from the donation page.".to_string()]
    } else {
        vec![]
    }
}

fn option_fields() -> Vec<Field> {
    vec![
        Field::text("name").required().max_length(80),
        Field::new("amount", FieldType::Number).required().min(1.0).step(0.01),
        Field::text("description").max_length(300),
        Field::new("active", FieldType::Boolean).default(true),
    ]
}

pub fn page() -> PageConfig {
    let mut page = PageConfig::new(PageKind::Donations, "Donation options");
    page.empty_message = "No donation options yet.".to_string();
    page.list_formats = FormatMap::new()
        .suppress("description")
        .field("amount", FieldFormat::new().render(amount));
    page.detail_formats = FormatMap::new()
        .field("amount", FieldFormat::new().render(amount).index(-1))
        .field("description", FieldFormat::new().wide());
    page.buttons = vec![
        ActionButton::action(
            "delete",
            "Delete",
            "donations/{id}/delete/",
            "Delete this donation option?",
        )
        .redirect(PageKind::Donations.list_path())
        .success_message("Donation option deleted."),
    ];
    page.forms = vec![
        FormConfig::new(FormSlot::Add, "Add donation option", "donations/")
            .fields(option_fields())
            .success_message("Donation option created."),
        FormConfig::new(FormSlot::Edit, "Edit donation option", "donations/{id}/")
            .fields(option_fields())
            .success_message("Donation option saved."),
    ];
    page.pre = Some(inactive_banner);
    page
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn amounts_have_two_decimals() {
        let entity = Entity::default();
        assert_eq!(amount(&json!(5), &entity), "5.00");
        assert_eq!(amount(&json!(null), &entity), "—");
    }
}
