use crate::forms::field::Field;
use crate::pages::{ActionButton, FormConfig, FormSlot, PageConfig, PageKind, PanelConfig};
use crate::render::format::{FieldFormat, FormatMap};

fn category_fields() -> Vec<Field> {
    vec![
        Field::text("name").required().max_length(60),
        Field::text("description").max_length(500),
    ]
}

pub fn page() -> PageConfig {
    let mut page = PageConfig::new(PageKind::Categories, "Categories");
    page.empty_message = "No categories yet.".to_string();
    page.detail_formats = FormatMap::new().field("description", FieldFormat::new().wide());
    page.buttons = vec![
        ActionButton::action(
            "delete",
            "Delete",
            "categories/{id}/delete/",
            "Delete this category? Its events keep their other details.",
        )
        .redirect(PageKind::Categories.list_path())
        .success_message("Category deleted."),
    ];
    page.forms = vec![
        FormConfig::new(FormSlot::Add, "Add category", "categories/")
            .fields(category_fields())
            .success_message("Category created."),
        FormConfig::new(FormSlot::Edit, "Edit category", "categories/{id}/")
            .fields(category_fields())
            .success_message("Category saved."),
    ];
    page.panels = vec![
        PanelConfig::new("Events", "categories/{id}/events/")
            .formats(FormatMap::new().suppress("description").suppress("location"))
            .row_link("/dashboard/events/{id}/")
            .empty_message("No events in this category."),
    ];
    page
}
