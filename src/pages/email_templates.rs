use crate::forms::field::{Field, FieldType};
use crate::pages::{ActionButton, FormConfig, FormSlot, PageConfig, PageKind};
use crate::render::format::{FieldFormat, FormatMap};

pub fn page() -> PageConfig {
    let mut page = PageConfig::new(PageKind::EmailTemplates, "Email templates");
    page.empty_message = "No email templates yet.".to_string();
    page.list_formats = FormatMap::new().suppress("body");
    page.detail_formats = FormatMap::new()
        .field("subject", FieldFormat::new().index(-1))
        .field(
            "body",
            FieldFormat::new().wide().edit_link("body/edit/"),
        );
    page.buttons = vec![
        ActionButton::action(
            "send-test",
            "Send test",
            "email-templates/{id}/test/",
            "Send a test email to your own address?",
        )
        .success_message("Test email sent."),
    ];
    page.forms = vec![
        FormConfig::new(FormSlot::Add, "Add template", "email-templates/")
            .fields([
                Field::text("name").required().help_text("Internal name, e.g. booking_confirmation."),
                Field::text("subject").required().max_length(200),
                Field::new("body", FieldType::Markdown).required(),
            ])
            .success_message("Template created."),
        FormConfig::new(FormSlot::Edit, "Edit template", "email-templates/{id}/")
            .fields([
                Field::text("name").required(),
                Field::text("subject").required().max_length(200),
            ])
            .success_message("Template saved."),
        FormConfig::new(
            FormSlot::Nested("body".to_string()),
            "Edit body",
            "email-templates/{id}/",
        )
        .fields([Field::new("body", FieldType::Markdown).required()])
        .prefill()
        .success_message("Template saved."),
    ];
    page
}
