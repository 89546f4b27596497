use serde_json::Value;

use crate::domain::entity::Entity;
use crate::forms::field::{Field, FieldType};
use crate::pages::{ActionButton, FormConfig, FormSlot, PageConfig, PageKind, PanelConfig};
use crate::render::format::{FieldFormat, FormatMap, render_datetime};

fn staff_banner(user: &Entity) -> Vec<String> {
    if user.get("is_staff") == Some(&Value::Bool(true)) {
        vec!["This user has staff access to the dashboard.".to_string()]
    } else {
        vec![]
    }
}

pub fn page() -> PageConfig {
    let mut page = PageConfig::new(PageKind::Users, "Users");
    page.empty_message = "No users have signed up yet.".to_string();
    page.list_formats = FormatMap::new()
        .suppress("password")
        .field("is_staff", FieldFormat::new().title("Staff"))
        .field("last_login", FieldFormat::new().render(render_datetime));
    page.detail_formats = FormatMap::new()
        .suppress("password")
        .field("is_staff", FieldFormat::new().title("Staff"))
        .field("last_login", FieldFormat::new().render(render_datetime).index(1))
        .field("date_joined", FieldFormat::new().title("Joined").render(render_datetime).index(1));
    page.buttons = vec![
        ActionButton::action(
            "reset-password",
            "Reset password",
            "users/{id}/reset-password/",
            "Email this user a password reset link?",
        )
        .success_message("Password reset email sent."),
        ActionButton::action(
            "delete",
            "Delete",
            "users/{id}/delete/",
            "Delete this user and cancel their bookings?",
        )
        .redirect(PageKind::Users.list_path())
        .success_message("User deleted."),
    ];
    page.forms = vec![
        FormConfig::new(FormSlot::Add, "Invite user", "users/")
            .fields([
                Field::text("name").required(),
                Field::text("email").required().max_length(254),
                Field::new("is_staff", FieldType::Boolean).title("Staff"),
            ])
            .submit_label("Invite")
            .success_message("Invitation sent."),
        FormConfig::new(FormSlot::Edit, "Edit user", "users/{id}/")
            .fields([
                Field::text("name").required(),
                Field::text("email").required().max_length(254),
                Field::new("is_staff", FieldType::Boolean).title("Staff"),
            ])
            .success_message("User saved."),
    ];
    page.panels = vec![
        PanelConfig::new("Bookings", "users/{id}/bookings/")
            .formats(
                FormatMap::new()
                    .suppress("user_id")
                    .field("created_at", FieldFormat::new().title("Booked").render(render_datetime)),
            )
            .row_link("/dashboard/events/{event_id}/")
            .empty_message("This user has not booked anything."),
    ];
    page.pre = Some(staff_banner);
    page
}
