//! HTTP handlers and the helpers they share.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::api::RestClient;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::company::Company;
use crate::domain::context::SharedContext;
use crate::models::config::ServerConfig;
use crate::pages::{DASHBOARD, PageKind};
use crate::services::auth::load_company;

pub mod auth;
pub mod dashboard;
pub mod public;

#[derive(Serialize)]
struct NavLink {
    title: &'static str,
    href: String,
    slug: &'static str,
}

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

/// Sends users without `role` to `redirect_to`, or answers 403.
pub fn ensure_role(
    user: &AuthenticatedUser,
    role: &str,
    redirect_to: Option<&str>,
) -> Result<(), HttpResponse> {
    if user.has_role(role) {
        return Ok(());
    }
    log::warn!("User {} lacks the {role} role", user.sub);
    match redirect_to {
        Some(location) => {
            FlashMessage::error("You do not have access to this page.").send();
            Err(redirect(location))
        }
        None => Err(HttpResponse::Forbidden().finish()),
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    render_with_status(tera, template, context, StatusCode::OK)
}

pub fn render_with_status(
    tera: &Tera,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn not_found(tera: &Tera, context: &Context) -> HttpResponse {
    render_with_status(tera, "errors/404.html", context, StatusCode::NOT_FOUND)
}

/// Fallback for unmatched paths.
pub async fn default_not_found(
    tera: web::Data<Tera>,
    flash_messages: IncomingFlashMessages,
) -> HttpResponse {
    let mut shared = SharedContext::default();
    not_found(&tera, &base_context(&flash_messages, &mut shared, "not_found"))
}

/// Backend client acting for `user`, anonymous without one.
pub fn backend(client: &RestClient, user: Option<&AuthenticatedUser>) -> RestClient {
    match user {
        Some(user) => client.authorized(&user.token),
        None => client.clone(),
    }
}

/// Request-scoped shared state. The company settings fall back to the
/// configured site name when the backend cannot provide them.
pub async fn session_context(
    api: &RestClient,
    user: Option<AuthenticatedUser>,
    server_config: &ServerConfig,
) -> SharedContext {
    let company = match load_company(api).await {
        Ok(company) => company,
        Err(err) => {
            log::warn!("Using default company settings: {err}");
            Company::named(&server_config.site_name)
        }
    };
    SharedContext::new(company).with_user(user)
}

/// Sends whatever the shared context collected as flash messages, for
/// handlers that answer with a redirect.
pub fn flash_context(context: &mut SharedContext) {
    if let Some(message) = context.take_message() {
        FlashMessage::success(message).send();
    }
    if let Some(error) = context.take_error() {
        FlashMessage::error(error).send();
    }
}

/// Template context with alerts, the user, the company and navigation.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    shared: &mut SharedContext,
    current_page: &str,
) -> Context {
    let mut alerts = flash_messages
        .iter()
        .map(|f| (f.content().to_string(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();
    if let Some(message) = shared.take_message() {
        alerts.push((message, alert_level_to_str(&Level::Success)));
    }
    if let Some(error) = shared.take_error() {
        alerts.push((error, alert_level_to_str(&Level::Error)));
    }

    let navigation = PageKind::ALL
        .iter()
        .map(|kind| NavLink {
            title: kind.title(),
            href: kind.list_path(),
            slug: kind.slug(),
        })
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &shared.user());
    context.insert("company", shared.company());
    context.insert("current_page", current_page);
    context.insert("dashboard_url", DASHBOARD);
    context.insert("navigation", &navigation);
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_uses_see_other() {
        let response = redirect("/dashboard/events/");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/dashboard/events/"
        );
    }

    #[test]
    fn missing_template_is_a_server_error() {
        let tera = Tera::default();
        let response = render_template(&tera, "nope.html", &Context::new());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
