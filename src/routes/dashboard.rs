use actix_multipart::form::MultipartForm;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::{Context, Tera};

use crate::api::RestClient;
use crate::domain::auth::{AuthenticatedUser, STAFF_ROLE};
use crate::domain::context::SharedContext;
use crate::domain::types::EntityId;
use crate::forms::FormError;
use crate::forms::upload::UploadImageForm;
use crate::models::config::ServerConfig;
use crate::pages::{PageConfig, PageKind};
use crate::routes::{
    backend, base_context, ensure_role, flash_context, not_found, redirect, render_with_status,
    session_context,
};
use crate::routing::location::Location;
use crate::services::ServiceError;
use crate::services::dashboard::{self as dashboard_service, FormResult, PageView};

const TEMPLATE: &str = "dashboard/page.html";

fn render_page(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    shared: &mut SharedContext,
    page: &PageConfig,
    view: Option<PageView>,
    status: StatusCode,
) -> HttpResponse {
    let context = page_context(
        base_context(flash_messages, shared, page.kind.slug()),
        page,
        view,
    );
    render_with_status(tera, TEMPLATE, &context, status)
}

fn page_context(mut context: Context, page: &PageConfig, view: Option<PageView>) -> Context {
    context.insert("page_title", &page.title);
    context.insert("list_path", &page.kind.list_path());
    match view {
        Some(PageView::List(list)) => context.insert("list", &list),
        Some(PageView::Detail(detail)) => context.insert("detail", &detail),
        Some(PageView::Unavailable) | None => {}
    }
    context
}

fn service_error(
    err: ServiceError,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    shared: &mut SharedContext,
    page: &PageConfig,
) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => {
            not_found(tera, &base_context(flash_messages, shared, page.kind.slug()))
        }
        ServiceError::Form(message) => {
            shared.set_error(message);
            render_page(tera, flash_messages, shared, page, None, StatusCode::BAD_REQUEST)
        }
        err => {
            log::error!("Failed to handle {} page: {err}", page.kind);
            shared.set_error("Something went wrong. Please try again later.");
            render_page(
                tera,
                flash_messages,
                shared,
                page,
                None,
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

/// Backend client and shared context for a staff member.
async fn staff_session(
    user: AuthenticatedUser,
    client: &RestClient,
    server_config: &ServerConfig,
) -> Result<(RestClient, SharedContext), HttpResponse> {
    ensure_role(&user, STAFF_ROLE, Some("/"))?;
    let api = backend(client, Some(&user));
    let shared = session_context(&api, Some(user), server_config).await;
    Ok((api, shared))
}

#[get("/dashboard/")]
pub async fn dashboard_index(user: AuthenticatedUser) -> impl Responder {
    if let Err(response) = ensure_role(&user, STAFF_ROLE, Some("/")) {
        return response;
    }
    redirect(&PageKind::Events.list_path())
}

#[get("/dashboard/{kind}/{tail:.*}")]
pub async fn show_page(
    path: web::Path<(String, String)>,
    req: HttpRequest,
    user: AuthenticatedUser,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (api, mut shared) = match staff_session(user, &client, &server_config).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let (kind, _) = path.into_inner();
    let Ok(kind) = kind.parse::<PageKind>() else {
        return not_found(&tera, &base_context(&flash_messages, &mut shared, "dashboard"));
    };
    let page = kind.config().with_company(shared.company());
    let location = Location::new(req.path(), req.query_string());

    match dashboard_service::load_page(&api, &page, &location, &mut shared).await {
        Ok(view) => render_page(
            &tera,
            &flash_messages,
            &mut shared,
            &page,
            Some(view),
            StatusCode::OK,
        ),
        Err(err) => service_error(err, &tera, &flash_messages, &mut shared, &page),
    }
}

#[post("/dashboard/{kind}/{id}/actions/{action}/")]
pub async fn run_action(
    path: web::Path<(String, i64, String)>,
    user: AuthenticatedUser,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (api, mut shared) = match staff_session(user, &client, &server_config).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let (kind, id, action) = path.into_inner();
    let (Ok(kind), Ok(id)) = (kind.parse::<PageKind>(), EntityId::new(id)) else {
        return not_found(&tera, &base_context(&flash_messages, &mut shared, "dashboard"));
    };
    let page = kind.config();

    match dashboard_service::run_action(&api, &page, id, &action, &mut shared).await {
        Ok(target) => {
            flash_context(&mut shared);
            redirect(&target)
        }
        Err(err) => service_error(err, &tera, &flash_messages, &mut shared, &page),
    }
}

#[post("/dashboard/{kind}/{id}/upload/")]
pub async fn upload_image(
    path: web::Path<(String, i64)>,
    user: AuthenticatedUser,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<UploadImageForm>,
) -> impl Responder {
    let (api, mut shared) = match staff_session(user, &client, &server_config).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let (kind, id) = path.into_inner();
    let (Ok(kind), Ok(id)) = (kind.parse::<PageKind>(), EntityId::new(id)) else {
        return not_found(&tera, &base_context(&flash_messages, &mut shared, "dashboard"));
    };
    let page = kind.config();

    let file = match form.into_upload() {
        Ok(file) => file,
        Err(FormError::InvalidData(message)) => {
            FlashMessage::error(message).send();
            return redirect(&page.detail_path(id));
        }
        Err(err) => {
            log::error!("Failed to read upload: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match dashboard_service::upload_image(&api, &page, id, file, &mut shared).await {
        Ok(target) => {
            flash_context(&mut shared);
            redirect(&target)
        }
        Err(err) => service_error(err, &tera, &flash_messages, &mut shared, &page),
    }
}

#[post("/dashboard/{kind}/{tail:.*}")]
pub async fn submit_form(
    path: web::Path<(String, String)>,
    req: HttpRequest,
    user: AuthenticatedUser,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    body: web::Bytes,
) -> impl Responder {
    let (api, mut shared) = match staff_session(user, &client, &server_config).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let (kind, _) = path.into_inner();
    let Ok(kind) = kind.parse::<PageKind>() else {
        return not_found(&tera, &base_context(&flash_messages, &mut shared, "dashboard"));
    };
    let page = kind.config().with_company(shared.company());
    let location = Location::new(req.path(), req.query_string());

    let posted = match serde_html_form::from_bytes::<Vec<(String, String)>>(&body) {
        Ok(posted) => posted,
        Err(err) => {
            log::warn!("Unreadable form body for {}: {err}", location.path());
            return HttpResponse::BadRequest().finish();
        }
    };

    match dashboard_service::submit_form(&api, &page, &location, &posted, &mut shared).await {
        Ok(FormResult::Redirect(target)) => {
            flash_context(&mut shared);
            redirect(&target)
        }
        Ok(FormResult::Rerender(view)) => render_page(
            &tera,
            &flash_messages,
            &mut shared,
            &page,
            Some(view),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        Err(err) => service_error(err, &tera, &flash_messages, &mut shared, &page),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_back_link_points_at_the_list() {
        let tera = Tera::new("templates/**/*").unwrap();
        let mut base = Context::new();
        base.insert("alerts", &Vec::<(String, String)>::new());
        base.insert("current_user", &json!(null));
        base.insert("company", &json!({"name": "Fete Co"}));
        base.insert("current_page", "events");
        base.insert("dashboard_url", "/dashboard");
        base.insert("navigation", &Vec::<String>::new());
        base.insert(
            "detail",
            &json!({
                "id": 5,
                "heading": "Summer Fete",
                "banners": [],
                "rows": [],
                "buttons": [],
                "panels": [],
                "forms": [],
                "upload": null
            }),
        );

        let context = page_context(base, &PageKind::Events.config(), None);
        let body = tera.render(TEMPLATE, &context).unwrap();

        assert!(body.contains(r#"<a class="back" href="&#x2F;dashboard&#x2F;events&#x2F;">"#));
        assert!(!body.contains(r#"href="../""#));
    }
}
