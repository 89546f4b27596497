use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::{Context, Tera};

use crate::api::RestClient;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::context::SharedContext;
use crate::domain::types::EntityId;
use crate::models::config::ServerConfig;
use crate::routes::{
    backend, base_context, flash_context, not_found, redirect, render_template,
    render_with_status, session_context,
};
use crate::routing::location::Location;
use crate::services::ServiceError;
use crate::services::public::{self as public_service, PublicResult};

fn public_error(
    err: ServiceError,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    shared: &mut SharedContext,
    template: &str,
) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => not_found(tera, &base_context(flash_messages, shared, "public")),
        err => {
            log::error!("Failed to render {template}: {err}");
            shared.set_error("Something went wrong. Please try again later.");
            let context = base_context(flash_messages, shared, "public");
            render_with_status(tera, template, &context, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn parse_form(body: &[u8]) -> Result<Vec<(String, String)>, HttpResponse> {
    serde_html_form::from_bytes::<Vec<(String, String)>>(body).map_err(|err| {
        log::warn!("Unreadable form body: {err}");
        HttpResponse::BadRequest().finish()
    })
}

fn event_context(
    flash_messages: &IncomingFlashMessages,
    shared: &mut SharedContext,
    event: &impl serde::Serialize,
) -> Context {
    let mut context = base_context(flash_messages, shared, "events");
    context.insert("event", event);
    context
}

#[get("/")]
pub async fn show_events(
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let api = backend(&client, user.as_ref());
    let mut shared = session_context(&api, user, &server_config).await;
    let location = Location::new(req.path(), req.query_string());

    match public_service::load_events(&api, &location, &mut shared).await {
        Ok(events) => {
            let mut context = base_context(&flash_messages, &mut shared, "events");
            context.insert("events", &events);
            render_template(&tera, "public/events.html", &context)
        }
        Err(err) => public_error(
            err,
            &tera,
            &flash_messages,
            &mut shared,
            "public/events.html",
        ),
    }
}

async fn event_page(
    id: i64,
    req: &HttpRequest,
    user: Option<AuthenticatedUser>,
    client: &RestClient,
    flash_messages: &IncomingFlashMessages,
    server_config: &ServerConfig,
    tera: &Tera,
) -> HttpResponse {
    let api = backend(client, user.as_ref());
    let mut shared = session_context(&api, user, server_config).await;
    let Ok(id) = EntityId::new(id) else {
        return not_found(tera, &base_context(flash_messages, &mut shared, "events"));
    };
    let location = Location::new(req.path(), req.query_string());

    match public_service::load_event(&api, id, &location, &mut shared).await {
        Ok(event) => {
            let context = event_context(flash_messages, &mut shared, &event);
            render_template(tera, "public/event.html", &context)
        }
        Err(err) => public_error(err, tera, flash_messages, &mut shared, "public/event.html"),
    }
}

#[get("/events/{id}/")]
pub async fn show_event(
    id: web::Path<i64>,
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    event_page(
        id.into_inner(),
        &req,
        user,
        &client,
        &flash_messages,
        &server_config,
        &tera,
    )
    .await
}

/// Same page with the booking dialog open.
#[get("/events/{id}/book/")]
pub async fn show_booking(
    id: web::Path<i64>,
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    event_page(
        id.into_inner(),
        &req,
        user,
        &client,
        &flash_messages,
        &server_config,
        &tera,
    )
    .await
}

#[post("/events/{id}/book/")]
pub async fn book_event(
    id: web::Path<i64>,
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    body: web::Bytes,
) -> impl Responder {
    let api = backend(&client, user.as_ref());
    let mut shared = session_context(&api, user, &server_config).await;
    let Ok(id) = EntityId::new(id.into_inner()) else {
        return not_found(&tera, &base_context(&flash_messages, &mut shared, "events"));
    };
    let posted = match parse_form(&body) {
        Ok(posted) => posted,
        Err(response) => return response,
    };
    let location = Location::new(req.path(), req.query_string());

    match public_service::book(&api, id, &location, &posted, &mut shared).await {
        Ok(PublicResult::Redirect(target)) => {
            flash_context(&mut shared);
            redirect(&target)
        }
        Ok(PublicResult::Rerender(event)) => {
            let context = event_context(&flash_messages, &mut shared, &event);
            render_with_status(
                &tera,
                "public/event.html",
                &context,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
        Err(err) => public_error(err, &tera, &flash_messages, &mut shared, "public/event.html"),
    }
}

#[get("/donate/")]
pub async fn show_donate(
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let api = backend(&client, user.as_ref());
    let mut shared = session_context(&api, user, &server_config).await;

    match public_service::load_donate(&api, &mut shared).await {
        Ok(view) => {
            let mut context = base_context(&flash_messages, &mut shared, "donate");
            context.insert("donate", &view);
            render_template(&tera, "public/donate.html", &context)
        }
        Err(err) => public_error(err, &tera, &flash_messages, &mut shared, "public/donate.html"),
    }
}

#[post("/donate/")]
pub async fn donate(
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    body: web::Bytes,
) -> impl Responder {
    let api = backend(&client, user.as_ref());
    let mut shared = session_context(&api, user, &server_config).await;
    let posted = match parse_form(&body) {
        Ok(posted) => posted,
        Err(response) => return response,
    };

    match public_service::donate(&api, &posted, &mut shared).await {
        Ok(PublicResult::Redirect(target)) => {
            flash_context(&mut shared);
            redirect(&target)
        }
        Ok(PublicResult::Rerender(view)) => {
            let mut context = base_context(&flash_messages, &mut shared, "donate");
            context.insert("donate", &view);
            render_with_status(
                &tera,
                "public/donate.html",
                &context,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
        }
        Err(err) => public_error(err, &tera, &flash_messages, &mut shared, "public/donate.html"),
    }
}
