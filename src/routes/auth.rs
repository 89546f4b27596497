use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;
use validator::Validate;

use crate::api::RestClient;
use crate::domain::auth::{AuthenticatedUser, STAFF_ROLE};
use crate::forms::login::LoginForm;
use crate::models::auth::{encode_session, session_expiry};
use crate::models::config::ServerConfig;
use crate::pages::PageKind;
use crate::routes::{backend, base_context, redirect, render_template, session_context};
use crate::services::auth as auth_service;

#[derive(Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

/// Staff land on the dashboard, everyone else on the public site.
fn home_for(user: &AuthenticatedUser) -> String {
    if user.has_role(STAFF_ROLE) {
        PageKind::Events.list_path()
    } else {
        "/".to_string()
    }
}

#[get("/login/")]
pub async fn show_login(
    query: web::Query<LoginQuery>,
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Some(user) = user {
        return redirect(&home_for(&user));
    }

    let mut shared = session_context(&client, None, &server_config).await;
    let mut context = base_context(&flash_messages, &mut shared, "login");
    context.insert("next", &query.next);
    context.insert("email", "");
    render_template(&tera, "auth/login.html", &context)
}

#[post("/login/")]
pub async fn login(
    req: HttpRequest,
    client: web::Data<RestClient>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    if let Err(err) = form.validate() {
        log::info!("Invalid login form: {err}");
        FlashMessage::error("Please enter your email address and password.").send();
        return redirect("/login/");
    }

    let mut shared = session_context(&client, None, &server_config).await;
    let exp = session_expiry(server_config.session_hours);

    let user = match auth_service::login(client.get_ref(), &form, exp, &mut shared).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Rejected credentials: show the backend's reason next to the form.
            let mut context = base_context(&flash_messages, &mut shared, "login");
            context.insert("next", &form.next);
            context.insert("email", form.email.trim());
            return render_template(&tera, "auth/login.html", &context);
        }
        Err(err) => {
            log::error!("Failed to sign in: {err}");
            FlashMessage::error("Signing in failed. Please try again later.").send();
            return redirect("/login/");
        }
    };

    let session = match encode_session(&user, &server_config.secret) {
        Ok(session) => session,
        Err(err) => {
            log::error!("Failed to sign the session token: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    if let Err(err) = Identity::login(&req.extensions(), session) {
        log::error!("Failed to store the session: {err}");
        return HttpResponse::InternalServerError().finish();
    }

    FlashMessage::success(format!("Welcome back, {}.", user.name)).send();
    redirect(form.next_or(&home_for(&user)))
}

#[post("/logout/")]
pub async fn logout(
    identity: Option<Identity>,
    user: Option<AuthenticatedUser>,
    client: web::Data<RestClient>,
) -> impl Responder {
    if let Some(user) = user.as_ref() {
        auth_service::logout(&backend(&client, Some(user))).await;
    }
    if let Some(identity) = identity {
        identity.logout();
    }
    FlashMessage::info("You have been signed out.").send();
    redirect("/")
}
