pub mod api;
pub mod domain;
pub mod error_conversions;
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
pub mod pages;
pub mod pagination;
pub mod render;
#[cfg(feature = "server")]
pub mod routes;
pub mod routing;
pub mod services;

#[cfg(feature = "server")]
pub use crate::server::run;

#[cfg(feature = "server")]
mod server {
    use actix_cors::Cors;
    use actix_files::Files;
    use actix_identity::IdentityMiddleware;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::middleware::{Compress, Logger};
    use actix_web::{App, HttpServer, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
    use tera::Tera;

    use crate::api::RestClient;
    use crate::middleware::RedirectUnauthorized;
    use crate::models::config::ServerConfig;
    use crate::routes::auth::{login, logout, show_login};
    use crate::routes::default_not_found;
    use crate::routes::dashboard::{dashboard_index, run_action, show_page, submit_form, upload_image};
    use crate::routes::public::{
        book_event, donate, show_booking, show_donate, show_event, show_events,
    };

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        let client = RestClient::new(&server_config.api_url, server_config.request_timeout())
            .map_err(|e| std::io::Error::other(format!("Failed to create API client: {e}")))?;

        // Keys and stores for identity, sessions, and flash messages.
        let secret_key = Key::from(server_config.secret.as_bytes());

        let message_store = CookieMessageStore::builder(secret_key.clone()).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let bind_address = (server_config.address.clone(), server_config.port);
        log::info!(
            "Serving on {}:{} against {}",
            bind_address.0,
            bind_address.1,
            client.base_url()
        );

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                        .cookie_secure(false) // set to true in prod
                        .cookie_domain(Some(format!(".{}", server_config.domain)))
                        .build(),
                )
                .wrap(Compress::default())
                .wrap(Logger::default())
                .service(Files::new("/assets", "./assets"))
                .service(show_events)
                .service(show_event)
                .service(show_booking)
                .service(book_event)
                .service(show_donate)
                .service(donate)
                .service(show_login)
                .service(login)
                .service(logout)
                .service(
                    web::scope("")
                        .wrap(RedirectUnauthorized)
                        .service(dashboard_index)
                        .service(run_action)
                        .service(upload_image)
                        .service(show_page)
                        .service(submit_form),
                )
                .default_service(web::to(default_not_found))
                .app_data(web::Data::new(tera.clone()))
                .app_data(web::Data::new(client.clone()))
                .app_data(web::Data::new(server_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
