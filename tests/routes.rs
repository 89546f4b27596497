use std::net::TcpListener;
use std::time::Duration;

use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, HttpServer, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, Level, storage::CookieMessageStore};
use serde_json::{Value, json};
use tera::Tera;

use eventdesk::api::RestClient;
use eventdesk::models::config::ServerConfig;
use eventdesk::routes::public::{book_event, show_donate};
use eventdesk::routes::{alert_level_to_str, redirect};

#[::core::prelude::v1::test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[::core::prelude::v1::test]
fn redirects_are_see_other() {
    let response = redirect("/login/");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login/");
}

/// Backend with one public event that accepts bookings, plus donation
/// options.
fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(|| {
        App::new()
            .route(
                "/api/public/donations/",
                web::get().to(|| async {
                    HttpResponse::Ok().json(json!({
                        "options": [{"id": 1, "name": "Sponsor a stall", "amount": 25}]
                    }))
                }),
            )
            .route(
                "/api/public/events/5/",
                web::get().to(|| async {
                    HttpResponse::Ok().json(json!({"id": 5, "name": "Summer Fete"}))
                }),
            )
            .route(
                "/api/public/events/5/book/",
                web::post().to(|body: web::Json<Value>| async move {
                    if body["name"] == "Ann" && body["quantity"] == 2 {
                        HttpResponse::Created().json(json!({"id": 71}))
                    } else {
                        HttpResponse::BadRequest().json(json!({"detail": "Unexpected booking"}))
                    }
                }),
            )
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    actix_web::rt::spawn(server);

    format!("http://127.0.0.1:{port}/api/")
}

fn flash_framework(key: &Key) -> FlashMessagesFramework {
    FlashMessagesFramework::builder(CookieMessageStore::builder(key.clone()).build()).build()
}

fn server_config(api_url: String) -> ServerConfig {
    ServerConfig {
        domain: "localhost".to_string(),
        address: "127.0.0.1".to_string(),
        port: 8080,
        templates_dir: "templates/**/*".to_string(),
        secret: "x".repeat(64),
        api_url,
        request_timeout_secs: 5,
        session_hours: 1,
        site_name: "Fete Co".to_string(),
    }
}

#[actix_web::test]
async fn saved_booking_redirects_back_to_the_event() {
    let config = server_config(spawn_backend());
    let client = RestClient::new(&config.api_url, config.request_timeout()).unwrap();
    let key = Key::generate();

    let app = test::init_service(
        App::new()
            .wrap(flash_framework(&key))
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(CookieSessionStore::default(), key))
            .app_data(web::Data::new(Tera::default()))
            .app_data(web::Data::new(client))
            .app_data(web::Data::new(config))
            .service(book_event),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/events/5/book/")
        .set_form([
            ("name", "Ann"),
            ("email", "ann@example.com"),
            ("quantity", "2"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/events/5/");
}

#[actix_web::test]
async fn donation_page_lists_the_options() {
    let config = server_config(spawn_backend());
    let client = RestClient::new(&config.api_url, config.request_timeout()).unwrap();
    let key = Key::generate();

    let app = test::init_service(
        App::new()
            .wrap(flash_framework(&key))
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(CookieSessionStore::default(), key))
            .app_data(web::Data::new(Tera::new("templates/**/*").unwrap()))
            .app_data(web::Data::new(client))
            .app_data(web::Data::new(config))
            .service(show_donate),
    )
    .await;

    let req = test::TestRequest::get().uri("/donate/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Support Fete Co"));
    assert!(body.contains("Sponsor a stall"));
}
