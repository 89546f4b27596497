use actix_web::{
    App, HttpResponse,
    http::{StatusCode, header},
    test, web,
};

use eventdesk::middleware::{RedirectUnauthorized, login_url};

#[actix_web::test]
async fn redirects_unauthorized_to_login_with_next() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Unauthorized().finish() })),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/dashboard/events/?page=2")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/login/?next=%2Fdashboard%2Fevents%2F%3Fpage%3D2"
    );
}

#[actix_web::test]
async fn success_response_passes_through() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn missing_session_is_redirected() {
    use eventdesk::domain::auth::AuthenticatedUser;

    async fn private(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.name)
    }

    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .wrap(actix_identity::IdentityMiddleware::default())
            .wrap(
                actix_session::SessionMiddleware::builder(
                    actix_session::storage::CookieSessionStore::default(),
                    actix_web::cookie::Key::generate(),
                )
                .build(),
            )
            .route("/dashboard/", web::get().to(private)),
    )
    .await;

    let req = test::TestRequest::get().uri("/dashboard/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        login_url("/dashboard/").as_str()
    );
}
