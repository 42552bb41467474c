mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fortify_server::identity::{IdentityProvider, StaticIdentity};
use fortify_server::routes;
use fortify_server::session::SESSION_COOKIE_NAME;

fn app_with(identity: Arc<dyn IdentityProvider>, secret: &str) -> Router {
    routes::api_router(common::test_state(identity, secret))
}

fn app() -> Router {
    app_with(
        Arc::new(StaticIdentity::accepting(common::TEST_UID)),
        common::TEST_SECRET,
    )
}

fn create_session_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/auth/session")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn create_session_sets_the_cookie() {
    let response = app()
        .oneshot(create_session_request(r#"{"idToken": "provider-token"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=432000"));

    let json = json_body(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["uid"], common::TEST_UID);
}

#[tokio::test]
async fn session_cookie_passes_the_route_gate() {
    let app = app();

    let response = app
        .clone()
        .oneshot(create_session_request(r#"{"idToken": "provider-token"}"#))
        .await
        .unwrap();
    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rejected_id_token_is_a_401() {
    let app = app_with(Arc::new(StaticIdentity::rejecting()), common::TEST_SECRET);
    let response = app
        .oneshot(create_session_request(r#"{"idToken": "bad-token"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = json_body(response).await;
    assert_eq!(json["error"], "Invalid ID token");
}

#[tokio::test]
async fn malformed_body_is_a_400() {
    let response = app()
        .oneshot(create_session_request("not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "Invalid request body");
}

#[tokio::test]
async fn missing_secret_is_a_configuration_error() {
    // Credential was fine; the failure class must be the server's, not the user's.
    let app = app_with(Arc::new(StaticIdentity::accepting(common::TEST_UID)), "");
    let response = app
        .oneshot(create_session_request(r#"{"idToken": "provider-token"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["error"], "Server session secret is not configured");
}

#[tokio::test]
async fn delete_session_clears_the_cookie() {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/auth/session")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
    assert!(set_cookie.contains("Max-Age=0") || set_cookie.contains("Expires="));

    let json = json_body(response).await;
    assert_eq!(json["status"], "success");
}
