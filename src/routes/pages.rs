//! Placeholder page handlers. Rendering is out of scope; these exist so the
//! route authorization gate has real routes to protect.

use axum::{response::Html, routing::get, Extension, Router};

use crate::middleware::auth::AuthUid;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route("/signup", get(signup))
        .route("/dashboard", get(dashboard))
        .route("/supplements", get(supplements))
        .route("/research", get(research))
        .route("/profile", get(profile))
}

async fn home() -> Html<&'static str> {
    Html("<h1>Fortify</h1>")
}

async fn login() -> Html<&'static str> {
    Html("<h1>Sign in</h1>")
}

async fn signup() -> Html<&'static str> {
    Html("<h1>Sign up</h1>")
}

async fn dashboard(Extension(AuthUid(uid)): Extension<AuthUid>) -> Html<String> {
    Html(format!("<h1>Dashboard</h1><p>Signed in as {uid}</p>"))
}

async fn supplements(Extension(AuthUid(_uid)): Extension<AuthUid>) -> Html<&'static str> {
    Html("<h1>Supplements</h1>")
}

async fn research(Extension(AuthUid(_uid)): Extension<AuthUid>) -> Html<&'static str> {
    Html("<h1>Research</h1>")
}

async fn profile(Extension(AuthUid(_uid)): Extension<AuthUid>) -> Html<&'static str> {
    Html("<h1>Profile</h1>")
}
