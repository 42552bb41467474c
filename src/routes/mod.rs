pub mod auth;
pub mod dashboard;
pub mod dose_log;
pub mod pages;
pub mod research;
pub mod supplements;

use axum::{middleware as axum_middleware, Router};

use crate::middleware::auth::route_gate;
use crate::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/supplements", supplements::router())
        .nest("/api/dose-log", dose_log::router())
        .nest("/api/research", research::router())
        .nest("/api/dashboard", dashboard::router())
        .merge(pages::router().layer(axum_middleware::from_fn_with_state(
            state.clone(),
            route_gate,
        )))
        .with_state(state)
}
