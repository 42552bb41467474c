pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod schedule;
pub mod session;

use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::identity::IdentityProvider;

/// Builds the CORS layer from the comma-separated origin list; "*" keeps the
/// permissive dev layer. With explicit origins credentials are allowed, which
/// rules out the `Any` wildcard for headers (tower-http panics on that
/// combination), so the allowed headers are listed out.
pub fn cors_layer(cors_origins: &str) -> CorsLayer {
    if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    /// Session signing secret; empty means misconfigured (issue fails with 500).
    pub session_secret: String,
    pub cookie_secure: bool,
    pub identity: Arc<dyn IdentityProvider>,
    pub llm: Client<OpenAIConfig>,
    pub research_model: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::create_session,
        routes::auth::delete_session,
        routes::supplements::list_supplements,
        routes::supplements::create_supplement,
        routes::supplements::get_supplement,
        routes::supplements::update_supplement,
        routes::supplements::delete_supplement,
        routes::dose_log::get_dose_log,
        routes::dose_log::toggle_dose_entry,
        routes::dashboard::get_schedule,
        routes::dashboard::get_summary,
        routes::research::research,
        routes::research::save_search,
        routes::research::get_history,
        routes::research::delete_search,
        routes::research::clear_history,
        routes::research::toggle_bookmark,
        routes::research::update_bookmark_details,
        routes::research::get_bookmarks,
        routes::research::get_stats,
    ),
    components(schemas(
        error::ApiError,
        routes::auth::CreateSessionRequest,
        routes::auth::SessionResponse,
        routes::auth::StatusResponse,
        models::supplement::SupplementInput,
        models::supplement::SupplementResponse,
        models::dose_log::ToggleDoseRequest,
        models::dose_log::ToggleDoseResponse,
        models::dose_log::DoseLogResponse,
        models::research::ResearchCategory,
        models::research::ResearchRequest,
        models::research::SaveSearchRequest,
        models::research::SavedSearchResponse,
        models::research::SearchHistoryItem,
        models::research::BookmarkedResearch,
        models::research::BookmarkToggleResponse,
        models::research::BookmarkDetailsRequest,
        models::research::ClearHistoryResponse,
        models::research::SearchStatsResponse,
        schedule::ScheduleTime,
        schedule::DoseEntry,
        schedule::DailySchedule,
        routes::dashboard::ScheduleResponse,
        routes::dashboard::SummaryResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session creation and sign-out"),
        (name = "Supplements", description = "Per-user supplement CRUD"),
        (name = "DoseLog", description = "Daily dose checklist state"),
        (name = "Dashboard", description = "Schedule and summary views"),
        (name = "Research", description = "LLM research and search history")
    ),
    security(("session_cookie" = []))
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            utoipa::openapi::security::SecurityScheme::ApiKey(
                utoipa::openapi::security::ApiKey::Cookie(
                    utoipa::openapi::security::ApiKeyValue::new(session::SESSION_COOKIE_NAME),
                ),
            ),
        );
    }
}
