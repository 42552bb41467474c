use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use fortify_server::{
    config::Config, cors_layer, identity::TokeninfoProvider, routes, ApiDoc, AppState,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("fortify_server=debug,tower_http=debug")
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./src/db/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let cors = cors_layer(&config.cors_origins);

    let llm = match &config.openai_api_key {
        Some(key) => Client::with_config(OpenAIConfig::new().with_api_key(key)),
        None => Client::new(),
    };

    let state = AppState {
        db: pool,
        session_secret: config.session_secret,
        cookie_secure: config.cookie_secure,
        identity: Arc::new(TokeninfoProvider::new(config.identity_tokeninfo_url)),
        llm,
        research_model: config.research_model,
    };

    let app = routes::api_router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!("Listening on {}", config.listen_addr);
    tracing::info!("Swagger UI at http://{}/docs/", config.listen_addr);
    axum::serve(listener, app).await.unwrap();
}
