use std::sync::Arc;

use async_openai::Client;
use sqlx::postgres::PgPoolOptions;

use fortify_server::identity::IdentityProvider;
use fortify_server::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_UID: &str = "user-abc";

/// State for router tests that never reach the database: the pool is lazy
/// and connects only on first use.
pub fn test_state(identity: Arc<dyn IdentityProvider>, session_secret: &str) -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/fortify_test")
        .expect("lazy pool");

    AppState {
        db: pool,
        session_secret: session_secret.to_string(),
        cookie_secure: false,
        identity,
        llm: Client::new(),
        research_model: "gpt-4o".to_string(),
    }
}
