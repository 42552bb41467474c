use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing the environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for the environment variable {0}: {1}")]
    InvalidValue(&'static str, String),
}

pub struct Config {
    pub database_url: String,
    /// Session signing secret. May be empty; an empty secret is reported as a
    /// server misconfiguration when a token is issued, not at startup.
    pub session_secret: String,
    pub listen_addr: String,
    /// Comma-separated allowed CORS origins. If empty or "*", allows all origins (dev mode).
    pub cors_origins: String,
    /// Whether the session cookie carries the Secure attribute (on in production).
    pub cookie_secure: bool,
    /// Tokeninfo endpoint of the external identity provider.
    pub identity_tokeninfo_url: String,
    pub openai_api_key: Option<String>,
    pub research_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let cookie_secure_str =
            std::env::var("COOKIE_SECURE").unwrap_or_else(|_| "false".to_string());
        let cookie_secure = cookie_secure_str
            .parse::<bool>()
            .map_err(|_| ConfigError::InvalidValue("COOKIE_SECURE", cookie_secure_str))?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
            session_secret: std::env::var("SESSION_SECRET").unwrap_or_default(),
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            cors_origins: std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            cookie_secure,
            identity_tokeninfo_url: std::env::var("IDENTITY_TOKENINFO_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/tokeninfo".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            research_model: std::env::var("RESEARCH_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
        })
    }
}
