//! Verification of provider-issued ID tokens.
//!
//! Sign-in happens against an external identity provider; the server only
//! ever sees the resulting ID token and exchanges it for a session cookie.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider rejected the token")]
    InvalidToken,
    #[error("identity provider request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Port to the external identity provider: ID token in, verified user id out.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_id_token(&self, id_token: &str) -> Result<String, IdentityError>;
}

/// Adapter that validates ID tokens against the provider's tokeninfo endpoint.
pub struct TokeninfoProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl TokeninfoProvider {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[derive(Deserialize)]
struct TokenInfo {
    sub: String,
}

#[async_trait]
impl IdentityProvider for TokeninfoProvider {
    async fn verify_id_token(&self, id_token: &str) -> Result<String, IdentityError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::InvalidToken);
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|_| IdentityError::InvalidToken)?;

        if info.sub.is_empty() {
            return Err(IdentityError::InvalidToken);
        }
        Ok(info.sub)
    }
}

/// Provider that accepts every non-empty token with a fixed subject, or
/// rejects everything. For tests and local development only.
pub struct StaticIdentity {
    uid: Option<String>,
}

impl StaticIdentity {
    pub fn accepting(uid: &str) -> Self {
        Self {
            uid: Some(uid.to_string()),
        }
    }

    pub fn rejecting() -> Self {
        Self { uid: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn verify_id_token(&self, id_token: &str) -> Result<String, IdentityError> {
        match &self.uid {
            Some(uid) if !id_token.is_empty() => Ok(uid.clone()),
            _ => Err(IdentityError::InvalidToken),
        }
    }
}
