use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SESSION_COOKIE_NAME: &str = "__session";
pub const SESSION_ISSUER: &str = "fortifyme";
/// Session lifetime: 5 days.
pub const SESSION_TTL_SECONDS: i64 = 5 * 24 * 60 * 60;

/// Claims carried by a session token. `uid` duplicates `sub` and the two
/// must match exactly for the token to be accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub uid: String,
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session signing secret is not configured")]
    MissingSecret,
    #[error("failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signs a session token for `uid`. An empty secret is a server
/// misconfiguration, surfaced as an error rather than a bad credential.
pub fn issue_session_token(uid: &str, secret: &str) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        uid: uid.to_string(),
        sub: uid.to_string(),
        iss: SESSION_ISSUER.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECONDS,
        nbf: now,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Verifies a session token and returns the user id it names.
///
/// Any failure (bad signature, wrong issuer, outside the validity window,
/// missing or mismatched `uid`/`sub`, unconfigured secret) yields `None`.
/// Failures are logged, never propagated.
pub fn verify_session_token(token: &str, secret: &str) -> Option<String> {
    if secret.is_empty() {
        tracing::warn!("session verification attempted without a configured secret");
        return None;
    }

    let mut validation = Validation::default();
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_nbf = true;

    match decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            let claims = data.claims;
            if claims.uid.is_empty() || claims.uid != claims.sub {
                tracing::warn!("session token rejected: uid/sub claim mismatch");
                return None;
            }
            Some(claims.uid)
        }
        Err(error) => {
            tracing::debug!(%error, "session token verification failed");
            None
        }
    }
}

/// Builds the session cookie: HttpOnly, SameSite=Lax, Path=/, 5-day max-age.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, token);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECONDS));
    cookie
}

/// Cookie that removes the session when sent to the client.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, "");
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_then_verify_round_trips() {
        let token = issue_session_token("user-123", SECRET).unwrap();
        assert_eq!(verify_session_token(&token, SECRET).as_deref(), Some("user-123"));
    }

    #[test]
    fn empty_secret_is_a_misconfiguration() {
        assert!(matches!(
            issue_session_token("user-123", ""),
            Err(SessionError::MissingSecret)
        ));
        let token = issue_session_token("user-123", SECRET).unwrap();
        assert_eq!(verify_session_token(&token, ""), None);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_session_token("user-123", SECRET).unwrap();
        assert_eq!(verify_session_token(&token, "other-secret"), None);
    }

    #[test]
    fn mismatched_uid_and_sub_are_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            uid: "user-123".to_string(),
            sub: "user-456".to_string(),
            iss: SESSION_ISSUER.to_string(),
            iat: now,
            exp: now + 3600,
            nbf: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verify_session_token(&token, SECRET), None);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            uid: "user-123".to_string(),
            sub: "user-123".to_string(),
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 3600,
            nbf: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verify_session_token(&token, SECRET), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            uid: "user-123".to_string(),
            sub: "user-123".to_string(),
            iss: SESSION_ISSUER.to_string(),
            iat: now - 7200,
            exp: now - 3600,
            nbf: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verify_session_token(&token, SECRET), None);
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_eq!(verify_session_token("not-a-jwt", SECRET), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert!(cookie.http_only().unwrap());
        assert!(cookie.secure().unwrap());
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(SESSION_TTL_SECONDS))
        );
    }
}
