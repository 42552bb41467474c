use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{err, ApiError};
use crate::identity::IdentityError;
use crate::session::{issue_session_token, removal_cookie, session_cookie, SessionError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/session", post(create_session).delete(delete_session))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// ID token minted by the external identity provider at sign-in.
    pub id_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub status: &'static str,
    pub uid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Exchanges a provider ID token for a session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/session",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created, cookie set", body = SessionResponse),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 401, description = "Provider rejected the ID token", body = ApiError),
        (status = 500, description = "Session secret not configured", body = ApiError),
    ),
    tag = "Auth"
)]
pub(crate) async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SessionResponse>), (StatusCode, Json<ApiError>)> {
    let Json(req) = payload.map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid request body"))?;

    let uid = state
        .identity
        .verify_id_token(&req.id_token)
        .await
        .map_err(|error| match error {
            IdentityError::InvalidToken => err(StatusCode::UNAUTHORIZED, "Invalid ID token"),
            IdentityError::Upstream(error) => {
                tracing::error!(%error, "identity provider request failed");
                err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to verify ID token")
            }
        })?;

    let token = issue_session_token(&uid, &state.session_secret).map_err(|error| match error {
        SessionError::MissingSecret => err(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server session secret is not configured",
        ),
        SessionError::Signing(error) => {
            tracing::error!(%error, "failed to sign session token");
            err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
        }
    })?;

    let jar = jar.add(session_cookie(token, state.cookie_secure));
    Ok((
        jar,
        Json(SessionResponse {
            status: "success",
            uid,
        }),
    ))
}

/// Signs the user out by clearing the session cookie.
#[utoipa::path(
    delete,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session cookie cleared", body = StatusResponse),
    ),
    tag = "Auth"
)]
pub(crate) async fn delete_session(jar: CookieJar) -> (CookieJar, Json<StatusResponse>) {
    (
        jar.remove(removal_cookie()),
        Json(StatusResponse { status: "success" }),
    )
}
