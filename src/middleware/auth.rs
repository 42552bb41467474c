use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::{err, ApiError};
use crate::session::{removal_cookie, verify_session_token, SESSION_COOKIE_NAME};
use crate::AppState;

/// Extractor for authenticated API requests. Re-verifies the session cookie
/// on every request; there is no session cache.
pub struct SessionUser {
    pub uid: String,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let uid = jar
            .get(SESSION_COOKIE_NAME)
            .and_then(|cookie| verify_session_token(cookie.value(), &state.session_secret));

        match uid {
            Some(uid) => Ok(SessionUser { uid }),
            None => Err(err(StatusCode::UNAUTHORIZED, "Unauthorized")),
        }
    }
}

/// Verified user id attached to protected page requests by the route gate.
#[derive(Debug, Clone)]
pub struct AuthUid(pub String);

/// Route classification for the gate. The table is a closed set; new pages
/// must be declared here to be protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AuthOnly,
    Protected,
}

const AUTH_ONLY_ROUTES: &[&str] = &["/login", "/signup"];
const PROTECTED_ROUTES: &[&str] = &["/dashboard", "/supplements", "/research", "/profile"];

fn matches_table(table: &[&str], path: &str) -> bool {
    table.iter().any(|route| {
        path == *route
            || path
                .strip_prefix(route)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

pub fn classify_route(path: &str) -> RouteClass {
    if matches_table(AUTH_ONLY_ROUTES, path) {
        RouteClass::AuthOnly
    } else if matches_table(PROTECTED_ROUTES, path) {
        RouteClass::Protected
    } else {
        RouteClass::Public
    }
}

/// Paths the gate never touches: API, docs, static assets.
fn bypasses_gate(path: &str) -> bool {
    path.starts_with("/api")
        || path.starts_with("/docs")
        || path.starts_with("/assets")
        || path == "/favicon.ico"
}

// Query-component set: enough to round-trip a path in a query value.
const CALLBACK_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'=');

fn login_redirect(path: &str) -> Redirect {
    let callback = utf8_percent_encode(path, CALLBACK_ENCODE);
    Redirect::temporary(&format!("/login?callbackUrl={callback}"))
}

/// Route authorization gate. Runs once per page request, before any handler,
/// and performs no mutations beyond clearing a failed cookie.
///
/// - protected + unauthenticated: redirect to login, remembering the path
/// - auth-only + authenticated: redirect to the dashboard
/// - protected + authenticated: attach the verified uid and continue
pub async fn route_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if bypasses_gate(&path) {
        return next.run(request).await;
    }

    let cookie_present = jar.get(SESSION_COOKIE_NAME).is_some();
    let uid = jar
        .get(SESSION_COOKIE_NAME)
        .and_then(|cookie| verify_session_token(cookie.value(), &state.session_secret));
    // A cookie that fails verification is cleared on the way out: fail closed.
    let stale_cookie = cookie_present && uid.is_none();

    match (classify_route(&path), uid) {
        (RouteClass::Protected, Some(uid)) => {
            request.extensions_mut().insert(AuthUid(uid));
            next.run(request).await
        }
        (RouteClass::Protected, None) => {
            let redirect = login_redirect(&path);
            if stale_cookie {
                (jar.remove(removal_cookie()), redirect).into_response()
            } else {
                redirect.into_response()
            }
        }
        (RouteClass::AuthOnly, Some(_)) => Redirect::temporary("/dashboard").into_response(),
        (_, _) => {
            let response = next.run(request).await;
            if stale_cookie {
                (jar.remove(removal_cookie()), response).into_response()
            } else {
                response
            }
        }
    }
}
