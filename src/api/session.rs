//! Session cookie handling and the gates in front of protected routes.

use super::errors::{ApiError, MSG_TOKEN_MISSING};
use super::handlers::AppState;
use crate::auth::{SessionClaims, SESSION_LIFETIME_SECS};
use axum::extract::{OriginalUri, Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "adminToken";

pub const ADMIN_LOGIN_PAGE: &str = "/admin/login";
pub const ADMIN_HOME_PAGE: &str = "/admin/dashboard";

/// Verified identity of the caller, inserted as a request extension by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

/// `Set-Cookie` value that stores `token` for the session lifetime.
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, ApiError> {
    cookie_header(token, SESSION_LIFETIME_SECS, secure)
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, ApiError> {
    cookie_header("", 0, secure)
}

fn cookie_header(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(format!("bad cookie: {e}")))
}

/// Extract the session token from the Cookie header.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|part| {
            part.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .filter(|token| !token.is_empty())
                .map(str::to_string)
        })
}

/// Middleware: no protected admin API handler runs without a verified token.
/// Returns 401 when the cookie is missing or the token does not verify.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized(MSG_TOKEN_MISSING.to_string()))?;
    let claims = state.auth.verify(&token)?;
    request.extensions_mut().insert(Session(claims));
    Ok(next.run(request).await)
}

/// Middleware for the admin pages.
///
/// The login page bounces an already signed-in admin to the dashboard. Every
/// other admin page requires a token that verifies, otherwise the browser is
/// sent to the login page.
pub async fn admin_page_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let signed_in = extract_session_token(request.headers())
        .map(|token| state.auth.verify(&token).is_ok())
        .unwrap_or(false);

    let on_login_page = path.trim_end_matches('/') == ADMIN_LOGIN_PAGE;
    if on_login_page {
        if signed_in {
            return Redirect::temporary(ADMIN_HOME_PAGE).into_response();
        }
    } else if !signed_in {
        tracing::debug!(%path, "admin page requested without a valid session");
        return Redirect::temporary(ADMIN_LOGIN_PAGE).into_response();
    }

    next.run(request).await
}
