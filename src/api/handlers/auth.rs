//! Login, logout and session verification.

use super::AppState;
use crate::api::errors::{ApiError, MSG_CREDENTIALS_REQUIRED, MSG_TOKEN_INVALID, MSG_TOKEN_MISSING};
use crate::api::session::{clear_session_cookie, extract_session_token, session_cookie};
use crate::auth::SessionClaims;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginUser {
    username: String,
    role: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    message: &'static str,
    user: LoginUser,
}

#[derive(Serialize)]
struct LogoutResponse {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
struct VerifyResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<SessionClaims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

/// POST /api/admin/auth/login - check credentials, set the session cookie.
///
/// The token travels only in the HttpOnly cookie, never in the body.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "login body rejected");
        ApiError::bad_request(MSG_CREDENTIALS_REQUIRED)
    })?;
    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request(MSG_CREDENTIALS_REQUIRED));
    }

    let success = state.auth.login(&body.username, &body.password).await?;
    let cookie = session_cookie(&success.token, state.config.cookie_secure)?;

    let response = LoginResponse {
        success: true,
        message: "Giriş başarılı",
        user: LoginUser {
            username: success.claims.username,
            role: success.claims.role.to_string(),
        },
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// POST /api/admin/auth/logout - clear the session cookie.
///
/// Tokens are stateless, so a copied token stays valid until it expires.
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let cookie = clear_session_cookie(state.config.cookie_secure)?;
    let response = LogoutResponse {
        success: true,
        message: "Çıkış başarılı",
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// GET /api/admin/auth/verify - report whether the cookie holds a valid session.
pub async fn verify(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(token) = extract_session_token(&headers) else {
        return rejected(MSG_TOKEN_MISSING);
    };
    match state.auth.verify(&token) {
        Ok(claims) => Json(VerifyResponse {
            valid: true,
            user: Some(claims),
            error: None,
        })
        .into_response(),
        Err(_) => rejected(MSG_TOKEN_INVALID),
    }
}

fn rejected(error: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(VerifyResponse {
            valid: false,
            user: None,
            error: Some(error),
        }),
    )
        .into_response()
}
