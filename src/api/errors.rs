//! API error type and JSON error responses

use crate::auth::AuthError;
use crate::store::StorageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const MSG_INVALID_CREDENTIALS: &str = "Geçersiz kullanıcı adı veya şifre";
pub const MSG_CREDENTIALS_REQUIRED: &str = "Kullanıcı adı ve şifre gerekli";
pub const MSG_TOKEN_MISSING: &str = "Token bulunamadı";
pub const MSG_TOKEN_INVALID: &str = "Geçersiz token";
pub const MSG_SERVER_ERROR: &str = "Sunucu hatası";
pub const MSG_NOT_FOUND: &str = "Kayıt bulunamadı";

/// Errors returned by HTTP handlers.
///
/// Client-facing variants carry the message shown to the user. `Internal`
/// carries detail for the log only; the response says [`MSG_SERVER_ERROR`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m) => m,
            ApiError::Internal(_) => MSG_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref detail) = self {
            tracing::error!(error = %detail, "request failed");
        }
        let status = self.status_code();
        let body = json!({
            "success": false,
            "error": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => {
                tracing::debug!(%what, "record not found");
                ApiError::NotFound(MSG_NOT_FOUND.to_string())
            }
            StorageError::Invalid(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized(MSG_INVALID_CREDENTIALS.to_string())
            }
            AuthError::InvalidToken(_) => ApiError::Unauthorized(MSG_TOKEN_INVALID.to_string()),
            AuthError::Storage(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
