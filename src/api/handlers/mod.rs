//! HTTP request handlers
//!
//! Split into submodules by domain:
//! - `auth` - login, logout and token verification
//! - `account` - password and profile changes for the signed-in admin
//! - `content` - projects, clients, messages, site settings and stats
//! - `upload` - image uploads for projects and the favicon
//! - `public` - contact form and read-only data for the public site
//! - `status` - health check

mod account;
mod auth;
mod content;
mod public;
mod status;
mod upload;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::api::errors::ApiError;
use crate::store::ContentStore;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::Json;
use regex::Regex;
use std::sync::LazyLock;

pub use account::{change_password, update_profile, PasswordChangeRequest};
pub use auth::{login, logout, verify, LoginRequest};
pub use content::{
    create_client, create_message, create_project, delete_client, delete_project, get_settings,
    get_stats, list_clients, list_messages, list_projects, reply_to_message, update_client,
    update_message, update_project, update_settings, ReplyRequest, StatsResponse,
};
pub use public::{public_projects, public_settings, submit_contact, ContactRequest};
pub use status::{health_check, HealthResponse};
pub use upload::upload_file;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub auth: Authenticator,
    pub content: ContentStore,
}

/// Unwrap a JSON body, turning extractor rejections into a JSON 400.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|e| {
        tracing::debug!(error = %e, "request body rejected");
        ApiError::bad_request("Geçersiz istek gövdesi")
    })
}

/// Headers telling browsers and proxies never to cache the response.
fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    headers
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

const MSG_INVALID_EMAIL: &str = "Geçerli bir email adresi giriniz";

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
