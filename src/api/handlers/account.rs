//! Password and profile changes for the signed-in admin.

use super::{is_valid_email, json_body, AppState, MSG_INVALID_EMAIL};
use crate::api::errors::ApiError;
use crate::api::session::Session;
use crate::auth::{AuthError, ProfileUpdate};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

impl fmt::Debug for PasswordChangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChangeRequest { .. }")
    }
}

#[derive(Serialize)]
pub struct PasswordChangeResponse {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    username: String,
    email: String,
    role: String,
    is_active: bool,
}

/// PUT /api/admin/password - change the admin password.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(Session(claims)): Extension<Session>,
    body: Result<Json<PasswordChangeRequest>, JsonRejection>,
) -> Result<Json<PasswordChangeResponse>, ApiError> {
    let body = json_body(body)?;
    if body.new_password.is_empty() {
        return Err(ApiError::bad_request("Yeni şifre boş olamaz"));
    }

    state
        .auth
        .change_password(&claims.username, &body.current_password, &body.new_password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => ApiError::Forbidden("Mevcut şifre yanlış".into()),
            other => other.into(),
        })?;

    Ok(Json(PasswordChangeResponse {
        success: true,
        message: "Şifre güncellendi",
    }))
}

/// PUT /api/admin/profile - update email and active flag.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let update = json_body(body)?;
    if let Some(ref email) = update.email {
        if !is_valid_email(email) {
            return Err(ApiError::bad_request(MSG_INVALID_EMAIL));
        }
    }
    let admin = state.auth.update_profile(update).await?;
    Ok(Json(ProfileResponse {
        username: admin.username,
        email: admin.email,
        role: admin.role.to_string(),
        is_active: admin.is_active,
    }))
}
