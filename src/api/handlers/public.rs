//! Unauthenticated endpoints used by the public site.

use super::{is_valid_email, json_body, AppState, MSG_INVALID_EMAIL};
use crate::api::errors::ApiError;
use crate::store::models::{Message, Project};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

const MSG_FIELDS_REQUIRED: &str = "Tüm alanlar zorunludur";
const MSG_CONTACT_RECEIVED: &str =
    "Mesajınız başarıyla gönderildi. En kısa sürede size dönüş yapacağız.";

#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ContactRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let fields = [&self.name, &self.email, &self.subject, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ApiError::bad_request(MSG_FIELDS_REQUIRED));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::bad_request(MSG_INVALID_EMAIL));
        }
        Ok(())
    }

    fn into_message(self, millis: i64) -> Message {
        let category = self
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "general".to_string());
        Message {
            client_id: Some(format!("contact-{millis}")),
            client_name: self.name,
            client_email: self.email,
            subject: self.subject,
            message: self.message,
            priority: Some(priority_for(&category).to_string()),
            category: Some(category),
            ..Message::default()
        }
    }
}

/// Complaints are urgent, quote requests next, everything else low.
fn priority_for(category: &str) -> &'static str {
    match category {
        "complaint" => "high",
        "quote" => "medium",
        _ => "low",
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    success: bool,
    message: &'static str,
    id: String,
}

/// POST /api/contact - store a contact-form submission as a new message.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let request = json_body(body)?;
    request.validate()?;

    let message = request.into_message(chrono::Utc::now().timestamp_millis());
    let saved = state.content.messages.add(message).await?;
    tracing::info!(
        id = %saved.id,
        category = saved.category.as_deref().unwrap_or_default(),
        "contact message received"
    );

    Ok(Json(ContactResponse {
        success: true,
        message: MSG_CONTACT_RECEIVED,
        id: saved.id,
    }))
}

/// GET /api/projects
pub async fn public_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.content.projects.list().await?))
}

/// GET /api/settings
pub async fn public_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    Ok(Json(state.content.settings.get().await?))
}
