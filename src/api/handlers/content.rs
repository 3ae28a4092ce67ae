//! Admin CRUD over projects, clients and messages, plus site settings and
//! dashboard stats.

use super::{json_body, no_cache_headers, AppState};
use crate::api::errors::ApiError;
use crate::store::models::{
    Client, Message, Project, CLIENT_STATUS_ACTIVE, PROJECT_STATUS_COMPLETED,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

type Patch = Result<Json<Map<String, Value>>, JsonRejection>;

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub reply: String,
}

/// Dashboard figures.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_projects: usize,
    pub completed_projects: usize,
    pub total_clients: usize,
    pub active_clients: usize,
    pub total_revenue: f64,
    pub average_project_value: f64,
}

impl StatsResponse {
    pub fn compute(projects: &[Project], clients: &[Client]) -> Self {
        let total_revenue: f64 = projects.iter().map(Project::budget_value).sum();
        let completed_projects = projects
            .iter()
            .filter(|p| p.status.as_deref() == Some(PROJECT_STATUS_COMPLETED))
            .count();
        let active_clients = clients
            .iter()
            .filter(|c| c.status.as_deref() == Some(CLIENT_STATUS_ACTIVE))
            .count();
        let average_project_value = if projects.is_empty() {
            0.0
        } else {
            total_revenue / projects.len() as f64
        };

        Self {
            total_projects: projects.len(),
            completed_projects,
            total_clients: clients.len(),
            active_clients,
            total_revenue,
            average_project_value,
        }
    }
}

fn deleted() -> Json<Value> {
    Json(json!({ "success": true }))
}

// === Projects ===

/// GET /api/admin/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state.content.projects.list().await?;
    Ok((no_cache_headers(), Json(projects)))
}

/// POST /api/admin/projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Project>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.content.projects.add(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/admin/projects/:id
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    patch: Patch,
) -> Result<Json<Project>, ApiError> {
    let project = state.content.projects.update(&id, json_body(patch)?).await?;
    Ok(Json(project))
}

/// DELETE /api/admin/projects/:id
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.content.projects.remove(&id).await?;
    Ok(deleted())
}

// === Clients ===

/// GET /api/admin/clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(state.content.clients.list().await?))
}

/// POST /api/admin/clients
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Client>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let client = state.content.clients.add(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /api/admin/clients/:id
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    patch: Patch,
) -> Result<Json<Client>, ApiError> {
    let client = state.content.clients.update(&id, json_body(patch)?).await?;
    Ok(Json(client))
}

/// DELETE /api/admin/clients/:id
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.content.clients.remove(&id).await?;
    Ok(deleted())
}

// === Messages ===

/// GET /api/admin/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state.content.messages.list().await?;
    Ok((no_cache_headers(), Json(messages)))
}

/// POST /api/admin/messages
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Message>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.content.messages.add(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// PATCH /api/admin/messages/:id
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    patch: Patch,
) -> Result<Json<Message>, ApiError> {
    let message = state.content.messages.update(&id, json_body(patch)?).await?;
    Ok(Json(message))
}

/// POST /api/admin/messages/:id/reply
pub async fn reply_to_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ReplyRequest>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let ReplyRequest { reply } = json_body(body)?;
    if reply.trim().is_empty() {
        return Err(ApiError::bad_request("Yanıt boş olamaz"));
    }
    let message = state.content.messages.reply(&id, reply).await?;
    Ok(Json(message))
}

// === Settings and stats ===

/// GET /api/admin/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    Ok(Json(state.content.settings.get().await?))
}

/// PUT /api/admin/settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    patch: Patch,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let settings = state.content.settings.update(json_body(patch)?).await?;
    tracing::info!(keys = settings.len(), "site settings updated");
    Ok(Json(settings))
}

/// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let (projects, clients) = tokio::try_join!(
        state.content.projects.list(),
        state.content.clients.list()
    )?;
    Ok(Json(StatsResponse::compute(&projects, &clients)))
}
