//! Image upload for project pictures and the site favicon.

use super::AppState;
use crate::api::errors::ApiError;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];
const ICON_TYPES: &[&str] = &["image/x-icon", "image/vnd.microsoft.icon"];

const MSG_NO_FILE: &str = "Dosya bulunamadı";
const MSG_BAD_TYPE: &str = "Sadece JPEG, PNG, WebP ve ICO dosyaları kabul edilir";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    success: bool,
    url: String,
    file_name: String,
}

/// What the upload is for. Favicons additionally accept ICO files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadKind {
    Project,
    Favicon,
}

impl UploadKind {
    fn from_field(value: Option<&str>) -> Self {
        match value {
            Some("favicon") => UploadKind::Favicon,
            _ => UploadKind::Project,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            UploadKind::Project => "project",
            UploadKind::Favicon => "favicon",
        }
    }

    fn accepts(self, content_type: &str) -> bool {
        IMAGE_TYPES.contains(&content_type)
            || (self == UploadKind::Favicon && ICON_TYPES.contains(&content_type))
    }
}

struct UploadedFile {
    name: String,
    content_type: String,
    data: Vec<u8>,
}

/// POST /api/admin/upload - multipart `file` plus optional `type`.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let max = state.config.max_upload_bytes;
    let mut file: Option<UploadedFile> = None;
    let mut kind_field: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .or_else(|| mime_guess::from_path(&name).first_raw().map(str::to_string))
                    .unwrap_or_default();
                let data = field.bytes().await.map_err(|e| multipart_error(e, max))?;
                file = Some(UploadedFile {
                    name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            Some("type") => {
                kind_field = Some(field.text().await.map_err(|e| multipart_error(e, max))?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request(MSG_NO_FILE))?;
    let kind = UploadKind::from_field(kind_field.as_deref());
    debug!(
        file_name = %file.name,
        size = file.data.len(),
        content_type = %file.content_type,
        kind = kind.prefix(),
        "upload received"
    );

    if !kind.accepts(&file.content_type) {
        warn!(content_type = %file.content_type, "upload rejected: type not allowed");
        return Err(ApiError::bad_request(MSG_BAD_TYPE));
    }
    if file.data.len() > max {
        warn!(size = file.data.len(), max, "upload rejected: too large");
        return Err(ApiError::BadRequest(too_large_message(max)));
    }

    let file_name = stored_file_name(
        kind,
        &file.name,
        &file.content_type,
        chrono::Utc::now().timestamp_millis(),
    );
    let dir = &state.config.uploads_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Internal(format!("create {}: {e}", dir.display())))?;
    let path = dir.join(&file_name);
    tokio::fs::write(&path, &file.data)
        .await
        .map_err(|e| ApiError::Internal(format!("write {}: {e}", path.display())))?;

    info!(%file_name, size = file.data.len(), "file uploaded");
    Ok(Json(UploadResponse {
        success: true,
        url: format!("/uploads/{file_name}"),
        file_name,
    }))
}

fn multipart_error(err: MultipartError, max: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BadRequest(too_large_message(max))
    } else {
        debug!(error = %err, "malformed multipart body");
        ApiError::bad_request(MSG_NO_FILE)
    }
}

fn too_large_message(max: usize) -> String {
    format!("Dosya boyutu {}'dan küçük olmalıdır", human_limit(max))
}

/// `<prefix>-<millis><ext>`. The extension always matches the validated
/// content type: the client's own extension is kept only when it is one of
/// the type's known extensions, otherwise the canonical one is used.
fn stored_file_name(kind: UploadKind, original: &str, content_type: &str, millis: i64) -> String {
    let known = mime_guess::get_mime_extensions_str(content_type).unwrap_or_default();
    let ext = std::path::Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| known.contains(&ext.as_str()))
        .unwrap_or_else(|| canonical_extension(content_type).to_string());
    format!("{}-{}.{}", kind.prefix(), millis, ext)
}

fn canonical_extension(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        _ => "png",
    }
}

/// "5MB" for whole mebibytes, otherwise a byte count.
fn human_limit(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bayt")
    }
}
