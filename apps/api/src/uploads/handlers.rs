use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::AppState;
use crate::uploads::storage::stored_file_name;

/// Multipart field the resume must be sent under.
pub const UPLOAD_FIELD: &str = "file";

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ALLOWED_MIME_TYPES: &[&str] = &[PDF_MIME, DOCX_MIME];

/// Upload failures. Each maps to a fixed status and `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type, only PDF and DOCX are allowed!")]
    InvalidFileType,

    #[error("LIMIT_FILE_SIZE")]
    FileTooLarge,

    #[error("LIMIT_UNEXPECTED_FILE")]
    UnexpectedFile,

    #[error("{0}")]
    Multipart(String),

    #[error("{0}")]
    Storage(String),
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::FileTooLarge
        } else {
            UploadError::Multipart(err.body_text())
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = match self {
            UploadError::InvalidFileType => StatusCode::BAD_REQUEST,
            UploadError::FileTooLarge
            | UploadError::UnexpectedFile
            | UploadError::Multipart(_)
            | UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Upload failed: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_path: String,
    pub file_type: String,
}

struct ReceivedFile {
    file_name: String,
    content_type: String,
    content: Bytes,
}

fn is_allowed_type(content_type: Option<&str>) -> bool {
    content_type.map_or(false, |ct| ALLOWED_MIME_TYPES.contains(&ct))
}

/// POST /upload
///
/// Accepts a single PDF or DOCX under the `file` field, no larger than the
/// configured ceiling, and stores it.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let max_bytes = state.config.max_upload_bytes;
    let mut received: Option<ReceivedFile> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            // plain form fields are not part of the upload
            continue;
        };
        if field.name() != Some(UPLOAD_FIELD) || received.is_some() {
            return Err(UploadError::UnexpectedFile);
        }

        let content_type = field.content_type().map(str::to_owned);
        if !is_allowed_type(content_type.as_deref()) {
            return Err(UploadError::InvalidFileType);
        }

        let mut content = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            if content.len() + chunk.len() > max_bytes {
                return Err(UploadError::FileTooLarge);
            }
            content.extend_from_slice(&chunk);
        }

        received = Some(ReceivedFile {
            file_name,
            content_type: content_type.unwrap_or_default(),
            content: content.freeze(),
        });
    }

    let file = received.ok_or(UploadError::InvalidFileType)?;
    let stored_name = stored_file_name(&file.file_name);
    let file_path = state
        .files
        .put(&stored_name, &file.content_type, file.content)
        .await
        .map_err(|e| UploadError::Storage(e.to_string()))?;

    info!("Accepted upload {} as {}", file.file_name, file_path);
    Ok(Json(UploadResponse {
        file_path,
        file_type: file.content_type,
    }))
}
