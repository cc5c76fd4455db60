//! Media upload route handler.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use tracing::debug;
use vitrine_core::Media;

use crate::error::{AppError, Result};
use crate::media::MediaFile;
use crate::state::AppState;

/// Name of the multipart field carrying files.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub data: Vec<Media>,
}

/// Upload every `file` field to the media host.
///
/// Responds with the media of the files that made it, in request order.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        files.push(MediaFile {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files provided".to_string()));
    }

    let data = state.uploads().upload_all(files).await;
    Ok(Json(UploadResponse { data }))
}
