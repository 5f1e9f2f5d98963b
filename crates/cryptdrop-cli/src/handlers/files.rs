//! File operation handlers

use super::blocking;
use crate::{ApiError, AppState, ErrorCode};
use axum::{
    Json,
    body::Body,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use cryptdrop_core::{CatalogEntry, CoreError, FileId, catalog::compose_storage_name};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Multipart form field carrying the upload
pub const UPLOAD_FIELD: &str = "file";

/// Body of a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: FileId,
    pub name: String,
    pub storage_name: String,
}

/// POST /upload - Encrypt and store a multipart file
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::api(ErrorCode::InvalidRequest, e.body_text()))?;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        if original_name.is_empty() {
            return Err(no_file_selected());
        }

        // Reject bad names before buffering the body.
        let name = state.vault.check_upload(&original_name, None)?;
        let max = state.config.vault.max_upload_size;

        let mut data = Zeroizing::new(Vec::new());
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if (data.len() + chunk.len()) as u64 > max {
                return Err(CoreError::FileTooLarge { max }.into());
            }
            data.extend_from_slice(&chunk);
        }

        let vault = Arc::clone(&state.vault);
        let id = blocking(move || vault.upload_bytes(&data, &original_name)).await?;

        let storage_name = compose_storage_name(&id, &name);
        tracing::info!(%id, name = %name, "Upload complete");
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                id,
                name,
                storage_name,
            }),
        )
            .into_response());
    }

    Err(no_file_selected())
}

/// GET /files - List stored files, newest first
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let vault = Arc::clone(&state.vault);
    let entries = blocking(move || vault.list_entries()).await?;
    Ok(Json(entries))
}

/// GET /download/{id} - Decrypted file
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: FileId = id.parse()?;
    let vault = Arc::clone(&state.vault);
    let file = blocking(move || vault.retrieve(&id)).await?;
    let name = file.name.clone();
    Ok(attachment(
        "application/octet-stream",
        &name,
        wiping_body(file.into_data()),
    ))
}

/// GET /download-encrypted/{id} - Stored envelope as-is
pub async fn download_encrypted(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: FileId = id.parse()?;
    let vault = Arc::clone(&state.vault);
    let file = blocking(move || vault.retrieve_ciphertext(&id)).await?;
    let name = file.name.clone();
    Ok(attachment(
        "application/octet-stream",
        &name,
        wiping_body(file.into_data()),
    ))
}

/// GET /download-key/{id} - Key file for offline decryption
pub async fn download_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: FileId = id.parse()?;
    let vault = Arc::clone(&state.vault);
    let artifact = blocking(move || vault.export_key(&id)).await?;
    Ok(attachment(
        "text/plain; charset=utf-8",
        &format!("{}_key.txt", id),
        wiping_body(Zeroizing::new(artifact.into_bytes())),
    ))
}

/// DELETE /files/{id} and POST /delete/{id} - Remove a file and its key
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: FileId = id.parse()?;
    let vault = Arc::clone(&state.vault);
    blocking(move || vault.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Response body that zeroes its buffer once axum is done with it
fn wiping_body(data: Zeroizing<Vec<u8>>) -> Body {
    Body::from(Bytes::from_owner(data))
}

fn attachment(content_type: &'static str, filename: &str, body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn no_file_selected() -> ApiError {
    ApiError::api(ErrorCode::NoFileSelected, "No file selected")
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::api(ErrorCode::FileTooLarge, e.body_text())
    } else {
        ApiError::api(ErrorCode::InvalidRequest, e.body_text())
    }
}
