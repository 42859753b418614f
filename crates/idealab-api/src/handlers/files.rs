//! Stored object read-out
//!
//! Serves project photos and achievement/showcase images back out of the
//! object store. Keys are validated by the store; traversal attempts and
//! unknown keys both answer 404.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::ErrorResponse;
use crate::storage::{content_type_for, StorageError};
use crate::AppState;

/// Fetch a stored object by key
#[utoipa::path(
    get,
    path = "/api/files/{key}",
    params(
        ("key" = String, Path, description = "Object key, e.g. projects/alice-1700000000000.jpg")
    ),
    responses(
        (status = 200, description = "Object bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No such object", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.store.get(&key).await.map_err(|e| match e {
        StorageError::NotFound(_) | StorageError::InvalidKey(_) => ApiError::NotFound,
        other => ApiError::Collaborator(other.to_string()),
    })?;

    let content_type = content_type_for(&key);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
