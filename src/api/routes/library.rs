//! Stored file handlers.

use super::{DeleteRequest, DeleteResponse};
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::CatalogEntry;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use tokio_util::io::ReaderStream;

/// GET /library - List stored files, newest first
#[utoipa::path(
    get,
    path = "/api/library",
    tag = "library",
    responses(
        (status = 200, description = "Stored files", body = Vec<CatalogEntry>),
        (status = 500, description = "Storage directory unreadable", body = crate::error::ApiError)
    )
)]
pub async fn list_library(State(state): State<AppState>) -> Result<Json<Vec<CatalogEntry>>> {
    Ok(Json(state.service.list_catalog().await?))
}

/// GET /music/*filename - Stream a stored file
#[utoipa::path(
    get,
    path = "/api/music/{filename}",
    tag = "library",
    params(
        ("filename" = String, Path, description = "File name inside the storage directory")
    ),
    responses(
        (status = 200, description = "File bytes (audio/mpeg or audio/ogg)"),
        (status = 400, description = "Invalid file name", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn fetch_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let (path, mime) = state.service.open_file(&filename).await?;

    let file = tokio::fs::File::open(&path).await?;
    let len = file.metadata().await?.len();

    Response::builder()
        .header(header::CONTENT_TYPE, mime)
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| Error::Other(format!("failed to build file response: {}", e)))
}

/// POST /delete - Delete a stored mp3
#[utoipa::path(
    post,
    path = "/api/delete",
    tag = "library",
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 400, description = "Invalid file name", body = crate::error::ApiError),
        (status = 403, description = "File type is protected", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>> {
    state.service.delete_file(&request.filename).await?;
    Ok(Json(DeleteResponse { success: true }))
}
