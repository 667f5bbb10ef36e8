//! Search and suggestion handlers.

use super::QueryRequest;
use crate::api::AppState;
use crate::error::Result;
use crate::types::{Suggestion, TrackMetadata};
use axum::{Json, extract::State};

/// POST /search - Resolve a query to track metadata
#[utoipa::path(
    post,
    path = "/api/search",
    tag = "lookup",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Resolved track", body = TrackMetadata),
        (status = 400, description = "No query provided", body = crate::error::ApiError),
        (status = 404, description = "Nothing found", body = crate::error::ApiError),
        (status = 500, description = "Search failed", body = crate::error::ApiError)
    )
)]
pub async fn resolve_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<TrackMetadata>> {
    let track = state.service.resolve(&request.query).await?;
    Ok(Json(track))
}

/// POST /suggestions - Up to five song-like results
///
/// Advisory: failures and empty queries return an empty list.
#[utoipa::path(
    post,
    path = "/api/suggestions",
    tag = "lookup",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Suggestions (possibly empty)", body = Vec<Suggestion>)
    )
)]
pub async fn suggest(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<Vec<Suggestion>> {
    Json(state.service.suggest(&request.query).await)
}
