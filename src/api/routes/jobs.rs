//! Job handlers.

use super::{SubmitRequest, SubmitResponse};
use crate::api::AppState;
use crate::error::Result;
use crate::types::{JobId, JobRecord};
use axum::{
    Json,
    extract::{Path, State},
};

/// POST /download - Submit a fetch job
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "jobs",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Job created", body = SubmitResponse),
        (status = 400, description = "No URL provided", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    let (locator, options) = request.into_parts();
    let task_id = state.service.submit(&locator, options).await?;
    Ok(Json(SubmitResponse { task_id }))
}

/// GET /progress/:task_id - Poll a job
///
/// Unknown ids return the `unknown` record with status 200.
#[utoipa::path(
    get,
    path = "/api/progress/{task_id}",
    tag = "jobs",
    params(
        ("task_id" = String, Path, description = "Job id returned by POST /download")
    ),
    responses(
        (status = 200, description = "Current job record", body = JobRecord),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn poll_job(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<JobRecord>> {
    let record = state.service.poll(&JobId::from(task_id)).await?;
    Ok(Json(record))
}
