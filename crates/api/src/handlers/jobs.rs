//! Handlers for generation job status under `/course/jobs`.

use axum::extract::{Path, State};
use axum::Json;
use learnlabs_core::error::CoreError;
use learnlabs_worker::{CancelError, JobRecord};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /course/jobs
///
/// All tracked jobs, newest first. Admin only.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<JobRecord>>> {
    Ok(Json(state.generation.tracker().list()))
}

/// GET /course/jobs/{job_id}
pub async fn get(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<JobRecord>> {
    state
        .generation
        .tracker()
        .get(job_id)
        .map(Json)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Job", job_id)))
}

/// POST /course/jobs/{job_id}/cancel
///
/// Cancel a queued or running job. A running job stops at its next chapter
/// boundary; chapters already persisted are kept. Admin only.
pub async fn cancel(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<JobRecord>> {
    let record = state
        .generation
        .tracker()
        .cancel(job_id)
        .map_err(|e| match e {
            CancelError::NotFound(id) => AppError::Core(CoreError::not_found("Job", id)),
            CancelError::AlreadyFinished(_) => AppError::Core(CoreError::Conflict(e.to_string())),
        })?;

    tracing::info!(job_id = %job_id, admin_id = admin.user_id, "Generation job cancelled");
    Ok(Json(record))
}
