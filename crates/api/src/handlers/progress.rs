//! Handlers for the `/progress` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use learnlabs_core::error::CoreError;
use learnlabs_core::types::DbId;
use learnlabs_db::models::progress::{CreateUserProgress, UserProgress};
use learnlabs_db::repositories::{ChapterRepo, ProgressRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// Request body for `POST /progress/save`. The user comes from the token.
#[derive(Debug, Deserialize)]
pub struct SaveProgressRequest {
    pub course_id: DbId,
    pub chapter_id: DbId,
    #[serde(default = "default_status")]
    pub status: bool,
}

fn default_status() -> bool {
    true
}

/// POST /progress/save
///
/// Record completion of a chapter. A chapter can be recorded once per user.
pub async fn save(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<SaveProgressRequest>,
) -> AppResult<(StatusCode, Json<UserProgress>)> {
    let chapter = ChapterRepo::find_by_id(&state.pool, input.chapter_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Chapter", input.chapter_id)))?;
    if chapter.course_id != input.course_id {
        return Err(AppError::BadRequest(format!(
            "Chapter {} does not belong to course {}",
            input.chapter_id, input.course_id
        )));
    }

    if ProgressRepo::find(&state.pool, user.user_id, input.chapter_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Progress already recorded for this chapter".into(),
        )));
    }

    let progress = ProgressRepo::create(
        &state.pool,
        &CreateUserProgress {
            user_id: user.user_id,
            course_id: input.course_id,
            chapter_id: input.chapter_id,
            status: input.status,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(progress)))
}

/// GET /progress/course/{course_id}
///
/// The caller's progress records within one course.
pub async fn list_for_course(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<Vec<UserProgress>>> {
    let records = ProgressRepo::list_for_course(&state.pool, user.user_id, course_id).await?;
    Ok(Json(records))
}
