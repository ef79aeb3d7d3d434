//! Handlers for the `/course` resource.
//!
//! Reads go straight to the repositories. Creation never waits for the
//! generator: the request is queued and the caller receives a job handle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use learnlabs_core::error::CoreError;
use learnlabs_core::generation::CourseGenerationRequest;
use learnlabs_core::types::DbId;
use learnlabs_db::models::course::{Chapter, Course, Section};
use learnlabs_db::repositories::{ChapterRepo, CourseRepo, RoadmapRepo, SectionRepo};
use learnlabs_worker::JobHandle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Acknowledgment for a queued generation.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// Always `"accepted"`.
    pub status: &'static str,
    pub job_id: Uuid,
    /// `true` when an unfinished job for the same slug was reused.
    pub existing: bool,
}

impl From<JobHandle> for AcceptedResponse {
    fn from(handle: JobHandle) -> Self {
        Self {
            status: "accepted",
            job_id: handle.job_id,
            existing: handle.existing,
        }
    }
}

/// Query parameters for `GET /course/get-course-slug/{slug}`.
#[derive(Debug, Deserialize)]
pub struct SlugLookupParams {
    pub roadmap_slug: Option<String>,
}

/// Either the stored course or an acknowledgment that it is being generated.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SlugLookup {
    Found(Course),
    Generating(AcceptedResponse),
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /course/create
///
/// Validate the request and queue a course generation. Returns 202 at once;
/// progress is visible through `/course/jobs/{job_id}`.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CourseGenerationRequest>,
) -> AppResult<(StatusCode, Json<AcceptedResponse>)> {
    let request = input.normalized();
    request.validate()?;

    let handle = state.generation.submit(request)?;
    tracing::info!(job_id = %handle.job_id, "Course generation accepted");

    Ok((StatusCode::ACCEPTED, Json(handle.into())))
}

/// GET /course
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Course>>> {
    let courses = CourseRepo::list(&state.pool).await?;
    Ok(Json(courses))
}

/// GET /course/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Course>> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", id)))?;
    Ok(Json(course))
}

/// GET /course/chapters/{course_id}
///
/// Chapters of a course ordered by chapter number.
pub async fn chapters(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<Vec<Chapter>>> {
    ensure_course_exists(&state, course_id).await?;
    let chapters = ChapterRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(chapters))
}

/// GET /course/chapters/{chapter_id}/sections
///
/// Sections of a chapter in their generated order.
pub async fn sections(
    State(state): State<AppState>,
    Path(chapter_id): Path<DbId>,
) -> AppResult<Json<Vec<Section>>> {
    ChapterRepo::find_by_id(&state.pool, chapter_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Chapter", chapter_id)))?;
    let sections = SectionRepo::list_by_chapter(&state.pool, chapter_id).await?;
    Ok(Json(sections))
}

/// GET /course/get-course-slug/{slug}?roadmap_slug=...
///
/// Returns the course stored under `slug`. When none exists and a
/// `roadmap_slug` is given, the matching roadmap step is generated as a
/// course under exactly that slug and 202 is returned with the job handle.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<SlugLookupParams>,
) -> AppResult<(StatusCode, Json<SlugLookup>)> {
    if let Some(course) = CourseRepo::find_by_slug(&state.pool, &slug).await? {
        return Ok((StatusCode::OK, Json(SlugLookup::Found(course))));
    }

    let roadmap_slug = params
        .roadmap_slug
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", &slug)))?;

    let roadmap = RoadmapRepo::find_by_slug(&state.pool, &roadmap_slug)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Roadmap", &roadmap_slug)))?;

    let step = RoadmapRepo::find_step_by_topic(&state.pool, roadmap.id, &slug)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("RoadmapStep", &slug)))?;

    let mut request = CourseGenerationRequest::for_topic(step.title);
    request.difficulty = roadmap.difficulty;
    request.slug = Some(slug.clone());
    let request = request.normalized();
    request.validate()?;

    let handle = state.generation.submit(request)?;
    tracing::info!(
        job_id = %handle.job_id,
        slug = %slug,
        roadmap = %roadmap.slug,
        existing = handle.existing,
        "Course missing, generation queued from roadmap step",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SlugLookup::Generating(handle.into())),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_course_exists(state: &AppState, course_id: DbId) -> AppResult<()> {
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Course", course_id)))?;
    Ok(())
}
