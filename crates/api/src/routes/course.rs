//! Route definitions for the `/course` resource and its generation jobs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{course, jobs};
use crate::state::AppState;

/// Routes mounted at `/course`.
///
/// ```text
/// GET  /                               -> list
/// POST /create                         -> create (202)
/// GET  /{id}                           -> get_by_id
/// GET  /chapters/{course_id}           -> chapters
/// GET  /chapters/{chapter_id}/sections -> sections
/// GET  /get-course-slug/{slug}         -> get_by_slug
/// GET  /jobs                           -> jobs::list (admin)
/// GET  /jobs/{job_id}                  -> jobs::get
/// POST /jobs/{job_id}/cancel           -> jobs::cancel (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(course::list))
        .route("/create", post(course::create))
        .route("/{id}", get(course::get_by_id))
        .route("/chapters/{id}", get(course::chapters))
        .route("/chapters/{id}/sections", get(course::sections))
        .route("/get-course-slug/{slug}", get(course::get_by_slug))
        .route("/jobs", get(jobs::list))
        .route("/jobs/{job_id}", get(jobs::get))
        .route("/jobs/{job_id}/cancel", post(jobs::cancel))
}
