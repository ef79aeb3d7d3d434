//! Route definitions for the `/progress` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/progress`. All require authentication.
///
/// ```text
/// POST /save                 -> save
/// GET  /course/{course_id}   -> list_for_course
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/save", post(progress::save))
        .route("/course/{course_id}", get(progress::list_for_course))
}
