pub mod auth;
pub mod course;
pub mod health;
pub mod progress;
pub mod roadmap;

use axum::Router;

use crate::config::ServerConfig;
use crate::router::timeout_layer;
use crate::state::AppState;

/// Build the API route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/send-otp                                   issue OTP (public)
/// /auth/register                                   register with OTP (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user (requires auth)
///
/// /course                                          list
/// /course/create                                   queue generation (POST, 202)
/// /course/{id}                                     get
/// /course/chapters/{course_id}                     chapters of a course
/// /course/chapters/{chapter_id}/sections           sections of a chapter
/// /course/get-course-slug/{slug}                   get by slug, or generate from roadmap
/// /course/jobs                                     list jobs (admin only)
/// /course/jobs/{job_id}                            job status
/// /course/jobs/{job_id}/cancel                     cancel job (POST, admin only)
///
/// /roadmap/create                                  generate roadmap (POST)
/// /roadmap/get-roadmaps                            list
/// /roadmap/get-roadmap/{id}                        get
/// /roadmap/get-roadmap-steps/{id}                  steps in order
///
/// /progress/save                                   record completion (requires auth)
/// /progress/course/{course_id}                     caller's progress (requires auth)
/// ```
///
/// Every group runs under the regular request timeout except
/// `/roadmap/create`, which generates inline and gets the longer
/// generation timeout instead.
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    let secs = config.request_timeout_secs;
    Router::new()
        .nest("/auth", auth::router().layer(timeout_layer(secs)))
        .nest("/course", course::router().layer(timeout_layer(secs)))
        .nest("/roadmap", roadmap::router(config))
        .nest("/progress", progress::router().layer(timeout_layer(secs)))
}
