//! Route definitions for the `/roadmap` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::config::ServerConfig;
use crate::handlers::roadmap;
use crate::router::timeout_layer;
use crate::state::AppState;

/// Routes mounted at `/roadmap`.
///
/// ```text
/// POST /create                   -> create      (generation timeout)
/// GET  /get-roadmaps             -> list
/// GET  /get-roadmap/{id}         -> get_by_id
/// GET  /get-roadmap-steps/{id}   -> steps
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    let generate = Router::new()
        .route("/create", post(roadmap::create))
        .layer(timeout_layer(config.generation_request_timeout_secs));

    let read = Router::new()
        .route("/get-roadmaps", get(roadmap::list))
        .route("/get-roadmap/{id}", get(roadmap::get_by_id))
        .route("/get-roadmap-steps/{id}", get(roadmap::steps))
        .layer(timeout_layer(config.request_timeout_secs));

    generate.merge(read)
}
