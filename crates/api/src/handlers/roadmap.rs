//! Handlers for the `/roadmap` resource.
//!
//! Roadmaps are small enough to generate inside the request: one generator
//! call, then one transactional insert of the roadmap and its steps.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use learnlabs_core::error::CoreError;
use learnlabs_core::types::DbId;
use learnlabs_db::models::roadmap::{Roadmap, RoadmapStep};
use learnlabs_db::repositories::RoadmapRepo;
use learnlabs_pipeline::roadmap::{generate_roadmap, roadmap_row};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Request body for `POST /roadmap/create`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoadmapRequest {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "difficulty must be 1-50 characters"))]
    pub difficulty: String,
}

/// A roadmap together with its ordered steps.
#[derive(Debug, Serialize)]
pub struct RoadmapWithSteps {
    pub roadmap: Roadmap,
    pub steps: Vec<RoadmapStep>,
}

/// POST /roadmap/create
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateRoadmapRequest>,
) -> AppResult<(StatusCode, Json<RoadmapWithSteps>)> {
    input.validate()?;

    let outline = generate_roadmap(&state.llm, input.name.trim(), input.difficulty.trim()).await?;
    let row = roadmap_row(&outline);

    if RoadmapRepo::find_by_slug(&state.pool, &row.slug).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Roadmap with slug '{}' already exists",
            row.slug
        ))));
    }

    let (roadmap, steps) = RoadmapRepo::create_with_steps(&state.pool, &row).await?;
    tracing::info!(roadmap_id = roadmap.id, slug = %roadmap.slug, steps = steps.len(), "Roadmap created");

    Ok((StatusCode::CREATED, Json(RoadmapWithSteps { roadmap, steps })))
}

/// GET /roadmap/get-roadmaps
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Roadmap>>> {
    Ok(Json(RoadmapRepo::list(&state.pool).await?))
}

/// GET /roadmap/get-roadmap/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Roadmap>> {
    let roadmap = RoadmapRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Roadmap", id)))?;
    Ok(Json(roadmap))
}

/// GET /roadmap/get-roadmap-steps/{id}
pub async fn steps(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<RoadmapStep>>> {
    RoadmapRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Roadmap", id)))?;
    Ok(Json(RoadmapRepo::list_steps(&state.pool, id).await?))
}
