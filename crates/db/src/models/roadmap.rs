//! Roadmap and roadmap step entity models.

use learnlabs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A roadmap row from the `roadmaps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Roadmap {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub difficulty: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a roadmap with its steps.
#[derive(Debug, Clone)]
pub struct CreateRoadmap {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub difficulty: String,
    pub steps: Vec<CreateRoadmapStep>,
}

/// A step row from the `roadmap_steps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoadmapStep {
    pub id: DbId,
    pub roadmap_id: DbId,
    pub title: String,
    pub description: String,
    pub topic_slug: String,
    pub order_index: i32,
    /// Set once a course with `slug == topic_slug` exists.
    pub course_id: Option<DbId>,
}

/// DTO for inserting one roadmap step.
#[derive(Debug, Clone)]
pub struct CreateRoadmapStep {
    pub title: String,
    pub description: String,
    pub topic_slug: String,
    pub order_index: i32,
}
