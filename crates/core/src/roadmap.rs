//! Generated roadmap shapes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One ordered step of a roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoadmapStepOutline {
    /// Step title.
    pub title: String,
    /// Short explanation of the step.
    pub description: String,
    /// Kebab-case slug used to generate (and later look up) the step's course.
    pub topic_slug: String,
    /// Step order in sequence (1, 2, 3, ...).
    pub order_index: i32,
}

/// Complete learning roadmap returned by the roadmap generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoadmapOutline {
    /// Roadmap name (e.g. Frontend, Backend).
    pub name: String,
    /// Beginner / Intermediate / Advanced.
    pub difficulty: String,
    /// Unique identifier for the roadmap.
    pub slug: String,
    /// Roadmap description.
    pub description: String,
    /// Generated steps.
    pub steps: Vec<RoadmapStepOutline>,
}
