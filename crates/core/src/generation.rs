//! Course-generation request parameters shared by the API, queue, and pipeline.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_TARGET_AUDIENCE: &str = "Beginner";
pub const DEFAULT_DIFFICULTY: &str = "Easy";
pub const DEFAULT_DURATION_MONTHS: u32 = 2;

fn default_target_audience() -> String {
    DEFAULT_TARGET_AUDIENCE.to_string()
}

fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

fn default_duration_months() -> u32 {
    DEFAULT_DURATION_MONTHS
}

/// Parameters for one course generation.
///
/// Deserialized from the `POST /course/create` body; `slug` is never taken
/// from the client and is only set by the slug-lookup fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CourseGenerationRequest {
    /// Topic name.
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[serde(default = "default_target_audience")]
    #[validate(length(max = 100))]
    pub target_audience: String,
    #[serde(default = "default_difficulty")]
    #[validate(length(max = 50))]
    pub difficulty: String,
    /// Total course duration in months.
    #[serde(rename = "duration", default = "default_duration_months")]
    #[validate(range(min = 1, max = 36, message = "duration must be between 1 and 36 months"))]
    pub duration_months: u32,
    /// Fixed slug for the resulting course. `None` derives a unique slug
    /// from the outline title.
    #[serde(default, skip_deserializing)]
    pub slug: Option<String>,
}

impl CourseGenerationRequest {
    /// Request with default audience, difficulty, and duration.
    pub fn for_topic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_audience: default_target_audience(),
            difficulty: default_difficulty(),
            duration_months: DEFAULT_DURATION_MONTHS,
            slug: None,
        }
    }

    /// Replace blank audience / difficulty values with the defaults.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        if self.target_audience.trim().is_empty() {
            self.target_audience = default_target_audience();
        }
        if self.difficulty.trim().is_empty() {
            self.difficulty = default_difficulty();
        }
        self
    }
}
