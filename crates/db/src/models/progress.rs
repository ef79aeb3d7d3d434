//! Per-user chapter completion records.

use learnlabs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub chapter_id: DbId,
    pub status: bool,
    pub completed_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording progress.
#[derive(Debug, Clone)]
pub struct CreateUserProgress {
    pub user_id: DbId,
    pub course_id: DbId,
    pub chapter_id: DbId,
    pub status: bool,
}
