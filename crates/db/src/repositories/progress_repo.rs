//! Repository for the `user_progress` table.

use learnlabs_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::{CreateUserProgress, UserProgress};

const COLUMNS: &str = "id, user_id, course_id, chapter_id, status, completed_at, updated_at";

/// Records and reads per-user chapter completion.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Insert a progress record.
    ///
    /// A second record for the same `(user_id, chapter_id)` violates
    /// `uq_user_progress_user_chapter`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUserProgress,
    ) -> Result<UserProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_progress (user_id, course_id, chapter_id, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProgress>(&query)
            .bind(input.user_id)
            .bind(input.course_id)
            .bind(input.chapter_id)
            .bind(input.status)
            .fetch_one(pool)
            .await
    }

    /// Find the record for one user and chapter.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        chapter_id: DbId,
    ) -> Result<Option<UserProgress>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM user_progress WHERE user_id = $1 AND chapter_id = $2");
        sqlx::query_as::<_, UserProgress>(&query)
            .bind(user_id)
            .bind(chapter_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's records for one course, oldest first.
    pub async fn list_for_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<UserProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_progress \
             WHERE user_id = $1 AND course_id = $2 \
             ORDER BY completed_at ASC, id ASC"
        );
        sqlx::query_as::<_, UserProgress>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }
}
