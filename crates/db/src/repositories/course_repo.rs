//! Repository for the `courses` table.

use learnlabs_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, description, level, total_chapters, duration_minutes, slug, created_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    ///
    /// Within the same transaction, roadmap steps whose `topic_slug` matches
    /// the new course slug and that are not yet linked get `course_id` set.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO courses (title, description, level, total_chapters, duration_minutes, slug)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.level)
            .bind(input.total_chapters)
            .bind(input.duration_minutes)
            .bind(&input.slug)
            .fetch_one(&mut *tx)
            .await?;

        let linked = sqlx::query(
            "UPDATE roadmap_steps SET course_id = $1 \
             WHERE topic_slug = $2 AND course_id IS NULL",
        )
        .bind(course.id)
        .bind(&course.slug)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        if linked > 0 {
            tracing::debug!(course_id = course.id, slug = %course.slug, linked, "Linked roadmap steps to course");
        }
        Ok(course)
    }

    /// Find a course by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course by its unique slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE slug = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all courses ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// Permanently delete a course and (by cascade) its chapters and sections.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
