//! Repository for the `chapters` table.

use learnlabs_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Chapter, ChapterWithSections, CreateChapter, Section};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, chapter_number, title, description, \
                       estimated_duration_minutes, created_at";

const SECTION_COLUMNS: &str =
    "id, chapter_id, position, section_type, title, content, language, explanation";

/// Provides operations for chapters.
pub struct ChapterRepo;

impl ChapterRepo {
    /// Insert a chapter and all of its sections in one transaction.
    ///
    /// Either the chapter row and every section row are committed, or none
    /// are. Sections get `position` = their index in `input.sections`.
    pub async fn create_with_sections(
        pool: &PgPool,
        input: &CreateChapter,
    ) -> Result<ChapterWithSections, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO chapters (course_id, chapter_number, title, description, estimated_duration_minutes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let chapter = sqlx::query_as::<_, Chapter>(&query)
            .bind(input.course_id)
            .bind(input.chapter_number)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.estimated_duration_minutes)
            .fetch_one(&mut *tx)
            .await?;

        let section_query = format!(
            "INSERT INTO sections (chapter_id, position, section_type, title, content, language, explanation)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {SECTION_COLUMNS}"
        );
        let mut sections = Vec::with_capacity(input.sections.len());
        for (position, section) in input.sections.iter().enumerate() {
            let row = sqlx::query_as::<_, Section>(&section_query)
                .bind(chapter.id)
                .bind(position as i32)
                .bind(&section.section_type)
                .bind(&section.title)
                .bind(&section.content)
                .bind(&section.language)
                .bind(&section.explanation)
                .fetch_one(&mut *tx)
                .await?;
            sections.push(row);
        }

        tx.commit().await?;
        Ok(ChapterWithSections { chapter, sections })
    }

    /// Find a chapter by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chapters WHERE id = $1");
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a course's chapters in `chapter_number` order.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Chapter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chapters WHERE course_id = $1 ORDER BY chapter_number ASC"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }
}
