//! Persistence seam used by the generation workflow.

use async_trait::async_trait;
use learnlabs_core::course::{ChapterOutline, CourseOutline, DetailedChapter};
use learnlabs_core::types::DbId;
use learnlabs_db::models::course::{Chapter, Course, CreateChapter, CreateCourse, CreateSection};
use learnlabs_db::repositories::{ChapterRepo, CourseRepo};
use learnlabs_db::DbPool;

/// A write to the content store failed. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Writes performed by the course-generation workflow.
///
/// Each call is one transaction: a failed `create_chapter` leaves no chapter
/// or section rows behind.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert the course row (no chapters) under `slug`.
    async fn create_course(
        &self,
        outline: &CourseOutline,
        slug: &str,
    ) -> Result<Course, PersistenceError>;

    /// Insert one chapter and all of its sections.
    async fn create_chapter(
        &self,
        course_id: DbId,
        chapter_number: i32,
        summary: &ChapterOutline,
        detailed: &DetailedChapter,
    ) -> Result<Chapter, PersistenceError>;
}

/// [`ContentStore`] over the Postgres repositories.
#[derive(Clone)]
pub struct PgContentStore {
    pool: DbPool,
}

impl PgContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn create_course(
        &self,
        outline: &CourseOutline,
        slug: &str,
    ) -> Result<Course, PersistenceError> {
        let course = CourseRepo::create(&self.pool, &course_row(outline, slug)).await?;
        Ok(course)
    }

    async fn create_chapter(
        &self,
        course_id: DbId,
        chapter_number: i32,
        summary: &ChapterOutline,
        detailed: &DetailedChapter,
    ) -> Result<Chapter, PersistenceError> {
        let input = chapter_row(course_id, chapter_number, summary, detailed);
        let created = ChapterRepo::create_with_sections(&self.pool, &input).await?;
        Ok(created.chapter)
    }
}

/// Insert DTO for a generated course.
pub fn course_row(outline: &CourseOutline, slug: &str) -> CreateCourse {
    CreateCourse {
        title: outline.course_title.clone(),
        description: outline.course_description.clone(),
        level: outline.level.clone(),
        total_chapters: outline.total_chapters,
        duration_minutes: outline.duration,
        slug: slug.to_string(),
    }
}

/// Insert DTO for one expanded chapter. Chapter metadata comes from the
/// outline summary; sections keep the expander's order.
pub fn chapter_row(
    course_id: DbId,
    chapter_number: i32,
    summary: &ChapterOutline,
    detailed: &DetailedChapter,
) -> CreateChapter {
    CreateChapter {
        course_id,
        chapter_number,
        title: summary.title.clone(),
        description: summary.description.clone(),
        estimated_duration_minutes: summary.estimated_duration,
        sections: detailed
            .sections
            .iter()
            .map(|s| CreateSection {
                section_type: s.section_type.as_str().to_string(),
                title: s.title.clone(),
                content: s.content.clone(),
                language: s.language.clone(),
                explanation: s.explanation.clone(),
            })
            .collect(),
    }
}
