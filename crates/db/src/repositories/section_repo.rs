//! Repository for the `sections` table.

use learnlabs_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::Section;

const COLUMNS: &str =
    "id, chapter_id, position, section_type, title, content, language, explanation";

/// Read access to sections. Sections are only written through
/// [`ChapterRepo::create_with_sections`](super::ChapterRepo::create_with_sections).
pub struct SectionRepo;

impl SectionRepo {
    /// List a chapter's sections in generation order.
    pub async fn list_by_chapter(
        pool: &PgPool,
        chapter_id: DbId,
    ) -> Result<Vec<Section>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM sections WHERE chapter_id = $1 ORDER BY position ASC");
        sqlx::query_as::<_, Section>(&query)
            .bind(chapter_id)
            .fetch_all(pool)
            .await
    }
}
