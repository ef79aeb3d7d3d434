//! Course, chapter, and section entity models.

use learnlabs_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub level: String,
    /// As declared by the outline; persisted chapters may be fewer.
    pub total_chapters: i32,
    pub duration_minutes: i32,
    pub slug: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a course.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub level: String,
    pub total_chapters: i32,
    pub duration_minutes: i32,
    pub slug: String,
}

/// A chapter row from the `chapters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chapter {
    pub id: DbId,
    pub course_id: DbId,
    pub chapter_number: i32,
    pub title: String,
    pub description: String,
    pub estimated_duration_minutes: i32,
    pub created_at: Timestamp,
}

/// DTO for inserting a chapter together with its sections.
#[derive(Debug, Clone)]
pub struct CreateChapter {
    pub course_id: DbId,
    pub chapter_number: i32,
    pub title: String,
    pub description: String,
    pub estimated_duration_minutes: i32,
    /// Inserted in order; `position` is the index in this vector.
    pub sections: Vec<CreateSection>,
}

/// A section row from the `sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub chapter_id: DbId,
    pub position: i32,
    /// One of `content`, `info`, `code`, `tip`.
    #[serde(rename = "type")]
    pub section_type: String,
    pub title: String,
    pub content: String,
    pub language: Option<String>,
    pub explanation: Option<String>,
}

/// DTO for inserting one section.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSection {
    pub section_type: String,
    pub title: String,
    pub content: String,
    pub language: Option<String>,
    pub explanation: Option<String>,
}

/// A chapter row plus its sections in position order.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterWithSections {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub sections: Vec<Section>,
}
