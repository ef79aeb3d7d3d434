//! Generated course content shapes.
//!
//! These are the structured values the generation client asks the model for.
//! Each type derives [`JsonSchema`] so the target schema sent with a request is
//! derived from the same definition that validates the response.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of a lesson section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    /// Main explanation of a concept.
    Content,
    /// Short fact, rule, or clarification.
    Info,
    /// Code example; carries `language` and `explanation`.
    Code,
    /// Best practice, pitfall, or learning hack.
    Tip,
}

impl SectionType {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Content => "content",
            SectionType::Info => "info",
            SectionType::Code => "code",
            SectionType::Tip => "tip",
        }
    }
}

/// One chapter entry of a [`CourseOutline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChapterOutline {
    /// Chapter number as emitted by the model (1-based).
    pub chapter_number: i32,
    /// Chapter title.
    pub title: String,
    /// Brief description of chapter content.
    pub description: String,
    /// Key learning objectives.
    pub learning_objectives: Vec<String>,
    /// Estimated time to complete, in minutes.
    pub estimated_duration: i32,
}

/// Complete course outline returned by the outline generator.
///
/// `total_chapters` is descriptive: it is stored as emitted and is not
/// reconciled against `chapters.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CourseOutline {
    /// Title of the course.
    pub course_title: String,
    /// Brief course description.
    pub course_description: String,
    /// Level of the course.
    pub level: String,
    /// Total number of chapters.
    pub total_chapters: i32,
    /// Time required to complete the course, in minutes.
    pub duration: i32,
    /// Ordered list of chapters.
    pub chapters: Vec<ChapterOutline>,
}

/// A lesson section produced by the chapter expander.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedSection {
    /// Type of section.
    #[serde(rename = "type")]
    pub section_type: SectionType,
    /// Section title.
    pub title: String,
    /// Main content.
    pub content: String,
    /// Programming language for code sections.
    #[serde(default)]
    pub language: Option<String>,
    /// Explanation for code sections.
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Section-level content for one outline chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetailedChapter {
    /// Chapter title.
    pub title: String,
    /// Duration in readable format (e.g. "15 min").
    #[serde(default)]
    pub duration: String,
    /// Ordered list of chapter sections.
    pub sections: Vec<GeneratedSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detailed_chapter_accepts_model_shaped_json() {
        let raw = serde_json::json!({
            "title": "Ownership",
            "sections": [
                { "type": "content", "title": "Moves", "content": "Values move." },
                {
                    "type": "code",
                    "title": "Borrowing",
                    "content": "fn f(s: &str) {}",
                    "language": "rust",
                    "explanation": "Takes a shared reference."
                }
            ]
        });

        let chapter: DetailedChapter = serde_json::from_value(raw).unwrap();
        assert_eq!(chapter.duration, "");
        assert_eq!(chapter.sections.len(), 2);
        assert_eq!(chapter.sections[0].section_type, SectionType::Content);
        assert_eq!(chapter.sections[0].language, None);
        assert_eq!(chapter.sections[1].language.as_deref(), Some("rust"));
    }

    #[test]
    fn unknown_section_type_is_rejected() {
        let raw = serde_json::json!({
            "title": "x",
            "sections": [{ "type": "quiz", "title": "q", "content": "c" }]
        });
        assert!(serde_json::from_value::<DetailedChapter>(raw).is_err());
    }
}
