//! Chapter expansion into typed lesson sections.

use learnlabs_core::course::{ChapterOutline, DetailedChapter};
use learnlabs_llm::{GenerationClient, GenerationError, Prompt};

const SYSTEM: &str = "You are an expert programming instructor.
Your task is to expand a course chapter into detailed lesson sections.

Guidelines:
- Divide the chapter into multiple sections of type: content, info, code, or tip.
- CONTENT: main explanation of a concept, written simply for students.
- INFO: short fact, rule, or important clarification.
- CODE: code examples (must include \"language\" and \"explanation\").
- TIP: best practices, pitfalls, or learning hacks.
- Keep sections concise but informative.";

pub fn chapter_prompt(chapter: &ChapterOutline) -> Prompt {
    let user = format!(
        "Expand the following chapter into structured sections:\n\n\
         Chapter {}: {}\n\
         Description: {}\n\
         Learning Objectives: {}\n\
         Estimated Duration: {} minutes",
        chapter.chapter_number,
        chapter.title,
        chapter.description,
        chapter.learning_objectives.join("; "),
        chapter.estimated_duration
    );
    Prompt::new(SYSTEM, user)
}

/// Expand one outline chapter. Section order is kept as emitted.
pub async fn expand_chapter(
    client: &GenerationClient,
    chapter: &ChapterOutline,
) -> Result<DetailedChapter, GenerationError> {
    tracing::info!(
        chapter_number = chapter.chapter_number,
        title = %chapter.title,
        "Expanding chapter",
    );

    let detailed: DetailedChapter = client.generate(&chapter_prompt(chapter)).await?;

    tracing::info!(
        chapter_number = chapter.chapter_number,
        sections = detailed.sections.len(),
        "Generated chapter content",
    );
    Ok(detailed)
}
