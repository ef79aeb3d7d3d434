//! Course outline generation.

use learnlabs_core::course::CourseOutline;
use learnlabs_core::generation::CourseGenerationRequest;
use learnlabs_llm::{GenerationClient, GenerationError, Prompt};

const SYSTEM: &str = "You are an expert course designer and educator.
Your task is to create a complete, well-structured course outline.

Guidelines:
- The course should have a logical progression.
- Each chapter should build on the previous one.
- Learning objectives must be actionable and clear.
- Estimated durations should align with the total course duration.
- Keep explanations concise, student-friendly, and practical.";

/// Instructions for one outline request.
pub fn outline_prompt(request: &CourseGenerationRequest) -> Prompt {
    let user = format!(
        "Create a course outline for the topic: {}\n\n\
         Requirements:\n\
         - Target audience: {}\n\
         - Course difficulty: {}\n\
         - Total course duration: {} Months",
        request.name, request.target_audience, request.difficulty, request.duration_months
    );
    Prompt::new(SYSTEM, user)
}

/// Generate the outline for a course. Exactly one generator call (plus the
/// client's internal repair pass).
pub async fn generate_outline(
    client: &GenerationClient,
    request: &CourseGenerationRequest,
) -> Result<CourseOutline, GenerationError> {
    tracing::info!(
        topic = %request.name,
        audience = %request.target_audience,
        difficulty = %request.difficulty,
        duration_months = request.duration_months,
        "Generating course outline",
    );

    let outline: CourseOutline = client.generate(&outline_prompt(request)).await?;

    tracing::info!(
        topic = %request.name,
        title = %outline.course_title,
        chapters = outline.chapters.len(),
        "Generated course outline",
    );
    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_all_request_parameters() {
        let mut request = CourseGenerationRequest::for_topic("Rust");
        request.target_audience = "Backend developers".into();
        request.duration_months = 3;

        let prompt = outline_prompt(&request);

        assert!(prompt.system.contains("course designer"));
        assert!(prompt.user.contains("topic: Rust"));
        assert!(prompt.user.contains("Target audience: Backend developers"));
        assert!(prompt.user.contains("Course difficulty: Easy"));
        assert!(prompt.user.contains("duration: 3 Months"));
    }
}
