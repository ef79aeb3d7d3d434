//! Roadmap generation.
//!
//! Unlike courses, a roadmap is generated and persisted inside the request
//! that asks for it: one generator call, then one transaction for the
//! roadmap row and all of its steps.

use learnlabs_core::roadmap::RoadmapOutline;
use learnlabs_core::slug::slugify;
use learnlabs_db::models::roadmap::{CreateRoadmap, CreateRoadmapStep};
use learnlabs_llm::{GenerationClient, GenerationError, Prompt};

const SYSTEM: &str = "You are an expert tech educator who creates learning roadmaps.
Your task: generate a complete, clear, step-by-step roadmap.

Guidelines:
- The roadmap must follow a logical progression.
- Split the roadmap into clear, ordered steps.
- Each step must have a title, a description, a topic_slug (kebab-case) and an order_index (1, 2, 3, ...).
- Difficulty must influence the complexity of topics.
- Steps should go from fundamentals to intermediate to advanced where applicable.
- Keep explanations concise and beginner-friendly.
- The roadmap slug must be unique and SEO friendly (kebab-case).";

pub fn roadmap_prompt(name: &str, difficulty: &str) -> Prompt {
    let user = format!(
        "Create a complete learning roadmap.\n\n\
         Roadmap Title: {name}\n\
         Difficulty Level: {difficulty}"
    );
    Prompt::new(SYSTEM, user)
}

pub async fn generate_roadmap(
    client: &GenerationClient,
    name: &str,
    difficulty: &str,
) -> Result<RoadmapOutline, GenerationError> {
    tracing::info!(name, difficulty, "Generating roadmap");

    let outline: RoadmapOutline = client.generate(&roadmap_prompt(name, difficulty)).await?;

    tracing::info!(
        name = %outline.name,
        slug = %outline.slug,
        steps = outline.steps.len(),
        "Generated roadmap",
    );
    Ok(outline)
}

/// Insert DTO for a generated roadmap.
///
/// Slugs are normalized to kebab-case since the model does not always
/// follow the instruction. Steps are ordered by `order_index`.
pub fn roadmap_row(outline: &RoadmapOutline) -> CreateRoadmap {
    let mut steps: Vec<CreateRoadmapStep> = outline
        .steps
        .iter()
        .map(|step| CreateRoadmapStep {
            title: step.title.clone(),
            description: step.description.clone(),
            topic_slug: normalize_slug(&step.topic_slug, &step.title),
            order_index: step.order_index,
        })
        .collect();
    steps.sort_by_key(|s| s.order_index);

    CreateRoadmap {
        name: outline.name.clone(),
        slug: normalize_slug(&outline.slug, &outline.name),
        description: outline.description.clone(),
        difficulty: outline.difficulty.clone(),
        steps,
    }
}

fn normalize_slug(slug: &str, fallback: &str) -> String {
    let slug = slugify(slug);
    if slug.is_empty() {
        slugify(fallback)
    } else {
        slug
    }
}
