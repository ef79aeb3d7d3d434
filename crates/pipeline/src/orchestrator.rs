//! Course generation state machine.
//!
//! ```text
//! OutlinePending -> OutlineReady -> CoursePersisted
//!     -> ExpandingChapter(1) -> ChapterPersisted(1) -> [delay]
//!     -> ExpandingChapter(2) -> ...
//!     -> Complete
//! ```
//!
//! `Failed` is reachable from the outline and course steps only; a chapter
//! that fails to generate or persist is skipped and the workflow moves on.
//! `Cancelled` is entered when the job's token fires at a chapter boundary
//! or during the inter-chapter delay.

use std::sync::Arc;
use std::time::Duration;

use learnlabs_core::generation::CourseGenerationRequest;
use learnlabs_core::slug::unique_slug;
use learnlabs_core::types::DbId;
use learnlabs_llm::GenerationClient;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::chapter::expand_chapter;
use crate::outline::generate_outline;
use crate::store::ContentStore;

/// Why a generation ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    OutlineGenerationFailed,
    PersistCourseFailed,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::OutlineGenerationFailed => "outline_generation_failed",
            FailureReason::PersistCourseFailed => "persist_course_failed",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of one running generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GenerationState {
    OutlinePending,
    OutlineReady,
    CoursePersisted { course_id: DbId },
    ExpandingChapter { chapter_number: i32 },
    ChapterPersisted { chapter_number: i32, chapter_id: DbId },
    Complete,
    Failed { reason: FailureReason },
    Cancelled,
}

/// Terminal result of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    Complete,
    Failed(FailureReason),
    Cancelled,
}

/// Summary handed back to the worker once a generation ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Set once the course row exists.
    pub course_id: Option<DbId>,
    pub outcome: GenerationOutcome,
    pub chapters_persisted: u32,
    pub chapters_skipped: u32,
}

/// Runs the outline, course, and chapter steps for one request.
#[derive(Clone)]
pub struct CourseGenerator {
    client: GenerationClient,
    store: Arc<dyn ContentStore>,
    throttle: Duration,
}

impl CourseGenerator {
    /// `throttle` is the flat pause between successive chapter expansions.
    pub fn new(client: GenerationClient, store: Arc<dyn ContentStore>, throttle: Duration) -> Self {
        Self {
            client,
            store,
            throttle,
        }
    }

    /// Drive one generation to a terminal state.
    ///
    /// `on_transition` is called for every state entered, including the
    /// terminal one. Rows already written stay in place on failure or
    /// cancellation.
    pub async fn run(
        &self,
        request: &CourseGenerationRequest,
        cancel: &CancellationToken,
        on_transition: &(dyn Fn(&GenerationState) + Send + Sync),
    ) -> GenerationReport {
        let mut report = GenerationReport {
            course_id: None,
            outcome: GenerationOutcome::Complete,
            chapters_persisted: 0,
            chapters_skipped: 0,
        };

        tracing::info!(
            topic = %request.name,
            model = self.client.model_name(),
            "Starting course generation"
        );
        on_transition(&GenerationState::OutlinePending);

        if cancel.is_cancelled() {
            return finish_cancelled(report, on_transition);
        }

        let outline = match generate_outline(&self.client, request).await {
            Ok(outline) => outline,
            Err(e) => {
                tracing::error!(topic = %request.name, error = %e, "Outline generation failed");
                return finish_failed(report, FailureReason::OutlineGenerationFailed, on_transition);
            }
        };
        on_transition(&GenerationState::OutlineReady);

        let slug = request
            .slug
            .clone()
            .unwrap_or_else(|| unique_slug(&outline.course_title));

        let course = match self.store.create_course(&outline, &slug).await {
            Ok(course) => course,
            Err(e) => {
                tracing::error!(topic = %request.name, slug = %slug, error = %e, "Failed to persist course");
                return finish_failed(report, FailureReason::PersistCourseFailed, on_transition);
            }
        };
        report.course_id = Some(course.id);
        tracing::info!(course_id = course.id, slug = %course.slug, "Course persisted");
        on_transition(&GenerationState::CoursePersisted {
            course_id: course.id,
        });

        let total = outline.chapters.len();
        for (index, summary) in outline.chapters.iter().enumerate() {
            let chapter_number = index as i32 + 1;

            if cancel.is_cancelled() {
                return finish_cancelled(report, on_transition);
            }

            if summary.chapter_number != chapter_number {
                tracing::warn!(
                    course_id = course.id,
                    emitted = summary.chapter_number,
                    position = chapter_number,
                    "Outline chapter number differs from its position, using position",
                );
            }

            on_transition(&GenerationState::ExpandingChapter { chapter_number });

            match expand_chapter(&self.client, summary).await {
                Ok(detailed) => {
                    match self
                        .store
                        .create_chapter(course.id, chapter_number, summary, &detailed)
                        .await
                    {
                        Ok(chapter) => {
                            report.chapters_persisted += 1;
                            tracing::info!(
                                course_id = course.id,
                                chapter_number,
                                chapter_id = chapter.id,
                                title = %summary.title,
                                sections = detailed.sections.len(),
                                "Chapter persisted",
                            );
                            on_transition(&GenerationState::ChapterPersisted {
                                chapter_number,
                                chapter_id: chapter.id,
                            });
                        }
                        Err(e) => {
                            report.chapters_skipped += 1;
                            tracing::warn!(
                                course_id = course.id,
                                chapter_number,
                                error = %e,
                                "Failed to persist chapter, skipping",
                            );
                        }
                    }
                }
                Err(e) => {
                    report.chapters_skipped += 1;
                    tracing::warn!(
                        course_id = course.id,
                        chapter_number,
                        title = %summary.title,
                        error = %e,
                        "Chapter generation failed, skipping",
                    );
                }
            }

            if index + 1 < total && !self.throttle.is_zero() {
                tracing::info!(
                    course_id = course.id,
                    wait_secs = self.throttle.as_secs_f64(),
                    "Waiting before next chapter",
                );
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return finish_cancelled(report, on_transition);
                    }
                    _ = tokio::time::sleep(self.throttle) => {}
                }
            }
        }

        tracing::info!(
            course_id = course.id,
            persisted = report.chapters_persisted,
            skipped = report.chapters_skipped,
            "Course generation complete",
        );
        on_transition(&GenerationState::Complete);
        report
    }
}

fn finish_failed(
    mut report: GenerationReport,
    reason: FailureReason,
    on_transition: &(dyn Fn(&GenerationState) + Send + Sync),
) -> GenerationReport {
    report.outcome = GenerationOutcome::Failed(reason);
    on_transition(&GenerationState::Failed { reason });
    report
}

fn finish_cancelled(
    mut report: GenerationReport,
    on_transition: &(dyn Fn(&GenerationState) + Send + Sync),
) -> GenerationReport {
    tracing::info!(course_id = ?report.course_id, "Course generation cancelled");
    report.outcome = GenerationOutcome::Cancelled;
    on_transition(&GenerationState::Cancelled);
    report
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use learnlabs_core::course::{ChapterOutline, CourseOutline, DetailedChapter, GeneratedSection};
    use learnlabs_db::models::course::{Chapter, Course};
    use learnlabs_llm::{CompletionProvider, CompletionRequest, GenerationError};
    use tokio::time::Instant;

    use super::*;
    use crate::store::PersistenceError;

    const THROTTLE: Duration = Duration::from_secs(20);

    fn outline_json(chapters: i32) -> String {
        let chapters: Vec<_> = (1..=chapters)
            .map(|n| {
                serde_json::json!({
                    "chapter_number": n,
                    "title": format!("Chapter title {n}"),
                    "description": "desc",
                    "learning_objectives": ["one"],
                    "estimated_duration": 30
                })
            })
            .collect();
        serde_json::json!({
            "course_title": "Rust Basics",
            "course_description": "Learn Rust",
            "level": "Beginner",
            "total_chapters": chapters.len(),
            "duration": 90,
            "chapters": chapters
        })
        .to_string()
    }

    fn chapter_json(n: i32) -> String {
        serde_json::json!({
            "title": format!("Chapter title {n}"),
            "duration": "30 min",
            "sections": [
                { "type": "content", "title": format!("Intro {n}"), "content": "text" },
                { "type": "code", "title": "Example", "content": "fn main() {}",
                  "language": "rust", "explanation": "entry point" },
                { "type": "tip", "title": "Tip", "content": "use clippy" }
            ]
        })
        .to_string()
    }

    /// Answers outline and chapter requests; records when each chapter
    /// expansion was requested.
    struct FakeProvider {
        outline: Option<String>,
        failing_chapters: Vec<i32>,
        expansions: Mutex<Vec<(i32, Instant)>>,
    }

    impl FakeProvider {
        fn new(chapters: i32) -> Self {
            Self {
                outline: Some(outline_json(chapters)),
                failing_chapters: vec![],
                expansions: Mutex::new(vec![]),
            }
        }
    }

    fn requested_chapter(request: &CompletionRequest) -> i32 {
        request
            .user
            .split("Chapter ")
            .nth(1)
            .and_then(|rest| rest.split(':').next())
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
            if request.schema_name == "CourseOutline" {
                return self.outline.clone().ok_or(GenerationError::Api {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            let n = requested_chapter(request);
            self.expansions.lock().unwrap().push((n, Instant::now()));
            if self.failing_chapters.contains(&n) {
                return Err(GenerationError::Api {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(chapter_json(n))
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        fail_course: bool,
        fail_chapters: Vec<i32>,
        courses: Mutex<Vec<Course>>,
        chapters: Mutex<Vec<(Chapter, Vec<GeneratedSection>, Instant)>>,
    }

    #[async_trait]
    impl ContentStore for MemoryStore {
        async fn create_course(
            &self,
            outline: &CourseOutline,
            slug: &str,
        ) -> Result<Course, PersistenceError> {
            if self.fail_course {
                return Err(sqlx::Error::PoolTimedOut.into());
            }
            let mut courses = self.courses.lock().unwrap();
            let course = Course {
                id: courses.len() as DbId + 1,
                title: outline.course_title.clone(),
                description: outline.course_description.clone(),
                level: outline.level.clone(),
                total_chapters: outline.total_chapters,
                duration_minutes: outline.duration,
                slug: slug.to_string(),
                created_at: chrono::Utc::now(),
            };
            courses.push(course.clone());
            Ok(course)
        }

        async fn create_chapter(
            &self,
            course_id: DbId,
            chapter_number: i32,
            summary: &ChapterOutline,
            detailed: &DetailedChapter,
        ) -> Result<Chapter, PersistenceError> {
            if self.fail_chapters.contains(&chapter_number) {
                return Err(sqlx::Error::PoolTimedOut.into());
            }
            let mut chapters = self.chapters.lock().unwrap();
            let chapter = Chapter {
                id: chapters.len() as DbId + 100,
                course_id,
                chapter_number,
                title: summary.title.clone(),
                description: summary.description.clone(),
                estimated_duration_minutes: summary.estimated_duration,
                created_at: chrono::Utc::now(),
            };
            chapters.push((chapter.clone(), detailed.sections.clone(), Instant::now()));
            Ok(chapter)
        }
    }

    impl MemoryStore {
        fn chapter_numbers(&self) -> Vec<i32> {
            self.chapters
                .lock()
                .unwrap()
                .iter()
                .map(|(c, _, _)| c.chapter_number)
                .collect()
        }
    }

    fn generator(
        provider: Arc<FakeProvider>,
        store: Arc<MemoryStore>,
        throttle: Duration,
    ) -> CourseGenerator {
        CourseGenerator::new(GenerationClient::new(provider), store, throttle)
    }

    fn request() -> CourseGenerationRequest {
        CourseGenerationRequest::for_topic("Rust")
    }

    #[tokio::test(start_paused = true)]
    async fn all_chapters_succeed() {
        let provider = Arc::new(FakeProvider::new(3));
        let store = Arc::new(MemoryStore::default());
        let states = Mutex::new(Vec::new());

        let report = generator(provider, store.clone(), THROTTLE)
            .run(&request(), &CancellationToken::new(), &|s: &GenerationState| {
                states.lock().unwrap().push(s.clone())
            })
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Complete);
        assert_eq!(report.course_id, Some(1));
        assert_eq!(report.chapters_persisted, 3);
        assert_eq!(report.chapters_skipped, 0);
        assert_eq!(store.courses.lock().unwrap().len(), 1);
        assert_eq!(store.chapter_numbers(), [1, 2, 3]);

        let states = states.into_inner().unwrap();
        assert_eq!(states.first(), Some(&GenerationState::OutlinePending));
        assert_eq!(states.last(), Some(&GenerationState::Complete));
        assert!(states.contains(&GenerationState::ExpandingChapter { chapter_number: 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn sections_are_persisted_in_expander_order() {
        let provider = Arc::new(FakeProvider::new(1));
        let store = Arc::new(MemoryStore::default());

        generator(provider, store.clone(), THROTTLE)
            .run(&request(), &CancellationToken::new(), &|_| {})
            .await;

        let expected: DetailedChapter = serde_json::from_str(&chapter_json(1)).unwrap();
        let chapters = store.chapters.lock().unwrap();
        assert_eq!(chapters[0].1, expected.sections);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_chapter_is_skipped() {
        let provider = Arc::new(FakeProvider {
            failing_chapters: vec![2],
            ..FakeProvider::new(3)
        });
        let store = Arc::new(MemoryStore::default());

        let report = generator(provider.clone(), store.clone(), THROTTLE)
            .run(&request(), &CancellationToken::new(), &|_| {})
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Complete);
        assert_eq!(report.chapters_persisted, 2);
        assert_eq!(report.chapters_skipped, 1);
        assert_eq!(store.chapter_numbers(), [1, 3]);

        let attempted: Vec<i32> = provider.expansions.lock().unwrap().iter().map(|(n, _)| *n).collect();
        assert_eq!(attempted, [1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn chapter_persistence_failure_is_skipped() {
        let provider = Arc::new(FakeProvider::new(3));
        let store = Arc::new(MemoryStore {
            fail_chapters: vec![1],
            ..MemoryStore::default()
        });

        let report = generator(provider, store.clone(), THROTTLE)
            .run(&request(), &CancellationToken::new(), &|_| {})
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Complete);
        assert_eq!(store.chapter_numbers(), [2, 3]);
        assert_eq!(report.chapters_skipped, 1);
    }

    #[tokio::test]
    async fn outline_failure_writes_nothing() {
        let provider = Arc::new(FakeProvider {
            outline: None,
            ..FakeProvider::new(3)
        });
        let store = Arc::new(MemoryStore::default());
        let last = Mutex::new(None);

        let report = generator(provider.clone(), store.clone(), THROTTLE)
            .run(&request(), &CancellationToken::new(), &|s: &GenerationState| {
                *last.lock().unwrap() = Some(s.clone())
            })
            .await;

        assert_matches!(
            report.outcome,
            GenerationOutcome::Failed(FailureReason::OutlineGenerationFailed)
        );
        assert_eq!(report.course_id, None);
        assert!(store.courses.lock().unwrap().is_empty());
        assert!(provider.expansions.lock().unwrap().is_empty());
        assert_eq!(
            last.into_inner().unwrap(),
            Some(GenerationState::Failed {
                reason: FailureReason::OutlineGenerationFailed
            })
        );
    }

    #[tokio::test]
    async fn course_persistence_failure_stops_workflow() {
        let provider = Arc::new(FakeProvider::new(2));
        let store = Arc::new(MemoryStore {
            fail_course: true,
            ..MemoryStore::default()
        });

        let report = generator(provider.clone(), store, THROTTLE)
            .run(&request(), &CancellationToken::new(), &|_| {})
            .await;

        assert_eq!(
            report.outcome,
            GenerationOutcome::Failed(FailureReason::PersistCourseFailed)
        );
        assert!(provider.expansions.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_separates_chapter_expansions() {
        let provider = Arc::new(FakeProvider {
            failing_chapters: vec![2],
            ..FakeProvider::new(3)
        });
        let store = Arc::new(MemoryStore::default());
        let started = Instant::now();

        generator(provider.clone(), store.clone(), THROTTLE)
            .run(&request(), &CancellationToken::new(), &|_| {})
            .await;

        let expansions = provider.expansions.lock().unwrap().clone();
        let chapters = store.chapters.lock().unwrap();

        // Chapter 1 persisted, then at least one delay before chapter 2 is requested.
        assert!(expansions[1].1 - chapters[0].2 >= THROTTLE);
        // Chapter 2 failed; the delay still applies before chapter 3.
        assert!(expansions[2].1 - expansions[1].1 >= THROTTLE);
        // No delay after the last chapter.
        let elapsed = started.elapsed();
        assert!(elapsed >= THROTTLE * 2 && elapsed < THROTTLE * 3);
    }

    #[tokio::test]
    async fn slug_from_request_is_used_verbatim() {
        let provider = Arc::new(FakeProvider::new(1));
        let store = Arc::new(MemoryStore::default());
        let mut request = request();
        request.slug = Some("rust-ownership".into());

        generator(provider, store.clone(), Duration::ZERO)
            .run(&request, &CancellationToken::new(), &|_| {})
            .await;

        assert_eq!(store.courses.lock().unwrap()[0].slug, "rust-ownership");
    }

    #[tokio::test]
    async fn repeated_runs_create_distinct_courses() {
        let provider = Arc::new(FakeProvider::new(1));
        let store = Arc::new(MemoryStore::default());
        let generator = generator(provider, store.clone(), Duration::ZERO);

        generator.run(&request(), &CancellationToken::new(), &|_| {}).await;
        generator.run(&request(), &CancellationToken::new(), &|_| {}).await;

        let courses = store.courses.lock().unwrap();
        assert_eq!(courses.len(), 2);
        assert_ne!(courses[0].slug, courses[1].slug);
        assert!(courses[0].slug.starts_with("rust-basics-"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_delay_stops_after_current_chapter() {
        let provider = Arc::new(FakeProvider::new(3));
        let store = Arc::new(MemoryStore::default());
        let cancel = CancellationToken::new();

        let report = generator(provider.clone(), store.clone(), THROTTLE)
            .run(&request(), &cancel, &|s: &GenerationState| {
                if matches!(s, GenerationState::ChapterPersisted { chapter_number: 1, .. }) {
                    cancel.cancel();
                }
            })
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Cancelled);
        assert_eq!(report.course_id, Some(1));
        assert_eq!(store.chapter_numbers(), [1]);
        assert_eq!(provider.expansions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_does_nothing() {
        let provider = Arc::new(FakeProvider::new(3));
        let store = Arc::new(MemoryStore::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = generator(provider, store.clone(), THROTTLE)
            .run(&request(), &cancel, &|_| {})
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Cancelled);
        assert!(store.courses.lock().unwrap().is_empty());
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(GenerationState::Failed {
            reason: FailureReason::PersistCourseFailed,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "state": "failed", "reason": "persist_course_failed" })
        );
    }
}
