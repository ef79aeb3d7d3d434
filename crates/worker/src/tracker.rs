//! In-memory registry of course-generation jobs.
//!
//! Jobs live only as long as the process; a restart abandons anything queued
//! or running. The lock is a `std` lock because the orchestrator reports
//! transitions through a synchronous callback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use learnlabs_core::generation::CourseGenerationRequest;
use learnlabs_core::types::{DbId, Timestamp};
use learnlabs_pipeline::{FailureReason, GenerationOutcome, GenerationReport, GenerationState};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Finished jobs kept for status queries before the oldest are evicted.
const MAX_FINISHED_JOBS: usize = 500;

/// Lifecycle of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running { state: GenerationState },
    Complete,
    Failed { reason: FailureReason },
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Complete | JobStatus::Failed { .. } | JobStatus::Cancelled
        )
    }
}

/// Public view of a job.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub topic: String,
    /// Fixed course slug, when the job came from a slug lookup.
    pub slug: Option<String>,
    #[serde(flatten)]
    pub status: JobStatus,
    pub course_id: Option<DbId>,
    pub chapters_persisted: u32,
    pub chapters_skipped: u32,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CancelError {
    #[error("Job {0} not found")]
    NotFound(Uuid),
    #[error("Job {0} has already finished")]
    AlreadyFinished(Uuid),
}

struct TrackedJob {
    record: JobRecord,
    cancel: CancellationToken,
    /// Order in which the job reached a terminal status.
    finished_seq: Option<u64>,
}

/// Shared, cloneable job registry.
#[derive(Clone)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<Uuid, TrackedJob>>>,
    finished_counter: Arc<AtomicU64>,
    shutdown: CancellationToken,
}

impl JobTracker {
    /// Job tokens are children of `shutdown`, so shutting down the worker
    /// pool also stops running jobs at their next chapter boundary.
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            finished_counter: Arc::new(AtomicU64::new(0)),
            shutdown,
        }
    }

    /// Register a queued job and return its id and cancellation token.
    pub fn insert(&self, request: &CourseGenerationRequest) -> (Uuid, CancellationToken) {
        self.register(&mut self.write(), request)
    }

    /// Register a queued job unless an unfinished job already targets the
    /// same slug, in which case that job is returned instead.
    ///
    /// The lookup and the insert happen under one write lock, so concurrent
    /// submissions for one slug yield exactly one job.
    pub fn insert_or_existing(
        &self,
        request: &CourseGenerationRequest,
    ) -> Result<(Uuid, CancellationToken), JobRecord> {
        let mut jobs = self.write();
        if let Some(slug) = request.slug.as_deref() {
            if let Some(existing) = jobs
                .values()
                .find(|j| !j.record.status.is_finished() && j.record.slug.as_deref() == Some(slug))
            {
                return Err(existing.record.clone());
            }
        }
        Ok(self.register(&mut jobs, request))
    }

    fn register(
        &self,
        jobs: &mut HashMap<Uuid, TrackedJob>,
        request: &CourseGenerationRequest,
    ) -> (Uuid, CancellationToken) {
        let id = Uuid::new_v4();
        let cancel = self.shutdown.child_token();
        let record = JobRecord {
            id,
            topic: request.name.clone(),
            slug: request.slug.clone(),
            status: JobStatus::Queued,
            course_id: None,
            chapters_persisted: 0,
            chapters_skipped: 0,
            created_at: chrono::Utc::now(),
            started_at: None,
            finished_at: None,
        };
        jobs.insert(
            id,
            TrackedJob {
                record,
                cancel: cancel.clone(),
                finished_seq: None,
            },
        );
        (id, cancel)
    }

    /// Drop a job that never made it onto the queue.
    pub fn remove(&self, id: Uuid) {
        self.write().remove(&id);
    }

    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.read().get(&id).map(|job| job.record.clone())
    }

    /// All known jobs, newest first.
    pub fn list(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self.read().values().map(|j| j.record.clone()).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Number of jobs queued or running.
    pub fn active_count(&self) -> usize {
        self.read()
            .values()
            .filter(|j| !j.record.status.is_finished())
            .count()
    }

    /// Move a job from `Queued` to `Running`. Returns `false` if the job was
    /// cancelled (or evicted) while it waited.
    pub fn mark_started(&self, id: Uuid) -> bool {
        let mut jobs = self.write();
        match jobs.get_mut(&id) {
            Some(job) if job.record.status == JobStatus::Queued => {
                job.record.status = JobStatus::Running {
                    state: GenerationState::OutlinePending,
                };
                job.record.started_at = Some(chrono::Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Record a non-terminal transition of a running job.
    pub fn record_transition(&self, id: Uuid, state: &GenerationState) {
        let mut jobs = self.write();
        let Some(job) = jobs.get_mut(&id) else {
            return;
        };
        match state {
            GenerationState::CoursePersisted { course_id } => {
                job.record.course_id = Some(*course_id);
            }
            GenerationState::ChapterPersisted { .. } => {
                job.record.chapters_persisted += 1;
            }
            _ => {}
        }
        if !state_is_terminal(state) {
            job.record.status = JobStatus::Running {
                state: state.clone(),
            };
        }
    }

    /// Store the final report of a job.
    pub fn finish(&self, id: Uuid, report: &GenerationReport) {
        let mut jobs = self.write();
        if let Some(job) = jobs.get_mut(&id) {
            job.record.status = match report.outcome {
                GenerationOutcome::Complete => JobStatus::Complete,
                GenerationOutcome::Failed(reason) => JobStatus::Failed { reason },
                GenerationOutcome::Cancelled => JobStatus::Cancelled,
            };
            job.record.course_id = report.course_id;
            job.record.chapters_persisted = report.chapters_persisted;
            job.record.chapters_skipped = report.chapters_skipped;
            job.record.finished_at = Some(chrono::Utc::now());
            job.finished_seq = Some(self.finished_counter.fetch_add(1, Ordering::Relaxed));
        }
        evict_finished(&mut jobs);
    }

    /// Request cancellation.
    ///
    /// A queued job is marked `Cancelled` immediately and will be skipped by
    /// the workers. A running job stops at its next chapter boundary; its
    /// status changes when the worker reports the final outcome.
    pub fn cancel(&self, id: Uuid) -> Result<JobRecord, CancelError> {
        let mut jobs = self.write();
        let job = jobs.get_mut(&id).ok_or(CancelError::NotFound(id))?;
        if job.record.status.is_finished() {
            return Err(CancelError::AlreadyFinished(id));
        }

        job.cancel.cancel();
        if job.record.status == JobStatus::Queued {
            job.record.status = JobStatus::Cancelled;
            job.record.finished_at = Some(chrono::Utc::now());
            job.finished_seq = Some(self.finished_counter.fetch_add(1, Ordering::Relaxed));
        }
        tracing::info!(job_id = %id, "Generation job cancellation requested");
        Ok(job.record.clone())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, TrackedJob>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, TrackedJob>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn state_is_terminal(state: &GenerationState) -> bool {
    matches!(
        state,
        GenerationState::Complete | GenerationState::Failed { .. } | GenerationState::Cancelled
    )
}

fn evict_finished(jobs: &mut HashMap<Uuid, TrackedJob>) {
    let mut finished: Vec<(u64, Uuid)> = jobs
        .values()
        .filter_map(|j| j.finished_seq.map(|seq| (seq, j.record.id)))
        .collect();
    if finished.len() <= MAX_FINISHED_JOBS {
        return;
    }
    finished.sort();
    let excess = finished.len() - MAX_FINISHED_JOBS;
    for (_, id) in finished.into_iter().take(excess) {
        jobs.remove(&id);
    }
}
