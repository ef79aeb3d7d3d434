//! Background execution of course generations.
//!
//! Submissions go onto a bounded [`GenerationQueue`]; a small pool of tasks
//! drains it and runs each job through the pipeline's
//! [`CourseGenerator`](learnlabs_pipeline::CourseGenerator). The
//! [`JobTracker`] exposes per-job status and cancellation.

pub mod pool;
pub mod queue;
pub mod tracker;

use learnlabs_pipeline::CourseGenerator;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use queue::{GenerationQueue, JobHandle, QueuedJob, SubmitError};
pub use tracker::{CancelError, JobRecord, JobStatus, JobTracker};

/// Sizing for the generation queue and worker pool.
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub workers: usize,
    pub queue_capacity: usize,
}

/// Create the queue and tracker and spawn the worker pool.
///
/// Cancelling `shutdown` stops the workers and signals every running job.
pub fn start(
    generator: CourseGenerator,
    settings: WorkerSettings,
    shutdown: CancellationToken,
) -> (GenerationQueue, Vec<JoinHandle<()>>) {
    let tracker = JobTracker::new(shutdown.clone());
    let (queue, receiver) = GenerationQueue::new(settings.queue_capacity, tracker.clone());
    let handles = pool::spawn_workers(settings.workers, generator, receiver, tracker, shutdown);
    tracing::info!(
        workers = settings.workers,
        queue_capacity = settings.queue_capacity,
        "Generation workers started",
    );
    (queue, handles)
}
