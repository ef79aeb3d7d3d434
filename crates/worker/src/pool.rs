//! Worker tasks draining the generation queue.

use std::sync::Arc;

use learnlabs_pipeline::{CourseGenerator, GenerationState};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::queue::QueuedJob;
use crate::tracker::JobTracker;

/// Spawn `workers` tasks sharing one queue receiver.
///
/// Each task runs one generation at a time. Tasks exit when `shutdown` is
/// cancelled or the queue is closed and drained.
pub fn spawn_workers(
    workers: usize,
    generator: CourseGenerator,
    receiver: mpsc::Receiver<QueuedJob>,
    tracker: JobTracker,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let receiver = Arc::new(Mutex::new(receiver));

    (0..workers.max(1))
        .map(|worker_id| {
            let generator = generator.clone();
            let receiver = Arc::clone(&receiver);
            let tracker = tracker.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                run_worker(worker_id, generator, receiver, tracker, shutdown).await;
            })
        })
        .collect()
}

async fn run_worker(
    worker_id: usize,
    generator: CourseGenerator,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedJob>>>,
    tracker: JobTracker,
    shutdown: CancellationToken,
) {
    tracing::info!(worker_id, "Generation worker started");

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => None,
            job = async { receiver.lock().await.recv().await } => job,
        };

        let Some(job) = next else {
            break;
        };

        if !tracker.mark_started(job.id) {
            tracing::info!(worker_id, job_id = %job.id, "Skipping cancelled job");
            continue;
        }

        tracing::info!(worker_id, job_id = %job.id, topic = %job.request.name, "Generation job started");

        let on_transition = |state: &GenerationState| tracker.record_transition(job.id, state);
        let report = generator.run(&job.request, &job.cancel, &on_transition).await;
        tracker.finish(job.id, &report);

        tracing::info!(
            worker_id,
            job_id = %job.id,
            course_id = ?report.course_id,
            outcome = ?report.outcome,
            persisted = report.chapters_persisted,
            skipped = report.chapters_skipped,
            "Generation job finished",
        );
    }

    tracing::info!(worker_id, "Generation worker stopped");
}
