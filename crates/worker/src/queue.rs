//! Bounded submission queue for course generation.

use learnlabs_core::generation::CourseGenerationRequest;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::tracker::JobTracker;

/// A job as handed to the worker pool.
#[derive(Debug)]
pub struct QueuedJob {
    pub id: Uuid,
    pub request: CourseGenerationRequest,
    pub cancel: CancellationToken,
}

/// Acknowledgment returned to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: Uuid,
    /// `true` when an unfinished job for the same slug already existed and
    /// its handle was returned instead of queueing a new one.
    pub existing: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Generation queue is full")]
    QueueFull,
    #[error("Generation workers are not running")]
    Closed,
}

/// Producer side of the generation queue. Cheap to clone.
#[derive(Clone)]
pub struct GenerationQueue {
    sender: mpsc::Sender<QueuedJob>,
    tracker: JobTracker,
}

impl GenerationQueue {
    /// Create a queue holding at most `capacity` waiting jobs. The receiver
    /// goes to the worker pool.
    pub fn new(capacity: usize, tracker: JobTracker) -> (Self, mpsc::Receiver<QueuedJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender, tracker }, receiver)
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    /// Queue a generation and return immediately.
    ///
    /// Requests with a fixed slug are deduplicated against unfinished jobs
    /// for the same slug. A full queue is rejected rather than awaited.
    pub fn submit(&self, request: CourseGenerationRequest) -> Result<JobHandle, SubmitError> {
        let (id, cancel) = match self.tracker.insert_or_existing(&request) {
            Ok(registered) => registered,
            Err(existing) => {
                tracing::info!(job_id = %existing.id, slug = ?existing.slug, "Generation already pending for slug");
                return Ok(JobHandle {
                    job_id: existing.id,
                    existing: true,
                });
            }
        };
        let topic = request.name.clone();
        let job = QueuedJob {
            id,
            request,
            cancel,
        };

        match self.sender.try_send(job) {
            Ok(()) => {
                tracing::info!(job_id = %id, topic = %topic, "Course generation queued");
                Ok(JobHandle {
                    job_id: id,
                    existing: false,
                })
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.tracker.remove(id);
                tracing::warn!(topic = %topic, "Generation queue full, rejecting request");
                Err(SubmitError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.tracker.remove(id);
                tracing::error!(topic = %topic, "Generation queue closed");
                Err(SubmitError::Closed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tracker::JobStatus;

    fn queue(capacity: usize) -> (GenerationQueue, mpsc::Receiver<QueuedJob>) {
        GenerationQueue::new(capacity, JobTracker::new(CancellationToken::new()))
    }

    #[tokio::test]
    async fn submitted_job_is_queued_and_tracked() {
        let (queue, mut rx) = queue(4);

        let handle = queue.submit(CourseGenerationRequest::for_topic("Rust")).unwrap();

        assert!(!handle.existing);
        let job = rx.recv().await.unwrap();
        assert_eq!(job.id, handle.job_id);
        assert_eq!(job.request.name, "Rust");
        assert_eq!(
            queue.tracker().get(handle.job_id).unwrap().status,
            JobStatus::Queued
        );
    }

    #[tokio::test]
    async fn full_queue_rejects_and_forgets_job() {
        let (queue, _rx) = queue(1);
        queue.submit(CourseGenerationRequest::for_topic("one")).unwrap();

        let result = queue.submit(CourseGenerationRequest::for_topic("two"));

        assert_matches!(result, Err(SubmitError::QueueFull));
        assert_eq!(queue.tracker().list().len(), 1);
    }

    #[tokio::test]
    async fn closed_queue_rejects() {
        let (queue, rx) = queue(1);
        drop(rx);

        assert_matches!(
            queue.submit(CourseGenerationRequest::for_topic("Rust")),
            Err(SubmitError::Closed)
        );
    }

    #[tokio::test]
    async fn same_slug_reuses_pending_job() {
        let (queue, _rx) = queue(4);
        let mut request = CourseGenerationRequest::for_topic("Rust");
        request.slug = Some("rust-basics".into());

        let first = queue.submit(request.clone()).unwrap();
        let second = queue.submit(request).unwrap();

        assert_eq!(first.job_id, second.job_id);
        assert!(second.existing);
        assert_eq!(queue.tracker().list().len(), 1);
    }

    #[test]
    fn concurrent_same_slug_submissions_share_one_job() {
        let mut request = CourseGenerationRequest::for_topic("Rust");
        request.slug = Some("rust-basics".into());

        for _ in 0..50 {
            let (queue, _rx) = queue(16);
            let barrier = std::sync::Arc::new(std::sync::Barrier::new(8));
            let handles: Vec<JobHandle> = (0..8)
                .map(|_| {
                    let queue = queue.clone();
                    let request = request.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        queue.submit(request).unwrap()
                    })
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect();

            assert_eq!(handles.iter().filter(|h| !h.existing).count(), 1);
            assert!(handles.iter().all(|h| h.job_id == handles[0].job_id));
            assert_eq!(queue.tracker().list().len(), 1);
        }
    }

    #[tokio::test]
    async fn requests_without_slug_are_never_deduplicated() {
        let (queue, _rx) = queue(4);

        let first = queue.submit(CourseGenerationRequest::for_topic("Rust")).unwrap();
        let second = queue.submit(CourseGenerationRequest::for_topic("Rust")).unwrap();

        assert_ne!(first.job_id, second.job_id);
    }
}
