//! Background job execution.
//!
//! Handlers never run report generation inline: they submit a job through
//! `JobQueue` and immediately get back an opaque handle. A single worker
//! task pulls jobs from the channel and runs them out-of-band; job failures
//! are recorded in the job outcome and never reach the submitting request.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::reports::ReportsService,
};

/// Size of the job channel. Submissions beyond this fail fast instead of
/// blocking the request handler.
const JOB_CHANNEL_SIZE: usize = 256;

/// A unit of background work
#[derive(Debug)]
pub enum Job {
    GenerateReport { id: Uuid },
}

/// Opaque reference returned to the submitter. There is no way to wait on
/// or cancel the job; callers poll for artifacts instead.
#[derive(Debug, Clone, Copy)]
pub struct JobHandle {
    pub id: Uuid,
}

#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<Job>,
}

impl JobQueue {
    /// Start the worker and return the queue plus its task handle.
    pub fn start(reports: ReportsService) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(JOB_CHANNEL_SIZE);
        let worker = tokio::spawn(worker_loop(rx, reports));
        (Self { tx }, worker)
    }

    /// Enqueue a report-generation job
    pub fn submit_report_generation(&self) -> AppResult<JobHandle> {
        let id = Uuid::new_v4();
        self.tx
            .try_send(Job::GenerateReport { id })
            .map_err(|e| AppError::Internal(format!("Error starting report generation: {}", e)))?;
        Ok(JobHandle { id })
    }
}

async fn worker_loop(mut rx: mpsc::Receiver<Job>, reports: ReportsService) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::GenerateReport { id } => match reports.generate().await {
                Ok((_, path)) => {
                    tracing::info!(job_id = %id, status = "success", path = %path.display(), "report job finished");
                }
                Err(e) => {
                    // Terminal: no retry. The outcome lives only in the log.
                    tracing::error!(job_id = %id, status = "error", message = %e, "report job failed");
                }
            },
        }
    }
    tracing::debug!("job worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Store};
    use std::sync::Arc;

    #[tokio::test]
    async fn submitted_job_writes_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let reports = ReportsService::new(store, dir.path().to_string_lossy().into_owned());

        let (queue, worker) = JobQueue::start(reports.clone());
        let handle = queue.submit_report_generation().unwrap();
        assert!(!handle.id.is_nil());

        // Closing the queue lets the worker drain and exit.
        drop(queue);
        worker.await.unwrap();

        let report = reports.latest().await.unwrap();
        assert_eq!(report.total_authors, 0);
        assert_eq!(report.total_books, 0);
    }

    #[tokio::test]
    async fn job_failure_does_not_kill_the_worker() {
        // Point the reports service at a path that cannot be created.
        let file = tempfile::NamedTempFile::new().unwrap();
        let bad_dir = file.path().join("sub");
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let reports = ReportsService::new(store, bad_dir.to_string_lossy().into_owned());

        let (queue, worker) = JobQueue::start(reports);
        queue.submit_report_generation().unwrap();
        queue.submit_report_generation().unwrap();

        drop(queue);
        // Worker survives both failing jobs and exits cleanly on close.
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn submit_after_worker_shutdown_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let reports = ReportsService::new(store, dir.path().to_string_lossy().into_owned());

        let (queue, worker) = JobQueue::start(reports);
        worker.abort();
        let _ = worker.await;

        // The receiver died with the worker task, so the channel is closed.
        assert!(queue.submit_report_generation().is_err());
    }
}
