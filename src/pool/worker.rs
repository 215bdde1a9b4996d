//! The loop each worker thread runs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use wavforge_av::Encoder;
use wavforge_common::{Error, JobDescriptor};

use crate::queue::SealedQueue;
use crate::report;
use crate::report::Reporter;

/// Per-worker tallies, returned through the thread's join handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub worker: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl WorkerStats {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Default::default()
        }
    }
}

/// One worker: dequeue, encode, report, until the queue is empty.
pub(crate) struct Worker {
    index: usize,
    queue: Arc<SealedQueue>,
    encoder: Arc<dyn Encoder>,
    reporter: Arc<Reporter>,
}

impl Worker {
    pub(crate) fn new(
        index: usize,
        queue: Arc<SealedQueue>,
        encoder: Arc<dyn Encoder>,
        reporter: Arc<Reporter>,
    ) -> Self {
        Self {
            index,
            queue,
            encoder,
            reporter,
        }
    }

    /// Drain the queue. A failed job is reported and the loop moves on.
    pub(crate) fn run(self) -> WorkerStats {
        let mut stats = WorkerStats::new(self.index);
        tracing::debug!(worker = self.index, "Worker started");

        while let Some(job) = self.queue.dequeue() {
            stats.attempted += 1;
            report!(self.reporter, "Encoding {}...", job);

            match self.encode(&job) {
                Ok(output) => {
                    stats.succeeded += 1;
                    tracing::info!(
                        worker = self.index,
                        path = %job,
                        output = %output.display(),
                        "Job completed"
                    );
                    report!(self.reporter, "Successfully encoded {}.", job);
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(worker = self.index, path = %job, "{}", e);
                    report!(self.reporter, "{}", e);
                }
            }
        }

        tracing::debug!(
            worker = self.index,
            attempted = stats.attempted,
            failed = stats.failed,
            "Queue empty, worker exiting"
        );
        stats
    }

    /// Run the encoder, turning both errors and panics into a job error.
    fn encode(&self, job: &JobDescriptor) -> Result<PathBuf, Error> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.encoder.encode(job))) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(Error::job(job.path(), e.to_string())),
            Err(payload) => Err(Error::job(
                job.path(),
                format!(
                    "{} encoder panicked: {}",
                    self.encoder.name(),
                    panic_message(&*payload)
                ),
            )),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
