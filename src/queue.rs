//! Job queue with an explicit two-phase lifecycle.
//!
//! A [`JobQueue`] is filled by a single owner while no worker exists, so
//! loading takes `&mut self` and needs no lock. [`JobQueue::seal`] consumes
//! the builder and returns a [`SealedQueue`], the only type workers can
//! dequeue from. Loading after sealing therefore does not compile.
//!
//! ```text
//! Building --seal()--> Sealed --dequeue()--> Draining --empty--> Done
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Serialize;
use wavforge_common::{Error, JobDescriptor, Result};

/// Lifecycle phase of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    /// Accepting loads; no worker may exist yet.
    Building,
    /// Closed to loads, nothing dequeued yet.
    Sealed,
    /// At least one descriptor has been handed out.
    Draining,
    /// A dequeue has observed the queue empty; it stays empty.
    Done,
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueueState::Building => "building",
            QueueState::Sealed => "sealed",
            QueueState::Draining => "draining",
            QueueState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Result of a bulk [`JobQueue::load`].
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Descriptors appended to the queue.
    pub queued: usize,
    /// One [`Error::Load`] per skipped path, in input order.
    pub rejected: Vec<Error>,
}

/// FIFO of pending jobs in the Building phase.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: VecDeque<JobDescriptor>,
}

impl JobQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue with room for `capacity` jobs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: VecDeque::with_capacity(capacity),
        }
    }

    /// Append one path to the back of the queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if the path is not a valid descriptor or the
    /// queue cannot grow. The queue is unchanged in that case.
    pub fn push<P: Into<PathBuf>>(&mut self, path: P) -> Result<()> {
        let path = path.into();
        let job = JobDescriptor::new(path.clone()).map_err(|e| Error::load(&path, e.to_string()))?;

        self.jobs
            .try_reserve(1)
            .map_err(|e| Error::load(&path, e.to_string()))?;
        self.jobs.push_back(job);
        Ok(())
    }

    /// Append every path in order, skipping the ones that fail.
    ///
    /// A failed path never stops the load; it is returned in
    /// [`LoadOutcome::rejected`] for the caller to report.
    pub fn load<I, P>(&mut self, paths: I) -> LoadOutcome
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut outcome = LoadOutcome::default();
        for path in paths {
            match self.push(path) {
                Ok(()) => outcome.queued += 1,
                Err(e) => {
                    tracing::warn!("{}", e);
                    outcome.rejected.push(e);
                }
            }
        }
        outcome
    }

    /// Number of queued jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Always [`QueueState::Building`].
    pub fn state(&self) -> QueueState {
        QueueState::Building
    }

    /// Close the queue to further loads and make it shareable.
    pub fn seal(self) -> SealedQueue {
        tracing::debug!(jobs = self.jobs.len(), "Queue sealed");
        SealedQueue {
            loaded: self.jobs.len(),
            inner: Mutex::new(Drain {
                jobs: self.jobs,
                state: QueueState::Sealed,
                dequeued: 0,
            }),
        }
    }
}

#[derive(Debug)]
struct Drain {
    jobs: VecDeque<JobDescriptor>,
    state: QueueState,
    dequeued: usize,
}

/// A queue closed to loads, drained concurrently by workers.
///
/// Every loaded descriptor is handed out by exactly one successful
/// [`dequeue`](SealedQueue::dequeue), in FIFO order.
#[derive(Debug)]
pub struct SealedQueue {
    loaded: usize,
    inner: Mutex<Drain>,
}

impl SealedQueue {
    /// Remove and return the head job, or `None` once the queue is empty.
    ///
    /// `None` is the normal termination signal for a worker, not an error.
    pub fn dequeue(&self) -> Option<JobDescriptor> {
        let mut inner = self.inner.lock();
        match inner.jobs.pop_front() {
            Some(job) => {
                inner.state = QueueState::Draining;
                inner.dequeued += 1;
                Some(job)
            }
            None => {
                inner.state = QueueState::Done;
                None
            }
        }
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> QueueState {
        self.inner.lock().state
    }

    /// Jobs present when the queue was sealed.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// Jobs handed out so far.
    pub fn dequeued(&self) -> usize {
        self.inner.lock().dequeued
    }

    /// Jobs not yet handed out.
    pub fn remaining(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
