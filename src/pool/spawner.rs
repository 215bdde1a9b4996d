//! How worker threads get started.

use std::io;
use std::thread::{self, JoinHandle};

use super::worker::WorkerStats;

/// Body of one worker thread.
pub type WorkerFn = Box<dyn FnOnce() -> WorkerStats + Send + 'static>;

/// Starts worker threads for a [`WorkerPool`](super::WorkerPool).
///
/// The pool never retries a failed spawn; it reports the error, stops
/// spawning, and still joins every handle it already holds.
pub trait Spawner {
    /// Start worker number `index` running `work`.
    fn spawn(&self, index: usize, work: WorkerFn) -> io::Result<JoinHandle<WorkerStats>>;
}

/// Spawns named OS threads through [`std::thread::Builder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSpawner;

impl OsSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl Spawner for OsSpawner {
    fn spawn(&self, index: usize, work: WorkerFn) -> io::Result<JoinHandle<WorkerStats>> {
        thread::Builder::new()
            .name(format!("wavforge-worker-{index}"))
            .spawn(work)
    }
}
