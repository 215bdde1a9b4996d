//! Fixed-size worker pool that drains a sealed queue to completion.
//!
//! The pool size is decided once, before any thread starts, as
//! `min(hardware_threads, jobs)`. Each worker loops on
//! [`SealedQueue::dequeue`] until it sees the queue empty, and
//! [`WorkerPool::run`] joins every started worker before returning.

mod spawner;
mod worker;

pub use spawner::{OsSpawner, Spawner, WorkerFn};
pub use worker::WorkerStats;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use wavforge_av::Encoder;
use wavforge_common::Error;

use crate::queue::SealedQueue;
use crate::report;
use crate::report::Reporter;
use worker::Worker;

/// Number of workers for `jobs` jobs on a machine with `hardware` threads.
pub fn worker_count(hardware: usize, jobs: usize) -> usize {
    hardware.min(jobs)
}

/// How a pool run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    /// The queue was empty; no thread was started.
    NothingToDo,
    /// Every requested worker ran and the queue was drained.
    Completed,
    /// At least one worker failed to start; the others were still joined.
    SpawnShortfall,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolStatus::NothingToDo => "nothing to do",
            PoolStatus::Completed => "completed",
            PoolStatus::SpawnShortfall => "spawn shortfall",
        };
        f.write_str(s)
    }
}

/// Outcome of [`WorkerPool::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReport {
    pub status: PoolStatus,
    /// `0` when the run ended before any pool was sized.
    pub hardware_threads: usize,
    pub requested_workers: usize,
    pub spawned_workers: usize,
    pub succeeded: usize,
    /// Includes jobs dequeued by a worker that died before reporting its
    /// tallies.
    pub failed: usize,
    /// Jobs left in the queue after the join barrier.
    pub unattempted: usize,
}

impl PoolReport {
    pub fn nothing_to_do(hardware_threads: usize) -> Self {
        Self {
            status: PoolStatus::NothingToDo,
            hardware_threads,
            requested_workers: 0,
            spawned_workers: 0,
            succeeded: 0,
            failed: 0,
            unattempted: 0,
        }
    }

    /// Jobs that went through the encoder.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whether the run counts as a success.
    ///
    /// A spawn shortfall is always a failure. Failed or unattempted jobs
    /// only count when `strict` is set.
    pub fn is_success(&self, strict: bool) -> bool {
        match self.status {
            PoolStatus::SpawnShortfall => false,
            PoolStatus::NothingToDo => true,
            PoolStatus::Completed => !strict || (self.failed == 0 && self.unattempted == 0),
        }
    }

    fn absorb(&mut self, stats: &WorkerStats) {
        self.succeeded += stats.succeeded;
        self.failed += stats.failed;
    }
}

/// Statically sized pool of worker threads.
pub struct WorkerPool {
    hardware_threads: usize,
    spawner: Box<dyn Spawner>,
}

impl WorkerPool {
    /// Pool sized for `hardware_threads` parallel threads (at least one).
    pub fn new(hardware_threads: usize) -> Self {
        Self {
            hardware_threads: hardware_threads.max(1),
            spawner: Box::new(OsSpawner::new()),
        }
    }

    /// Pool sized for the logical CPUs of this machine.
    pub fn detect() -> Self {
        Self::new(num_cpus::get())
    }

    /// Replace how worker threads are started.
    pub fn with_spawner<S: Spawner + 'static>(mut self, spawner: S) -> Self {
        self.spawner = Box::new(spawner);
        self
    }

    pub fn hardware_threads(&self) -> usize {
        self.hardware_threads
    }

    /// Drain `queue` with `min(hardware_threads, queue.remaining())` workers.
    ///
    /// Blocks until every started worker has exited. Job failures are
    /// reported per job and never stop the run; a spawn failure stops
    /// further spawning and is reflected in [`PoolReport::status`].
    pub fn run(
        &self,
        queue: SealedQueue,
        encoder: Arc<dyn Encoder>,
        reporter: Arc<Reporter>,
    ) -> PoolReport {
        let jobs = queue.remaining();
        let requested = worker_count(self.hardware_threads, jobs);
        if requested == 0 {
            tracing::info!("Queue is empty, no workers started");
            return PoolReport::nothing_to_do(self.hardware_threads);
        }

        tracing::info!(
            jobs,
            workers = requested,
            encoder = encoder.name(),
            "Starting worker pool"
        );
        report!(reporter, "Spawning {} threads...", requested);

        let queue = Arc::new(queue);
        let mut handles = Vec::with_capacity(requested);
        for index in 0..requested {
            let worker = Worker::new(
                index,
                Arc::clone(&queue),
                Arc::clone(&encoder),
                Arc::clone(&reporter),
            );
            match self.spawner.spawn(index, Box::new(move || worker.run())) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    let err = Error::spawn(index, e);
                    tracing::error!("{}", err);
                    report!(reporter, "{}", err);
                    break;
                }
            }
        }

        let spawned = handles.len();
        let mut report = PoolReport {
            status: if spawned < requested {
                PoolStatus::SpawnShortfall
            } else {
                PoolStatus::Completed
            },
            hardware_threads: self.hardware_threads,
            requested_workers: requested,
            spawned_workers: spawned,
            succeeded: 0,
            failed: 0,
            unattempted: 0,
        };

        for handle in handles {
            match handle.join() {
                Ok(stats) => report.absorb(&stats),
                Err(_) => tracing::error!("Worker thread panicked outside of a job"),
            }
        }

        // Jobs dequeued by a worker whose stats never came back count as failed
        let lost = queue.dequeued().saturating_sub(report.attempted());
        if lost > 0 {
            tracing::error!(jobs = lost, "Counting jobs from a lost worker as failed");
            report.failed += lost;
        }
        report.unattempted = queue.remaining();

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            unattempted = report.unattempted,
            status = %report.status,
            "Worker pool finished"
        );
        report
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("hardware_threads", &self.hardware_threads)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::JobQueue;
    use crate::report::ReportBuffer;
    use std::collections::HashSet;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::JoinHandle;
    use wavforge_common::JobDescriptor;

    fn sealed(n: usize) -> SealedQueue {
        let mut queue = JobQueue::new();
        queue.load((0..n).map(|i| format!("/music/{i:03}.wav")));
        queue.seal()
    }

    fn ok_encoder() -> Arc<dyn Encoder> {
        Arc::new(|job: &JobDescriptor| -> wavforge_av::Result<PathBuf> {
            Ok(job.output_path("mp3"))
        })
    }

    fn memory_reporter() -> (Arc<Reporter>, ReportBuffer) {
        let (reporter, buffer) = Reporter::memory();
        (Arc::new(reporter), buffer)
    }

    /// Counts spawn calls.
    #[derive(Clone, Default)]
    struct CountingSpawner {
        spawned: Arc<AtomicUsize>,
    }

    impl Spawner for CountingSpawner {
        fn spawn(&self, index: usize, work: WorkerFn) -> io::Result<JoinHandle<WorkerStats>> {
            self.spawned.fetch_add(1, Ordering::SeqCst);
            OsSpawner::new().spawn(index, work)
        }
    }

    /// Starts the first `limit` workers, then fails.
    struct FailAfter {
        limit: usize,
    }

    impl Spawner for FailAfter {
        fn spawn(&self, index: usize, work: WorkerFn) -> io::Result<JoinHandle<WorkerStats>> {
            if index >= self.limit {
                return Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    "Resource temporarily unavailable",
                ));
            }
            OsSpawner::new().spawn(index, work)
        }
    }

    /// Starts workers that drain the queue and then die before returning.
    struct DiesAfterDraining;

    impl Spawner for DiesAfterDraining {
        fn spawn(&self, index: usize, work: WorkerFn) -> io::Result<JoinHandle<WorkerStats>> {
            OsSpawner::new().spawn(
                index,
                Box::new(move || -> WorkerStats {
                    let _stats = work();
                    panic!("worker {index} lost its tallies");
                }),
            )
        }
    }

    #[test]
    fn worker_count_is_min_of_hardware_and_jobs() {
        assert_eq!(worker_count(4, 5), 4);
        assert_eq!(worker_count(8, 2), 2);
        assert_eq!(worker_count(4, 4), 4);
        assert_eq!(worker_count(16, 0), 0);
    }

    #[test]
    fn five_jobs_on_four_threads() {
        let counter = CountingSpawner::default();
        let pool = WorkerPool::new(4).with_spawner(counter.clone());
        let (reporter, buffer) = memory_reporter();

        let report = pool.run(sealed(5), ok_encoder(), reporter);

        assert_eq!(counter.spawned.load(Ordering::SeqCst), 4);
        assert_eq!(report.status, PoolStatus::Completed);
        assert_eq!(report.requested_workers, 4);
        assert_eq!(report.spawned_workers, 4);
        assert_eq!(report.succeeded, 5);
        assert_eq!(report.unattempted, 0);
        assert_eq!(buffer.lines()[0], "Spawning 4 threads...");
    }

    #[test]
    fn two_jobs_on_eight_threads() {
        let counter = CountingSpawner::default();
        let pool = WorkerPool::new(8).with_spawner(counter.clone());
        let (reporter, _buffer) = memory_reporter();

        let report = pool.run(sealed(2), ok_encoder(), reporter);

        assert_eq!(counter.spawned.load(Ordering::SeqCst), 2);
        assert_eq!(report.requested_workers, 2);
        assert_eq!(report.succeeded, 2);
    }

    #[test]
    fn empty_queue_spawns_nothing() {
        let counter = CountingSpawner::default();
        let pool = WorkerPool::new(4).with_spawner(counter.clone());
        let (reporter, buffer) = memory_reporter();

        let report = pool.run(sealed(0), ok_encoder(), reporter);

        assert_eq!(report, PoolReport::nothing_to_do(4));
        assert_eq!(counter.spawned.load(Ordering::SeqCst), 0);
        assert!(buffer.contents().is_empty());
        assert!(report.is_success(true));
    }

    #[test]
    fn zero_hardware_threads_still_runs_one_worker() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.hardware_threads(), 1);
        let (reporter, _buffer) = memory_reporter();
        let report = pool.run(sealed(3), ok_encoder(), reporter);
        assert_eq!(report.spawned_workers, 1);
        assert_eq!(report.succeeded, 3);
    }

    #[test]
    fn spawn_failure_joins_started_workers() {
        let pool = WorkerPool::new(4).with_spawner(FailAfter { limit: 2 });
        let (reporter, buffer) = memory_reporter();

        let report = pool.run(sealed(10), ok_encoder(), reporter);

        assert_eq!(report.status, PoolStatus::SpawnShortfall);
        assert_eq!(report.requested_workers, 4);
        assert_eq!(report.spawned_workers, 2);
        // The two running workers still drain everything.
        assert_eq!(report.succeeded, 10);
        assert_eq!(report.unattempted, 0);
        assert!(!report.is_success(false));

        let out = buffer.contents();
        assert!(out.contains("Failed to spawn worker 2: Resource temporarily unavailable"));
        assert!(!out.contains("Failed to spawn worker 3"), "spawn must not be retried");
    }

    #[test]
    fn no_worker_spawned_leaves_jobs_unattempted() {
        let pool = WorkerPool::new(4).with_spawner(FailAfter { limit: 0 });
        let (reporter, _buffer) = memory_reporter();

        let report = pool.run(sealed(3), ok_encoder(), reporter);

        assert_eq!(report.status, PoolStatus::SpawnShortfall);
        assert_eq!(report.spawned_workers, 0);
        assert_eq!(report.attempted(), 0);
        assert_eq!(report.unattempted, 3);
    }

    #[test]
    fn lost_worker_jobs_count_as_failed() {
        let pool = WorkerPool::new(2).with_spawner(DiesAfterDraining);
        let (reporter, _buffer) = memory_reporter();

        let report = pool.run(sealed(6), ok_encoder(), reporter);

        assert_eq!(report.spawned_workers, 2);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 6);
        assert_eq!(report.attempted(), 6);
        assert_eq!(report.unattempted, 0);
        assert!(!report.is_success(true));
    }

    #[test]
    fn failing_jobs_do_not_block_others() {
        let pool = WorkerPool::new(3);
        let (reporter, buffer) = memory_reporter();
        let encoder: Arc<dyn Encoder> =
            Arc::new(|job: &JobDescriptor| -> wavforge_av::Result<PathBuf> {
                let n: usize = job.path().file_stem().unwrap().to_str().unwrap().parse().unwrap();
                if n % 2 == 0 {
                    Err(wavforge_av::Error::encode("unsupported sample format"))
                } else {
                    Ok(job.output_path("mp3"))
                }
            });

        let report = pool.run(sealed(20), encoder, reporter);

        assert_eq!(report.status, PoolStatus::Completed);
        assert_eq!(report.succeeded, 10);
        assert_eq!(report.failed, 10);
        assert!(report.is_success(false));
        assert!(!report.is_success(true));

        let lines = buffer.lines();
        assert_eq!(lines.iter().filter(|l| l.starts_with("Failed to encode")).count(), 10);
        assert_eq!(lines.iter().filter(|l| l.starts_with("Successfully encoded")).count(), 10);
    }

    #[test]
    fn one_success_line_per_job() {
        const JOBS: usize = 200;
        let pool = WorkerPool::new(8);
        let (reporter, buffer) = memory_reporter();
        let bytes = Arc::new(AtomicUsize::new(0));
        let written = Arc::clone(&bytes);
        let encoder: Arc<dyn Encoder> =
            Arc::new(move |job: &JobDescriptor| -> wavforge_av::Result<PathBuf> {
                written.fetch_add(1024, Ordering::SeqCst);
                Ok(job.output_path("mp3"))
            });

        let report = pool.run(sealed(JOBS), encoder, reporter);
        assert_eq!(report.succeeded, JOBS);
        assert_eq!(bytes.load(Ordering::SeqCst), JOBS * 1024);

        let successes: Vec<String> = buffer
            .lines()
            .into_iter()
            .filter(|l| l.starts_with("Successfully encoded"))
            .collect();
        assert_eq!(successes.len(), JOBS);
        let unique: HashSet<_> = successes.iter().collect();
        assert_eq!(unique.len(), JOBS, "duplicate success line");
        for i in 0..JOBS {
            let expected = format!("Successfully encoded /music/{i:03}.wav.");
            assert!(unique.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn run_returns_after_all_workers_finish() {
        let pool = WorkerPool::new(4);
        let (reporter, _buffer) = memory_reporter();
        let running = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let (r, f) = (Arc::clone(&running), Arc::clone(&finished));
        let encoder: Arc<dyn Encoder> =
            Arc::new(move |job: &JobDescriptor| -> wavforge_av::Result<PathBuf> {
                r.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(20));
                f.fetch_add(1, Ordering::SeqCst);
                Ok(job.output_path("mp3"))
            });

        let report = pool.run(sealed(5), encoder, reporter);

        assert_eq!(report.succeeded, 5);
        assert_eq!(running.load(Ordering::SeqCst), 5);
        assert_eq!(finished.load(Ordering::SeqCst), 5);
    }
}
