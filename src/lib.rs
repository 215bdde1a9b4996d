//! Wavforge - batch audio conversion over a fixed pool of worker threads
//!
//! A run scans one directory for input files, loads them into a
//! [`JobQueue`], seals it, and lets a [`WorkerPool`] of
//! `min(hardware threads, jobs)` threads drain it. Each worker hands its job
//! to an [`Encoder`](wavforge_av::Encoder) and reports the outcome through a
//! shared [`Reporter`].
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use wavforge::{config::BatchConfig, Reporter, Scheduler};
//! use wavforge_av::DryRunEncoder;
//!
//! let scheduler = Scheduler::new(&BatchConfig::default());
//! let report = scheduler.run(
//!     Path::new("/music"),
//!     Arc::new(DryRunEncoder::new("mp3")),
//!     Arc::new(Reporter::stdout()),
//! )?;
//! println!("{} converted, {} failed", report.succeeded, report.failed);
//! # Ok::<(), wavforge_common::Error>(())
//! ```

pub mod config;
pub mod pool;
pub mod queue;
pub mod report;
pub mod scheduler;

pub use pool::{PoolReport, PoolStatus, WorkerPool};
pub use queue::{JobQueue, QueueState, SealedQueue};
pub use report::Reporter;
pub use scheduler::{build_encoder, Scheduler};
