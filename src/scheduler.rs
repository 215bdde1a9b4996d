//! Top-level driver: discover input files, load and seal the queue, run the
//! worker pool.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;
use wavforge_av::{DryRunEncoder, Encoder, FfmpegEncoder};
use wavforge_common::paths::{has_extension, normalize_extension, replace_extension};
use wavforge_common::{Error, Result};

use crate::config::{BatchConfig, Config, EncoderBackend};
use crate::pool::{PoolReport, WorkerPool};
use crate::queue::JobQueue;
use crate::report;
use crate::report::Reporter;

/// Drives one batch run over a single directory.
#[derive(Debug)]
pub struct Scheduler {
    input_extension: String,
    output_extension: String,
    threads: Option<usize>,
    pool: Option<WorkerPool>,
}

impl Scheduler {
    /// Scheduler for `config`.
    ///
    /// The pool is only sized once there is work: from `threads` when set,
    /// otherwise from the detected CPUs.
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            input_extension: normalize_extension(&config.input_extension),
            output_extension: normalize_extension(&config.output_extension),
            threads: config.threads,
            pool: None,
        }
    }

    /// Use `pool` instead of building one from the config.
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// List the matching files directly inside `dir` (no recursion).
    ///
    /// Paths are absolute and come back in directory-listing order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Startup`] when `dir` cannot be opened as a directory.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let root = dir
            .canonicalize()
            .map_err(|e| Error::startup(format!("Failed to open {}: {}", dir.display(), e)))?;
        if !root.is_dir() {
            return Err(Error::startup(format!(
                "Failed to open {}: not a directory",
                dir.display()
            )));
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(Error::startup(format!(
                        "Failed to open {}: {}",
                        dir.display(),
                        e
                    )));
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && has_extension(entry.path(), &self.input_extension) {
                found.push(entry.into_path());
            }
        }

        tracing::debug!(dir = %root.display(), found = found.len(), "Scanned directory");
        Ok(found)
    }

    /// Discover the files in `dir` and load them into a new queue.
    ///
    /// Every discovered path is echoed through `reporter`, as is every path
    /// that could not be queued. An empty result is reported but is not an
    /// error.
    pub fn load(&self, dir: &Path, reporter: &Reporter) -> Result<JobQueue> {
        let paths = self.discover(dir)?;
        for path in &paths {
            report!(reporter, "{}", path.display());
        }

        let (paths, clashes) = self.claim_outputs(paths);
        let mut queue = JobQueue::with_capacity(paths.len());
        let outcome = queue.load(paths);
        for err in clashes.iter().chain(&outcome.rejected) {
            report!(reporter, "{}", err);
        }

        if queue.is_empty() {
            report!(
                reporter,
                "No {} files in the folder {}.",
                self.input_extension,
                dir.display()
            );
        }
        Ok(queue)
    }

    /// Keep the first input for each output path and reject the rest.
    ///
    /// Matching ignores case, so `song.wav` and `song.WAV` would otherwise
    /// both be encoded into `song.mp3`.
    fn claim_outputs(&self, paths: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<Error>) {
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(paths.len());
        let mut kept = Vec::with_capacity(paths.len());
        let mut clashes = Vec::new();

        for path in paths {
            let output = replace_extension(&path, &self.output_extension);
            match claimed.entry(output) {
                Entry::Occupied(first) => {
                    let err = Error::load(
                        &path,
                        format!(
                            "{} is already the output of {}",
                            first.key().display(),
                            first.get().display()
                        ),
                    );
                    tracing::warn!("{}", err);
                    clashes.push(err);
                }
                Entry::Vacant(slot) => {
                    slot.insert(path.clone());
                    kept.push(path);
                }
            }
        }
        (kept, clashes)
    }

    /// Seal `queue` and drain it with the pool.
    ///
    /// An empty queue returns [`PoolStatus::NothingToDo`](crate::pool::PoolStatus)
    /// without building a pool.
    pub fn dispatch(
        &self,
        queue: JobQueue,
        encoder: Arc<dyn Encoder>,
        reporter: Arc<Reporter>,
    ) -> PoolReport {
        if queue.is_empty() {
            return PoolReport::nothing_to_do(0);
        }
        match &self.pool {
            Some(pool) => pool.run(queue.seal(), encoder, reporter),
            None => {
                let pool = match self.threads {
                    Some(threads) => WorkerPool::new(threads),
                    None => WorkerPool::detect(),
                };
                pool.run(queue.seal(), encoder, reporter)
            }
        }
    }

    /// Discover, load, seal and drain in one call.
    pub fn run(
        &self,
        dir: &Path,
        encoder: Arc<dyn Encoder>,
        reporter: Arc<Reporter>,
    ) -> Result<PoolReport> {
        let queue = self.load(dir, &reporter)?;
        Ok(self.dispatch(queue, encoder, reporter))
    }
}

/// Build the encoder selected by `config`.
///
/// # Errors
///
/// Fails when the ffmpeg backend is selected and ffmpeg cannot be found.
pub fn build_encoder(config: &Config) -> wavforge_av::Result<Arc<dyn Encoder>> {
    let output_extension = &config.batch.output_extension;
    match config.encoder.backend {
        EncoderBackend::Ffmpeg => {
            let settings = config.encoder.ffmpeg_settings(output_extension);
            Ok(Arc::new(FfmpegEncoder::new(settings)?))
        }
        EncoderBackend::DryRun => Ok(Arc::new(DryRunEncoder::new(output_extension))),
    }
}
