//! Per-job scratch space.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wavforge_common::JobDescriptor;

/// Scratch directory for encoding one file.
///
/// The encoder writes into [`output`](Workspace::output), which lives in a
/// hidden temporary directory next to the input so the final rename never
/// crosses a filesystem. [`finalize`](Workspace::finalize) moves the result
/// to its destination; dropping the workspace without finalizing discards
/// any partial output.
///
/// # Example
///
/// ```no_run
/// use wavforge_av::Workspace;
/// use wavforge_common::JobDescriptor;
///
/// let job = JobDescriptor::new("/music/take1.wav")?;
/// let workspace = Workspace::new(&job, "mp3")?;
/// // Encode into workspace.output()
/// let written = workspace.finalize()?;
/// assert_eq!(written, job.output_path("mp3"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    input_path: PathBuf,
    output_path: PathBuf,
    destination: PathBuf,
}

impl Workspace {
    /// Create a workspace for converting `job` into a `.{extension}` file.
    pub fn new(job: &JobDescriptor, extension: &str) -> Result<Self> {
        let input = job.path();
        let parent = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let temp_dir = tempfile::Builder::new()
            .prefix(".wavforge-")
            .tempdir_in(parent)
            .map_err(|e| Error::Workspace(format!("cannot create temp dir in {:?}: {}", parent, e)))?;

        let destination = job.output_path(extension);
        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::InvalidInput("Invalid input file path".to_string()))?;
        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            input_path: input.to_path_buf(),
            output_path,
            destination,
        })
    }

    /// Get the input file path.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Get the scratch output path the encoder should write to.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Get the final destination of the output.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Move the scratch output to its destination.
    ///
    /// A single rename, so an existing output is replaced atomically and no
    /// other file next to it is touched.
    pub fn finalize(self) -> Result<PathBuf> {
        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                self.output_path
            )));
        }

        std::fs::rename(&self.output_path, &self.destination).map_err(|e| {
            Error::Workspace(format!("Failed to move output to destination: {}", e))
        })?;

        Ok(self.destination.clone())
    }
}
