//! Job descriptors.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longest accepted descriptor path, in bytes (Linux `PATH_MAX`).
pub const MAX_PATH_LEN: usize = 4096;

/// Identifies one unit of conversion work: the path of a single input file.
///
/// A descriptor is immutable once built. The queue owns it until a worker
/// dequeues it, after which that worker owns it exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDescriptor(PathBuf);

impl JobDescriptor {
    /// Validate `path` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty path, a path with no file
    /// name, or a path longer than [`MAX_PATH_LEN`] bytes. Long paths are
    /// rejected rather than truncated.
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if path.as_os_str().is_empty() {
            return Err(Error::invalid_input("job path is empty"));
        }
        let len = path.as_os_str().len();
        if len > MAX_PATH_LEN {
            return Err(Error::invalid_input(format!(
                "job path is {len} bytes, limit is {MAX_PATH_LEN}"
            )));
        }
        if path.file_name().is_none() {
            return Err(Error::invalid_input(format!(
                "job path has no file name: {}",
                path.display()
            )));
        }

        Ok(Self(path))
    }

    /// The input file path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The input file name, lossily converted for display.
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Where the converted file goes: same directory, extension replaced.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        crate::paths::replace_extension(&self.0, extension)
    }

    /// Unwrap into the owned path.
    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl fmt::Display for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for JobDescriptor {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<PathBuf> for JobDescriptor {
    type Error = Error;

    fn try_from(path: PathBuf) -> Result<Self> {
        Self::new(path)
    }
}
