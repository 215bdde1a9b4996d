//! Encoder that only reports what it would do.

use std::path::PathBuf;

use wavforge_common::JobDescriptor;

use crate::{Encoder, Error, Result};

/// Dry-run encoder: checks the input exists and returns the path that a real
/// encoder would write, without creating anything.
#[derive(Debug, Clone)]
pub struct DryRunEncoder {
    output_extension: String,
}

impl DryRunEncoder {
    pub fn new(output_extension: impl Into<String>) -> Self {
        Self {
            output_extension: output_extension.into(),
        }
    }
}

impl Encoder for DryRunEncoder {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn encode(&self, job: &JobDescriptor) -> Result<PathBuf> {
        if !job.path().exists() {
            return Err(Error::file_not_found(job.path()));
        }

        let output = job.output_path(&self.output_extension);

        #[cfg(feature = "tracing")]
        tracing::info!("[DRY RUN] Would encode {} -> {}", job, output.display());

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.wav");
        std::fs::write(&input, b"RIFF").unwrap();

        let enc = DryRunEncoder::new("mp3");
        let out = enc.encode(&JobDescriptor::new(&input).unwrap()).unwrap();

        assert_eq!(out, dir.path().join("a.mp3"));
        assert!(!out.exists());
        assert_eq!(enc.name(), "dry-run");
    }

    #[test]
    fn test_dry_run_missing_input() {
        let enc = DryRunEncoder::new("mp3");
        let job = JobDescriptor::new("/nonexistent/a.wav").unwrap();
        assert!(matches!(
            enc.encode(&job).unwrap_err(),
            Error::FileNotFound { .. }
        ));
    }
}
