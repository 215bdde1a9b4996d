//! The encoder seam between the worker pool and the codec.

use std::path::PathBuf;

use wavforge_common::JobDescriptor;

use crate::Result;

/// Converts one input file into one output file.
///
/// Workers call [`encode`](Encoder::encode) concurrently from several threads,
/// always on distinct descriptors, so implementations must not share mutable
/// state across calls. `encode` must return: the pool has no watchdog and a
/// call that never finishes stalls the whole run.
///
/// Any `Fn(&JobDescriptor) -> Result<PathBuf>` closure is an encoder, which
/// keeps forged encoders in tests to a single line.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use wavforge_av::Encoder;
/// use wavforge_common::JobDescriptor;
///
/// let forged = |job: &JobDescriptor| -> wavforge_av::Result<PathBuf> {
///     Ok(job.output_path("mp3"))
/// };
/// let out = forged.encode(&JobDescriptor::new("/m/a.wav").unwrap()).unwrap();
/// assert_eq!(out, PathBuf::from("/m/a.mp3"));
/// ```
pub trait Encoder: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Encode `job`, returning the path of the written output.
    fn encode(&self, job: &JobDescriptor) -> Result<PathBuf>;
}

impl<F> Encoder for F
where
    F: Fn(&JobDescriptor) -> Result<PathBuf> + Send + Sync,
{
    fn encode(&self, job: &JobDescriptor) -> Result<PathBuf> {
        self(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Arc;

    #[test]
    fn test_closure_is_an_encoder() {
        let enc: Arc<dyn Encoder> = Arc::new(|job: &JobDescriptor| -> Result<PathBuf> {
            Err(Error::encode(format!("refusing {}", job.file_name())))
        });
        let job = JobDescriptor::new("/m/a.wav").unwrap();

        let err = enc.encode(&job).unwrap_err();
        assert_eq!(err.to_string(), "encode failed: refusing a.wav");
        assert_eq!(enc.name(), "custom");
    }
}
