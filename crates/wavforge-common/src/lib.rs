//! Wavforge-Common: shared job types, path helpers and errors.
//!
//! This crate provides the pieces every other wavforge crate agrees on:
//!
//! - **Job descriptors**: the validated path of one file to convert
//! - **Path utilities**: extension matching and output-name rewriting
//! - **Error handling**: the error taxonomy of a batch run and a result alias
//!
//! # Examples
//!
//! ```
//! use wavforge_common::{Error, JobDescriptor, Result};
//! use wavforge_common::paths::has_extension;
//! use std::path::Path;
//!
//! let job = JobDescriptor::new("/music/take1.wav")?;
//! assert!(has_extension(job.path(), "wav"));
//! assert_eq!(job.output_path("mp3"), Path::new("/music/take1.mp3"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::startup("directory is gone"))
//! }
//! # Ok::<(), Error>(())
//! ```

pub mod error;
pub mod job;
pub mod paths;

pub use error::{Error, Result};
pub use job::{JobDescriptor, MAX_PATH_LEN};
