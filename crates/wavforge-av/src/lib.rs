//! # wavforge-av
//!
//! Encoder backends for batch audio conversion.
//!
//! The batch scheduler treats encoding as opaque: it hands an [`Encoder`] one
//! [`JobDescriptor`](wavforge_common::JobDescriptor) at a time and only looks
//! at success or the failure reason. This crate provides:
//!
//! - [`Encoder`] - the trait the worker pool calls, also implemented for plain
//!   closures
//! - [`FfmpegEncoder`] - converts through the `ffmpeg` CLI (libmp3lame by default)
//! - [`DryRunEncoder`] - reports what would be written without touching disk
//! - [`Workspace`] - per-job scratch directory with atomic finalization
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use wavforge_av::{Encoder, FfmpegEncoder, FfmpegSettings};
//! use wavforge_common::JobDescriptor;
//!
//! let encoder = FfmpegEncoder::new(FfmpegSettings::default())?;
//! let output = encoder.encode(&JobDescriptor::new("/music/take1.wav")?)?;
//! println!("wrote {}", output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dry_run;
mod encoder;
mod error;
mod ffmpeg;
pub mod tools;
pub mod workspace;

// Re-exports
pub use dry_run::DryRunEncoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use ffmpeg::{FfmpegEncoder, FfmpegSettings};
pub use tools::{get_tool_path, require_tool};
pub use workspace::Workspace;
