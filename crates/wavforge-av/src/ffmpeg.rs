//! Encoding through the `ffmpeg` command-line tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use wavforge_common::JobDescriptor;

use crate::tools::get_tool_path;
use crate::{Encoder, Error, Result, Workspace};

/// How many trailing stderr lines to keep in a failure message.
const STDERR_TAIL_LINES: usize = 3;

/// ffmpeg encoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FfmpegSettings {
    /// Explicit ffmpeg binary; `PATH` is searched when unset.
    pub ffmpeg_path: Option<PathBuf>,
    /// Audio codec passed to `-codec:a` (default: libmp3lame).
    pub codec: String,
    /// VBR quality passed to `-q:a`, 0 best to 9 worst (default: 2).
    pub quality: u8,
    /// Extension of the written file (default: mp3).
    pub output_extension: String,
    /// Extra arguments inserted before the output path.
    pub extra_args: Vec<String>,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            codec: "libmp3lame".to_string(),
            quality: 2, // LAME "high"
            output_extension: "mp3".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Encoder that shells out to ffmpeg once per job.
///
/// Each call gets its own [`Workspace`], so concurrent calls share nothing
/// but the immutable settings.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    settings: FfmpegSettings,
}

impl FfmpegEncoder {
    /// Locate ffmpeg and build an encoder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] when ffmpeg is neither configured nor
    /// on `PATH`.
    pub fn new(settings: FfmpegSettings) -> Result<Self> {
        let program = get_tool_path("ffmpeg", settings.ffmpeg_path.as_deref())?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Using ffmpeg at {}", program.display());

        Ok(Self { program, settings })
    }

    /// The resolved ffmpeg binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The settings this encoder was built with.
    pub fn settings(&self) -> &FfmpegSettings {
        &self.settings
    }

    /// Build the ffmpeg argument list for one conversion.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.into());

        args.extend(
            [
                "-vn".to_string(),
                "-codec:a".to_string(),
                self.settings.codec.clone(),
                "-q:a".to_string(),
                self.settings.quality.to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.extend(self.settings.extra_args.iter().map(OsString::from));

        args.push(output.into());
        args
    }
}

impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode(&self, job: &JobDescriptor) -> Result<PathBuf> {
        let input = job.path();
        if !input.exists() {
            return Err(Error::file_not_found(input));
        }

        let workspace = Workspace::new(job, &self.settings.output_extension)?;
        let args = self.args(input, workspace.output());

        #[cfg(feature = "tracing")]
        tracing::debug!("Running {} {:?}", self.program.display(), args);

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found("ffmpeg")
                } else {
                    Error::Io(e)
                }
            })?;

        if !result.status.success() {
            let tail = stderr_tail(&result.stderr, STDERR_TAIL_LINES);
            return Err(Error::tool_failed(
                "ffmpeg",
                if tail.is_empty() {
                    format!("exited with {}", result.status)
                } else {
                    format!("exited with {}: {}", result.status, tail)
                },
            ));
        }

        let written = std::fs::metadata(workspace.output())
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(Error::encode(format!(
                "ffmpeg produced no output for {}",
                job
            )));
        }

        workspace.finalize()
    }
}

/// Last `max_lines` non-empty lines of a tool's stderr, joined with `" | "`.
fn stderr_tail(stderr: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join(" | ")
}
