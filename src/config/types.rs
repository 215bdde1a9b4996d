use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wavforge_av::FfmpegSettings;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub encoder: EncoderConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Extension of the files to pick up (default: wav)
    #[serde(default = "default_input_extension")]
    pub input_extension: String,

    /// Extension given to converted files (default: mp3)
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Hardware thread count to plan for; detected from the CPU when unset.
    /// The pool still never starts more workers than there are jobs.
    #[serde(default)]
    pub threads: Option<usize>,

    /// Exit non-zero when any file fails to convert
    #[serde(default)]
    pub strict: bool,
}

fn default_input_extension() -> String {
    "wav".to_string()
}

fn default_output_extension() -> String {
    "mp3".to_string()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_extension: default_input_extension(),
            output_extension: default_output_extension(),
            threads: None,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncoderBackend {
    #[default]
    Ffmpeg,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EncoderConfig {
    #[serde(default)]
    pub backend: EncoderBackend,

    /// Path to the ffmpeg binary (searched on PATH when unset)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default = "default_codec")]
    pub codec: String,

    /// VBR quality, 0 (best) to 9 (worst)
    #[serde(default = "default_quality")]
    pub quality: u8,

    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_codec() -> String {
    "libmp3lame".to_string()
}

fn default_quality() -> u8 {
    2
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            backend: EncoderBackend::default(),
            ffmpeg_path: None,
            codec: default_codec(),
            quality: default_quality(),
            extra_args: Vec::new(),
        }
    }
}

impl EncoderConfig {
    /// ffmpeg settings producing `.{output_extension}` files.
    pub fn ffmpeg_settings(&self, output_extension: &str) -> FfmpegSettings {
        FfmpegSettings {
            ffmpeg_path: self
                .ffmpeg_path
                .as_ref()
                .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned())),
            codec: self.codec.clone(),
            quality: self.quality,
            output_extension: output_extension.to_string(),
            extra_args: self.extra_args.clone(),
        }
    }
}
