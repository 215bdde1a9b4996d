use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use wavforge::config::{Config, EncoderBackend};

#[derive(Parser)]
#[command(name = "wavforge")]
#[command(author, version, about = "Convert every WAV file in a folder to MP3")]
pub struct Cli {
    /// Folder to scan for input files
    pub dir: PathBuf,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be encoded without running the encoder
    #[arg(long)]
    pub dry_run: bool,

    /// Use this many threads instead of the detected CPU count
    #[arg(short = 'j', long)]
    pub threads: Option<NonZeroUsize>,

    /// Exit non-zero if any file fails to encode
    #[arg(long)]
    pub strict: bool,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(threads) = self.threads {
            config.batch.threads = Some(threads.get());
        }
        if self.strict {
            config.batch.strict = true;
        }
        if self.dry_run {
            config.encoder.backend = EncoderBackend::DryRun;
        }
    }
}
