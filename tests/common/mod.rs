//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wavforge_av::Encoder;
use wavforge_common::JobDescriptor;

/// Smallest byte sequence that starts like a RIFF/WAVE file.
pub const WAV_HEADER: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt ";

/// Create a temp folder containing `names`, each holding a short WAV header.
pub fn media_dir(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(name), WAV_HEADER).unwrap();
    }
    dir
}

/// `count` files named `take-000.wav`, `take-001.wav`, ...
pub fn numbered_wavs(count: usize) -> TempDir {
    let names: Vec<String> = (0..count).map(|i| format!("take-{i:03}.wav")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    media_dir(&refs)
}

/// Encoder that writes `bytes` bytes to `<stem>.mp3` next to each input.
pub fn forged_encoder(bytes: usize) -> impl Encoder {
    move |job: &JobDescriptor| -> wavforge_av::Result<PathBuf> {
        let output = job.output_path("mp3");
        fs::write(&output, vec![0xFF; bytes])?;
        Ok(output)
    }
}

/// Files in `dir` with the given extension.
pub fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    found.sort();
    found
}
