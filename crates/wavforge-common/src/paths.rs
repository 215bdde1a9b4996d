//! Path utilities for matching input files and naming output files.
//!
//! Extensions are compared case-insensitively and may be given with or
//! without a leading dot.

use std::path::{Path, PathBuf};

/// Audio containers ffmpeg can write without extra muxer options.
const OUTPUT_EXTENSIONS: &[&str] = &["mp3", "ogg", "opus", "flac", "m4a", "aac", "wav"];

/// Strip a leading dot and lowercase an extension.
///
/// # Examples
///
/// ```
/// use wavforge_common::paths::normalize_extension;
///
/// assert_eq!(normalize_extension(".WAV"), "wav");
/// assert_eq!(normalize_extension("mp3"), "mp3");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Check whether `path` ends in `.{ext}` with a non-empty stem.
///
/// A bare `.wav` (nothing before the extension) does not match.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use wavforge_common::paths::has_extension;
///
/// assert!(has_extension(Path::new("/music/take1.wav"), "wav"));
/// assert!(has_extension(Path::new("TAKE2.WAV"), ".wav"));
/// assert!(!has_extension(Path::new("notes.txt"), "wav"));
/// ```
pub fn has_extension(path: &Path, ext: &str) -> bool {
    let wanted = normalize_extension(ext);
    if wanted.is_empty() {
        return false;
    }

    path.file_stem().is_some_and(|s| !s.is_empty())
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase() == wanted)
            .unwrap_or(false)
}

/// Replace the extension of `path` with `ext`.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use wavforge_common::paths::replace_extension;
///
/// assert_eq!(
///     replace_extension(Path::new("/music/take1.wav"), ".mp3"),
///     PathBuf::from("/music/take1.mp3")
/// );
/// ```
pub fn replace_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(normalize_extension(ext))
}

/// Check if an extension (with or without a dot) names a known output format.
pub fn is_known_output_extension(ext: &str) -> bool {
    OUTPUT_EXTENSIONS.contains(&normalize_extension(ext).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a.wav"), "wav"));
        assert!(has_extension(Path::new("/abs/path/song.wav"), "wav"));
        assert!(has_extension(Path::new("song.1.wav"), "wav"));

        // Case insensitive, dot optional
        assert!(has_extension(Path::new("SONG.WAV"), "wav"));
        assert!(has_extension(Path::new("song.Wav"), ".WAV"));

        assert!(!has_extension(Path::new("song.mp3"), "wav"));
        assert!(!has_extension(Path::new("song.wav.bak"), "wav"));
        assert!(!has_extension(Path::new("wav"), "wav"));
        assert!(!has_extension(Path::new("song"), "wav"));
        assert!(!has_extension(Path::new(""), "wav"));
    }

    #[test]
    fn test_bare_extension_is_not_a_match() {
        // ".wav" is a hidden file named "wav", not a wav file.
        assert!(!has_extension(Path::new(".wav"), "wav"));
        assert!(!has_extension(Path::new("/music/.wav"), "wav"));
        assert!(has_extension(Path::new("/music/.hidden.wav"), "wav"));
    }

    #[test]
    fn test_empty_extension_never_matches() {
        assert!(!has_extension(Path::new("song.wav"), ""));
        assert!(!has_extension(Path::new("song.wav"), "."));
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(
            replace_extension(Path::new("/m/a.wav"), "mp3"),
            PathBuf::from("/m/a.mp3")
        );
        assert_eq!(
            replace_extension(Path::new("/m/a.b.WAV"), "FLAC"),
            PathBuf::from("/m/a.b.flac")
        );
    }

    #[test]
    fn test_known_output_extensions() {
        assert!(is_known_output_extension("mp3"));
        assert!(is_known_output_extension(".Flac"));
        assert!(!is_known_output_extension("txt"));
        assert!(!is_known_output_extension(""));
    }
}
