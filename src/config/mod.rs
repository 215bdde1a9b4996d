mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use wavforge_common::paths::{is_known_output_extension, normalize_extension};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    prepare_config(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./wavforge.toml",
        "~/.config/wavforge/config.toml",
        "/etc/wavforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Normalize extensions so `.WAV` and `wav` mean the same thing.
pub fn prepare_config(config: &mut Config) {
    config.batch.input_extension = normalize_extension(&config.batch.input_extension);
    config.batch.output_extension = normalize_extension(&config.batch.output_extension);
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let batch = &config.batch;

    if normalize_extension(&batch.input_extension).is_empty() {
        anyhow::bail!("batch.input_extension cannot be empty");
    }
    if normalize_extension(&batch.output_extension).is_empty() {
        anyhow::bail!("batch.output_extension cannot be empty");
    }
    if normalize_extension(&batch.input_extension) == normalize_extension(&batch.output_extension) {
        anyhow::bail!(
            "batch.input_extension and batch.output_extension are both '{}'; outputs would overwrite inputs",
            batch.input_extension
        );
    }
    if batch.threads == Some(0) {
        anyhow::bail!("batch.threads must be at least 1");
    }

    if !is_known_output_extension(&batch.output_extension) {
        tracing::warn!(
            "Output extension '{}' is not a known output format",
            batch.output_extension
        );
    }

    if config.encoder.quality > 9 {
        anyhow::bail!(
            "encoder.quality must be between 0 and 9, got {}",
            config.encoder.quality
        );
    }
    if config.encoder.codec.trim().is_empty() {
        anyhow::bail!("encoder.codec cannot be empty");
    }

    Ok(())
}
