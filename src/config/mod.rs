mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./audiorelay.toml",
        "~/.config/audiorelay/config.toml",
        "/etc/audiorelay/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let extractor = &config.extractor;

    if extractor.program.trim().is_empty() && extractor.path.is_none() {
        anyhow::bail!("Extractor program name cannot be empty");
    }

    if let Some(ref path) = extractor.path {
        if !path.exists() {
            tracing::warn!("Extractor path does not exist: {:?}", path);
        }
    }

    if extractor.format.trim().is_empty() {
        anyhow::bail!("Extractor format selector cannot be empty");
    }

    if extractor.resolve_timeout_secs == 0 {
        anyhow::bail!("Extractor resolve timeout must be greater than 0");
    }

    if extractor.version_timeout_secs == 0 {
        anyhow::bail!("Extractor version timeout must be greater than 0");
    }

    Ok(())
}
