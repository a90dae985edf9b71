//! Configuration loading and discovery for `atlasmesh.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::MeshConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "atlasmesh.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse atlasmesh.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error(
        "Config validation failed:\n{}",
        .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
    )]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out: Option<PathBuf>,
    /// Override pixels per unit
    pub pixels_per_unit: Option<f32>,
    /// Override output extension
    pub extension: Option<String>,
    /// Enable stale file pruning
    pub prune: Option<bool>,
}

/// Find atlasmesh.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for atlasmesh.toml
/// 2. Check XDG_CONFIG_HOME/atlasmesh/atlasmesh.toml (or ~/.config/atlasmesh/atlasmesh.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find atlasmesh.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("atlasmesh").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find atlasmesh.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an atlasmesh.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(Some(Path::new("project/atlasmesh.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<MeshConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(MeshConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<MeshConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: MeshConfig = toml::from_str(&contents)?;
    check(&config)?;
    Ok(config)
}

fn check(config: &MeshConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged
/// configuration is validated again.
pub fn merge_cli_overrides(
    config: &mut MeshConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(ref out) = overrides.out {
        config.output.dir = out.clone();
    }

    if let Some(pixels_per_unit) = overrides.pixels_per_unit {
        config.geometry.pixels_per_unit = pixels_per_unit;
    }

    if let Some(ref extension) = overrides.extension {
        config.output.extension = extension.clone();
    }

    if let Some(prune) = overrides.prune {
        config.output.prune = prune;
    }

    check(config)
}

/// Resolve a path relative to the directory holding the config file.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
