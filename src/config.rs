//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::s3::DEFAULT_REGION;
use crate::error::SetupError;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Placer settings.
    #[serde(default)]
    pub placer: PlacerConfig,

    /// Object storage settings, used when `placer.backend = "s3"`.
    #[serde(default)]
    pub s3: S3Config,
}

/// Which directory backend to select source images from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local filesystem.
    #[default]
    Local,
    /// S3-compatible object storage.
    S3,
}

/// Where source images come from and where derivatives go.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    /// Directory backend.
    pub backend: Backend,
    /// Source directory, or bucket name for the S3 backend.
    pub original_path: String,
    /// Output directory for resized images.
    pub resized_path: String,
    /// Fixed seed for source selection. Unset means the process RNG.
    pub seed: Option<u64>,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            original_path: "./static/images/".to_string(),
            resized_path: "./static/images/resized/".to_string(),
            seed: None,
        }
    }
}

/// Object storage settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Bucket region.
    pub region: String,
    /// Endpoint override for S3-compatible servers.
    pub endpoint: Option<String>,
    /// Where selected objects are downloaded to.
    pub staging_dir: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self { region: DEFAULT_REGION.to_string(), endpoint: None, staging_dir: None }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Load configuration from the discovered path (see
    /// [`discover_config_path`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the discovered file exists but cannot be parsed.
    pub fn discover(explicit: Option<&str>) -> Result<Self, SetupError> {
        Self::load(&discover_config_path(explicit)).map_err(SetupError::Config)
    }

    /// Source location, preferring `PLACECHICKEN_ORIGINAL_PATH`.
    #[must_use]
    pub fn original_path(&self) -> String {
        std::env::var("PLACECHICKEN_ORIGINAL_PATH")
            .unwrap_or_else(|_| self.placer.original_path.clone())
    }

    /// Output directory, preferring `PLACECHICKEN_RESIZED_PATH`.
    #[must_use]
    pub fn resized_path(&self) -> PathBuf {
        std::env::var("PLACECHICKEN_RESIZED_PATH")
            .map_or_else(|_| PathBuf::from(&self.placer.resized_path), PathBuf::from)
    }

    /// Bucket region, preferring `AWS_REGION`.
    #[must_use]
    pub fn region(&self) -> String {
        std::env::var("AWS_REGION").unwrap_or_else(|_| self.s3.region.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path
/// 2. `PLACECHICKEN_CONFIG` environment variable
/// 3. `~/.config/placechicken/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PLACECHICKEN_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/placechicken/config.toml")
    } else {
        PathBuf::from("placechicken.toml")
    }
}
