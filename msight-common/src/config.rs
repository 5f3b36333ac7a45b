//! Configuration file loading
//!
//! Per-service TOML config resolved from the platform config directory
//! (`~/.config/msight/<service>.toml` on Linux). Values here are the
//! lowest-priority tier; services override them from the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration shared by MatchSight services
///
/// All fields are optional; services apply their own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// API key for the external media-understanding service
    pub media_api_key: Option<String>,
    /// Base URL of the external media-understanding service
    pub media_base_url: Option<String>,
    /// Model identifier used for generation requests
    pub media_model: Option<String>,
    /// Sport label attached to produced analyses
    pub sport: Option<String>,
    /// HTTP listen port
    pub port: Option<u16>,
    /// Remote asset poll interval, seconds
    pub poll_interval_secs: Option<u64>,
    /// Remote asset processing budget, seconds
    pub processing_timeout_secs: Option<u64>,
}

/// Default configuration file path for a service
///
/// `~/.config/msight/<service>.toml` (or the platform equivalent).
pub fn config_file_path(service_name: &str) -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("msight").join(format!("{}.toml", service_name)))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Load the TOML config for a service
///
/// A missing file is not an error: it yields the all-defaults config so a
/// service can run from environment variables alone.
pub fn load_toml_config(service_name: &str) -> Result<TomlConfig> {
    let path = config_file_path(service_name)?;
    load_toml_config_from(&path)
}

/// Load a TOML config from an explicit path (missing file => defaults)
pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}
