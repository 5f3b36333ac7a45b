//! Configuration resolution for msight-va
//!
//! Two-tier priority for every setting: environment variable, then TOML
//! config file, then the compiled default. The media API key has no
//! default and must come from one of the first two tiers.

use msight_common::config::TomlConfig;
use msight_common::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 5810;
const DEFAULT_SPORT: &str = "taekwondo";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_PROCESSING_TIMEOUT_SECS: u64 = 600;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct VaConfig {
    pub media_api_key: String,
    /// Override for the media service base URL (None = production URL)
    pub media_base_url: Option<String>,
    /// Override for the generation model identifier
    pub media_model: Option<String>,
    /// Sport label stamped onto produced analyses
    pub sport: String,
    pub port: u16,
    /// Remote asset poll interval
    pub poll_interval: Duration,
    /// Remote asset processing budget
    pub processing_timeout: Duration,
}

/// Resolve the full service configuration
pub fn resolve(toml_config: &TomlConfig) -> Result<VaConfig> {
    let media_api_key = resolve_media_api_key(toml_config)?;

    let media_base_url = std::env::var("MSIGHT_MEDIA_BASE_URL")
        .ok()
        .or_else(|| toml_config.media_base_url.clone());
    let media_model = std::env::var("MSIGHT_MEDIA_MODEL")
        .ok()
        .or_else(|| toml_config.media_model.clone());
    let sport = std::env::var("MSIGHT_SPORT")
        .ok()
        .or_else(|| toml_config.sport.clone())
        .unwrap_or_else(|| DEFAULT_SPORT.to_string());

    let port = match std::env::var("MSIGHT_PORT") {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("Invalid MSIGHT_PORT: {}", raw)))?,
        Err(_) => toml_config.port.unwrap_or(DEFAULT_PORT),
    };

    let poll_interval = Duration::from_secs(
        toml_config
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
    );
    let processing_timeout = Duration::from_secs(
        toml_config
            .processing_timeout_secs
            .unwrap_or(DEFAULT_PROCESSING_TIMEOUT_SECS),
    );

    Ok(VaConfig {
        media_api_key,
        media_base_url,
        media_model,
        sport,
        port,
        poll_interval,
        processing_timeout,
    })
}

/// Resolve the media service API key (ENV → TOML)
pub fn resolve_media_api_key(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var("MSIGHT_MEDIA_API_KEY").ok();
    resolve_key_from(env_key.as_deref(), toml_config.media_api_key.as_deref())
}

fn resolve_key_from(env_key: Option<&str>, toml_key: Option<&str>) -> Result<String> {
    let mut sources = Vec::new();
    if env_key.map(is_valid_key).unwrap_or(false) {
        sources.push("environment");
    }
    if toml_key.map(is_valid_key).unwrap_or(false) {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "Media API key found in multiple sources: {}. Using environment (highest priority).",
            sources.join(", ")
        );
    }

    if let Some(key) = env_key {
        if is_valid_key(key) {
            info!("Media API key loaded from environment variable");
            return Ok(key.to_string());
        }
    }

    if let Some(key) = toml_key {
        if is_valid_key(key) {
            info!("Media API key loaded from TOML config");
            return Ok(key.to_string());
        }
    }

    Err(Error::Config(
        "Media API key not configured. Please configure using one of:\n\
         1. Environment: MSIGHT_MEDIA_API_KEY=your-key-here\n\
         2. TOML config: ~/.config/msight/msight-va.toml (media_api_key = \"your-key\")"
            .to_string(),
    ))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
