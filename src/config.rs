//! Configuration file parser for ~/.config/newswire/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! The API key can also come from the `NEWSWIRE_API_KEY` environment
//! variable, which takes precedence over the file.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Upper bound on config file size; anything larger is rejected rather than
/// read into memory.
const MAX_CONFIG_SIZE: u64 = 64 * 1024;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid API base url: {0}")]
    InvalidBaseUrl(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Custom Debug masks `api_key` to keep the secret out of logs.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// News API key (alternative to the NEWSWIRE_API_KEY env var).
    api_key: Option<String>,

    /// Base url of the headlines API.
    pub api_base: String,

    /// Two-letter content language.
    pub language: String,

    /// Two-letter country/region.
    pub country: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://gnews.io/api/v4/".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("language", &self.language)
            .field("country", &self.country)
            .finish()
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let size = std::fs::metadata(path)?.len();
        if size > MAX_CONFIG_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} bytes (max {})",
                size, MAX_CONFIG_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The effective API key: environment variable first, then config file,
    /// then empty (the upstream will answer 401/403 and the mediator falls
    /// back to mock data, so a missing key degrades rather than fails).
    pub fn api_key(&self) -> SecretString {
        let key = std::env::var("NEWSWIRE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
            .unwrap_or_default();
        SecretString::from(key)
    }

    /// Parsed API base url.
    pub fn base_url(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.api_base).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base, "https://gnews.io/api/v4/");
        assert_eq!(config.language, "en");
        assert_eq!(config.country, "us");
        assert!(config.base_url().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api_base, Config::default().api_base);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(r#"language = "zh""#).unwrap();
        assert_eq!(config.language, "zh");
        assert_eq!(config.country, "us");
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config: Config = toml::from_str(r#"api_key = "super-secret""#).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config: Config = toml::from_str(r#"api_base = "not a url""#).unwrap();
        assert!(config.base_url().is_err());
    }
}
