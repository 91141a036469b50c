//! Configuration management for the application.
//!
//! Handles loading, validating, and saving application configuration in TOML
//! format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Upload size ceiling: 10 MiB, matching the API contract.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Image extensions accepted by the upload endpoint.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host for the API server
    pub host: String,
    /// Bind port for the API server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

/// Image upload settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploaded images are stored and served from
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
}

fn default_max_upload_bytes() -> u64 {
    MAX_UPLOAD_BYTES
}

impl Default for UploadConfig {
    fn default() -> Self {
        let upload_dir = Config::config_dir()
            .map(|dir| dir.join("uploads"))
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        Self {
            upload_dir,
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// Remote annotation (AI restyle) settings.
///
/// The API key is never stored in the config file; `api_key_env` names the
/// environment variable it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    #[serde(default = "default_annotation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_annotation_timeout_secs() -> u64 {
    30
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mistral.ai/v1/chat/completions".to_string(),
            model: "mistral-small-latest".to_string(),
            api_key_env: "MISTRAL_API_KEY".to_string(),
            timeout_secs: default_annotation_timeout_secs(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/Pageforge/config.toml`
/// - macOS: `~/Library/Application Support/Pageforge/config.toml`
/// - Windows: `%APPDATA%\Pageforge\config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Image upload settings
    #[serde(default)]
    pub uploads: UploadConfig,
    /// Remote annotation settings
    #[serde(default)]
    pub annotation: AnnotationConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("Pageforge");

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path()?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, &config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Server host cannot be empty");
        }

        if self.uploads.max_bytes == 0 {
            anyhow::bail!("Upload size limit cannot be zero");
        }

        if !self.annotation.endpoint.starts_with("http://")
            && !self.annotation.endpoint.starts_with("https://")
        {
            anyhow::bail!(
                "Annotation endpoint must be an http(s) URL: {}",
                self.annotation.endpoint
            );
        }

        if self.annotation.model.is_empty() {
            anyhow::bail!("Annotation model cannot be empty");
        }

        Ok(())
    }

    /// Reads the annotation API key from the configured environment variable.
    #[must_use]
    pub fn annotation_api_key(&self) -> Option<String> {
        std::env::var(&self.annotation.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}
