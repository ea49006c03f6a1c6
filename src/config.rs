//! Configuration management for SheetChat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SheetchatError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for SheetChat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the assistant backend (the `/api/...` paths are joined onto it)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_user_agent() -> String {
    format!("sheetchat/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// First transcript entry shown when a chat starts
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Directory chart payloads are written to; `None` disables export
    #[serde(default)]
    pub charts_dir: Option<PathBuf>,

    /// Whether readline history is kept across prompts within a chat
    #[serde(default = "default_input_history")]
    pub input_history: bool,
}

fn default_welcome_message() -> String {
    "👋 Welcome! Upload your Excel files to get started. I can help you analyze your data and create visualizations."
        .to_string()
}

fn default_input_history() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
            charts_dir: None,
            input_history: default_input_history(),
        }
    }
}

/// Default location for exported charts when the user asks for export
/// without naming a directory
pub fn default_charts_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sheetchat").map(|dirs| dirs.data_dir().join("charts"))
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SheetchatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SheetchatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SHEETCHAT_API_URL") {
            tracing::debug!(base_url = %base_url, "Env override: SHEETCHAT_API_URL");
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("SHEETCHAT_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) => self.api.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid SHEETCHAT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(dir) = std::env::var("SHEETCHAT_CHARTS_DIR") {
            tracing::debug!(charts_dir = %dir, "Env override: SHEETCHAT_CHARTS_DIR");
            self.chat.charts_dir = Some(PathBuf::from(dir));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            self.api.base_url = api_url.clone();
        }
        if let Some(dir) = &cli.charts_dir {
            self.chat.charts_dir = Some(dir.clone());
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an absolute http(s) URL or the
    /// timeout is outside `1..=3600` seconds
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            SheetchatError::Config(format!(
                "Invalid api.base_url '{}': {}",
                self.api.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SheetchatError::Config(format!(
                "api.base_url must use http or https, got: {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(SheetchatError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.api.timeout_seconds > 3600 {
            return Err(SheetchatError::Config(
                "api.timeout_seconds must be less than or equal to 3600".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cli_without_overrides() -> crate::cli::Cli {
        crate::cli::Cli {
            config: None,
            verbose: false,
            json_logs: false,
            api_url: None,
            charts_dir: None,
            command: crate::cli::Commands::Session,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_seconds, 120);
        assert!(config.chat.charts_dir.is_none());
        assert!(config.chat.welcome_message.starts_with("👋 Welcome!"));
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_relative_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost:8000/api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_non_http_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_config_validation_timeout_bounds() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.api.timeout_seconds = 3601;
        assert!(config.validate().is_err());

        config.api.timeout_seconds = 3600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: https://finance.example.com
  timeout_seconds: 30
chat:
  welcome_message: Hello there
  charts_dir: /tmp/charts
  input_history: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://finance.example.com");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.chat.welcome_message, "Hello there");
        assert_eq!(config.chat.charts_dir, Some(PathBuf::from("/tmp/charts")));
        assert!(!config.chat.input_history);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("api:\n  timeout_seconds: 5\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_seconds, 5);
        assert!(config.chat.input_history);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        std::env::remove_var("SHEETCHAT_API_URL");
        let config = Config::load("nonexistent.yaml", &cli_without_overrides()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    #[serial]
    fn test_load_reads_file() {
        std::env::remove_var("SHEETCHAT_API_URL");
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api:\n  base_url: http://backend:9000\n").unwrap();

        let config = Config::load(path.to_str().unwrap(), &cli_without_overrides()).unwrap();
        assert_eq!(config.api.base_url, "http://backend:9000");
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api: [not, a, map").unwrap();

        let err = Config::load(path.to_str().unwrap(), &cli_without_overrides()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_vars_override_file_values() {
        std::env::set_var("SHEETCHAT_API_URL", "http://env-backend:8080");
        std::env::set_var("SHEETCHAT_TIMEOUT_SECONDS", "45");
        std::env::set_var("SHEETCHAT_CHARTS_DIR", "/var/tmp/charts");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("SHEETCHAT_API_URL");
        std::env::remove_var("SHEETCHAT_TIMEOUT_SECONDS");
        std::env::remove_var("SHEETCHAT_CHARTS_DIR");

        assert_eq!(config.api.base_url, "http://env-backend:8080");
        assert_eq!(config.api.timeout_seconds, 45);
        assert_eq!(config.chat.charts_dir, Some(PathBuf::from("/var/tmp/charts")));
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env_is_ignored() {
        std::env::set_var("SHEETCHAT_TIMEOUT_SECONDS", "soon");
        let mut config = Config::default();
        config.apply_env_vars();
        std::env::remove_var("SHEETCHAT_TIMEOUT_SECONDS");

        assert_eq!(config.api.timeout_seconds, 120);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut cli = cli_without_overrides();
        cli.api_url = Some("http://cli-backend:1234".to_string());
        cli.charts_dir = Some(PathBuf::from("out"));

        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.api.base_url, "http://cli-backend:1234");
        assert_eq!(config.chat.charts_dir, Some(PathBuf::from("out")));
    }
}
