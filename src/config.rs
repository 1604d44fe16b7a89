//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// DocAssist backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL including the `/api` prefix
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Reverse geocoding service
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_enabled")]
    pub enabled: bool,

    #[serde(default = "default_geocoding_url")]
    pub url: String,

    #[serde(default = "default_geocoding_language")]
    pub language: String,

    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,
}

fn default_geocoding_enabled() -> bool {
    true
}

fn default_geocoding_url() -> String {
    "https://api.bigdatacloud.net/data/reverse-geocode-client".to_string()
}

fn default_geocoding_language() -> String {
    "en".to_string()
}

fn default_geocoding_timeout() -> u64 {
    10
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: default_geocoding_enabled(),
            url: default_geocoding_url(),
            language: default_geocoding_language(),
            timeout_secs: default_geocoding_timeout(),
        }
    }
}

/// Fixed device position. A terminal has no GPS, so this stands in for it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Persisted login session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: String,
}

fn default_session_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("docassist").join("session.toml").to_string_lossy().to_string())
        .unwrap_or_else(|| "./docassist_session.toml".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("docassist").join("config.toml")),
            Some(PathBuf::from("/etc/docassist/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Session file location
    pub fn session_path(&self) -> PathBuf {
        PathBuf::from(&self.session.path)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DOCASSIST_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(timeout) = var("DOCASSIST_REQUEST_TIMEOUT") {
            match timeout.parse() {
                Ok(t) => self.backend.request_timeout_secs = t,
                Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid DOCASSIST_REQUEST_TIMEOUT"),
            }
        }

        if let Some(path) = var("DOCASSIST_SESSION_PATH") {
            self.session.path = path;
        }

        if let Some(level) = var("DOCASSIST_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("DOCASSIST_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# DocAssist Configuration
#
# Environment variables override these settings:
# - DOCASSIST_BACKEND_URL
# - DOCASSIST_REQUEST_TIMEOUT
# - DOCASSIST_SESSION_PATH
# - DOCASSIST_LOG_LEVEL
# - DOCASSIST_LOG_FORMAT

[backend]
# DocAssist API base URL (including the /api prefix)
base_url = "http://127.0.0.1:8000/api"

# Request timeout in seconds
request_timeout_secs = 30

[geocoding]
# Resolve detected coordinates to a city name
enabled = true

# Reverse geocoding endpoint
url = "https://api.bigdatacloud.net/data/reverse-geocode-client"

# Language of returned place names
language = "en"

# Request timeout in seconds
timeout_secs = 10

[location]
# Fixed device position used by `--gps` and `docassist locate`
# latitude = 30.2672
# longitude = -97.7431

[session]
# Where the login session is kept between runs
# path = "~/.local/share/docassist/session.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert!(config.geocoding.enabled);
        assert_eq!(config.geocoding.language, "en");
        assert_eq!(config.geocoding.timeout_secs, 10);
        assert!(config.location.latitude.is_none());
        assert!(config.session.path.ends_with("session.toml"));
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.geocoding.timeout_secs, 10);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DOCASSIST_BACKEND_URL", "http://clinic.local/api"),
            ("DOCASSIST_REQUEST_TIMEOUT", "5"),
            ("DOCASSIST_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend.base_url, "http://clinic.local/api");
        assert_eq!(config.backend.request_timeout_secs, 5);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_timeout_override_keeps_value() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "DOCASSIST_REQUEST_TIMEOUT").then(|| "soon".to_string()));
        assert_eq!(config.backend.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nrequest_timeout_secs = 12\n").unwrap();

        std::env::set_var("DOCASSIST_BACKEND_URL", "http://env.local/api");
        let config = Config::load_with_env(&path).unwrap();
        std::env::remove_var("DOCASSIST_BACKEND_URL");

        assert_eq!(config.backend.base_url, "http://env.local/api");
        assert_eq!(config.backend.request_timeout_secs, 12);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\nbase_url = \"http://clinic.local/api\"\n\n[location]\nlatitude = 12.5\nlongitude = 77.6\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.backend.base_url, "http://clinic.local/api");
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.location.latitude, Some(12.5));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[backend\nbase_url = 1").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }
}
