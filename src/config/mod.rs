//! Configuration management
//!
//! This module handles loading and parsing configuration for the Sitedeck client.
//! Configuration can be loaded from:
//! - sitedeck.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Content backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Credentials for write requests
    #[serde(default)]
    pub auth: AuthConfig,
    /// List cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Dashboard presentation settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Staged image limits
    #[serde(default)]
    pub images: ImageConfig,
}

/// Content backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// API root; resource paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Origin that relative image paths are resolved against
    #[serde(default = "default_media_origin")]
    pub media_origin: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            media_origin: default_media_origin(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_media_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("sitedeck/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Credentials for write requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token; content writes fail locally without it
    #[serde(default)]
    pub token: Option<String>,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in seconds; the default 0 keeps entries until refreshed
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
        }
    }
}

fn default_ttl() -> u64 {
    0
}

/// Dashboard presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Indentation per tree depth level
    #[serde(default = "default_indent_width")]
    pub indent_width: u32,
    /// How long success notices stay visible, in milliseconds
    #[serde(default = "default_notice_ttl_ms")]
    pub notice_ttl_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            notice_ttl_ms: default_notice_ttl_ms(),
        }
    }
}

fn default_indent_width() -> u32 {
    20
}

fn default_notice_ttl_ms() -> u64 {
    3000
}

/// Staged image limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Maximum file size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
        "image/svg+xml".to_string(),
    ]
}

impl ImageConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Guess a MIME type from a file name's extension
    pub fn mime_for_file_name(&self, file_name: &str) -> Option<&'static str> {
        let extension = file_name.rsplit_once('.')?.1.to_lowercase();
        match extension.as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            "svg" => Some("image/svg+xml"),
            "bmp" => Some("image/bmp"),
            "tif" | "tiff" => Some("image/tiff"),
            "ico" => Some("image/x-icon"),
            _ => None,
        }
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - SITEDECK_BACKEND_BASE_URL
    /// - SITEDECK_BACKEND_MEDIA_ORIGIN
    /// - SITEDECK_BACKEND_TIMEOUT_SECS
    /// - SITEDECK_AUTH_TOKEN
    /// - SITEDECK_CACHE_TTL_SECONDS
    /// - SITEDECK_DASHBOARD_INDENT_WIDTH
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("SITEDECK_BACKEND_BASE_URL") {
            self.backend.base_url = base_url;
        }
        if let Ok(origin) = std::env::var("SITEDECK_BACKEND_MEDIA_ORIGIN") {
            self.backend.media_origin = origin;
        }
        if let Ok(timeout) = std::env::var("SITEDECK_BACKEND_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.backend.timeout_secs = timeout;
            }
        }

        if let Ok(token) = std::env::var("SITEDECK_AUTH_TOKEN") {
            if !token.trim().is_empty() {
                self.auth.token = Some(token);
            }
        }

        if let Ok(ttl) = std::env::var("SITEDECK_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        if let Ok(width) = std::env::var("SITEDECK_DASHBOARD_INDENT_WIDTH") {
            if let Ok(width) = width.parse::<u32>() {
                self.dashboard.indent_width = width;
            }
        }
    }
}

/// Format YAML parsing error with location and context
pub(crate) fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_KEYS: [&str; 6] = [
    "SITEDECK_BACKEND_BASE_URL",
    "SITEDECK_BACKEND_MEDIA_ORIGIN",
    "SITEDECK_BACKEND_TIMEOUT_SECS",
    "SITEDECK_AUTH_TOKEN",
    "SITEDECK_CACHE_TTL_SECONDS",
    "SITEDECK_DASHBOARD_INDENT_WIDTH",
];

#[cfg(test)]
fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_sitedeck.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.backend.base_url, "http://localhost:8000/api");
        assert_eq!(config.backend.media_origin, "http://localhost:8000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.auth.token, None);
        assert_eq!(config.cache.ttl_seconds, 0);
        assert_eq!(config.dashboard.indent_width, 20);
        assert_eq!(config.dashboard.notice_ttl_ms, 3000);
        assert_eq!(config.images.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.dashboard.indent_width, 20);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "backend:\n  timeout_secs: 5\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.backend.base_url, "http://localhost:8000/api");
        assert_eq!(config.cache.ttl_seconds, 0);
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"
backend:
  base_url: "https://cms.example.org/backend/api"
  media_origin: "https://cms.example.org/backend"
  timeout_secs: 10
  user_agent: "deck-test"
auth:
  token: "abc123"
cache:
  ttl_seconds: 120
dashboard:
  indent_width: 4
  notice_ttl_ms: 800
images:
  max_file_size: 1024
  allowed_types: ["image/png"]
"#).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.backend.base_url, "https://cms.example.org/backend/api");
        assert_eq!(config.backend.media_origin, "https://cms.example.org/backend");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.backend.user_agent, "deck-test");
        assert_eq!(config.auth.token.as_deref(), Some("abc123"));
        assert_eq!(config.cache.ttl_seconds, 120);
        assert_eq!(config.dashboard.indent_width, 4);
        assert_eq!(config.dashboard.notice_ttl_ms, 800);
        assert_eq!(config.images.max_file_size, 1024);
        assert!(config.images.is_type_allowed("image/png"));
        assert!(!config.images.is_type_allowed("image/jpeg"));
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "backend:\n  timeout_secs: not_a_number\n").unwrap();

        let result = Config::load(file.path());

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("parse"));
    }

    #[test]
    fn test_load_malformed_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "backend:\n  base_url: [invalid yaml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_mime_for_file_name() {
        let images = ImageConfig::default();
        assert_eq!(images.mime_for_file_name("photo.JPG"), Some("image/jpeg"));
        assert_eq!(images.mime_for_file_name("banner.webp"), Some("image/webp"));
        assert_eq!(images.mime_for_file_name("notes.txt"), None);
        assert_eq!(images.mime_for_file_name("no_extension"), None);
    }

    #[test]
    fn test_env_override_backend_and_auth() {
        let _guard = lock_env();
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "backend:\n  base_url: \"http://file/api\"\n").unwrap();

        std::env::set_var("SITEDECK_BACKEND_BASE_URL", "http://env/api");
        std::env::set_var("SITEDECK_BACKEND_TIMEOUT_SECS", "7");
        std::env::set_var("SITEDECK_AUTH_TOKEN", "from-env");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.backend.base_url, "http://env/api");
        assert_eq!(config.backend.timeout_secs, 7);
        assert_eq!(config.auth.token.as_deref(), Some("from-env"));

        clear_env();
    }

    #[test]
    fn test_env_override_invalid_numbers_ignored() {
        let _guard = lock_env();
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "cache:\n  ttl_seconds: 60\n").unwrap();

        std::env::set_var("SITEDECK_CACHE_TTL_SECONDS", "soon");
        std::env::set_var("SITEDECK_DASHBOARD_INDENT_WIDTH", "-3");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.dashboard.indent_width, 20);

        clear_env();
    }

    #[test]
    fn test_env_blank_token_ignored() {
        let _guard = lock_env();
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "auth:\n  token: \"file-token\"\n").unwrap();

        std::env::set_var("SITEDECK_AUTH_TOKEN", "   ");

        let config = Config::load_with_env(file.path()).unwrap();
        assert_eq!(config.auth.token.as_deref(), Some("file-token"));

        clear_env();
    }
}
