//! Configuration module for Editor Uploadr
//!
//! Handles loading and parsing of YAML configuration files with support for
//! environment variable expansion and validation of the upload policy.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports two syntaxes:
/// - `${VAR_NAME}` - Simple expansion, keeps placeholder if var not found
/// - `${VAR_NAME:-default}` - Expansion with default value
///
/// Variable names must start with a letter or underscore and contain only
/// uppercase letters, digits, and underscores.
///
/// # Examples
///
/// ```ignore
/// std::env::set_var("UPLOAD_ROOT", "/srv/uploads");
/// let result = expand_env_vars("${UPLOAD_ROOT}/image/{yyyy}");
/// assert_eq!(result, "/srv/uploads/image/{yyyy}");
///
/// let result = expand_env_vars("${MISSING:-default}");
/// assert_eq!(result, "default");
/// ```
pub(crate) fn expand_env_vars(s: &str) -> String {
    // Regex to capture ${VAR} or ${VAR:-default}
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]+))?\}").unwrap();
    let mut last_match = 0;
    let mut result = String::with_capacity(s.len());

    for cap in re.captures_iter(s) {
        let full_match = cap.get(0).unwrap();
        let var_name = cap.get(1).unwrap().as_str();

        result.push_str(&s[last_match..full_match.start()]);

        let value = match std::env::var(var_name) {
            Ok(val) => val,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                // No env var and no default. Keep the original placeholder.
                None => full_match.as_str().to_string(),
            },
        };
        result.push_str(&value);

        last_match = full_match.end();
    }

    result.push_str(&s[last_match..]);

    result
}

/// Placeholders understood by the path template.
pub const PATH_PLACEHOLDERS: [&str; 7] = [
    "{yyyy}", "{mm}", "{dd}", "{hh}", "{ii}", "{ss}", "{time}",
];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub uploader: UploaderConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        ConfigLoader::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.uploader.validate()?;

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level '{}': must be one of trace, debug, info, warn, error",
                    other
                )))
            }
        }

        Ok(())
    }
}

/// Upload policy for one uploader instance.
///
/// Immutable once handed to an [`Uploader`](crate::upload::Uploader).
///
/// # Example
///
/// ```yaml
/// uploader:
///   path_format: "${UPLOAD_ROOT:-/var/www}/upload/image/{yyyy}{mm}{dd}/{time}"
///   max_size: 2048000
///   allowed_extensions: [".png", ".jpg", ".jpeg", ".gif", ".bmp"]
///   remote_timeout_secs: 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Destination template; see [`PATH_PLACEHOLDERS`]. The source
    /// extension is appended to the rendered value.
    pub path_format: String,

    /// Maximum accepted size in bytes (inclusive).
    pub max_size: u64,

    /// Allowed extensions including the leading dot, e.g. `.png`.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Informational only; not used when deriving paths.
    #[serde(default)]
    pub original_name: Option<String>,

    /// Timeout applied to each remote request (HEAD and GET). Default: 5
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,
}

impl UploaderConfig {
    /// Create a config with default extensions and timeout
    pub fn new(path_format: impl Into<String>, max_size: u64) -> Self {
        Self {
            path_format: path_format.into(),
            max_size,
            allowed_extensions: default_allowed_extensions(),
            original_name: None,
            remote_timeout_secs: default_remote_timeout(),
        }
    }

    /// Replace the allowed extension list
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the upload policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_format.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "path_format cannot be empty".into(),
            ));
        }

        if self.max_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_size must be greater than zero".into(),
            ));
        }

        for ext in &self.allowed_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid extension '{}': must start with '.' followed by at least one character",
                    ext
                )));
            }
        }

        if self.remote_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "remote_timeout_secs must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

fn default_allowed_extensions() -> Vec<String> {
    [".png", ".jpg", ".jpeg", ".gif", ".bmp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_remote_timeout() -> u64 {
    5
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). Default: "info"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output. Default: true
    #[serde(default = "default_log_json")]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_log_json(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_json() -> bool {
    true
}
