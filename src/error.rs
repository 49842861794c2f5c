use std::path::PathBuf;
use thiserror::Error;

/// Main error type for devlog
#[derive(Error, Debug)]
pub enum DevLogError {
    /// Git-related errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Language-model API errors
    #[error("Language model error: {0}")]
    LanguageModel(String),

    /// Chat webhook rejected the payload
    #[error("Webhook delivery failed: {0}")]
    Webhook(String),

    /// No metrics snapshot could be located for an identity key
    #[error("Metrics file not found: {} (checked fallbacks: {})", primary.display(), format_paths(checked))]
    MetricsNotFound {
        primary: PathBuf,
        checked: Vec<PathBuf>,
    },

    /// Date or week label that cannot be parsed
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Missing configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

/// Result type alias for devlog operations
pub type Result<T> = std::result::Result<T, DevLogError>;

impl DevLogError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new language-model error
    pub fn language_model<S: Into<String>>(msg: S) -> Self {
        Self::LanguageModel(msg.into())
    }

    /// Create a new webhook delivery error
    pub fn webhook<S: Into<String>>(msg: S) -> Self {
        Self::Webhook(msg.into())
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "none".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
