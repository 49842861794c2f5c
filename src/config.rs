use crate::ai::claude::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::error::{DevLogError, Result};
use crate::git::stats::DEFAULT_HOTSPOT_LIMIT;
use crate::git::top_changes::DEFAULT_TOP_CHANGES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Largest UTC offset accepted, in hours
const MAX_OFFSET_HOURS: i32 = 14;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the documentation tree holding `DevLog/`, `Meeting/` and `Planning/`
    #[serde(default = "default_docs_root")]
    pub docs_root: PathBuf,

    /// Anthropic API key (overridden by `ANTHROPIC_AUTH_TOKEN` / `ANTHROPIC_API_KEY`)
    pub api_key: Option<String>,

    /// Model used for narrative sections
    #[serde(default = "default_model")]
    pub model: String,

    /// Messages endpoint override, for proxies and compatible gateways
    pub api_url: Option<String>,

    /// Max tokens per narrative response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Chat webhook (overridden by `DISCORD_WEBHOOK_URL`)
    pub webhook_url: Option<String>,

    /// Offset of report timestamps and day boundaries, in hours
    #[serde(default)]
    pub utc_offset_hours: i32,

    /// Number of hotspot files kept
    #[serde(default = "default_hotspot_limit")]
    pub hotspot_limit: usize,

    /// Number of top changes selected
    #[serde(default = "default_top_change_limit")]
    pub top_change_limit: usize,

    /// Generate narrative sections unless disabled on the command line
    #[serde(default)]
    pub narrative_enabled: bool,

    /// Base revision for pull-request ranges
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    /// Where the documentation book is published, for links in notifications
    pub publish_base_url: Option<String>,

    /// Directories skipped when building the table of contents
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

impl Config {
    /// Load from an explicit file, or from the default location.
    ///
    /// An explicit file must exist. A missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DevLogError::config(format!(
                "Config file not found at: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DevLogError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join("devlog").join("config.toml"))
    }

    /// Write a default configuration file to `path`
    pub fn create_default(path: &Path) -> Result<Self> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(path, toml_string)?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.hotspot_limit == 0 {
            return Err(DevLogError::config("hotspot_limit must be > 0"));
        }

        if self.top_change_limit == 0 {
            return Err(DevLogError::config("top_change_limit must be > 0"));
        }

        if self.utc_offset_hours.abs() > MAX_OFFSET_HOURS {
            return Err(DevLogError::config(format!(
                "utc_offset_hours must be within ±{}",
                MAX_OFFSET_HOURS
            )));
        }

        if self.model.trim().is_empty() {
            return Err(DevLogError::config("model must not be empty"));
        }

        Ok(())
    }

    /// Apply credential overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply credential overrides from `lookup`; empty values are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("ANTHROPIC_AUTH_TOKEN").or_else(|| lookup("ANTHROPIC_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(url) = lookup("DISCORD_WEBHOOK_URL") {
            self.webhook_url = Some(url);
        }

        self
    }

    /// Copy safe to print: secrets keep only their first characters
    pub fn masked(&self) -> Self {
        let mut config = self.clone();
        config.api_key = config.api_key.as_deref().map(mask_secret);
        config.webhook_url = config.webhook_url.as_deref().map(mask_secret);
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_root: default_docs_root(),
            api_key: None,
            model: default_model(),
            api_url: None,
            max_tokens: default_max_tokens(),
            webhook_url: None,
            utc_offset_hours: 0,
            hotspot_limit: default_hotspot_limit(),
            top_change_limit: default_top_change_limit(),
            narrative_enabled: false,
            base_branch: default_base_branch(),
            publish_base_url: None,
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(8).collect();
    format!("{}…", visible)
}

// Serde default functions
fn default_docs_root() -> PathBuf {
    PathBuf::from("Documents")
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_hotspot_limit() -> usize {
    DEFAULT_HOTSPOT_LIMIT
}

fn default_top_change_limit() -> usize {
    DEFAULT_TOP_CHANGES
}

fn default_base_branch() -> String {
    "origin/main".to_string()
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        "_book".to_string(),
        "target".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.docs_root, PathBuf::from("Documents"));
        assert_eq!(config.hotspot_limit, 5);
        assert_eq!(config.top_change_limit, 3);
        assert_eq!(config.base_branch, "origin/main");
        assert!(!config.narrative_enabled);
        assert!(config.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_limits() {
        let mut config = Config::default();
        config.hotspot_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.top_change_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.utc_offset_hours = -15;
        assert!(config.validate().is_err());
        config.utc_offset_hours = 9;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization_uses_defaults() {
        let toml_str = r#"
            docs_root = "docs"
            utc_offset_hours = 9
            narrative_enabled = true
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.docs_root, PathBuf::from("docs"));
        assert_eq!(config.utc_offset_hours, 9);
        assert!(config.narrative_enabled);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.hotspot_limit, 5);
    }

    #[test]
    fn test_config_round_trip_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devlog/config.toml");

        let created = Config::create_default(&path).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(Some(&temp_dir.path().join("absent.toml")));
        assert!(matches!(result, Err(DevLogError::Config(_))));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "hotspot_limit = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        fs::write(&path, "hotspot_limit = [\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(DevLogError::TomlParse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ANTHROPIC_API_KEY", "sk-ant-from-env"),
            ("DISCORD_WEBHOOK_URL", "https://discord.test/webhook"),
        ]);
        let config = Config::default().with_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_key.as_deref(), Some("sk-ant-from-env"));
        assert_eq!(config.webhook_url.as_deref(), Some("https://discord.test/webhook"));
    }

    #[test]
    fn test_auth_token_wins_and_blank_is_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ANTHROPIC_AUTH_TOKEN", "token"),
            ("ANTHROPIC_API_KEY", "key"),
            ("DISCORD_WEBHOOK_URL", "  "),
        ]);
        let mut base = Config::default();
        base.webhook_url = Some("https://from-file".to_string());

        let config = base.with_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_key.as_deref(), Some("token"));
        assert_eq!(config.webhook_url.as_deref(), Some("https://from-file"));
    }

    #[test]
    fn test_masked() {
        let mut config = Config::default();
        config.api_key = Some("sk-ant-api03-secret".to_string());
        let masked = config.masked();
        assert_eq!(masked.api_key.as_deref(), Some("sk-ant-a…"));
        assert!(masked.webhook_url.is_none());
    }
}
