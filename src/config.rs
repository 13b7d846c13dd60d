use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::query::DEFAULT_DEBOUNCE;
use crate::scheduler::DEFAULT_REFRESH_INTERVAL;

/// Longest accepted refresh interval: one week, in minutes.
pub const MAX_REFRESH_INTERVAL: u64 = 7 * 24 * 60;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the news backend; the feed is served from `/api/news` below it
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Refresh interval in minutes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Idle time before search input is applied, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_secs() / 60
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_storage_url")]
    pub url: String,
    /// Prefix for every persisted key
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_storage_url() -> String {
    "sqlite:newsdeck.db?mode=rwc".to_string()
}

fn default_namespace() -> String {
    "newsdeck".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: default_storage_url(),
            namespace: default_namespace(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            refresh_interval: default_refresh_interval(),
            debounce_ms: default_debounce_ms(),
            request_timeout: default_request_timeout(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.refresh_interval == 0 {
            anyhow::bail!("refresh_interval must be at least one minute");
        }
        if self.refresh_interval > MAX_REFRESH_INTERVAL {
            anyhow::bail!(
                "refresh_interval must be at most {} minutes",
                MAX_REFRESH_INTERVAL
            );
        }
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }
        Ok(())
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.saturating_mul(60))
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_refresh_interval() {
        assert_eq!(default_refresh_interval(), 5);
        assert_eq!(Config::default().refresh_period(), Duration::from_secs(300));
    }

    #[test]
    fn test_defaults_match_component_constants() {
        let config = Config::default();
        assert_eq!(config.refresh_period(), DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.debounce_delay(), DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            api_base_url = "https://news.example.com"
            refresh_interval = 10
            debounce_ms = 400

            [storage]
            url = "sqlite::memory:"
            namespace = "corriere"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.api_base_url, "https://news.example.com");
        assert_eq!(config.refresh_interval, 10);
        assert_eq!(config.debounce_delay(), Duration::from_millis(400));
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.storage.url, "sqlite::memory:");
        assert_eq!(config.storage.namespace, "corriere");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.storage.namespace, "newsdeck");
    }

    #[test]
    fn test_partial_storage_section() {
        let content = r#"
            [storage]
            namespace = "other"
        "#;

        let config = Config::from_str(content).unwrap();
        assert_eq!(config.storage.url, "sqlite:newsdeck.db?mode=rwc");
        assert_eq!(config.storage.namespace, "other");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let result = Config::from_str("refresh_interval = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_huge_refresh_interval_rejected() {
        assert!(Config::from_str("refresh_interval = 18446744073709551615").is_err());
        assert!(Config::from_str("refresh_interval = 10081").is_err());

        let config = Config::from_str("refresh_interval = 10080").unwrap();
        assert_eq!(config.refresh_period(), Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn test_refresh_period_saturates() {
        let config = Config {
            refresh_interval: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.refresh_period(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_blank_base_url_rejected() {
        let result = Config::from_str("api_base_url = \"  \"");
        assert!(result.is_err());
    }
}
