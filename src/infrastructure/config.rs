//! Configuration infrastructure
//!
//! Settings are layered, lowest priority first:
//! 1. Built-in defaults (see [`defaults`])
//! 2. Optional JSON config file
//! 3. `PRODUCT_CRAWLER_<SECTION>__<KEY>` environment variables
//! 4. Command-line flags (applied by the binary)

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::info;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crawler: CrawlerConfig,
    pub batch: BatchConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Where URLs come from and where rows go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Category listing page to harvest product links from
    pub listing_url: String,

    /// Maximum number of "load more" activations on the listing page
    pub max_load_more: u32,

    /// Read raw product URLs from this file instead of the listing page
    pub urls_file: Option<PathBuf>,

    /// CSV output path
    pub output_path: PathBuf,
}

/// Batch scheduling and worker pool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// URLs per batch (requests allowed per cooldown window)
    pub batch_size: usize,

    /// Pause between batches in seconds
    pub cooldown_seconds: u64,

    /// Maximum simultaneously running fetch tasks
    pub max_concurrent: usize,

    /// Lower bound of the per-task pre-fetch jitter
    pub jitter_min_ms: u64,

    /// Upper bound of the per-task pre-fetch jitter
    pub jitter_max_ms: u64,
}

impl BatchConfig {
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// HTTP client identity, timeout and retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Total attempts per fetch, including the first
    pub max_attempts: u32,

    /// Backoff before retry `n` is `backoff_base_ms * 2^(n-1)`
    pub backoff_base_ms: u64,

    pub accept_language: String,
    pub referer: String,
    pub accept: String,

    /// Pool the client picks its single user agent from
    pub user_agents: Vec<String>,

    pub follow_redirects: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Write JSON lines to the log file instead of plain text
    pub json_format: bool,

    pub console_output: bool,
    pub file_output: bool,

    /// Directory for the log file; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            listing_url: tiki::CATEGORY_HOME_LIVING.to_string(),
            max_load_more: defaults::MAX_LOAD_MORE,
            urls_file: None,
            output_path: PathBuf::from(defaults::OUTPUT_FILE),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::BATCH_SIZE,
            cooldown_seconds: defaults::COOLDOWN_SECONDS,
            max_concurrent: defaults::MAX_CONCURRENT,
            jitter_min_ms: defaults::JITTER_MIN_MS,
            jitter_max_ms: defaults::JITTER_MAX_MS,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_attempts: defaults::MAX_ATTEMPTS,
            backoff_base_ms: defaults::BACKOFF_BASE_MS,
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            referer: tiki::REFERER.to_string(),
            accept: defaults::ACCEPT.to_string(),
            user_agents: defaults::USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            follow_redirects: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
        }
    }
}

/// Settings that would make the run meaningless or hang
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("batch.batch_size must be greater than 0")]
    ZeroBatchSize,

    #[error("batch.max_concurrent must be greater than 0")]
    ZeroConcurrency,

    #[error("batch.jitter_min_ms ({min}) is greater than batch.jitter_max_ms ({max})")]
    InvertedJitter { min: u64, max: u64 },

    #[error("http.request_timeout_seconds must be greater than 0")]
    ZeroTimeout,

    #[error("http.max_attempts must be greater than 0")]
    ZeroAttempts,

    #[error("http.user_agents must contain at least one entry")]
    EmptyUserAgentPool,

    #[error("crawler.listing_url is not a valid URL: {0}")]
    InvalidListingUrl(String),
}

impl AppConfig {
    /// Reject settings the crawler cannot run with
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.batch.batch_size == 0 {
            return Err(ConfigValidationError::ZeroBatchSize);
        }
        if self.batch.max_concurrent == 0 {
            return Err(ConfigValidationError::ZeroConcurrency);
        }
        if self.batch.jitter_min_ms > self.batch.jitter_max_ms {
            return Err(ConfigValidationError::InvertedJitter {
                min: self.batch.jitter_min_ms,
                max: self.batch.jitter_max_ms,
            });
        }
        if self.http.request_timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout);
        }
        if self.http.max_attempts == 0 {
            return Err(ConfigValidationError::ZeroAttempts);
        }
        if self.http.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyUserAgentPool);
        }
        if self.crawler.urls_file.is_none() {
            url::Url::parse(&self.crawler.listing_url)
                .map_err(|e| ConfigValidationError::InvalidListingUrl(e.to_string()))?;
        }
        Ok(())
    }
}

/// File layer behind a loaded configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "Loaded configuration from: {:?}", path),
            Self::Defaults(path) => write!(f, "No configuration file at {:?}, using defaults", path),
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    pub const ENV_PREFIX: &'static str = "PRODUCT_CRAWLER";

    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("product-export-crawler");

        Ok(config_dir)
    }

    /// Manager for the default per-user config file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("config.json");
        Ok(Self { config_path })
    }

    /// Manager for an explicit config file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load defaults, then the config file (if present), then environment overrides.
    pub fn load_config(&self) -> Result<AppConfig> {
        let path = self.config_path.to_string_lossy();

        let settings = config::Config::builder()
            .add_source(config::File::new(&path, config::FileFormat::Json).required(false))
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {:?}", self.config_path))?;

        let app_config: AppConfig = settings
            .try_deserialize()
            .context("Configuration has invalid values")?;

        Ok(app_config)
    }

    /// Where the file layer of the last load came from. Logged by the binary
    /// once the subscriber is installed.
    pub fn config_source(&self) -> ConfigSource {
        if self.config_path.is_file() {
            ConfigSource::File(self.config_path.clone())
        } else {
            ConfigSource::Defaults(self.config_path.clone())
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Tiki.vn endpoints the crawler was built against
pub mod tiki {
    /// "Nhà Cửa - Đời Sống" (home & living) category listing
    pub const CATEGORY_HOME_LIVING: &str = "https://tiki.vn/nha-cua-doi-song/c1883";

    /// Referer sent with every product request
    pub const REFERER: &str = "https://tiki.vn/";
}

/// Default crawling configuration values
pub mod defaults {
    /// The site allows roughly this many requests per cooldown window
    pub const BATCH_SIZE: usize = 240;

    /// Cooldown between batches in seconds
    pub const COOLDOWN_SECONDS: u64 = 31;

    /// Simultaneous product page fetches
    pub const MAX_CONCURRENT: usize = 8;

    pub const JITTER_MIN_MS: u64 = 50;
    pub const JITTER_MAX_MS: u64 = 200;

    /// Default "load more" activations on the listing page
    pub const MAX_LOAD_MORE: u32 = 20;

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const BACKOFF_BASE_MS: u64 = 500;

    pub const OUTPUT_FILE: &str = "tiki_product_crawling.csv";
    pub const LOG_LEVEL: &str = "info";

    pub const ACCEPT_LANGUAGE: &str = "vi-VN,vi;q=0.9,en-US;q=0.8";
    pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

    /// Desktop browser identities; one is picked per client
    pub const USER_AGENTS: &[&str] = &[
        // Chrome - Windows
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.6167.85 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.199 Safari/537.36",
        // Chrome - macOS
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 12_6_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.6045.105 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_2) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.5993.88 Safari/537.36",
        // Chrome - Linux
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.5938.92 Safari/537.36",
        // Firefox
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 13.6; rv:121.0) Gecko/20100101 Firefox/121.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 12.7; rv:120.0) Gecko/20100101 Firefox/120.0",
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:119.0) Gecko/20100101 Firefox/119.0",
        // Edge
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.6167.85 Safari/537.36 Edg/121.0.2277.83",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.199 Safari/537.36 Edg/120.0.2210.145",
        // Safari
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 12_7_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
        // Brave / Opera
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Brave Chrome/119.0.6045.160 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_3_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.5845.97 Safari/537.36 Brave/1.58.127",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.199 Safari/537.36 OPR/96.0.4693.80",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_rate_limit_profile() {
        let config = AppConfig::default();
        assert_eq!(config.batch.batch_size, 240);
        assert_eq!(config.batch.cooldown(), Duration::from_secs(31));
        assert_eq!(config.batch.max_concurrent, 8);
        assert_eq!((config.batch.jitter_min_ms, config.batch.jitter_max_ms), (50, 200));
        assert_eq!(config.http.request_timeout_seconds, 10);
        assert_eq!(config.http.max_attempts, 3);
        assert_eq!(config.http.backoff_base_ms, 500);
        assert_eq!(config.http.user_agents.len(), defaults::USER_AGENTS.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_unusable_settings() {
        let mut config = AppConfig::default();
        config.batch.batch_size = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroBatchSize));

        let mut config = AppConfig::default();
        config.batch.max_concurrent = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroConcurrency));

        let mut config = AppConfig::default();
        config.batch.jitter_min_ms = 300;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvertedJitter { min: 300, max: 200 })
        );

        let mut config = AppConfig::default();
        config.http.user_agents = vec![" ".to_string()];
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyUserAgentPool));

        let mut config = AppConfig::default();
        config.crawler.listing_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidListingUrl(_))
        ));

        config.crawler.urls_file = Some(PathBuf::from("urls.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("absent.json"));
        let config = manager.load_config().unwrap();
        assert_eq!(config.batch, BatchConfig::default());
        assert_eq!(config.http.referer, tiki::REFERER);
        assert_eq!(
            manager.config_source(),
            ConfigSource::Defaults(dir.path().join("absent.json"))
        );
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "batch": { "batch_size": 100, "cooldown_seconds": 5 }, "crawler": { "max_load_more": 3 } }"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(&path).load_config().unwrap();
        assert_eq!(config.batch.batch_size, 100);
        assert_eq!(config.batch.cooldown_seconds, 5);
        assert_eq!(config.batch.max_concurrent, defaults::MAX_CONCURRENT);
        assert_eq!(config.crawler.max_load_more, 3);
        assert_eq!(config.crawler.listing_url, tiki::CATEGORY_HOME_LIVING);
    }

    #[test]
    fn test_config_source_names_the_file_layer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let manager = ConfigManager::with_path(&path);
        assert!(manager.config_source().to_string().contains("using defaults"));

        std::fs::write(&path, "{}").unwrap();
        let source = manager.config_source();
        assert_eq!(source, ConfigSource::File(path));
        assert!(source.to_string().starts_with("Loaded configuration from"));
    }

    #[tokio::test]
    async fn test_saved_config_loads_back_unchanged() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));

        let mut config = AppConfig::default();
        config.batch.batch_size = 60;
        config.logging.level = "debug".to_string();
        config.crawler.urls_file = Some(PathBuf::from("urls.txt"));

        manager.save_config(&config).await.unwrap();
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded, config);
    }
}
