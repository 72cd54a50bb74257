//! Configuration file parser for ~/.config/paperfeed/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged, since they are usually typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::feed::fetcher::{DEFAULT_SEARCH_ENDPOINT, MAX_SEARCH_RESULTS};
use crate::feed::{ArxivFeed, DEFAULT_PAGE_SIZE};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Records per page.
    pub page_size: usize,

    /// Minutes a fetched feed is reused before refetching.
    pub cache_ttl_minutes: u64,

    /// Distinct feed URLs kept in the session cache.
    pub cache_capacity: usize,

    /// arXiv query API endpoint.
    pub search_endpoint: String,

    /// Query used when `search` is run without one.
    pub default_query: String,

    /// Result count used when `search` is run without `-n`.
    pub default_max_results: u32,

    /// Feed browsed when neither `--feed` nor `--url` is given.
    pub default_feed: ArxivFeed,

    /// Serve the last good feed instead of fetching on Saturdays and Sundays.
    pub pause_on_weekends: bool,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl_minutes: DEFAULT_TTL.as_secs() / 60,
            cache_capacity: DEFAULT_CAPACITY,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            default_query: "retrieval augmented generation".to_string(),
            default_max_results: 10,
            default_feed: ArxivFeed::default(),
            pause_on_weekends: false,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 9] = [
        "page_size",
        "cache_ttl_minutes",
        "cache_capacity",
        "search_endpoint",
        "default_query",
        "default_max_results",
        "default_feed",
        "pause_on_weekends",
        "user_agent",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            page_size = config.page_size,
            feed = %config.default_feed,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if !(1..=MAX_SEARCH_RESULTS).contains(&self.default_max_results) {
            return Err(ConfigError::Invalid(format!(
                "default_max_results must be between 1 and {MAX_SEARCH_RESULTS}"
            )));
        }
        if url::Url::parse(&self.search_endpoint).is_err() {
            return Err(ConfigError::Invalid(format!(
                "search_endpoint is not a URL: {}",
                self.search_endpoint
            )));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("paperfeed_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.cache_ttl_minutes, 60);
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.search_endpoint, "http://export.arxiv.org/api/query");
        assert_eq!(config.default_query, "retrieval augmented generation");
        assert_eq!(config.default_max_results, 10);
        assert_eq!(config.default_feed, ArxivFeed::Ai);
        assert!(!config.pause_on_weekends);
        assert!(config.user_agent.starts_with("paperfeed/"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/paperfeed_test_nonexistent_config.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "page_size = 25\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.cache_ttl_minutes, 60);
        assert_eq!(config.default_feed, ArxivFeed::Ai);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
page_size = 5
cache_ttl_minutes = 15
cache_capacity = 3
search_endpoint = "https://export.arxiv.org/api/query"
default_query = "diffusion models"
default_max_results = 50
default_feed = "q-bio"
pause_on_weekends = true
user_agent = "lab-browser/2.0"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.cache_ttl(), Duration::from_secs(15 * 60));
        assert_eq!(config.cache_capacity, 3);
        assert_eq!(config.search_endpoint, "https://export.arxiv.org/api/query");
        assert_eq!(config.default_query, "diffusion models");
        assert_eq!(config.default_max_results, 50);
        assert_eq!(config.default_feed, ArxivFeed::QBio);
        assert!(config.pause_on_weekends);
        assert_eq!(config.user_agent, "lab-browser/2.0");
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_feed_name_rejected() {
        assert!(matches!(
            Config::from_toml("default_feed = \"astro-ph\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::from_toml("page_size = 12\ntheme = \"dark\"\n").unwrap();
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(matches!(
            Config::from_toml("page_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("default_max_results = 51"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("search_endpoint = \"nope\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    // SEC-014: File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"#".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }
}
