//! Configuration management for the cinetop pipeline
//!
//! Handles loading and validating configuration from environment variables
//! and TOML files. Defaults carry the real deployment constants: 6 s request
//! timeout, 4 retries, 1.5-3.0 s inter-request jitter, and a 29 minute proxy
//! validity window (externally sourced proxies have a bounded lifetime of
//! trustworthiness).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on the top-N report size
pub const MAX_TOP: u32 = 21;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fetcher configuration
    pub fetch: FetchConfig,

    /// Proxy pool configuration
    pub proxy: ProxyConfig,

    /// Source endpoints and URL shapes
    pub sources: SourcesConfig,

    /// Ranking configuration
    pub ranking: RankingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum attempts per logical fetch
    pub max_retries: u32,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Lower bound of the pre-attempt jitter sleep, in milliseconds
    pub min_delay_ms: u64,

    /// Upper bound of the pre-attempt jitter sleep, in milliseconds
    pub max_delay_ms: u64,

    /// Global rate limit (requests per second)
    pub rate_limit: u32,

    /// User agent string
    pub user_agent: String,

    /// Bypass the proxy pool and fetch directly
    pub direct: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            timeout_secs: 6,
            min_delay_ms: 1500,
            max_delay_ms: 3000,
            rate_limit: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            direct: false,
        }
    }
}

impl FetchConfig {
    /// Per-attempt timeout as a Duration
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Proxy pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy discovery endpoint; returns whitespace-separated host:port pairs
    pub discovery_url: String,

    /// URL probed through each candidate to decide liveness
    pub validation_url: String,

    /// Per-candidate validation timeout in seconds
    pub validation_timeout_secs: u64,

    /// Pool validity window in seconds; a full refresh is forced past it
    pub max_age_secs: u64,

    /// Discovery attempts per refresh call
    pub refresh_attempts: u32,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            discovery_url: String::from("http://www.freeproxy-list.ru/api/proxy?token=demo"),
            validation_url: String::from("https://www.afisha.ru/msk/schedule_cinema/"),
            validation_timeout_secs: 4,
            max_age_secs: 29 * 60,
            refresh_attempts: 3,
        }
    }
}

impl ProxyConfig {
    /// Validation timeout as a Duration
    #[must_use]
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }

    /// Pool validity window as a Duration
    #[must_use]
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

/// Source endpoints and URL shapes
///
/// The `{id}` placeholder in the templates is substituted with the entry's
/// external identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Primary listing page (today's schedule)
    pub listing_url: String,

    /// Primary per-movie detail page template
    pub movie_url: String,

    /// Primary per-movie venue schedule page template
    pub schedule_url: String,

    /// Secondary source search endpoint; the encoded query is appended
    pub search_url: String,

    /// URL shape marking a direct per-movie page on the secondary source
    pub movie_page_pattern: String,

    /// URL shape marking a search-results page on the secondary source
    pub search_page_pattern: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            listing_url: String::from("https://www.afisha.ru/msk/schedule_cinema/"),
            movie_url: String::from("https://www.afisha.ru/movie/{id}/"),
            schedule_url: String::from("https://www.afisha.ru/msk/schedule_cinema_product/{id}/"),
            search_url: String::from(
                "https://www.kinopoisk.ru/index.php?first=yes&what=film&kp_query=",
            ),
            movie_page_pattern: String::from("kinopoisk.ru/film/"),
            search_page_pattern: String::from("kinopoisk.ru/index.php"),
        }
    }
}

/// Ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Default top-N count when the CLI does not override it
    pub default_top: u32,

    /// Optional minimum-rating floor; entries below it are dropped
    pub min_rating: Option<f64>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_top: 7,
            min_rating: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Optional append-mode log file
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u32>("CINETOP_MAX_RETRIES") {
            config.fetch.max_retries = v;
        }
        if let Some(v) = env_parse::<u64>("CINETOP_TIMEOUT_SECS") {
            config.fetch.timeout_secs = v;
        }
        if let Some(v) = env_parse::<u32>("CINETOP_RATE_LIMIT") {
            config.fetch.rate_limit = v;
        }
        if let Ok(v) = std::env::var("CINETOP_USER_AGENT") {
            config.fetch.user_agent = v;
        }
        if let Ok(v) = std::env::var("CINETOP_PROXY_DISCOVERY_URL") {
            config.proxy.discovery_url = v;
        }
        if let Some(v) = env_parse::<u64>("CINETOP_PROXY_MAX_AGE_SECS") {
            config.proxy.max_age_secs = v;
        }
        if let Ok(v) = std::env::var("CINETOP_LOG_LEVEL") {
            config.logging.level = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.max_retries == 0 {
            anyhow::bail!("max_retries must be greater than 0");
        }

        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than 0");
        }

        if self.fetch.min_delay_ms > self.fetch.max_delay_ms {
            anyhow::bail!("min_delay_ms must not exceed max_delay_ms");
        }

        if self.fetch.rate_limit == 0 {
            anyhow::bail!("rate_limit must be positive");
        }

        if self.ranking.default_top == 0 || self.ranking.default_top > MAX_TOP {
            anyhow::bail!("default_top must be in 1..={MAX_TOP}");
        }

        if !self.sources.movie_url.contains("{id}") || !self.sources.schedule_url.contains("{id}")
        {
            anyhow::bail!("movie_url and schedule_url must contain the {{id}} placeholder");
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
