use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Namespace prefixes of administrative and meta pages that are never followed
pub const DEFAULT_EXCLUDED_NAMESPACES: &[&str] = &[
    "Wikipedia:",
    "Help:",
    "File:",
    "Template:",
    "Category:",
    "Special:",
    "Talk:",
    "Portal:",
    "User:",
    "Draft:",
    "Media:",
];

/// Main configuration structure for Wiki-ETL
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Article the crawl starts from (depth 0)
    pub seed_url: String,

    /// Maximum depth to crawl from the seed
    pub max_depth: u32,

    /// Maximum number of outbound links followed per page
    pub max_links_per_page: usize,

    /// Maximum number of fetches in flight at once
    pub max_concurrent_requests: u32,

    /// Delay before each request, per concurrency slot (milliseconds)
    pub request_delay_ms: u64,

    /// Total attempts per URL for retryable failures
    pub max_retries: u32,

    /// First backoff wait; doubles on every further retry (milliseconds)
    pub retry_base_delay_ms: u64,

    /// Timeout for a single request attempt (seconds)
    pub request_timeout_secs: u64,

    /// Namespace prefixes never admitted to the frontier
    pub excluded_namespaces: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: "https://en.wikipedia.org/wiki/Toronto".to_string(),
            max_depth: 2,
            max_links_per_page: 25,
            max_concurrent_requests: 10,
            request_delay_ms: 500,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            request_timeout_secs: 30,
            excluded_namespaces: DEFAULT_EXCLUDED_NAMESPACES
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
        }
    }
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "WikiETL".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/wiki-etl/wiki-etl".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Production pages must have content strictly longer than this
    pub min_content_length: usize,

    /// Optional path for a markdown run summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "pipeline.db".to_string(),
            min_content_length: 50,
            summary_path: None,
        }
    }
}
