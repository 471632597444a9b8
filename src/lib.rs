//! Wiki-ETL: a bounded crawl-transform-load pipeline
//!
//! This crate crawls a seed wiki article breadth-first to a bounded depth,
//! extracts and validates article content from every page, and loads the
//! result into SQLite staging tables with filtered production views on top.

pub mod config;
pub mod crawler;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for fatal pipeline conditions
///
/// Per-page and load failures never surface here; they are recorded in
/// the [`output::PipelineReport`] instead.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Invalid crawl state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL {0} is not on the crawled site")]
    OffSite(String),

    #[error("URL {0} is not an article path")]
    NotArticle(String),

    #[error("Article URL {0} has an empty title slug")]
    EmptySlug(String),
}

/// Network fetch failures, always recovered per page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} for {url} after {attempts} attempt(s)")]
    HttpStatus {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Request timeout for {url} after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },
}

impl FetchError {
    /// Short machine-readable kind used in report entries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::HttpStatus { .. } => "http-status",
            Self::Timeout { .. } => "timeout",
        }
    }

    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::HttpStatus { url, .. } | Self::Timeout { url, .. } => {
                url
            }
        }
    }
}

/// Extraction verdicts that drop a record or link, always recovered per page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Page {url} has no title")]
    MissingTitle { url: String },

    #[error("Page {url} depth {depth} is outside 0..={max_depth}")]
    DepthOutOfRange {
        url: String,
        depth: u32,
        max_depth: u32,
    },

    #[error("Malformed link on {source_url} to '{href}': {reason}")]
    MalformedLink {
        source_url: String,
        href: String,
        reason: String,
    },
}

impl ValidationError {
    /// Short machine-readable kind used in report entries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingTitle { .. } => "missing-title",
            Self::DepthOutOfRange { .. } => "depth-out-of-range",
            Self::MalformedLink { .. } => "malformed-link",
        }
    }

    /// The page the verdict applies to
    pub fn url(&self) -> &str {
        match self {
            Self::MissingTitle { url } | Self::DepthOutOfRange { url, .. } => url,
            Self::MalformedLink { source_url, .. } => source_url,
        }
    }
}

/// Result type alias for fatal pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::PipelineReport;
pub use pipeline::{run_pipeline, Pipeline};
pub use state::CrawlState;
