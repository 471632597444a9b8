//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and rate limiting
//! - Page extraction and validation
//! - Frontier management and cycle avoidance
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod retry;

pub use coordinator::{run_crawl, Coordinator, CrawlOutput};
pub use extractor::{clean_text, extract, Extraction, PageContext, MIN_SUMMARY_CHARS};
pub use fetcher::{build_http_client, parse_http_date, FetchedDocument, Fetcher};
pub use frontier::{DiscoveredLink, Frontier, FrontierItem, FrontierLevel};
pub use retry::{is_retryable_status, RetryPolicy};
