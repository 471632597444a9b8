//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Bounding in-flight requests with a semaphore
//! - Per-request politeness delay
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::Config;
use crate::crawler::retry::{is_retryable_status, RetryPolicy};
use crate::FetchError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::header::LAST_MODIFIED;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Maximum redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page body
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Page body content
    pub body: String,

    /// Parsed `Last-Modified` header, if present and well-formed
    pub last_modified: Option<DateTime<Utc>>,

    /// When the response body finished arriving
    pub fetched_at: DateTime<Utc>,
}

/// Why a single attempt failed, before the retry decision
#[derive(Debug)]
enum AttemptFailure {
    Status(u16),
    Timeout,
    Transport(String),
}

impl AttemptFailure {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Transport(format!("connection failed: {}", error))
        } else {
            Self::Transport(error.to_string())
        }
    }

    /// Connection and protocol failures are final; timeouts are not
    fn is_retryable(&self) -> bool {
        match self {
            Self::Status(status) => is_retryable_status(*status),
            Self::Timeout => true,
            Self::Transport(_) => false,
        }
    }

    fn into_error(self, url: &str, attempts: u32) -> FetchError {
        let url = url.to_string();
        match self {
            Self::Status(status) => FetchError::HttpStatus {
                url,
                status,
                attempts,
            },
            Self::Timeout => FetchError::Timeout { url, attempts },
            Self::Transport(message) => FetchError::Transport { url, message },
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The pipeline configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use wiki_etl::config::Config;
/// use wiki_etl::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.crawler.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Shared, concurrency-bounded page fetcher
///
/// Cloning is cheap; clones share the same client and the same slot pool,
/// so the in-flight bound holds across every task that uses them.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    slots: Arc<Semaphore>,
    request_delay: Duration,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &Config) -> Self {
        let crawler = &config.crawler;
        Self {
            client,
            slots: Arc::new(Semaphore::new(crawler.max_concurrent_requests as usize)),
            request_delay: crawler.request_delay(),
            retry: RetryPolicy::new(crawler.max_retries, crawler.retry_base_delay()),
        }
    }

    /// Number of requests that may start right now
    #[cfg(test)]
    fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Fetches a URL with full error handling and retry logic
    ///
    /// # Request Flow
    ///
    /// 1. Wait for a free slot
    /// 2. Sleep the politeness delay while holding it
    /// 3. Send GET, following up to 10 redirects
    /// 4. On a retryable failure, back off and try again while
    ///    attempts remain
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429 | Retry with backoff |
    /// | HTTP 5xx | Retry with backoff |
    /// | Timeout | Retry with backoff |
    /// | HTTP 404, other 4xx | Immediate failure |
    /// | Connection refused, TLS | Immediate failure |
    ///
    /// The slot is held through backoff waits, so retries count against
    /// the concurrency bound.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let mut attempt = 1;
        loop {
            match self.attempt(url).await {
                Ok(document) => {
                    tracing::debug!("Fetched {} ({} bytes)", url, document.body.len());
                    return Ok(document);
                }
                Err(failure) if failure.is_retryable() && self.retry.allows_retry(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed ({:?}), retrying in {:?}",
                        attempt,
                        self.retry.max_attempts,
                        url,
                        failure,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => {
                    let error = failure.into_error(url, attempt);
                    tracing::warn!("{}", error);
                    return Err(error);
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<FetchedDocument, AttemptFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AttemptFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure::Status(status.as_u16()));
        }

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date);
        if response.url().as_str() != url {
            tracing::debug!("{} redirected to {}", url, response.url());
        }

        let body = response
            .text()
            .await
            .map_err(AttemptFailure::from_reqwest)?;

        Ok(FetchedDocument {
            body,
            last_modified,
            fetched_at: Utc::now(),
        })
    }
}

/// Obsolete HTTP-date layouts still accepted by RFC 9110: RFC 850 and asctime
const OBSOLETE_HTTP_DATE_FORMATS: &[&str] = &["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

/// Parses an HTTP-date header value
///
/// The preferred IMF-fixdate form (`Sun, 06 Nov 1994 08:49:37 GMT`) is read
/// as RFC 2822; the two obsolete forms are read as UTC.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    OBSOLETE_HTTP_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
