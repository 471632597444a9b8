//! Crawler coordinator - level-by-level crawl orchestration
//!
//! This module contains the main crawl loop, which:
//! - Seeds the frontier and drives the crawl state machine
//! - Fans each level out to concurrent fetch/extract tasks
//! - Fans results back in, in frontier order
//! - Builds the next level from the capped outbound links

use crate::config::Config;
use crate::crawler::extractor::{extract, Extraction, PageContext};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{DiscoveredLink, Frontier, FrontierItem, FrontierLevel};
use crate::output::ErrorEntry;
use crate::state::CrawlState;
use crate::storage::{LinkEdge, PageRecord};
use crate::url::NamespaceFilter;
use crate::{EtlError, FetchError, UrlError, ValidationError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Everything a crawl produced, retained in memory for the load phase
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    pub records: Vec<PageRecord>,
    pub edges: Vec<LinkEdge>,
    pub errors: Vec<ErrorEntry>,

    /// URLs handed to the fetcher across all levels
    pub pages_attempted: usize,
    pub levels_completed: u32,

    /// Start of the run, used as the report's start time
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl CrawlOutput {
    pub fn pages_succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn links_discovered(&self) -> usize {
        self.edges.len()
    }
}

/// Result of processing one frontier item
#[derive(Debug)]
enum PageOutcome {
    Extracted(Extraction),
    FetchFailed(FetchError),
    Invalid(ValidationError),
    Crashed { url: String, message: String },
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    filter: Arc<NamespaceFilter>,
    frontier: Frontier,
    state: CrawlState,
}

impl Coordinator {
    /// Creates a coordinator with its own HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - The validated pipeline configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(EtlError)` - Client or seed URL setup failed
    pub fn new(config: Arc<Config>) -> Result<Self, EtlError> {
        let fetcher = Fetcher::new(&config)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(config: Arc<Config>, fetcher: Fetcher) -> Result<Self, EtlError> {
        let site = Url::parse(&config.crawler.seed_url)
            .map_err(|e| UrlError::Parse(format!("{}: {}", config.crawler.seed_url, e)))?;
        let filter = NamespaceFilter::new(config.crawler.excluded_namespaces.iter().cloned());

        Ok(Self {
            frontier: Frontier::new(site, filter.clone()),
            filter: Arc::new(filter),
            fetcher,
            config,
            state: CrawlState::Idle,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    fn advance(&mut self, next: CrawlState) -> Result<(), EtlError> {
        self.state = self.state.transition(next)?;
        tracing::debug!("Crawl state: {}", self.state);
        Ok(())
    }

    /// Runs the crawl to completion
    ///
    /// Per-page failures are captured in [`CrawlOutput::errors`]; only setup
    /// problems and illegal state transitions return `Err`.
    ///
    /// # Level Loop
    ///
    /// 1. `LevelInFlight(d)`: fetch and extract every item concurrently
    /// 2. `LevelComplete(d)`: merge results in frontier order
    /// 3. Stop at `max_depth` or when no new URLs were discovered,
    ///    otherwise admit the next level and repeat
    pub async fn run(mut self) -> Result<CrawlOutput, EtlError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let crawler = &self.config.crawler;
        let max_depth = crawler.max_depth;
        let max_links = crawler.max_links_per_page;

        tracing::info!(
            "Starting crawl from {} (max depth {}, {} concurrent)",
            crawler.seed_url,
            max_depth,
            crawler.max_concurrent_requests
        );

        let mut level = self.frontier.seed(&self.config.crawler.seed_url)?;

        let mut records = Vec::new();
        let mut edges = Vec::new();
        let mut errors = Vec::new();
        let mut pages_attempted = 0;
        let mut levels_completed = 0;

        loop {
            let depth = level.depth;
            self.advance(CrawlState::LevelInFlight(depth))?;
            tracing::info!("Depth {}: crawling {} pages", depth, level.len());

            let outcomes = self.run_level(&level).await;
            self.advance(CrawlState::LevelComplete(depth))?;
            pages_attempted += level.len();
            levels_completed += 1;

            let mut discovered = Vec::new();
            let mut succeeded = 0;

            for outcome in outcomes {
                match outcome {
                    PageOutcome::Extracted(extraction) => {
                        succeeded += 1;
                        errors.extend(extraction.rejected_links.iter().map(ErrorEntry::from_validation));

                        if depth < max_depth {
                            discovered.extend(extraction.links.iter().take(max_links).map(|link| {
                                DiscoveredLink {
                                    target: link.target_url.clone(),
                                    parent_url: link.source_url.clone(),
                                }
                            }));
                        }

                        records.push(extraction.record);
                        edges.extend(extraction.links);
                    }
                    PageOutcome::FetchFailed(error) => errors.push(ErrorEntry::from_fetch(&error)),
                    PageOutcome::Invalid(error) => errors.push(ErrorEntry::from_validation(&error)),
                    PageOutcome::Crashed { url, message } => {
                        tracing::error!("Task for {} did not complete: {}", url, message);
                        errors.push(ErrorEntry::crashed(url, message));
                    }
                }
            }

            tracing::info!(
                "Depth {} done: {}/{} pages extracted, {} candidate links",
                depth,
                succeeded,
                level.len(),
                discovered.len()
            );

            if depth >= max_depth {
                break;
            }

            let next = self.frontier.next_level(depth + 1, discovered);
            if next.is_empty() {
                tracing::info!("No new pages discovered at depth {}, stopping", depth + 1);
                break;
            }
            level = next;
        }

        self.advance(CrawlState::Finished)?;

        let duration = start.elapsed();
        tracing::info!(
            "Crawl finished: {} pages ({} URLs admitted), {} links, {} errors in {:.2}s",
            records.len(),
            self.frontier.visited_count(),
            edges.len(),
            errors.len(),
            duration.as_secs_f64()
        );

        Ok(CrawlOutput {
            records,
            edges,
            errors,
            pages_attempted,
            levels_completed,
            started_at,
            duration,
        })
    }

    /// Processes every item of a level concurrently
    ///
    /// Outcomes are returned in frontier order regardless of completion order.
    async fn run_level(&self, level: &FrontierLevel) -> Vec<PageOutcome> {
        let mut tasks = JoinSet::new();

        for (index, item) in level.items.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let filter = Arc::clone(&self.filter);
            let item = item.clone();
            let depth = level.depth;
            let max_depth = self.config.crawler.max_depth;

            tasks.spawn(async move {
                let outcome = process_page(fetcher, filter, item, depth, max_depth).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<PageOutcome>> = level.items.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!("Crawl task failed: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(&level.items)
            .map(|(slot, item)| {
                slot.unwrap_or_else(|| PageOutcome::Crashed {
                    url: item.url.to_string(),
                    message: "task aborted before reporting".to_string(),
                })
            })
            .collect()
    }
}

/// Fetches one page, then extracts it on the blocking pool
async fn process_page(
    fetcher: Fetcher,
    filter: Arc<NamespaceFilter>,
    item: FrontierItem,
    depth: u32,
    max_depth: u32,
) -> PageOutcome {
    tracing::debug!("Fetching {} (depth {})", item.url, depth);

    let document = match fetcher.fetch(item.url.as_str()).await {
        Ok(document) => document,
        Err(e) => return PageOutcome::FetchFailed(e),
    };

    let url = item.url.to_string();
    let extracted = tokio::task::spawn_blocking(move || {
        let ctx = PageContext {
            url: &item.url,
            depth,
            max_depth,
            parent_url: item.parent_url.as_deref(),
        };
        extract(&document, &ctx, &filter)
    })
    .await;

    match extracted {
        Ok(Ok(extraction)) => PageOutcome::Extracted(extraction),
        Ok(Err(verdict)) => {
            tracing::warn!("Dropping {}: {}", url, verdict);
            PageOutcome::Invalid(verdict)
        }
        Err(e) => PageOutcome::Crashed {
            url,
            message: e.to_string(),
        },
    }
}

/// Runs a crawl with the given configuration
pub async fn run_crawl(config: Arc<Config>) -> Result<CrawlOutput, EtlError> {
    Coordinator::new(config)?.run().await
}
