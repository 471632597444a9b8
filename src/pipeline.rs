//! End-to-end pipeline: crawl, load, report
//!
//! The crawl output is kept by the caller, so the load phase can be retried
//! on its own after a [`LoadError`].

use crate::config::{compute_config_hash, validate, Config};
use crate::crawler::{Coordinator, CrawlOutput};
use crate::loader::{LoadError, LoadResult, Loader};
use crate::output::{PipelineReport, ReportBuilder};
use crate::storage::{SqliteStorage, Storage};
use crate::EtlError;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One configured pipeline
pub struct Pipeline {
    config: Arc<Config>,
    config_hash: String,
}

impl Pipeline {
    /// Validates the configuration and fixes it for the run
    pub fn new(config: Config) -> Result<Self, EtlError> {
        validate(&config)?;
        let config_hash = compute_config_hash(&config)?;

        Ok(Self {
            config: Arc::new(config),
            config_hash,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Runs the crawl phase only
    pub async fn crawl(&self) -> Result<CrawlOutput, EtlError> {
        Coordinator::new(Arc::clone(&self.config))?.run().await
    }

    /// Loads crawl output into the configured SQLite database
    ///
    /// Can be called again with the same output after a failure.
    pub fn load(&self, output: &CrawlOutput) -> Result<LoadResult, LoadError> {
        let path = Path::new(&self.config.output.database_path);
        let mut storage = SqliteStorage::new(path).map_err(|e| LoadError::WriteFailure {
            target: self.config.output.database_path.clone(),
            source: e,
        })?;
        self.load_into(&mut storage, output)
    }

    /// Loads crawl output through any storage backend
    pub fn load_into<S: Storage + ?Sized>(
        &self,
        storage: &mut S,
        output: &CrawlOutput,
    ) -> Result<LoadResult, LoadError> {
        Loader::new(storage, self.config.output.min_content_length)
            .load(&output.records, &output.edges)
    }

    /// Runs crawl then load and reports on both
    ///
    /// Per-page and load failures land in the report; `Err` means the run
    /// could not start (client setup, unusable seed).
    pub async fn run(&self) -> Result<PipelineReport, EtlError> {
        tracing::info!("Pipeline starting (config hash {})", self.config_hash);

        let output = self.crawl().await?;

        let load_start = Instant::now();
        let loaded = self.load(&output);
        let load_duration = load_start.elapsed();

        let report = self.report(&output, &loaded, load_duration, Utc::now());

        tracing::info!(
            "Pipeline finished: {} pages loaded, {} errors",
            report.counts.pages_loaded,
            report.error_count()
        );
        Ok(report)
    }

    /// Builds the report for a crawl and its load outcome
    ///
    /// The run is timed from the start of the crawl to `finished_at`.
    pub fn report(
        &self,
        output: &CrawlOutput,
        loaded: &Result<LoadResult, LoadError>,
        load_duration: Duration,
        finished_at: DateTime<Utc>,
    ) -> PipelineReport {
        let builder = ReportBuilder::new(output.started_at, self.config_hash.clone())
            .crawl(
                output.pages_attempted,
                output.pages_succeeded(),
                output.links_discovered(),
                output.levels_completed,
                output.duration,
            )
            .errors(output.errors.iter().cloned());

        let builder = match loaded {
            Ok(result) => builder.loaded(result.pages_loaded, result.links_loaded, load_duration),
            Err(e) => {
                tracing::error!("Load failed: {}", e);
                builder.load_failed(e, load_duration)
            }
        };

        builder.finish(finished_at)
    }
}

/// Runs the full pipeline with the given configuration
pub async fn run_pipeline(config: Config) -> Result<PipelineReport, EtlError> {
    Pipeline::new(config)?.run().await
}
