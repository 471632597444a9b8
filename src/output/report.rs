//! Run report assembly
//!
//! The report is built once, at the end of a run, from the crawl output and
//! the load outcome. It is a plain value afterwards.

use crate::loader::LoadError;
use crate::{FetchError, ValidationError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Extract,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Extract => "extract",
            Self::Load => "load",
        };
        f.write_str(name)
    }
}

/// One recovered (or, for loads, fatal) failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub stage: Stage,

    /// URL for fetch and extract errors, table or view name for load errors
    pub identifier: String,

    /// Machine-readable error kind, e.g. `http-status` or `missing-title`
    pub kind: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(
        stage: Stage,
        identifier: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            identifier: identifier.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn from_fetch(error: &FetchError) -> Self {
        Self::new(Stage::Fetch, error.url(), error.kind(), error.to_string())
    }

    pub fn from_validation(error: &ValidationError) -> Self {
        Self::new(Stage::Extract, error.url(), error.kind(), error.to_string())
    }

    pub fn from_load(error: &LoadError) -> Self {
        Self::new(Stage::Load, error.target(), error.kind(), error.to_string())
    }

    /// A fetch/extract task that never reported back
    pub fn crashed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Stage::Extract, url, "task-failure", message)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}: {}",
            self.stage, self.kind, self.identifier, self.message
        )
    }
}

/// Raw counts gathered across stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub pages_attempted: usize,
    pub pages_succeeded: usize,
    pub links_discovered: usize,
    pub pages_loaded: usize,
    pub links_loaded: usize,
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,
    pub counts: RunCounts,

    /// Successful pages per minute of wall-clock time
    pub pages_per_minute: f64,

    /// Discovered links per minute of wall-clock time
    pub links_per_minute: f64,

    pub crawl_duration: Duration,
    pub load_duration: Duration,
    pub levels_completed: u32,

    /// Hash of the effective configuration
    pub config_hash: String,
    pub errors: Vec<ErrorEntry>,
}

impl PipelineReport {
    /// True when no stage recorded an error
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when production data was materialized
    pub fn load_succeeded(&self) -> bool {
        !self.errors.iter().any(|e| e.stage == Stage::Load)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn errors_in(&self, stage: Stage) -> impl Iterator<Item = &ErrorEntry> {
        self.errors.iter().filter(move |e| e.stage == stage)
    }
}

/// Builds a report from start/end instants, counts and errors
///
/// Throughput is 0 when no time elapsed. Stage timings, level count and
/// config hash start empty; [`ReportBuilder`] fills them in.
pub fn finalize(
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    counts: RunCounts,
    errors: Vec<ErrorEntry>,
) -> PipelineReport {
    let duration = (finished_at - started_at).to_std().unwrap_or(Duration::ZERO);
    let minutes = duration.as_secs_f64() / 60.0;

    PipelineReport {
        started_at,
        finished_at,
        duration,
        counts,
        pages_per_minute: per_minute(counts.pages_succeeded, minutes),
        links_per_minute: per_minute(counts.links_discovered, minutes),
        crawl_duration: Duration::ZERO,
        load_duration: Duration::ZERO,
        levels_completed: 0,
        config_hash: String::new(),
        errors,
    }
}

fn per_minute(count: usize, minutes: f64) -> f64 {
    if minutes > 0.0 {
        count as f64 / minutes
    } else {
        0.0
    }
}

/// Accumulates stage results, then produces the final report
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    started_at: DateTime<Utc>,
    counts: RunCounts,
    errors: Vec<ErrorEntry>,
    crawl_duration: Duration,
    load_duration: Duration,
    levels_completed: u32,
    config_hash: String,
}

impl ReportBuilder {
    pub fn new(started_at: DateTime<Utc>, config_hash: impl Into<String>) -> Self {
        Self {
            started_at,
            counts: RunCounts::default(),
            errors: Vec::new(),
            crawl_duration: Duration::ZERO,
            load_duration: Duration::ZERO,
            levels_completed: 0,
            config_hash: config_hash.into(),
        }
    }

    pub fn crawl(
        mut self,
        pages_attempted: usize,
        pages_succeeded: usize,
        links_discovered: usize,
        levels_completed: u32,
        duration: Duration,
    ) -> Self {
        self.counts.pages_attempted = pages_attempted;
        self.counts.pages_succeeded = pages_succeeded;
        self.counts.links_discovered = links_discovered;
        self.levels_completed = levels_completed;
        self.crawl_duration = duration;
        self
    }

    pub fn loaded(mut self, pages_loaded: usize, links_loaded: usize, duration: Duration) -> Self {
        self.counts.pages_loaded = pages_loaded;
        self.counts.links_loaded = links_loaded;
        self.load_duration = duration;
        self
    }

    pub fn load_failed(mut self, error: &LoadError, duration: Duration) -> Self {
        self.errors.push(ErrorEntry::from_load(error));
        self.load_duration = duration;
        self
    }

    pub fn errors<I>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = ErrorEntry>,
    {
        self.errors.extend(errors);
        self
    }

    pub fn finish(self, finished_at: DateTime<Utc>) -> PipelineReport {
        let mut report = finalize(self.started_at, finished_at, self.counts, self.errors);
        report.crawl_duration = self.crawl_duration;
        report.load_duration = self.load_duration;
        report.levels_completed = self.levels_completed;
        report.config_hash = self.config_hash;
        report
    }
}
