//! Wiki-ETL main entry point
//!
//! This is the command-line interface for the wiki crawl-transform-load pipeline.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wiki_etl::config::{compute_config_hash, load_config, validate, Config};
use wiki_etl::output::{generate_markdown_summary, print_report};
use wiki_etl::Pipeline;

/// Wiki-ETL: crawl a wiki article graph and load it into SQLite
///
/// Starting from a seed article, Wiki-ETL follows article links
/// breadth-first to a bounded depth, extracts each page's title, summary,
/// and text, and loads everything into staging tables with filtered
/// production views on top.
#[derive(Parser, Debug)]
#[command(name = "wiki-etl")]
#[command(version)]
#[command(about = "A bounded wiki crawl-transform-load pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (all keys optional)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed article URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Maximum crawl depth (0 = seed only)
    #[arg(long)]
    depth: Option<u32>,

    /// Links followed from each page
    #[arg(long)]
    max_links_per_page: Option<usize>,

    /// Maximum in-flight requests
    #[arg(long)]
    concurrency: Option<u32>,

    /// Delay before each request, in milliseconds
    #[arg(long)]
    request_delay_ms: Option<u64>,

    /// SQLite database path
    #[arg(long, value_name = "PATH")]
    db: Option<String>,

    /// Content length a page must exceed to reach production
    #[arg(long)]
    min_content_length: Option<usize>,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate and print the effective configuration without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies flag overrides on top of file or default configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.crawler.seed_url = url.clone();
        }
        if let Some(depth) = self.depth {
            config.crawler.max_depth = depth;
        }
        if let Some(links) = self.max_links_per_page {
            config.crawler.max_links_per_page = links;
        }
        if let Some(concurrency) = self.concurrency {
            config.crawler.max_concurrent_requests = concurrency;
        }
        if let Some(delay) = self.request_delay_ms {
            config.crawler.request_delay_ms = delay;
        }
        if let Some(db) = &self.db {
            config.output.database_path = db.clone();
        }
        if let Some(min) = self.min_content_length {
            config.output.min_content_length = min;
        }
        if let Some(summary) = &self.summary {
            config.output.summary_path = Some(summary.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let pipeline = Pipeline::new(config).context("failed to set up pipeline")?;
    let report = pipeline.run().await.context("pipeline could not run")?;

    if !cli.quiet {
        print_report(&report);
    }

    if let Some(path) = &pipeline.config().output.summary_path {
        generate_markdown_summary(&report, Path::new(path))
            .with_context(|| format!("failed to write summary to {}", path))?;
        tracing::info!("Summary written to {}", path);
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_etl=info,warn"),
            1 => EnvFilter::new("wiki_etl=debug,info"),
            2 => EnvFilter::new("wiki_etl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let hash = compute_config_hash(config)?;
    let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;

    println!("=== Wiki-ETL Dry Run ===\n");
    println!("{}", rendered);
    println!("Config hash: {}", hash);
    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl from {} to depth {}",
        config.crawler.seed_url, config.crawler.max_depth
    );

    Ok(())
}
