//! Configuration module for Wiki-ETL
//!
//! This module handles loading, parsing, and validating the run configuration.
//! Every key has a documented default, so a TOML file is optional.
//!
//! # Example
//!
//! ```no_run
//! use wiki_etl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("etl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_EXCLUDED_NAMESPACES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config};
pub use validation::validate;
