//! Output module for run reports and summaries
//!
//! This module handles:
//! - Assembling the run report from stage results
//! - Printing a console summary
//! - Writing an optional markdown summary file

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{finalize, ErrorEntry, PipelineReport, ReportBuilder, RunCounts, Stage};
pub use stats::{format_report, print_report};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
