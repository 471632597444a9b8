//! Markdown summary generation
//!
//! This module writes a human-readable markdown summary of a run,
//! including counts, timings, and the full error list.

use crate::output::report::{PipelineReport, Stage};
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the report
///
/// # Arguments
///
/// * `report` - The finished run report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &PipelineReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_summary(report: &PipelineReport) -> String {
    let counts = &report.counts;
    let mut md = String::new();

    md.push_str("# Wiki-ETL Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds ({:.2} minutes)\n",
        report.duration.as_secs_f64(),
        report.duration.as_secs_f64() / 60.0
    ));
    let status = if report.is_clean() {
        "clean"
    } else if report.load_succeeded() {
        "completed with errors"
    } else {
        "load failed"
    };
    md.push_str(&format!("- **Status**: {}\n", status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", report.config_hash));

    md.push_str("## Counts\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages attempted | {} |\n", counts.pages_attempted));
    md.push_str(&format!("| Pages extracted | {} |\n", counts.pages_succeeded));
    md.push_str(&format!("| Links discovered | {} |\n", counts.links_discovered));
    md.push_str(&format!("| Pages loaded | {} |\n", counts.pages_loaded));
    md.push_str(&format!("| Links loaded | {} |\n", counts.links_loaded));
    md.push_str(&format!("| Levels completed | {} |\n", report.levels_completed));
    md.push_str(&format!("| Errors | {} |\n\n", report.error_count()));

    md.push_str("## Timing\n\n");
    md.push_str(&format!(
        "- **Crawl**: {:.2}s\n",
        report.crawl_duration.as_secs_f64()
    ));
    md.push_str(&format!(
        "- **Load**: {:.2}s\n",
        report.load_duration.as_secs_f64()
    ));
    md.push_str(&format!(
        "- **Throughput**: {:.1} pages/min, {:.1} links/min\n\n",
        report.pages_per_minute, report.links_per_minute
    ));

    if !report.is_clean() {
        md.push_str("## Errors\n\n");
        for stage in [Stage::Fetch, Stage::Extract, Stage::Load] {
            let entries: Vec<_> = report.errors_in(stage).collect();
            if entries.is_empty() {
                continue;
            }

            md.push_str(&format!("### {} ({})\n\n", stage, entries.len()));
            md.push_str("| Identifier | Kind | Message |\n");
            md.push_str("|------------|------|---------|\n");
            for entry in entries {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    entry.identifier,
                    entry.kind,
                    entry.message.replace('|', "\\|")
                ));
            }
            md.push('\n');
        }
    }

    md
}
