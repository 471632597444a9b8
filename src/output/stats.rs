//! Console summary of a pipeline run

use crate::output::report::PipelineReport;

/// Errors listed individually before the rest are summarized
pub const ERRORS_SHOWN: usize = 5;

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &PipelineReport) {
    print!("{}", format_report(report));
}

/// Formats the report the way [`print_report`] shows it
pub fn format_report(report: &PipelineReport) -> String {
    let counts = &report.counts;
    let mut out = String::new();

    out.push_str("=== Pipeline Report ===\n\n");

    out.push_str("Crawl:\n");
    out.push_str(&format!("  Pages attempted: {}\n", counts.pages_attempted));
    out.push_str(&format!("  Pages extracted: {}\n", counts.pages_succeeded));
    out.push_str(&format!("  Links discovered: {}\n", counts.links_discovered));
    out.push_str(&format!("  Levels completed: {}\n", report.levels_completed));
    out.push_str(&format!(
        "  Crawl time: {:.2}s\n\n",
        report.crawl_duration.as_secs_f64()
    ));

    out.push_str("Load:\n");
    out.push_str(&format!("  Pages loaded: {}\n", counts.pages_loaded));
    out.push_str(&format!("  Links loaded: {}\n", counts.links_loaded));
    out.push_str(&format!(
        "  Load time: {:.2}s\n\n",
        report.load_duration.as_secs_f64()
    ));

    out.push_str(&format!(
        "Throughput: {:.1} pages/min, {:.1} links/min over {:.2}s\n",
        report.pages_per_minute,
        report.links_per_minute,
        report.duration.as_secs_f64()
    ));
    out.push_str(&format!("Config hash: {}\n", report.config_hash));

    if report.is_clean() {
        out.push_str("\nNo errors.\n");
        return out;
    }

    out.push_str(&format!("\nErrors ({}):\n", report.error_count()));
    for entry in report.errors.iter().take(ERRORS_SHOWN) {
        out.push_str(&format!("  - {}\n", entry));
    }
    if report.error_count() > ERRORS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more\n",
            report.error_count() - ERRORS_SHOWN
        ));
    }

    out
}
