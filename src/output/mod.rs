//! User-facing output for concat.
//!
//! This module handles:
//! - Formatted status messages
//! - Per-source progress lines
//! - The end-of-run summary
//!
//! # Examples
//!
//! ```no_run
//! use pdfconcat::output::OutputFormatter;
//! use pdfconcat::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Concatenating 2 PDF files...");
//! formatter.success("Created book.pdf");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::concat::ConcatReport;
use crate::utils::format_file_size;

/// Display the outcome of a run.
///
/// # Arguments
///
/// * `formatter` - Output formatter to use
/// * `report` - Report returned by the concatenation
pub fn display_report(formatter: &OutputFormatter, report: &ConcatReport) {
    let form_sources = report.files.iter().filter(|file| file.has_form).count();
    if form_sources > 1
        && formatter.should_print()
        && let Some(kept) = &report.form_source
    {
        formatter.warning(&format!(
            "{form_sources} sources carry a form; only the one from {} is kept",
            kept.display()
        ));
    }

    for line in summary_lines(report) {
        formatter.detail("summary", &line);
    }

    if report.dry_run {
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", report.output.display()));
        formatter.info("  Run without --dry-run to create the concatenated PDF");
        return;
    }

    formatter.success(&format!(
        "Created {} ({} pages, {}) in {:.2}s",
        report.output.display(),
        report.total_pages,
        format_file_size(report.output_size),
        report.elapsed_ms as f64 / 1000.0
    ));
}

fn summary_lines(report: &ConcatReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} file(s), {} pages, {} bookmark(s)",
        report.files.len(),
        report.total_pages,
        report.bookmarks
    )];
    if let Some(form_source) = &report.form_source {
        lines.push(format!("form taken from {}", form_source.display()));
    }
    let resolved: usize = report.files.iter().map(|file| file.named_destinations).sum();
    if resolved > 0 {
        lines.push(format!("{resolved} named destination(s) resolved"));
    }
    lines
}
