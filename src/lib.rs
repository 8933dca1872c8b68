//! Concatenate PDF files into a single document.
//!
//! Pages are appended in the order the sources are given. Bookmarks of every
//! source are carried over with their page targets renumbered, named
//! destinations are resolved to direct page references, and the interactive
//! form of the last source that has one ends up in the output.
//!
//! The concatenation itself ([`concat::Concatenator`]) is written against the
//! [`engine`] traits; [`io::LopdfEngine`] implements them on top of `lopdf`.

pub mod cli;
pub mod concat;
pub mod config;
pub mod engine;
mod error;
pub mod io;
pub mod outline;
pub mod output;
pub mod telemetry;
pub(crate) mod utils;

pub use error::*;

pub use crate::concat::{ConcatOptions, ConcatReport, Concatenator, FileSummary};
pub use crate::config::{CompressionLevel, Config};

use crate::io::{LopdfEngine, WriteOptions};
use crate::output::OutputFormatter;

/// Run a concatenation described by `config`.
///
/// Progress is printed according to the quiet/verbose/json settings of
/// `config`; the returned report describes what was (or, for a dry run,
/// would be) written.
///
/// # Errors
///
/// Returns [`ConcatError::OutputExists`] when `no_clobber` is set and the
/// destination exists, otherwise the first error of the run.
pub fn run(config: &Config) -> Result<ConcatReport> {
    if config.no_clobber && config.output.try_exists()? {
        return Err(ConcatError::output_exists(&config.output));
    }

    let formatter = OutputFormatter::from_config(config);
    let engine = LopdfEngine::new(WriteOptions {
        compression: config.compression,
        ..WriteOptions::default()
    });
    let mut concatenator = Concatenator::new(engine)
        .with_options(ConcatOptions {
            outlines: config.outlines,
            forms: config.forms,
        })
        .with_formatter(formatter.clone());

    if config.dry_run {
        formatter.section("DRY RUN MODE - No files will be created");
    }
    formatter.info(&format!("Concatenating {} PDF files...", config.inputs().len()));

    let report = if config.dry_run {
        concatenator.plan(&config.output, config.inputs())?
    } else {
        concatenator.concatenate(&config.output, config.inputs())?
    };

    output::display_report(&formatter, &report);
    Ok(report)
}
