//! CLI argument parsing for concat.
//!
//! The positional arguments are the destination followed by the sources, in
//! the order they are concatenated. Fewer than two positionals is not a clap
//! error: it is reported by [`Config`](crate::config::Config) as a usage error
//! so that the exact usage line and exit status can be controlled.
//!
//! # Examples
//!
//! ```no_run
//! use pdfconcat::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("{} positional arguments", cli.files.len());
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Concatenate PDF files into a single document.
///
/// Pages are appended in argument order. Bookmarks of every source are kept
/// and renumbered, named destinations are resolved, and the interactive
/// form of the last source that has one is carried over.
#[derive(Parser, Debug, Clone)]
#[command(name = "concat")]
#[command(version)]
#[command(about = "Concatenate PDF files into a single document", long_about = None)]
#[command(author)]
#[command(override_usage = "concat [OPTIONS] <DESTFILE> <FILE1> [FILE2 ...]")]
pub struct Cli {
    /// Destination file followed by the PDFs to concatenate (in order)
    ///
    /// Source arguments containing '*', '?' or '[' are expanded as glob
    /// patterns; matches are taken in alphabetical order.
    ///
    /// Examples:
    ///   concat book.pdf cover.pdf chapter*.pdf
    #[arg(value_name = "FILES", num_args = 0..)]
    pub files: Vec<PathBuf>,

    /// Dry run - open every source and show the plan without writing output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - log every processed page
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Never overwrite an existing destination file
    #[arg(long)]
    pub no_clobber: bool,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress content streams (default)
    /// - maximum: Also drop unreferenced objects and renumber
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Do not carry bookmarks over into the output
    #[arg(long)]
    pub no_outlines: bool,

    /// Do not carry interactive forms over into the output
    #[arg(long)]
    pub no_forms: bool,

    /// Print a JSON report of the run on stdout
    #[arg(long)]
    pub json: bool,
}
