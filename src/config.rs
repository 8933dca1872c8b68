//! Configuration module for concat.
//!
//! This module transforms CLI arguments into a validated configuration that
//! drives the concatenation. It handles:
//! - The destination/sources split of the positional arguments
//! - Glob expansion of source patterns
//! - Validation of argument combinations

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cli::Cli;
use crate::error::{ConcatError, Result};
use crate::utils;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as they were read.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress, drop unreferenced objects and renumber what is left.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = ConcatError;
    /// Parse compression level from string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation: "none", "standard", or "maximum"
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(ConcatError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Source files, in concatenation order, after glob expansion.
    pub inputs: Vec<PathBuf>,

    /// Destination file.
    pub output: PathBuf,

    /// Open every source but do not write the destination.
    pub dry_run: bool,

    /// Log every processed page.
    pub verbose: bool,

    /// Suppress all non-error output.
    pub quiet: bool,

    /// Refuse to overwrite an existing destination.
    pub no_clobber: bool,

    /// Compression applied to the output.
    pub compression: CompressionLevel,

    /// Carry bookmarks into the output.
    pub outlines: bool,

    /// Carry interactive forms into the output.
    pub forms: bool,

    /// Print a machine-readable report instead of progress output.
    pub json: bool,
}

impl Config {
    /// Build a configuration for `output` and `inputs` with default options.
    pub fn new(output: impl Into<PathBuf>, inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            output: output.into(),
            dry_run: false,
            verbose: false,
            quiet: false,
            no_clobber: false,
            compression: CompressionLevel::default(),
            outlines: true,
            forms: true,
            json: false,
        }
    }

    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - The destination is also one of the sources
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(ConcatError::Usage);
        }

        if self.verbose && self.quiet {
            return Err(ConcatError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if let Some(input) = self.inputs.iter().find(|input| same_file(input, &self.output)) {
            return Err(ConcatError::invalid_config(format!(
                "Output file cannot be the same as an input file: {}",
                input.display()
            )));
        }

        Ok(())
    }

    /// Check if progress output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Default log filter directive for this run.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

impl TryFrom<&Cli> for Config {
    type Error = ConcatError;

    /// Split the positionals into destination and sources, expand source
    /// patterns and validate the result.
    ///
    /// The argument count is checked before anything touches the file
    /// system.
    fn try_from(cli: &Cli) -> Result<Self> {
        let [output, sources @ ..] = cli.files.as_slice() else {
            return Err(ConcatError::Usage);
        };
        if sources.is_empty() {
            return Err(ConcatError::Usage);
        }

        let compression = CompressionLevel::from_str(&cli.compression)?;
        let inputs = utils::expand_input_patterns(sources)?;

        let config = Self {
            inputs,
            output: output.clone(),
            dry_run: cli.dry_run,
            verbose: cli.verbose,
            quiet: cli.quiet,
            no_clobber: cli.no_clobber,
            compression,
            outlines: !cli.no_outlines,
            forms: !cli.no_forms,
            json: cli.json,
        };
        config.validate()?;

        Ok(config)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
