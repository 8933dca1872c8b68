//! Error types for pdfconcat.
//!
//! Every failure of a concatenation run is described by [`ConcatError`].
//! Errors carry the file (and page, where relevant) that caused them so the
//! message printed by the binary is enough to diagnose the problem.
//!
//! # Error Categories
//!
//! - **Usage errors**: too few arguments, conflicting options
//! - **Input errors**: missing, unreadable, encrypted or malformed sources
//! - **Output errors**: the destination cannot be created or written
//! - **Copy errors**: a page, form or outline fails to transfer

use std::io;
use std::path::PathBuf;

/// Message printed when the command line does not name a destination and at
/// least one source.
pub const USAGE: &str = "arguments: destfile file1 [file2 ...]";

/// Result type alias for pdfconcat operations.
pub type Result<T> = std::result::Result<T, ConcatError>;

/// Main error type for pdfconcat operations.
#[derive(Debug, thiserror::Error)]
pub enum ConcatError {
    /// Fewer than two arguments were supplied.
    #[error("arguments: destfile file1 [file2 ...]")]
    Usage,

    /// The options given cannot be combined.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// A source file does not exist.
    #[error("File not found: {}", path.display())]
    InputNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A source path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// A source file could not be opened as a PDF document.
    #[error("Failed to open PDF: {}\n  Reason: {reason}", path.display())]
    InputOpen {
        /// Path of the source.
        path: PathBuf,
        /// Why the document could not be opened.
        reason: String,
    },

    /// A source file is encrypted; there is no security handler.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedInput {
        /// Path of the encrypted source.
        path: PathBuf,
    },

    /// The destination exists and overwriting was refused.
    #[error(
        "Output file already exists: {}\n  \
         Remove --no-clobber to overwrite it or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Destination path.
        path: PathBuf,
    },

    /// The destination could not be created or written.
    #[error("Failed to write output file: {}\n  Reason: {source}", path.display())]
    OutputWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A page could not be imported into the output.
    #[error("Failed to import page {page} of {}\n  Reason: {reason}", path.display())]
    PageImport {
        /// Source file.
        path: PathBuf,
        /// 1-based page number in the source.
        page: u32,
        /// Why the import failed.
        reason: String,
    },

    /// The interactive form of a source could not be copied.
    #[error("Failed to copy form from: {}\n  Reason: {reason}", path.display())]
    FormCopy {
        /// Source file.
        path: PathBuf,
        /// Why the copy failed.
        reason: String,
    },

    /// Bookmarks could not be read from a source or attached to the output.
    #[error("Failed to process bookmarks for: {}\n  Reason: {reason}", path.display())]
    Outline {
        /// File whose outline was being processed.
        path: PathBuf,
        /// Details about the failure.
        reason: String,
    },

    /// Error reported by the PDF library.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConcatError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an InputNotFound error.
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: impl Into<PathBuf>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Create an InputOpen error.
    pub fn input_open(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InputOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an EncryptedInput error.
    pub fn encrypted_input(path: impl Into<PathBuf>) -> Self {
        Self::EncryptedInput { path: path.into() }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: impl Into<PathBuf>) -> Self {
        Self::OutputExists { path: path.into() }
    }

    /// Create an OutputWrite error.
    pub fn output_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a PageImport error.
    pub fn page_import(path: impl Into<PathBuf>, page: u32, reason: impl Into<String>) -> Self {
        Self::PageImport {
            path: path.into(),
            page,
            reason: reason.into(),
        }
    }

    /// Create a FormCopy error.
    pub fn form_copy(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FormCopy {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Outline error.
    pub fn outline(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Outline {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage => 1,
            Self::InvalidConfig { .. } => 1,
            Self::InputNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::InputOpen { .. } => 3,
            Self::EncryptedInput { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::OutputWrite { .. } => 5,
            Self::PageImport { .. } => 6,
            Self::FormCopy { .. } => 6,
            Self::Outline { .. } => 6,
            Self::Pdf(_) => 6,
            Self::Io(_) => 5,
        }
    }
}
