//! Error types for pagewielder.
//!
//! Every failure aborts the whole run. Errors are grouped so callers (and
//! scripts driving the CLI) can tell a bad range expression from a bad file:
//!
//! - **Parse errors**: malformed range or operation syntax
//! - **Out-of-range errors**: a page bound that does not exist in its document
//! - **Plan errors**: a plan that would produce nothing
//! - **I/O errors**: missing inputs, unreadable PDFs, failed writes
//! - **Execution errors**: a page that cannot be copied into the output

use std::io;
use std::path::PathBuf;

use crate::engine::EngineState;

/// Result type alias for pagewielder operations.
pub type Result<T> = std::result::Result<T, PageWielderError>;

/// Main error type for pagewielder operations.
#[derive(Debug, thiserror::Error)]
pub enum PageWielderError {
    /// A range or operation spec token could not be parsed.
    #[error("Invalid page specification '{token}'\n  Reason: {reason}")]
    Parse {
        /// The offending token.
        token: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A page bound resolved outside of its document.
    #[error(
        "Page range '{token}' is out of range for PDF: {}\n  \
         PDF has {page_count} page(s). Page numbers must be between 1 and {page_count}",
        .path.display()
    )]
    OutOfRange {
        /// Document the range was resolved against.
        path: PathBuf,
        /// The offending range token.
        token: String,
        /// Page count of the document.
        page_count: usize,
    },

    /// The plan is empty or contradictory.
    #[error("Invalid page plan: {reason}")]
    Plan {
        /// Description of the problem.
        reason: String,
    },

    /// A page could not be copied into the output document.
    #[error("Failed to assemble output: {reason}")]
    Execution {
        /// Description of the failure.
        reason: String,
    },

    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Failed to load a PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to read a JSON spec file.
    #[error("Failed to read spec file: {}\n  Reason: {source}", .path.display())]
    FailedToReadSpecFile {
        /// Path to the spec file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration or argument combination.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong.
        message: String,
    },

    /// The engine was driven out of order.
    #[error("Engine cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// State the engine was in.
        from: EngineState,
        /// State that was requested.
        to: EngineState,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<lopdf::Error> for PageWielderError {
    fn from(err: lopdf::Error) -> Self {
        Self::Execution {
            reason: err.to_string(),
        }
    }
}

impl PageWielderError {
    /// Create a Parse error.
    pub fn parse(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create an OutOfRange error.
    pub fn out_of_range(path: PathBuf, token: impl Into<String>, page_count: usize) -> Self {
        Self::OutOfRange {
            path,
            token: token.into(),
            page_count,
        }
    }

    /// Create a Plan error.
    pub fn plan(reason: impl Into<String>) -> Self {
        Self::Plan {
            reason: reason.into(),
        }
    }

    /// Create an Execution error.
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for errors caused by what the user asked for rather than by
    /// the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::OutOfRange { .. }
                | Self::Plan { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig { .. } => 1,
            Self::InvalidTransition { .. } => 1,
            Self::Parse { .. } => 2,
            Self::OutOfRange { .. } => 3,
            Self::Plan { .. } => 4,
            Self::FileNotFound { .. } => 5,
            Self::NotAFile { .. } => 5,
            Self::FailedToLoadPdf { .. } => 5,
            Self::FailedToReadSpecFile { .. } => 5,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::OutputExists { .. } => 6,
            Self::Execution { .. } => 7,
            Self::Cancelled => 130, // Standard exit code for SIGINT
        }
    }
}
