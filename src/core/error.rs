//! Error handling for dompile
//!
//! Two layers, mirroring how the renderer reports problems:
//!
//! 1. [`DompileError`]: strongly-typed failures of fallible operations
//!    (storage I/O, a missing source root, loading the root document).
//!    Only these abort work; everything that goes wrong *inside* a render
//!    branch becomes a [`Diagnostic`](super::Diagnostic) instead.
//! 2. [`ErrorContext`]: a user-facing wrapper with details and a
//!    suggestion, used by the CLI to print colored errors.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dompile::core::{DompileError, user_friendly_error};
//!
//! let error = DompileError::SourceRootMissing { path: "site/src".into() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dompile operations
#[derive(Error, Debug)]
pub enum DompileError {
    /// Reading from the backing store failed
    #[error("Failed to {operation} '{}'", .path.display())]
    Io {
        /// What was being attempted (e.g. "read", "list")
        operation: String,
        /// The path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The path does not exist in the backing store
    #[error("File not found: {}", .path.display())]
    NotFound {
        /// The missing path
        path: PathBuf,
    },

    /// The path exists but is a directory or special file
    #[error("Not a regular file: {}", .path.display())]
    NotAFile {
        /// The offending path
        path: PathBuf,
    },

    /// File content is not valid UTF-8
    #[error("File is not valid UTF-8: {}", .path.display())]
    InvalidUtf8 {
        /// The offending path
        path: PathBuf,
    },

    /// The configured source root does not exist
    #[error("Source root does not exist: {}", .path.display())]
    SourceRootMissing {
        /// Configured source root
        path: PathBuf,
    },
}

impl DompileError {
    /// Wrap an [`std::io::Error`] for `path`, mapping the common kinds to
    /// dedicated variants.
    pub fn from_io(operation: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path,
            },
            std::io::ErrorKind::InvalidData => Self::InvalidUtf8 {
                path,
            },
            _ => Self::Io {
                operation: operation.to_string(),
                path,
                source,
            },
        }
    }
}

/// User-facing error with optional details and suggestion
#[derive(Debug)]
pub struct ErrorContext {
    /// Primary message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with only the primary message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with an actionable suggestion
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(dompile_error) = error.downcast_ref::<DompileError>() {
        return create_error_context(dompile_error, &error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(format!("{error:#}"))
                .with_suggestion("Check file ownership and permissions");
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(format!("{error:#}"))
            .with_suggestion("Check dompile.toml for TOML syntax errors")
            .with_details("Keys use kebab-case, e.g. `max-include-depth = 10`");
    }

    ErrorContext::new(format!("{error:#}"))
}

fn create_error_context(error: &DompileError, chain: &anyhow::Error) -> ErrorContext {
    let message = format!("{chain:#}");
    match error {
        DompileError::SourceRootMissing {
            ..
        } => ErrorContext::new(message)
            .with_suggestion("Create the directory or set `source` in dompile.toml")
            .with_details("Virtual includes and layouts are resolved against the source root"),
        DompileError::NotFound {
            ..
        } => ErrorContext::new(message)
            .with_suggestion("Check that the path is correct and relative to --project"),
        DompileError::InvalidUtf8 {
            ..
        } => ErrorContext::new(message)
            .with_details("Documents, includes and layouts must be UTF-8 text"),
        _ => ErrorContext::new(message),
    }
}
