//! Error handling for lexdown
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`LexdownError`]) for the few failures that
//!    actually abort a document run (strict-mode metadata errors, unreadable
//!    configuration, invalid field patterns).
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users.
//!
//! Everything that is local to one field, header or reference is *not* an
//! error. Those problems are recorded as [`Diagnostic`](crate::core::Diagnostic)s
//! on the run context and the document still renders.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lexdown::core::{LexdownError, user_friendly_error};
//!
//! let error = LexdownError::MalformedMetadata {
//!     reason: "mapping values are not allowed here".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for lexdown operations.
///
/// # Error Categories
///
/// - [`MalformedMetadata`] - invalid YAML in the metadata block (strict mode only)
/// - [`InvalidConfig`] - a configuration value that cannot be used
/// - [`InvalidFieldPattern`] - a custom placeholder delimiter pair that cannot be scanned
/// - [`ConfigParse`] - TOML syntax errors in a configuration file
/// - [`WorkerFailed`] - a batch worker task did not complete
/// - [`Io`] / [`Json`] - wrapped lower-level failures
///
/// [`MalformedMetadata`]: LexdownError::MalformedMetadata
/// [`InvalidConfig`]: LexdownError::InvalidConfig
/// [`InvalidFieldPattern`]: LexdownError::InvalidFieldPattern
/// [`ConfigParse`]: LexdownError::ConfigParse
/// [`WorkerFailed`]: LexdownError::WorkerFailed
/// [`Io`]: LexdownError::Io
/// [`Json`]: LexdownError::Json
#[derive(Error, Debug)]
pub enum LexdownError {
    /// The metadata block exists but is not valid YAML (or not a mapping).
    #[error("Malformed metadata block: {reason}")]
    MalformedMetadata {
        /// Parser message
        reason: String,
    },

    /// Configuration value is out of range or contradictory.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Custom placeholder delimiters that cannot be used for scanning.
    #[error("Invalid field pattern '{open}...{close}': {reason}")]
    InvalidFieldPattern {
        /// Opening delimiter
        open: String,
        /// Closing delimiter
        close: String,
        /// Why the pair was rejected
        reason: String,
    },

    /// Configuration file is not valid TOML.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A batch worker panicked or was cancelled.
    #[error("Batch worker failed: {reason}")]
    WorkerFailed {
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, LexdownError>;

/// Error wrapper with user-facing suggestion and details.
///
/// Displayed by the CLI with color coding:
/// - Error message: red and bold
/// - Details: yellow
/// - Suggestion: green
#[derive(Debug)]
pub struct ErrorContext {
    /// Rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
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

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`LexdownError`] variants, [`std::io::Error`] and
/// [`toml::de::Error`] anywhere in the error chain and attaches a tailored
/// suggestion. Anything else is reported with its full context chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<LexdownError>() {
            return create_error_context(err, message);
        }

        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            return match io_error.kind() {
                std::io::ErrorKind::NotFound => ErrorContext::new(message)
                    .with_suggestion("Check that the file or directory exists and the path is correct"),
                std::io::ErrorKind::PermissionDenied => ErrorContext::new(message)
                    .with_suggestion("Check file ownership and permissions"),
                _ => ErrorContext::new(message),
            };
        }

        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return ErrorContext::new(message)
                .with_suggestion("Check the configuration file for TOML syntax errors")
                .with_details("Keys use kebab-case, e.g. `level-one = \"Article %n.\"`");
        }
    }

    ErrorContext::new(message)
}

fn create_error_context(error: &LexdownError, message: String) -> ErrorContext {
    match error {
        LexdownError::MalformedMetadata {
            ..
        } => ErrorContext::new(message)
            .with_suggestion("Fix the YAML between the leading `---` lines, or run without --strict")
            .with_details("In non-strict mode the document is rendered with an empty metadata store"),
        LexdownError::InvalidConfig {
            ..
        } => ErrorContext::new(message)
            .with_suggestion("Review the configuration file passed with --config"),
        LexdownError::InvalidFieldPattern {
            ..
        } => ErrorContext::new(message).with_suggestion(
            "Field patterns need distinct, non-empty `open` and `close` delimiters",
        ),
        LexdownError::ConfigParse(_) => ErrorContext::new(message)
            .with_suggestion("Check the configuration file for TOML syntax errors"),
        LexdownError::WorkerFailed {
            ..
        } => ErrorContext::new(message)
            .with_suggestion("Retry with --max-parallel 1 to isolate the failing document"),
        LexdownError::Io(_) | LexdownError::Json(_) => ErrorContext::new(message),
    }
}
