//! Error handling for the explorer engine
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`ExplorerError`]) returned by every library API
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for the preview binary
//!
//! # Error Categories
//!
//! - **Metadata**: [`ExplorerError::TargetNotFound`], [`ExplorerError::InvalidTarget`]
//! - **Data access**: [`ExplorerError::EntityNotFound`], [`ExplorerError::FetchFailed`]
//! - **Rendering**: [`ExplorerError::RendererNotFound`]
//! - **Filter tokens**: [`ExplorerError::Filter`]
//! - **Configuration and fixtures**: [`ExplorerError::ConfigError`], [`ExplorerError::FixtureError`]
//!
//! Errors are [`Clone`] because a single fetch failure is delivered to every
//! waiter of a cache key.
//!
//! # Examples
//!
//! ```rust,no_run
//! use explorer_engine::core::{ExplorerError, user_friendly_error};
//!
//! let error = ExplorerError::TargetNotFound {
//!     target: "UserEntity".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::filter::FilterError;

/// Result alias used across the library.
pub type Result<T, E = ExplorerError> = std::result::Result<T, E>;

/// The main error type for explorer engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    /// No target with the given logical name is known to the data service.
    #[error("Target '{target}' not found")]
    TargetNotFound {
        /// Logical target name
        target: String,
    },

    /// The row identified by `id` does not exist.
    #[error("Entity '{id}' not found in target '{target}'")]
    EntityNotFound {
        /// Logical target name
        target: String,
        /// Primary key value
        id: String,
    },

    /// Target metadata violates a structural invariant.
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget {
        /// Logical target name
        target: String,
        /// What is wrong with it
        reason: String,
    },

    /// The underlying fetch capability rejected a request.
    #[error("Failed to fetch target '{target}': {reason}")]
    FetchFailed {
        /// Logical target name
        target: String,
        /// Failure reported by the data service
        reason: String,
    },

    /// A renderer code is not registered in the requested family.
    #[error("No {family} renderer registered for code '{code}'")]
    RendererNotFound {
        /// Renderer family name
        family: String,
        /// Requested code
        code: String,
    },

    /// A filter token or value could not be encoded or decoded.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Configuration file problems.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// A data fixture could not be loaded.
    #[error("Invalid fixture '{path}': {reason}")]
    FixtureError {
        /// Fixture path
        path: String,
        /// Parse or validation failure
        reason: String,
    },

    /// I/O failure, stored as text so the error stays cloneable.
    #[error("IO error: {0}")]
    IoError(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Free-form message
        message: String,
    },
}

impl From<std::io::Error> for ExplorerError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

impl From<toml::de::Error> for ExplorerError {
    fn from(error: toml::de::Error) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

/// Error wrapper carrying a suggestion and details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ExplorerError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ExplorerError) -> Self {
        Self {
            error,
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

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

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
        write!(f, "{}", self.error)?;

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
/// Recognizes [`ExplorerError`] anywhere in the chain and [`std::io::Error`];
/// everything else is wrapped as [`ExplorerError::Other`] with the full context
/// chain in the details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(explorer_error) = error.downcast_ref::<ExplorerError>() {
        return create_error_context(explorer_error.clone());
    }

    for cause in error.chain() {
        if let Some(explorer_error) = cause.downcast_ref::<ExplorerError>() {
            return create_error_context(explorer_error.clone()).with_details(format!("{error:#}"));
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(ExplorerError::IoError(io_error.to_string()))
            .with_suggestion("Check that the file exists and is readable");
    }

    ErrorContext::new(ExplorerError::Other {
        message: error.to_string(),
    })
    .with_details(format!("{error:#}"))
}

fn create_error_context(error: ExplorerError) -> ErrorContext {
    let suggestion = match &error {
        ExplorerError::TargetNotFound { .. } => Some(
            "Run 'explorer resolve --fixture <file> <target>' with one of the targets defined in the fixture",
        ),
        ExplorerError::EntityNotFound { .. } => {
            Some("Use 'explorer list' to find the primary key of an existing row")
        }
        ExplorerError::InvalidTarget { .. } => {
            Some("Mark exactly one column of the target with \"primary\": true")
        }
        ExplorerError::Filter(_) => Some(
            "Filter tokens look like '::name:value::other:%part%'; values must not contain '::'",
        ),
        ExplorerError::ConfigError { .. } => {
            Some("Check the TOML syntax of the file pointed to by EXPLORER_CONFIG_PATH")
        }
        ExplorerError::FixtureError { .. } => {
            Some("Fixtures are JSON documents with \"targets\" and \"rows\" keys")
        }
        _ => None,
    };

    let ctx = ErrorContext::new(error);
    match suggestion {
        Some(suggestion) => ctx.with_suggestion(suggestion),
        None => ctx,
    }
}
