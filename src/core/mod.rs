//! Core types for the explorer engine
//!
//! Currently this module only hosts the error system:
//! - [`ExplorerError`] - Enumerated error types covering every engine failure mode
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! # Error Handling Pattern
//!
//! Library code returns [`Result`] (an alias over [`ExplorerError`]); the
//! preview binary works with [`anyhow::Result`] and converts at the edge:
//!
//! ```rust,no_run
//! use explorer_engine::core::{ExplorerError, user_friendly_error};
//!
//! fn example_operation() -> anyhow::Result<()> {
//!     Err(ExplorerError::TargetNotFound { target: "Ghost".into() }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     user_friendly_error(e).display();
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, ExplorerError, Result, user_friendly_error};
