//! Error types for the cache store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache store.
///
/// A missing key is not an error: lookups return `Option` instead, and the
/// caller cannot distinguish "expired" from "deleted" from "never set".
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// The caller's cancellation token fired before the operation started
    #[error("operation was canceled")]
    Canceled,

    /// Increment/decrement on a value that does not hold an integer
    #[error("value for key is not numeric: {0}")]
    NotNumeric(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache store.
pub type Result<T> = std::result::Result<T, CacheError>;
