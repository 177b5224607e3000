//! Error types for the Quiver library.
//!
//! Every fallible operation returns [`Result`], whose error side is the
//! [`QuiverError`] enum. The variants mirror the failure classes of the index
//! catalogs: bad arguments, duplicate or missing keys, type mismatches between a
//! caller and a stored index, lock timeouts and unsupported operations.
//!
//! # Examples
//!
//! ```
//! use quiver::error::{QuiverError, Result};
//!
//! fn register(key: &str) -> Result<()> {
//!     if key.is_empty() {
//!         return Err(QuiverError::invalid_argument("empty index key"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(register("").is_err());
//! ```

use std::io;

use thiserror::Error;

use crate::registry::IndexType;

/// The main error type for Quiver operations.
#[derive(Error, Debug)]
pub enum QuiverError {
    /// A required parameter was empty, out of range or violated a length constraint.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An index or user-key value with this key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// No index or value is registered under this key.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller's index type does not match the stored entry.
    #[error("Type mismatch on '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: IndexType,
        found: IndexType,
    },

    /// The catalog lock could not be acquired before its timeout expired.
    #[error("Lock failure: {0}")]
    LockFailure(String),

    /// The index type does not support the requested operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// I/O errors (configuration and excluded-word files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with QuiverError.
pub type Result<T> = std::result::Result<T, QuiverError>;

impl QuiverError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        QuiverError::InvalidArgument(msg.into())
    }

    /// Create a new duplicate key error.
    pub fn duplicate_key<S: Into<String>>(key: S) -> Self {
        QuiverError::DuplicateKey(key.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        QuiverError::NotFound(key.into())
    }

    /// Create a new type mismatch error.
    pub fn type_mismatch<S: Into<String>>(key: S, expected: IndexType, found: IndexType) -> Self {
        QuiverError::TypeMismatch {
            key: key.into(),
            expected,
            found,
        }
    }

    /// Create a new lock failure error.
    pub fn lock_failure<S: Into<String>>(msg: S) -> Self {
        QuiverError::LockFailure(msg.into())
    }

    /// Create a new unsupported operation error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        QuiverError::Unsupported(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        QuiverError::Other(msg.into())
    }

    /// Whether the caller may retry the operation unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, QuiverError::LockFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = QuiverError::invalid_argument("empty key");
        assert_eq!(error.to_string(), "Invalid argument: empty key");

        let error = QuiverError::duplicate_key("color");
        assert_eq!(error.to_string(), "Duplicate key: color");

        let error = QuiverError::type_mismatch("color", IndexType::Exact, IndexType::Range);
        assert_eq!(
            error.to_string(),
            "Type mismatch on 'color': expected Exact, found Range"
        );
    }

    #[test]
    fn test_only_lock_failures_are_transient() {
        assert!(QuiverError::lock_failure("registry").is_transient());
        assert!(!QuiverError::not_found("color").is_transient());
        assert!(!QuiverError::unsupported("range thresholds").is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = QuiverError::from(io_error);

        match error {
            QuiverError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
