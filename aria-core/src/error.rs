//! # Error Types for ARIA
//!
//! Unified error handling across all ARIA crates.

use thiserror::Error;

/// Main error type for ARIA operations
#[derive(Error, Debug)]
pub enum AriaError {
    /// Store backend failure (transient network/DB)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Unique-key collision on insert
    #[error("Conflict on key {0}")]
    Conflict(String),

    /// Invalid input (empty text, missing user)
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// Lookup returned nothing where something was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for ARIA operations
pub type AriaResult<T> = Result<T, AriaError>;

impl AriaError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(key: impl Into<String>) -> Self {
        Self::Conflict(key.into())
    }

    /// Create an invalid-input error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Whether this error is a transient backend failure worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
