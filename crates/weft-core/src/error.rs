//! Error types for Weft operations.
//!
//! This module provides the common `Error` type and `Result<T>` alias used
//! across all Weft crates. Uses `thiserror` for derive macros.
//!
//! Propagation policy: validation and configuration errors surface
//! immediately to the caller and are never retried. Backend errors raised
//! during synchronization are safe to retry at the next reconciliation pass
//! because the document log is written before any index.

use thiserror::Error;

/// Errors that can occur in Weft operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A document is missing a required field or is otherwise malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration: bad chunker parameters, unknown search mode,
    /// or an embedding-size mismatch against a persisted domain.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Domain or model not registered.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An index or log store is unreachable or failed an operation.
    #[error("Backend error: {0}")]
    Backend(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Result type alias using Weft's Error type.
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Tests
// ============================================================================
