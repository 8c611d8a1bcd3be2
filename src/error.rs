//! Error types for the response cache
//!
//! Provides unified error handling using thiserror. These errors stay inside
//! the crate: public cache operations translate every failure into a logged
//! miss or no-op outcome, so callers never see them.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache internals.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record file exists but does not parse as a cache record
    #[error("Corrupt cache record: {0}")]
    Corrupt(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache internals.
pub type Result<T> = std::result::Result<T, CacheError>;
