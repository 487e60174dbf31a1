//! Infrastructure error model.

use thiserror::Error;

/// Result type returned by external stores (persistence layer, revocation store).
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of an external store.
///
/// These are never client errors: callers must fail closed when they see one
/// (deny the request) instead of guessing an answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached (connection refused, timeout, pool exhausted).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered, but with something we could not use.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A write was rejected because the target record does not exist.
    #[error("record not found")]
    NotFound,
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
