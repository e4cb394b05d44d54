//! Application error types for core storage and domain logic.
use std::fmt;
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("content is required and must be a non-empty string")]
    InvalidContent,

    #[error("ttl_seconds must be an integer >= 1")]
    InvalidTtl,

    #[error("max_views must be an integer >= 1")]
    InvalidMaxViews,

    #[error("content exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Not found")]
    NotFound,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl AppError {
    /// Whether the error was caused by caller input rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidContent
                | Self::InvalidTtl
                | Self::InvalidMaxViews
                | Self::PayloadTooLarge { .. }
        )
    }
}

/// Why a lookup ended in [`AppError::NotFound`].
///
/// Only used for logging; callers always see the same not-found outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No record under the key (never existed or already deleted).
    Missing,
    /// `expires_at` has passed.
    Expired,
    /// `views` reached `max_views`.
    ViewLimitReached,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::Expired => f.write_str("expired"),
            Self::ViewLimitReached => f.write_str("view limit exceeded"),
        }
    }
}

impl From<redb::Error> for AppError {
    fn from(value: redb::Error) -> Self {
        Self::StoreUnavailable(value.to_string())
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::from(redb::Error::from(value))
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::from(redb::Error::from(value))
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::from(redb::Error::from(value))
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::from(redb::Error::from(value))
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::from(redb::Error::from(value))
    }
}
