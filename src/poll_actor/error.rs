//! Error types for the poll collection.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during poll operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PollError {
    /// The requested poll was not found.
    #[error("Poll not found: {0}")]
    NotFound(String),

    /// A poll with the same id already exists.
    #[error("Poll already exists: {0}")]
    AlreadyExists(String),

    /// An error occurred while communicating with the store.
    #[error("Poll store error: {0}")]
    Store(String),
}

impl From<StoreError> for PollError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Conflict(id) => Self::AlreadyExists(id),
            other => Self::Store(other.to_string()),
        }
    }
}
