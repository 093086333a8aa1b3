//! Error types for the order collection.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// No order exists for the addressed user in this poll.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// An error occurred while communicating with the store.
    #[error("Order store error: {0}")]
    Store(String),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other.to_string()),
        }
    }
}
