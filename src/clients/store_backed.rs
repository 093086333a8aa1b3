//! Shared default operations for resource-specific clients.

use async_trait::async_trait;

use crate::store::{Document, StoreClient, StoreError};

/// Trait for resource-specific clients to inherit standard operations.
///
/// Reduces boilerplate by providing default implementations for `get` and
/// `remove` over the inner generic client.
#[async_trait]
pub trait StoreBacked<T: Document>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<StoreError> + Send + Sync;

    /// Access the inner generic store client.
    fn inner(&self) -> &StoreClient<T>;

    /// Fetch a document by scope and id.
    #[tracing::instrument(skip(self))]
    async fn get(&self, scope: T::Scope, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(scope, id).await.map_err(Into::into)
    }

    /// Delete a document by scope and id.
    #[tracing::instrument(skip(self))]
    async fn remove(&self, scope: T::Scope, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().remove(scope, id).await.map_err(Into::into)
    }
}
