//! Client for the poll collection.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::model::{Poll, PollCreate, PollId, PollPatch};
use crate::poll_actor::PollError;
use crate::store::StoreClient;

/// Client for interacting with the poll collection.
///
/// Polls are single documents: the collection scopes each poll by its own
/// id, so watching a poll yields zero-or-one-element snapshots mapped to
/// `Option<Poll>` here.
#[derive(Clone)]
pub struct PollClient {
    inner: StoreClient<Poll>,
    next_id: Arc<dyn Fn() -> PollId + Send + Sync>,
}

impl PollClient {
    pub fn new(inner: StoreClient<Poll>, next_id: impl Fn() -> PollId + Send + Sync + 'static) -> Self {
        Self {
            inner,
            next_id: Arc::new(next_id),
        }
    }

    /// Creates a poll under a generated id and returns the stored document.
    #[instrument(skip(self, params))]
    pub async fn create(&self, params: PollCreate) -> Result<Poll, PollError> {
        let poll = Poll {
            id: (self.next_id)(),
            selected_restaurant: params.selected_restaurant,
            restaurant_options: params.restaurant_options,
            ordering_ends_at: params.ordering_ends_at,
        };
        debug!(id = %poll.id, "Creating poll");
        self.inner.insert(poll.clone()).await?;
        Ok(poll)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &PollId) -> Result<Option<Poll>, PollError> {
        debug!("Sending request");
        self.inner.get(id.clone(), id.clone()).await.map_err(Into::into)
    }

    /// Applies a partial update and returns the updated document.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &PollId, patch: PollPatch) -> Result<Poll, PollError> {
        debug!("Sending request");
        self.inner.patch(id.clone(), id.clone(), patch).await.map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: &PollId) -> Result<(), PollError> {
        debug!("Sending request");
        self.inner.remove(id.clone(), id.clone()).await.map_err(Into::into)
    }

    /// Opens a live view of the poll: its current state plus a snapshot
    /// stream delivering the document (or its absence) after every change.
    pub async fn watch(
        &self,
        id: &PollId,
    ) -> Result<(Option<Poll>, broadcast::Receiver<Vec<Poll>>), PollError> {
        let subscription = self.inner.watch(id.clone()).await?;
        Ok((subscription.initial.into_iter().next(), subscription.updates))
    }
}
