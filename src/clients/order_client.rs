//! Client for the order collection.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};

use crate::clients::store_backed::StoreBacked;
use crate::model::{Order, OrderDraft, OrderPatch, PollId, UserId};
use crate::order_actor::OrderError;
use crate::store::{PutOutcome, StoreClient, Subscription};

/// Client for interacting with the order collection.
#[derive(Clone)]
pub struct OrderClient {
    inner: StoreClient<Order>,
}

impl OrderClient {
    pub fn new(inner: StoreClient<Order>) -> Self {
        Self { inner }
    }

    /// Submits a user's order as one atomic create-or-replace, stamping a
    /// fresh creation time. The returned outcome says whether this was the
    /// user's first order in the poll or a replacement.
    #[instrument(skip(self, draft), fields(dish = %draft.dish))]
    pub async fn submit(
        &self,
        poll_id: &PollId,
        user_id: &UserId,
        draft: OrderDraft,
    ) -> Result<(Order, PutOutcome), OrderError> {
        let order = Order {
            poll_id: poll_id.clone(),
            user_id: user_id.clone(),
            dish: draft.dish,
            notes: draft.notes.filter(|notes| !notes.is_empty()),
            cost: draft.cost,
            created_at: Utc::now(),
        };
        debug!("Sending request");
        let outcome = self.inner.put(order.clone()).await?;
        Ok((order, outcome))
    }

    /// Merges partial fields over the addressed user's order and returns
    /// the updated document.
    #[instrument(skip(self, patch))]
    pub async fn amend(
        &self,
        poll_id: &PollId,
        user_id: &UserId,
        patch: OrderPatch,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner
            .patch(poll_id.clone(), user_id.clone(), patch)
            .await
            .map_err(Into::into)
    }

    /// The poll's current order list.
    pub async fn list(&self, poll_id: &PollId) -> Result<Vec<Order>, OrderError> {
        self.inner.list(poll_id.clone()).await.map_err(Into::into)
    }

    /// Opens a live snapshot stream over the poll's full order list.
    pub async fn watch(&self, poll_id: &PollId) -> Result<Subscription<Order>, OrderError> {
        self.inner.watch(poll_id.clone()).await.map_err(Into::into)
    }
}

#[async_trait]
impl StoreBacked<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &StoreClient<Order> {
        &self.inner
    }
}
