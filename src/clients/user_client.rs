//! Client for the user directory.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::clients::store_backed::StoreBacked;
use crate::model::{User, UserId};
use crate::store::StoreClient;
use crate::user_actor::UserError;

/// Client for interacting with the user directory.
#[derive(Clone)]
pub struct UserClient {
    inner: StoreClient<User>,
}

impl UserClient {
    pub fn new(inner: StoreClient<User>) -> Self {
        Self { inner }
    }

    /// Registers or refreshes a user under its auth-assigned id.
    #[instrument(skip(self, user), fields(id = %user.id))]
    pub async fn put(&self, user: User) -> Result<(), UserError> {
        debug!("Sending request");
        self.inner.put(user).await.map(|_| ()).map_err(Into::into)
    }

    /// Batched lookup used for order enrichment; unknown ids are simply
    /// absent from the result.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn get_many(&self, ids: Vec<UserId>) -> Result<Vec<User>, UserError> {
        debug!("Sending request");
        self.inner.get_many((), ids).await.map_err(Into::into)
    }
}

#[async_trait]
impl StoreBacked<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &StoreClient<User> {
        &self.inner
    }
}
