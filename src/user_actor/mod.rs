//! User-specific resource wiring.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::User;
use crate::store::CollectionActor;

/// Creates a new user collection actor and its client.
pub fn new(buffer_size: usize, watch_capacity: usize) -> (CollectionActor<User>, UserClient) {
    let (actor, generic_client) = CollectionActor::new(buffer_size, watch_capacity);
    let client = UserClient::new(generic_client);

    (actor, client)
}
