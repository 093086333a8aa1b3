//! Order-specific resource wiring.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use crate::store::CollectionActor;

/// Creates a new order collection actor and its client.
pub fn new(buffer_size: usize, watch_capacity: usize) -> (CollectionActor<Order>, OrderClient) {
    let (actor, generic_client) = CollectionActor::new(buffer_size, watch_capacity);
    let client = OrderClient::new(generic_client);

    (actor, client)
}
