//! Poll-specific resource wiring.

pub mod entity;
pub mod error;

pub use error::*;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::clients::PollClient;
use crate::model::{Poll, PollId};
use crate::store::CollectionActor;

/// Creates a new poll collection actor and its client.
pub fn new(buffer_size: usize, watch_capacity: usize) -> (CollectionActor<Poll>, PollClient) {
    let poll_id_counter = Arc::new(AtomicU64::new(1));
    let next_poll_id = move || {
        let id = poll_id_counter.fetch_add(1, Ordering::SeqCst);
        PollId(format!("poll_{}", id))
    };

    let (actor, generic_client) = CollectionActor::new(buffer_size, watch_capacity);
    let client = PollClient::new(generic_client, next_poll_id);

    (actor, client)
}
