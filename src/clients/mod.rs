//! Type-safe wrappers around [`StoreClient`](crate::store::StoreClient).

pub mod order_client;
pub mod poll_client;
pub mod store_backed;
pub mod user_client;

pub use order_client::*;
pub use poll_client::*;
pub use store_backed::*;
pub use user_client::*;
