//! Pure data structures for polls, orders, and users.

pub mod order;
pub mod poll;
pub mod user;

pub use order::*;
pub use poll::*;
pub use user::*;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Type-safe identifier for polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PollId(pub String);

impl Display for PollId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PollId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Type-safe identifier for users. Ids come from the authentication layer;
/// this crate never generates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
