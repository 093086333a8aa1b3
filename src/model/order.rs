//! One user's dish selection within a poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{PollId, UserId};

/// A single user's order. At most one exists per (poll, user); the order
/// collection keys orders by user id within the poll scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub poll_id: PollId,
    pub user_id: UserId,
    pub dish: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

/// Payload for submitting an order: what the user fills into the form.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub dish: String,
    pub notes: Option<String>,
    pub cost: f64,
}

/// Partial update for an order (administrative override). `None` fields are
/// left untouched; setting `notes` to the empty string clears them.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub dish: Option<String>,
    pub notes: Option<String>,
    pub cost: Option<f64>,
}

/// An [`Order`] joined with the display name resolved for its user. The name
/// is derived at snapshot time and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedOrder {
    pub order: Order,
    pub user_name: String,
}
