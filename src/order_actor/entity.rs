//! [`Document`] implementation for [`Order`].

use crate::model::{Order, OrderPatch, PollId, UserId};
use crate::store::Document;

impl Document for Order {
    // Orders are scoped by poll and keyed by user: the store itself upholds
    // the one-order-per-user invariant.
    type Scope = PollId;
    type Id = UserId;
    type Patch = OrderPatch;

    fn scope(&self) -> PollId {
        self.poll_id.clone()
    }

    fn id(&self) -> UserId {
        self.user_id.clone()
    }

    fn apply_patch(&mut self, patch: OrderPatch) {
        if let Some(dish) = patch.dish {
            self.dish = dish;
        }
        if let Some(notes) = patch.notes {
            // The empty string clears the notes.
            self.notes = (!notes.is_empty()).then_some(notes);
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn patch_merges_only_provided_fields() {
        let mut order = Order {
            poll_id: PollId::from("poll_1"),
            user_id: UserId::from("user_1"),
            dish: "Ramen".to_string(),
            notes: Some("extra spicy".to_string()),
            cost: 12.5,
            created_at: Utc::now(),
        };

        order.apply_patch(OrderPatch {
            cost: Some(14.0),
            ..OrderPatch::default()
        });
        assert_eq!(order.dish, "Ramen");
        assert_eq!(order.notes.as_deref(), Some("extra spicy"));
        assert_eq!(order.cost, 14.0);

        order.apply_patch(OrderPatch {
            notes: Some(String::new()),
            ..OrderPatch::default()
        });
        assert_eq!(order.notes, None);
    }
}
