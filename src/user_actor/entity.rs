//! [`Document`] implementation for [`User`].

use crate::model::{User, UserId};
use crate::store::Document;

impl Document for User {
    // Users live in one flat directory; there is nothing to partition by.
    type Scope = ();
    type Id = UserId;
    type Patch = (); // No partial updates for now.

    fn scope(&self) {}

    fn id(&self) -> UserId {
        self.id.clone()
    }

    fn apply_patch(&mut self, _patch: ()) {}
}
