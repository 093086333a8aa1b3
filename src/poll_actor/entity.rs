//! [`Document`] implementation for [`Poll`].

use crate::model::{Poll, PollId, PollPatch};
use crate::store::Document;

impl Document for Poll {
    // A poll is its own scope: watching the scope observes the single
    // document, which is how the session follows one poll live.
    type Scope = PollId;
    type Id = PollId;
    type Patch = PollPatch;

    fn scope(&self) -> PollId {
        self.id.clone()
    }

    fn id(&self) -> PollId {
        self.id.clone()
    }

    fn apply_patch(&mut self, patch: PollPatch) {
        if let Some(ends_at) = patch.ordering_ends_at {
            self.ordering_ends_at = Some(ends_at);
        }
        if let Some(options) = patch.restaurant_options {
            self.restaurant_options = options;
        }
    }
}
