//! The ordering-deadline state machine.
//!
//! Poll snapshots arrive as full states with no ordering relationship to
//! the order stream, so the "ordering just closed" notification cannot hang
//! off a mutable "previous deadline" capture. The phase is an explicit
//! state keyed purely off the latest deadline value; feeding it the same
//! expired snapshot twice cannot emit twice.

use chrono::{DateTime, Utc};

/// Where the session stands relative to the poll's ordering deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlinePhase {
    /// No deadline, or the deadline lies in the future.
    #[default]
    Open,
    /// The deadline was just observed to have passed; the transition
    /// notification has been emitted.
    JustClosed,
    /// The deadline passed in an earlier snapshot.
    Closed,
}

impl DeadlinePhase {
    /// Advances the phase against the latest observed deadline. Returns the
    /// next phase and whether the one-time "ordering closed" notification
    /// fires on this observation.
    #[must_use]
    pub fn observe(self, deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> (Self, bool) {
        let expired = deadline.is_some_and(|ends| ends <= now);
        match (self, expired) {
            (_, false) => (Self::Open, false),
            (Self::Open, true) => (Self::JustClosed, true),
            (Self::JustClosed | Self::Closed, true) => (Self::Closed, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn drive(phases: &[Option<i64>]) -> Vec<bool> {
        let now = Utc::now();
        let mut phase = DeadlinePhase::default();
        phases
            .iter()
            .map(|offset_secs| {
                let deadline = offset_secs.map(|secs| now + Duration::seconds(secs));
                let (next, emitted) = phase.observe(deadline, now);
                phase = next;
                emitted
            })
            .collect()
    }

    #[test]
    fn emits_once_on_the_transition_snapshot() {
        // future, future, past: fires exactly on the third snapshot.
        assert_eq!(drive(&[Some(60), Some(60), Some(-1)]), vec![false, false, true]);
    }

    #[test]
    fn does_not_refire_on_repeated_expired_snapshots() {
        assert_eq!(drive(&[Some(-1), Some(-1), Some(-1)]), vec![true, false, false]);
    }

    #[test]
    fn absent_deadline_keeps_ordering_open() {
        assert_eq!(drive(&[None, None]), vec![false, false]);
    }

    #[test]
    fn reopened_deadline_can_close_again() {
        assert_eq!(
            drive(&[Some(-1), Some(60), Some(-1)]),
            vec![true, false, true]
        );
    }

    #[test]
    fn deadline_exactly_now_counts_as_expired() {
        let now = Utc::now();
        let (phase, emitted) = DeadlinePhase::Open.observe(Some(now), now);
        assert_eq!(phase, DeadlinePhase::JustClosed);
        assert!(emitted);
    }
}
