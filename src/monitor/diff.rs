//! Snapshot diffing keyed by slot identity
//!
//! Two slots at the same time with different hashes are different offers:
//! the service re-issues a slot when its price or points change, and that
//! has to show up as a change.

use chrono::NaiveTime;

use crate::models::{PollSnapshot, Slot};

/// Classification of one poll against the previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// A slot at the preferred time exists in the current snapshot
    ExactMatch(Slot),
    /// Identities appeared and/or disappeared
    Changed { added: Vec<Slot>, removed: Vec<Slot> },
    /// Same identities as before
    NoChange,
}

impl DiffOutcome {
    pub fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChange)
    }
}

/// Compare `current` to `previous`
///
/// An exact match short-circuits; `added` follows current fetch order and
/// `removed` follows previous fetch order.
pub fn diff(
    previous: &PollSnapshot,
    current: &PollSnapshot,
    preferred_time: NaiveTime,
) -> DiffOutcome {
    if let Some(slot) = current.iter().find(|s| s.time() == preferred_time) {
        return DiffOutcome::ExactMatch(slot.clone());
    }

    let added = difference(current, previous);
    let removed = difference(previous, current);

    if added.is_empty() && removed.is_empty() {
        DiffOutcome::NoChange
    } else {
        DiffOutcome::Changed { added, removed }
    }
}

/// Slots of `left` whose identity is missing from `right`
fn difference(left: &PollSnapshot, right: &PollSnapshot) -> Vec<Slot> {
    left.iter()
        .filter(|s| !right.contains(s.slot_hash()))
        .cloned()
        .collect()
}
