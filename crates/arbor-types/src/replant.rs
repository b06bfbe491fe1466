//! Pending replant records.

use serde::{Deserialize, Serialize};

use crate::block::BlockState;

/// A deferred sapling placement, keyed externally by world and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReplant {
    /// The sapling state to place.
    pub sapling: BlockState,
    /// The state that was directly below the planting cell when the entry
    /// was scheduled. Restored verbatim when the entry resolves.
    pub below: BlockState,
    /// World time the entry was created at.
    pub created_tick: u64,
}

impl PendingReplant {
    /// Create a record.
    pub const fn new(sapling: BlockState, below: BlockState, created_tick: u64) -> Self {
        Self {
            sapling,
            below,
            created_tick,
        }
    }

    /// Ticks elapsed since creation. A clock that went backwards reads as
    /// zero elapsed.
    pub const fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_tick)
    }
}
