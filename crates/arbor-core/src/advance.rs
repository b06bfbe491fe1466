//! The per-tick replant state machine.
//!
//! Every pending entry of the ticking world moves through:
//!
//! ```text
//! Waiting --(delay elapsed)--> ReadyCheck --+--> Planted   (sapling or dropped sapling)
//!                                  |        +--> Abandoned (cell taken, conveyor gone)
//!                                  +--(not ready)--> ReadyCheck next tick
//! ```
//!
//! Readiness means the planting conveyor has drained, nothing is left
//! lying on the planting column, and every conveyor chained below it (up
//! to a bounded depth) has drained too. This keeps saplings from being
//! planted on top of a conveyor line that is still moving harvest drops.

use arbor_types::{Aabb, ItemStack, Vec3, VoxelPos};
use arbor_world::WorldHost;

use crate::config::ReplantConfig;
use crate::error::CoreError;
use crate::store::PendingReplantStore;

/// Inset of the column scan from each side of the block.
const COLUMN_INSET: f64 = 0.05;

/// Height of the column scan above the planting cell's floor.
const COLUMN_HEIGHT: f64 = 1.5;

/// Why an entry was removed without planting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// Something occupies the planting cell.
    CellOccupied,
    /// The block below is no longer a conveyor.
    ConveyorRemoved,
    /// The conveyor block is there but its buffer is gone. The below state
    /// was restored.
    ConveyorBufferMissing,
}

/// What happened to one entry this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The delay has not elapsed.
    Waiting,
    /// The delay elapsed but the conveyor chain is not clear yet.
    Deferred,
    /// The sapling was placed.
    Planted,
    /// The sapling could no longer be placed and was dropped as an item.
    DroppedSapling,
    /// The entry was removed without planting.
    Abandoned(AbandonReason),
}

/// Per-tick counts of entry outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceSummary {
    /// Entries still inside their delay.
    pub waiting: usize,
    /// Entries whose chain was not clear.
    pub deferred: usize,
    /// Saplings placed.
    pub planted: usize,
    /// Saplings dropped as items.
    pub dropped: usize,
    /// Entries abandoned.
    pub abandoned: usize,
}

impl AdvanceSummary {
    fn record(&mut self, outcome: EntryOutcome) {
        let slot = match outcome {
            EntryOutcome::Waiting => &mut self.waiting,
            EntryOutcome::Deferred => &mut self.deferred,
            EntryOutcome::Planted => &mut self.planted,
            EntryOutcome::DroppedSapling => &mut self.dropped,
            EntryOutcome::Abandoned(_) => &mut self.abandoned,
        };
        *slot = slot.saturating_add(1);
    }

    /// Entries that resolved (left the store) this tick.
    pub const fn resolved(&self) -> usize {
        self.planted
            .saturating_add(self.dropped)
            .saturating_add(self.abandoned)
    }
}

/// Advances pending replants.
#[derive(Debug, Clone)]
pub struct ReplantAdvancer {
    delay: u64,
    chain_depth: u32,
    drain_pass_cap: u32,
}

impl ReplantAdvancer {
    /// Create an advancer from configuration.
    pub const fn new(config: &ReplantConfig) -> Self {
        Self {
            delay: config.delay_ticks,
            chain_depth: config.chain_depth,
            drain_pass_cap: config.drain_pass_cap,
        }
    }

    /// Advance every pending entry of the ticking world once.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::World`] if the host fails; entries processed
    /// before the fault keep their outcome.
    pub fn advance<W>(
        &self,
        world: &mut W,
        store: &mut PendingReplantStore,
    ) -> Result<AdvanceSummary, CoreError>
    where
        W: WorldHost + ?Sized,
    {
        let world_id = world.world_id().clone();
        let mut summary = AdvanceSummary::default();
        for pos in store.positions(&world_id) {
            let outcome = self.advance_entry(world, store, pos)?;
            summary.record(outcome);
        }
        if summary.resolved() > 0 {
            tracing::debug!(
                world = %world_id,
                planted = summary.planted,
                dropped = summary.dropped,
                abandoned = summary.abandoned,
                "Resolved pending replants"
            );
        }
        Ok(summary)
    }

    /// Advance the single entry at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::World`] if the host fails.
    pub fn advance_entry<W>(
        &self,
        world: &mut W,
        store: &mut PendingReplantStore,
        pos: VoxelPos,
    ) -> Result<EntryOutcome, CoreError>
    where
        W: WorldHost + ?Sized,
    {
        let world_id = world.world_id().clone();
        let Some(entry) = store.get(&world_id, pos).cloned() else {
            return Ok(EntryOutcome::Waiting);
        };
        if entry.elapsed(world.time()) < self.delay {
            return Ok(EntryOutcome::Waiting);
        }

        let conveyor = pos.down();
        if !world.is_air(pos) {
            store.remove(&world_id, pos);
            return Ok(self.abandon(pos, AbandonReason::CellOccupied));
        }
        if !world.is_conveyor(&world.block_state(conveyor)) {
            store.remove(&world_id, pos);
            return Ok(self.abandon(pos, AbandonReason::ConveyorRemoved));
        }
        if world.conveyor_is_empty(conveyor).is_none() {
            world.set_block_state(conveyor, entry.below.clone())?;
            store.remove(&world_id, pos);
            return Ok(self.abandon(pos, AbandonReason::ConveyorBufferMissing));
        }

        self.drain(world, conveyor)?;
        let ready = world.conveyor_is_empty(conveyor) == Some(true)
            && !has_items_on_column(world, pos)
            && self.lower_chain_ready(world, conveyor)?;
        if !ready {
            return Ok(EntryOutcome::Deferred);
        }

        world.conveyor_pull(conveyor)?;
        world.set_block_state(conveyor, entry.below)?;
        let outcome = if world.can_place_sapling(&entry.sapling, pos) {
            world.set_block_state(pos, entry.sapling.clone())?;
            EntryOutcome::Planted
        } else {
            world.drop_stack(pos, ItemStack::new(entry.sapling.block.clone(), 1))?;
            EntryOutcome::DroppedSapling
        };
        store.remove(&world_id, pos);
        tracing::debug!(
            world = %world_id,
            pos = %pos,
            sapling = %entry.sapling.block,
            ?outcome,
            "Replant resolved"
        );
        Ok(outcome)
    }

    fn abandon(&self, pos: VoxelPos, reason: AbandonReason) -> EntryOutcome {
        tracing::debug!(pos = %pos, ?reason, delay = self.delay, "Abandoned pending replant");
        EntryOutcome::Abandoned(reason)
    }

    /// Pull from above and absorb loose items until a pass moves nothing,
    /// or the pass cap is hit. Returns whether anything moved.
    fn drain<W>(&self, world: &mut W, conveyor: VoxelPos) -> Result<bool, CoreError>
    where
        W: WorldHost + ?Sized,
    {
        let mut moved_any = false;
        for _ in 0..self.drain_pass_cap {
            let mut moved = world.conveyor_pull(conveyor)?;
            for item in world.conveyor_input_items(conveyor) {
                if world.conveyor_absorb(conveyor, item.id)? {
                    moved = true;
                }
            }
            if !moved {
                break;
            }
            moved_any = true;
        }
        Ok(moved_any)
    }

    /// Walk the conveyors stacked below `conveyor`. A non-conveyor link
    /// ends the chain successfully; a conveyor without a buffer, one that
    /// does not drain empty, or one with items still on its input column
    /// fails it.
    fn lower_chain_ready<W>(&self, world: &mut W, conveyor: VoxelPos) -> Result<bool, CoreError>
    where
        W: WorldHost + ?Sized,
    {
        let mut current = conveyor.down();
        for _ in 0..self.chain_depth {
            if !world.is_conveyor(&world.block_state(current)) {
                return Ok(true);
            }
            if world.conveyor_is_empty(current).is_none() {
                return Ok(false);
            }
            self.drain(world, current)?;
            if world.conveyor_is_empty(current) != Some(true)
                || has_items_on_column(world, current.up())
            {
                return Ok(false);
            }
            current = current.down();
        }
        Ok(true)
    }
}

/// Whether any loose item rests in the column over `floor`.
fn has_items_on_column<W>(world: &W, floor: VoxelPos) -> bool
where
    W: WorldHost + ?Sized,
{
    let x = f64::from(floor.x);
    let y = f64::from(floor.y);
    let z = f64::from(floor.z);
    let column = Aabb::new(
        Vec3::new(x + COLUMN_INSET, y, z + COLUMN_INSET),
        Vec3::new(
            x + 1.0 - COLUMN_INSET,
            y + COLUMN_HEIGHT,
            z + 1.0 - COLUMN_INSET,
        ),
    );
    !world.items_in(&column).is_empty()
}
