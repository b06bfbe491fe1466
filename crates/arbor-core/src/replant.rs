//! Replant decision and scheduling.
//!
//! After a trunk is removed, the captured base state picks the sapling
//! species by ordered tag check. Species that only grow from a 2x2
//! footprint need four trunk cells in a square around the base, and either
//! all four cells get scheduled or none do.
//!
//! Scheduling clears the planting cell, installs a downward conveyor below
//! it (unless one is already there), and records a [`PendingReplant`] with
//! the state that was below. The sapling itself is placed later by
//! [`ReplantAdvancer`](crate::advance::ReplantAdvancer).

use std::collections::{BTreeMap, BTreeSet};

use arbor_types::{BlockState, PendingReplant, Species, VoxelPos};
use arbor_world::WorldHost;

use crate::error::CoreError;
use crate::store::PendingReplantStore;

/// Why a harvest did not schedule a replant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplantSkip {
    /// Replanting is turned off.
    Disabled,
    /// The base state matched no species (or its sapling is not
    /// registered).
    NoSpecies,
    /// A 2x2 species without a 2x2 trunk footprint around the base.
    NoAnchor,
    /// A target cell is occupied or cannot hold a sapling.
    Blocked(VoxelPos),
}

/// Cells to schedule for one harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplantPlan {
    /// The species being replanted.
    pub species: Species,
    /// The sapling state to place.
    pub sapling: BlockState,
    /// Each planting cell with the state captured below it.
    pub cells: Vec<(VoxelPos, BlockState)>,
}

/// The species whose log tag `base_state` carries, checked in
/// [`Species::LOOKUP_ORDER`]. Optional species are skipped when the host
/// does not register their sapling.
pub fn resolve_species<W>(world: &W, base_state: &BlockState) -> Option<Species>
where
    W: WorldHost + ?Sized,
{
    Species::LOOKUP_ORDER.into_iter().find(|species| {
        (!species.is_optional() || world.is_registered(&species.sapling_id()))
            && world.block_has_tag(base_state, species.log_tag())
    })
}

/// The north-west corner of a 2x2 trunk square containing `base`, trying
/// offsets dx in {-1, 0} (outer) and dz in {-1, 0}.
pub fn two_by_two_anchor(trunk: &BTreeSet<VoxelPos>, base: VoxelPos) -> Option<VoxelPos> {
    for dx in -1..=0 {
        for dz in -1..=0 {
            let anchor = base.offset(dx, 0, dz);
            let square = [
                anchor,
                anchor.offset(1, 0, 0),
                anchor.offset(0, 0, 1),
                anchor.offset(1, 0, 1),
            ];
            if square.iter().all(|cell| trunk.contains(cell)) {
                return Some(anchor);
            }
        }
    }
    None
}

fn can_plant<W>(world: &W, sapling: &BlockState, pos: VoxelPos) -> bool
where
    W: WorldHost + ?Sized,
{
    world.is_air(pos) && world.can_place_sapling(sapling, pos)
}

/// Decide what to replant after harvesting `trunk` from `base`.
///
/// # Errors
///
/// Returns the [`ReplantSkip`] reason when nothing should be scheduled.
pub fn plan_replant<W>(
    world: &W,
    base: VoxelPos,
    base_state: &BlockState,
    trunk: &BTreeSet<VoxelPos>,
) -> Result<ReplantPlan, ReplantSkip>
where
    W: WorldHost + ?Sized,
{
    let species = resolve_species(world, base_state).ok_or(ReplantSkip::NoSpecies)?;
    let sapling = world
        .decode_state(&species.sapling_id(), &BTreeMap::new())
        .ok_or(ReplantSkip::NoSpecies)?;

    let targets = if species.requires_two_by_two() {
        let anchor = two_by_two_anchor(trunk, base).ok_or(ReplantSkip::NoAnchor)?;
        vec![
            anchor,
            anchor.offset(1, 0, 0),
            anchor.offset(0, 0, 1),
            anchor.offset(1, 0, 1),
        ]
    } else {
        vec![base]
    };

    let cells: Vec<(VoxelPos, BlockState)> = targets
        .into_iter()
        .map(|pos| (pos, world.block_state(pos.down())))
        .collect();
    if let Some((blocked, _)) = cells
        .iter()
        .find(|(pos, _)| !can_plant(world, &sapling, *pos))
    {
        return Err(ReplantSkip::Blocked(*blocked));
    }

    Ok(ReplantPlan {
        species,
        sapling,
        cells,
    })
}

/// Schedule one replant at `pos`. Returns `false` (and changes nothing)
/// if `pos` is already pending.
///
/// # Errors
///
/// Returns [`CoreError::World`] if the host rejects a block write.
pub fn schedule<W>(
    world: &mut W,
    store: &mut PendingReplantStore,
    pos: VoxelPos,
    sapling: &BlockState,
    below: BlockState,
) -> Result<bool, CoreError>
where
    W: WorldHost + ?Sized,
{
    let world_id = world.world_id().clone();
    if store.contains(&world_id, pos) {
        return Ok(false);
    }

    world.set_block_state(pos, BlockState::air())?;
    let conveyor = pos.down();
    if !world.is_conveyor(&world.block_state(conveyor)) {
        let state = world.conveyor_state();
        world.set_block_state(conveyor, state)?;
    }

    let replant = PendingReplant::new(sapling.clone(), below, world.time());
    store.insert(&world_id, pos, replant);
    tracing::debug!(world = %world_id, pos = %pos, sapling = %sapling.block, "Scheduled replant");
    Ok(true)
}

/// Schedule every cell of `plan`. Returns how many were newly scheduled.
///
/// # Errors
///
/// Returns [`CoreError::World`] if the host rejects a block write.
pub fn apply_plan<W>(
    world: &mut W,
    store: &mut PendingReplantStore,
    plan: ReplantPlan,
) -> Result<usize, CoreError>
where
    W: WorldHost + ?Sized,
{
    let mut scheduled: usize = 0;
    for (pos, below) in plan.cells {
        if schedule(world, store, pos, &plan.sapling, below)? {
            scheduled = scheduled.saturating_add(1);
        }
    }
    Ok(scheduled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use arbor_types::WorldId;
    use arbor_world::MemoryWorld;

    use super::*;

    fn world() -> MemoryWorld {
        MemoryWorld::new(WorldId::new("minecraft:overworld"))
    }

    #[test]
    fn species_follow_log_tags() {
        let w = world();
        let cases = [
            ("oak_log", Species::Oak),
            ("stripped_spruce_wood", Species::Spruce),
            ("birch_wood", Species::Birch),
            ("jungle_log", Species::Jungle),
            ("acacia_log", Species::Acacia),
            ("dark_oak_log", Species::DarkOak),
            ("cherry_log", Species::Cherry),
            ("pale_oak_log", Species::PaleOak),
        ];
        for (block, expected) in cases {
            let state = w.default_state(block).unwrap();
            assert_eq!(resolve_species(&w, &state), Some(expected), "{block}");
        }
    }

    #[test]
    fn pale_oak_needs_a_registered_sapling() {
        let w = world().without_pale_oak();
        let state = BlockState::vanilla("pale_oak_log");
        assert_eq!(resolve_species(&w, &state), None);
    }

    #[test]
    fn anchor_search_prefers_west_then_north() {
        let base = VoxelPos::new(5, 64, 5);
        let square = |anchor: VoxelPos| -> BTreeSet<VoxelPos> {
            [(0, 0), (1, 0), (0, 1), (1, 1)]
                .into_iter()
                .map(|(dx, dz)| anchor.offset(dx, 0, dz))
                .collect()
        };

        let mut trunk = square(VoxelPos::new(4, 64, 4));
        trunk.extend(square(VoxelPos::new(5, 64, 5)));
        assert_eq!(two_by_two_anchor(&trunk, base), Some(VoxelPos::new(4, 64, 4)));

        let trunk = square(VoxelPos::new(5, 64, 4));
        assert_eq!(two_by_two_anchor(&trunk, base), Some(VoxelPos::new(5, 64, 4)));

        let trunk: BTreeSet<VoxelPos> = [base, base.offset(1, 0, 0)].into_iter().collect();
        assert_eq!(two_by_two_anchor(&trunk, base), None);
    }

    #[test]
    fn single_sapling_plan_captures_the_soil() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.place(base.down(), "podzol").unwrap();
        let trunk = BTreeSet::from([base]);
        let plan = plan_replant(&w, base, &BlockState::vanilla("birch_log"), &trunk).unwrap();
        assert_eq!(plan.species, Species::Birch);
        assert_eq!(plan.cells.len(), 1);
        assert_eq!(plan.cells.first().unwrap().1.block.path(), "podzol");
    }

    #[test]
    fn blocked_single_cell_is_skipped() {
        let mut w = world();
        let base = VoxelPos::new(0, 64, 0);
        w.place(base.down(), "stone").unwrap();
        let trunk = BTreeSet::from([base]);
        assert_eq!(
            plan_replant(&w, base, &BlockState::vanilla("oak_log"), &trunk),
            Err(ReplantSkip::Blocked(base))
        );
    }

    #[test]
    fn schedule_clears_cell_installs_conveyor_and_is_idempotent() {
        let mut w = world();
        let mut store = PendingReplantStore::new();
        let pos = VoxelPos::new(0, 64, 0);
        w.place(pos.down(), "grass_block").unwrap();
        w.place(pos, "torch").unwrap();
        w.set_time(77);
        let sapling = w.default_state("oak_sapling").unwrap();
        let below = w.block_state(pos.down());

        assert!(schedule(&mut w, &mut store, pos, &sapling, below.clone()).unwrap());
        assert!(w.is_air(pos));
        assert!(w.is_conveyor(&w.block_state(pos.down())));
        assert_eq!(w.block_state(pos.down()).property("facing"), Some("down"));

        assert!(!schedule(&mut w, &mut store, pos, &sapling, below).unwrap());
        let id = WorldId::new("minecraft:overworld");
        assert_eq!(store.len(&id), 1);
        assert_eq!(store.get(&id, pos).unwrap().created_tick, 77);
    }

    #[test]
    fn existing_conveyor_is_left_alone() {
        let mut w = world();
        let mut store = PendingReplantStore::new();
        let pos = VoxelPos::new(0, 64, 0);
        let sideways = w.default_state("hopper").unwrap().with("facing", "north");
        w.set_block_state(pos.down(), sideways.clone()).unwrap();
        let sapling = w.default_state("oak_sapling").unwrap();

        schedule(&mut w, &mut store, pos, &sapling, sideways.clone()).unwrap();
        assert_eq!(w.block_state(pos.down()), sideways);
    }
}
