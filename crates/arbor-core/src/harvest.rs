//! The harvest orchestrator.
//!
//! One admitted marker tick: check the held tool, find the tree base next
//! to the marker, collect trunk and canopy, break both sets (pooling each
//! set's drops at the base column), schedule the replant, and play one
//! wood-break sound.
//!
//! Nothing here is an error unless the host faults. A marker that is not
//! holding an axe, or that is not next to a tree, yields a
//! [`HarvestSkip`].

use std::collections::BTreeSet;

use arbor_types::{
    BlockState, ItemSpawn, ItemStack, ItemTag, Marker, SoundCategory, SoundEvent, Vec3, VoxelPos,
};
use arbor_world::WorldHost;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{HarvestConfig, ReplantConfig};
use crate::error::CoreError;
use crate::replant::{self, ReplantSkip};
use crate::search::{self, HarvestSet, SearchBounds};
use crate::store::PendingReplantStore;

/// Why a trigger did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestSkip {
    /// The marker is not holding an axe.
    NotAnAxe,
    /// No trunk block sits next to the marker's support block.
    NoTreeBase,
    /// The base stopped being trunk material before the search ran.
    EmptyTrunk,
}

/// What a harvest did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// The tree base the harvest started from.
    pub base: VoxelPos,
    /// Trunk blocks broken.
    pub trunk_broken: usize,
    /// Canopy blocks broken.
    pub canopy_broken: usize,
    /// Item entities spawned at the base column.
    pub drops_spawned: usize,
    /// Replant entries newly scheduled.
    pub replants_scheduled: usize,
    /// Why no replant was scheduled, when none was.
    pub replant_skip: Option<ReplantSkip>,
    /// Whether the canopy was cut with shears from a nearby marker.
    pub sheared: bool,
}

/// Result of one trigger tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// A tree was harvested.
    Harvested(HarvestReport),
    /// Nothing happened.
    Skipped(HarvestSkip),
}

/// Totals from breaking one set.
#[derive(Debug, Clone, Copy, Default)]
struct BreakTotals {
    broken: usize,
    spawned: usize,
}

/// Runs harvests.
#[derive(Debug, Clone)]
pub struct Harvester {
    config: HarvestConfig,
    replant_enabled: bool,
    rng: StdRng,
}

impl Harvester {
    /// Create a harvester. The pitch jitter generator is seeded from
    /// `harvest.rng_seed`.
    pub fn new(harvest: &HarvestConfig, replant: &ReplantConfig) -> Self {
        Self {
            config: harvest.clone(),
            replant_enabled: replant.enabled,
            rng: StdRng::seed_from_u64(harvest.rng_seed),
        }
    }

    /// Run one admitted trigger for `marker`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::World`] if the host faults mid-harvest. Blocks
    /// already broken stay broken.
    pub fn on_trigger_tick<W>(
        &mut self,
        world: &mut W,
        store: &mut PendingReplantStore,
        marker: &Marker,
    ) -> Result<HarvestOutcome, CoreError>
    where
        W: WorldHost + ?Sized,
    {
        if !world.item_has_tag(&marker.held, ItemTag::Axes) {
            return Ok(HarvestOutcome::Skipped(HarvestSkip::NotAnAxe));
        }

        let Some(base) =
            search::find_tree_base(world, marker, &SearchBounds::trunk(&self.config))
        else {
            return Ok(HarvestOutcome::Skipped(HarvestSkip::NoTreeBase));
        };
        let HarvestSet { trunk, canopy } = search::collect(world, base, &self.config);
        if trunk.is_empty() {
            return Ok(HarvestOutcome::Skipped(HarvestSkip::EmptyTrunk));
        }

        let base_state = world.block_state(base);
        let shears = self.find_shears(world, marker);

        let trunk_totals = break_blocks(world, &trunk, &marker.held, base)?;
        let canopy_totals = if canopy.is_empty() {
            BreakTotals::default()
        } else {
            break_blocks(world, &canopy, &shears, base)?
        };

        let mut replants_scheduled = 0;
        let mut replant_skip = None;
        if trunk_totals.broken > 0 {
            if self.replant_enabled {
                match replant::plan_replant(world, base, &base_state, &trunk) {
                    Ok(plan) => replants_scheduled = replant::apply_plan(world, store, plan)?,
                    Err(skip) => replant_skip = Some(skip),
                }
            } else {
                replant_skip = Some(ReplantSkip::Disabled);
            }
        }

        if trunk_totals.broken > 0 || canopy_totals.broken > 0 {
            let pitch = jittered_pitch(
                self.config.sound_pitch_base,
                self.config.sound_pitch_spread,
                self.rng.random::<f32>(),
            );
            world.play_sound(
                base,
                SoundEvent::WoodBreak,
                SoundCategory::Blocks,
                self.config.sound_volume,
                pitch,
            );
        }

        let report = HarvestReport {
            base,
            trunk_broken: trunk_totals.broken,
            canopy_broken: canopy_totals.broken,
            drops_spawned: trunk_totals.spawned.saturating_add(canopy_totals.spawned),
            replants_scheduled,
            replant_skip,
            sheared: !shears.is_empty(),
        };
        tracing::info!(
            world = %world.world_id(),
            marker = %marker.id,
            base = %base,
            species = ?replant::resolve_species(world, &base_state),
            trunk = report.trunk_broken,
            canopy = report.canopy_broken,
            drops = report.drops_spawned,
            replants = report.replants_scheduled,
            "Harvested tree"
        );
        Ok(HarvestOutcome::Harvested(report))
    }

    /// The shears held by another marker near `marker`, or the empty stack.
    fn find_shears<W>(&self, world: &W, marker: &Marker) -> ItemStack
    where
        W: WorldHost + ?Sized,
    {
        let region = marker.bounds.expand(self.config.shears_search_expand);
        world
            .markers_in(&region)
            .into_iter()
            .find(|other| other.id != marker.id && world.is_shears(&other.held))
            .map_or_else(ItemStack::empty, |other| other.held)
    }
}

/// `low + spread * unit` for `unit` in `[0, 1)`, kept below `low + spread`.
/// Rounding that lands on the upper bound, or a zero spread, gives `low`.
fn jittered_pitch(low: f32, spread: f32, unit: f32) -> f32 {
    let pitch = spread.mul_add(unit, low);
    if pitch < low + spread { pitch } else { low }
}

/// Break every non-air block in `positions` with `tool`, then spawn the
/// pooled drops at `drop_target`.
fn break_blocks<W>(
    world: &mut W,
    positions: &BTreeSet<VoxelPos>,
    tool: &ItemStack,
    drop_target: VoxelPos,
) -> Result<BreakTotals, CoreError>
where
    W: WorldHost + ?Sized,
{
    let mut totals = BreakTotals::default();
    let mut drops = Vec::new();

    for &pos in positions {
        let state = world.block_state(pos);
        if state.is_air() {
            continue;
        }
        let stacks = world.dropped_stacks(&state, pos, tool)?;
        drops.extend(stacks.into_iter().filter(|stack| !stack.is_empty()));
        world.on_stacks_dropped(&state, pos, tool)?;
        world.set_block_state(pos, BlockState::air())?;
        world.emit_break_effect(pos, &state);
        totals.broken = totals.broken.saturating_add(1);
    }

    if totals.broken > 0 {
        totals.spawned = spawn_pooled_drops(world, drop_target, drops)?;
    }
    Ok(totals)
}

/// Spawn `drops` motionless at the bottom centre of `target`.
fn spawn_pooled_drops<W>(
    world: &mut W,
    target: VoxelPos,
    drops: Vec<ItemStack>,
) -> Result<usize, CoreError>
where
    W: WorldHost + ?Sized,
{
    let position = Vec3::new(
        f64::from(target.x) + 0.5,
        f64::from(target.y) + 0.25,
        f64::from(target.z) + 0.5,
    );
    let mut spawned: usize = 0;
    for stack in drops {
        world.spawn_item(ItemSpawn::at_rest(stack, position))?;
        spawned = spawned.saturating_add(1);
    }
    Ok(spawned)
}
