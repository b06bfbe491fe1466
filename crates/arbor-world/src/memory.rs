//! In-memory reference host.
//!
//! [`MemoryWorld`] implements [`WorldHost`] over plain maps. It knows the
//! vanilla tree blocks (logs, wood, leaves, saplings for every species),
//! a few soils, hoppers, and chests, with the same tag layout and block
//! properties the real host exposes. Tests build small worlds with it and
//! assert on the recorded effects; the demo engine runs a farm on it.
//!
//! Host behaviour that normally runs on its own (hoppers pushing items
//! down and sucking up loose items) is driven explicitly through
//! [`MemoryWorld::tick_conveyors`].

use std::collections::{BTreeMap, BTreeSet};

use arbor_types::{
    Aabb, BlockRegistry, BlockState, BlockTag, Identifier, ItemEntity, ItemEntityId, ItemSpawn,
    ItemStack, ItemTag, Marker, MarkerId, SoundCategory, SoundEvent, Species, Vec3, VoxelPos,
    WorldId,
};
use tracing::trace;

use crate::error::WorldError;
use crate::host::WorldHost;

/// Number of slots in a hopper.
const CONVEYOR_SLOTS: usize = 5;

/// Number of slots in a chest.
const CONTAINER_SLOTS: usize = 27;

/// Largest count a single slot holds.
const MAX_STACK: u32 = 64;

/// Default lowest buildable Y.
const DEFAULT_MIN_Y: i32 = -64;

/// Default highest buildable Y.
const DEFAULT_MAX_Y: i32 = 319;

/// Half-width of a loose item's bounding box.
const ITEM_HALF_WIDTH: f64 = 0.125;

/// Height of a loose item's bounding box.
const ITEM_HEIGHT: f64 = 0.25;

/// Half-extent of a marker's bounding box.
const MARKER_HALF_EXTENT: f64 = 0.375;

/// Vanilla tree species paths, in the order the registry lists them.
const SPECIES_PATHS: [&str; 8] = [
    "oak", "spruce", "birch", "jungle", "acacia", "dark_oak", "cherry", "pale_oak",
];

/// Blocks without properties.
const PLAIN_BLOCKS: [&str; 9] = [
    "air",
    "stone",
    "dirt",
    "grass_block",
    "podzol",
    "coarse_dirt",
    "glass",
    "chest",
    "torch",
];

/// Blocks a sapling can root in.
const SOILS: [&str; 4] = ["grass_block", "dirt", "podzol", "coarse_dirt"];

/// Items tagged as axes.
const AXES: [&str; 6] = [
    "wooden_axe",
    "stone_axe",
    "iron_axe",
    "golden_axe",
    "diamond_axe",
    "netherite_axe",
];

/// One block property: allowed values and the default.
#[derive(Debug, Clone)]
struct PropertyDef {
    default: String,
    allowed: Vec<String>,
}

impl PropertyDef {
    fn new(default: &str, allowed: &[&str]) -> Self {
        Self {
            default: default.to_owned(),
            allowed: allowed.iter().map(|v| (*v).to_owned()).collect(),
        }
    }
}

/// Registry entry for one block.
#[derive(Debug, Clone, Default)]
struct BlockDef {
    properties: BTreeMap<String, PropertyDef>,
}

impl BlockDef {
    fn with(mut self, name: &str, property: PropertyDef) -> Self {
        self.properties.insert(name.to_owned(), property);
        self
    }
}

/// A sound recorded by [`MemoryWorld`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedSound {
    /// Where it played.
    pub pos: VoxelPos,
    /// Which sound.
    pub sound: SoundEvent,
    /// Mixer category.
    pub category: SoundCategory,
    /// Volume.
    pub volume: f32,
    /// Pitch.
    pub pitch: f32,
}

/// A block-break effect recorded by [`MemoryWorld`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakEffect {
    /// Where the block broke.
    pub pos: VoxelPos,
    /// The state that broke.
    pub state: BlockState,
}

#[derive(Debug, Clone)]
struct MarkerEntity {
    marker: Marker,
    alive: bool,
}

/// Slot storage shared by hoppers and chests.
#[derive(Debug, Clone, Default)]
struct SlotBuffer {
    slots: Vec<ItemStack>,
}

impl SlotBuffer {
    fn is_empty(&self) -> bool {
        self.slots.iter().all(ItemStack::is_empty)
    }

    /// Insert as much of `stack` as fits, returning the count inserted.
    fn insert(&mut self, stack: &ItemStack, capacity: usize) -> u32 {
        let mut remaining = stack.count;
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.item == stack.item && slot.count < MAX_STACK {
                let moved = remaining.min(MAX_STACK.saturating_sub(slot.count));
                slot.count = slot.count.saturating_add(moved);
                remaining = remaining.saturating_sub(moved);
            }
        }
        while remaining > 0 && self.slots.len() < capacity {
            let moved = remaining.min(MAX_STACK);
            self.slots.push(ItemStack::new(stack.item.clone(), moved));
            remaining = remaining.saturating_sub(moved);
        }
        stack.count.saturating_sub(remaining)
    }

    /// Whether one more item of `item` would fit.
    fn accepts(&self, item: &Identifier, capacity: usize) -> bool {
        self.slots.len() < capacity
            || self
                .slots
                .iter()
                .any(|slot| &slot.item == item && slot.count < MAX_STACK)
    }

    /// Remove a single item from the first non-empty slot.
    fn take_one(&mut self) -> Option<ItemStack> {
        let slot = self.slots.iter_mut().find(|slot| !slot.is_empty())?;
        slot.count = slot.count.saturating_sub(1);
        let taken = ItemStack::new(slot.item.clone(), 1);
        self.slots.retain(|slot| !slot.is_empty());
        Some(taken)
    }
}

/// An in-memory world implementing [`WorldHost`].
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    id: WorldId,
    time: u64,
    min_y: i32,
    max_y: i32,
    registry: BTreeMap<Identifier, BlockDef>,
    block_tags: BTreeMap<BlockTag, BTreeSet<Identifier>>,
    soils: BTreeSet<Identifier>,
    axes: BTreeSet<Identifier>,
    blocks: BTreeMap<VoxelPos, BlockState>,
    markers: BTreeMap<MarkerId, MarkerEntity>,
    items: BTreeMap<ItemEntityId, ItemEntity>,
    conveyors: BTreeMap<VoxelPos, SlotBuffer>,
    containers: BTreeMap<VoxelPos, SlotBuffer>,
    dark: BTreeSet<VoxelPos>,
    faulty: BTreeSet<VoxelPos>,
    sounds: Vec<PlayedSound>,
    break_effects: Vec<BreakEffect>,
    spawns: Vec<ItemSpawn>,
    drop_hooks: Vec<VoxelPos>,
}

impl MemoryWorld {
    /// Create an empty world with every vanilla tree species registered.
    pub fn new(id: WorldId) -> Self {
        let mut world = Self {
            id,
            time: 0,
            min_y: DEFAULT_MIN_Y,
            max_y: DEFAULT_MAX_Y,
            registry: BTreeMap::new(),
            block_tags: BTreeMap::new(),
            soils: SOILS.into_iter().map(Identifier::vanilla).collect(),
            axes: AXES.into_iter().map(Identifier::vanilla).collect(),
            blocks: BTreeMap::new(),
            markers: BTreeMap::new(),
            items: BTreeMap::new(),
            conveyors: BTreeMap::new(),
            containers: BTreeMap::new(),
            dark: BTreeSet::new(),
            faulty: BTreeSet::new(),
            sounds: Vec::new(),
            break_effects: Vec::new(),
            spawns: Vec::new(),
            drop_hooks: Vec::new(),
        };
        world.register_vanilla();
        world
    }

    /// Remove pale oak from the registry, like a host that predates it.
    #[must_use]
    pub fn without_pale_oak(mut self) -> Self {
        self.registry.retain(|id, _| !id.path().contains("pale_oak"));
        for members in self.block_tags.values_mut() {
            members.retain(|id| !id.path().contains("pale_oak"));
        }
        self.block_tags.remove(&BlockTag::PaleOakLogs);
        self
    }

    fn register_vanilla(&mut self) {
        for path in PLAIN_BLOCKS {
            self.registry.insert(Identifier::vanilla(path), BlockDef::default());
        }

        self.registry.insert(
            Identifier::vanilla("hopper"),
            BlockDef::default()
                .with(
                    "facing",
                    PropertyDef::new("down", &["down", "north", "south", "west", "east"]),
                )
                .with("enabled", PropertyDef::new("true", &["true", "false"])),
        );

        let axis = PropertyDef::new("y", &["x", "y", "z"]);
        let distance = PropertyDef::new("7", &["1", "2", "3", "4", "5", "6", "7"]);
        let persistent = PropertyDef::new("false", &["true", "false"]);
        let stage = PropertyDef::new("0", &["0", "1"]);

        for (species, path) in Species::LOOKUP_ORDER.into_iter().zip(SPECIES_PATHS) {
            let trunk_blocks = [
                format!("{path}_log"),
                format!("{path}_wood"),
                format!("stripped_{path}_log"),
                format!("stripped_{path}_wood"),
            ];
            for block in &trunk_blocks {
                let id = Identifier::vanilla(block);
                self.registry
                    .insert(id.clone(), BlockDef::default().with("axis", axis.clone()));
                self.tag(BlockTag::Logs, id.clone());
                self.tag(species.log_tag(), id);
            }

            let leaves = Identifier::vanilla(&format!("{path}_leaves"));
            self.registry.insert(
                leaves.clone(),
                BlockDef::default()
                    .with("distance", distance.clone())
                    .with("persistent", persistent.clone()),
            );
            self.tag(BlockTag::Leaves, leaves);

            self.registry.insert(
                species.sapling_id(),
                BlockDef::default().with("stage", stage.clone()),
            );
        }
    }

    fn tag(&mut self, tag: BlockTag, block: Identifier) {
        self.block_tags.entry(tag).or_default().insert(block);
    }

    /// Restrict the buildable height range.
    #[must_use]
    pub const fn with_build_range(mut self, min_y: i32, max_y: i32) -> Self {
        self.min_y = min_y;
        self.max_y = max_y;
        self
    }

    // -----------------------------------------------------------------------
    // Setup helpers
    // -----------------------------------------------------------------------

    /// Set the world clock.
    pub const fn set_time(&mut self, time: u64) {
        self.time = time;
    }

    /// Advance the world clock.
    pub const fn advance_time(&mut self, ticks: u64) {
        self.time = self.time.saturating_add(ticks);
    }

    /// The default state of a vanilla block, if registered.
    pub fn default_state(&self, path: &str) -> Option<BlockState> {
        let id = Identifier::vanilla(path);
        let def = self.registry.get(&id)?;
        Some(BlockState {
            properties: def
                .properties
                .iter()
                .map(|(name, prop)| (name.clone(), prop.default.clone()))
                .collect(),
            block: id,
        })
    }

    /// Place the default state of a vanilla block.
    pub fn place(&mut self, pos: VoxelPos, path: &str) -> Result<(), WorldError> {
        let state = self
            .default_state(path)
            .ok_or_else(|| WorldError::UnknownBlock(Identifier::vanilla(path)))?;
        self.set_block_state(pos, state)
    }

    /// Fill the inclusive box between `a` and `b` with a vanilla block.
    pub fn fill(&mut self, a: VoxelPos, b: VoxelPos, path: &str) -> Result<(), WorldError> {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.place(VoxelPos::new(x, y, z), path)?;
                }
            }
        }
        Ok(())
    }

    /// Hang a marker on `support` at `position`, holding `held`.
    pub fn add_marker(&mut self, support: VoxelPos, position: Vec3, held: ItemStack) -> MarkerId {
        let id = MarkerId::new();
        let bounds = Aabb::new(
            Vec3::new(
                position.x - MARKER_HALF_EXTENT,
                position.y - MARKER_HALF_EXTENT,
                position.z - MARKER_HALF_EXTENT,
            ),
            Vec3::new(
                position.x + MARKER_HALF_EXTENT,
                position.y + MARKER_HALF_EXTENT,
                position.z + MARKER_HALF_EXTENT,
            ),
        );
        self.markers.insert(
            id,
            MarkerEntity {
                marker: Marker {
                    id,
                    held,
                    support,
                    position,
                    bounds,
                },
                alive: true,
            },
        );
        id
    }

    /// Kill a marker. It stays known but is no longer reported alive.
    pub fn remove_marker(&mut self, id: MarkerId) {
        if let Some(entity) = self.markers.get_mut(&id) {
            entity.alive = false;
        }
    }

    /// Replace the item a marker holds.
    pub fn set_marker_item(&mut self, id: MarkerId, held: ItemStack) {
        if let Some(entity) = self.markers.get_mut(&id) {
            entity.marker.held = held;
        }
    }

    /// Drop a loose item at an exact position.
    pub fn add_item(&mut self, stack: ItemStack, position: Vec3) -> ItemEntityId {
        let id = ItemEntityId::new();
        self.items.insert(
            id,
            ItemEntity {
                id,
                stack,
                position,
            },
        );
        id
    }

    /// Remove a loose item.
    pub fn remove_item(&mut self, id: ItemEntityId) {
        self.items.remove(&id);
    }

    /// All loose items, in id order.
    pub fn items(&self) -> Vec<ItemEntity> {
        self.items.values().cloned().collect()
    }

    /// Put items straight into the conveyor buffer at `pos`.
    pub fn insert_into_conveyor(
        &mut self,
        pos: VoxelPos,
        stack: &ItemStack,
    ) -> Result<u32, WorldError> {
        let buffer = self
            .conveyors
            .get_mut(&pos)
            .ok_or(WorldError::NoConveyor(pos))?;
        Ok(buffer.insert(stack, CONVEYOR_SLOTS))
    }

    /// Contents of the conveyor buffer at `pos`.
    pub fn conveyor_contents(&self, pos: VoxelPos) -> Option<&[ItemStack]> {
        self.conveyors.get(&pos).map(|buffer| buffer.slots.as_slice())
    }

    /// Drop the conveyor buffer at `pos` while leaving the block in place,
    /// like a host whose block entity failed to load.
    pub fn remove_conveyor_buffer(&mut self, pos: VoxelPos) {
        self.conveyors.remove(&pos);
    }

    /// Contents of the container at `pos`.
    pub fn container_contents(&self, pos: VoxelPos) -> Option<&[ItemStack]> {
        self.containers.get(&pos).map(|buffer| buffer.slots.as_slice())
    }

    /// Put items straight into the container at `pos`.
    pub fn insert_into_container(
        &mut self,
        pos: VoxelPos,
        stack: &ItemStack,
    ) -> Result<u32, WorldError> {
        let buffer = self.containers.get_mut(&pos).ok_or_else(|| WorldError::HostFault {
            pos,
            reason: "no container".to_owned(),
        })?;
        Ok(buffer.insert(stack, CONTAINER_SLOTS))
    }

    /// Mark `pos` as too dark for saplings (or lit again).
    pub fn set_dark(&mut self, pos: VoxelPos, dark: bool) {
        if dark {
            self.dark.insert(pos);
        } else {
            self.dark.remove(&pos);
        }
    }

    /// Make drop computation at `pos` fail with a host fault.
    pub fn set_faulty(&mut self, pos: VoxelPos) {
        self.faulty.insert(pos);
    }

    // -----------------------------------------------------------------------
    // Recorded effects
    // -----------------------------------------------------------------------

    /// Every sound played so far.
    pub fn sounds(&self) -> &[PlayedSound] {
        &self.sounds
    }

    /// Every break effect emitted so far.
    pub fn break_effects(&self) -> &[BreakEffect] {
        &self.break_effects
    }

    /// Every item spawn request so far.
    pub fn spawns(&self) -> &[ItemSpawn] {
        &self.spawns
    }

    /// Positions whose pre-removal drop hook ran, in call order.
    pub fn drop_hooks(&self) -> &[VoxelPos] {
        &self.drop_hooks
    }

    /// Forget recorded effects.
    pub fn clear_effects(&mut self) {
        self.sounds.clear();
        self.break_effects.clear();
        self.spawns.clear();
        self.drop_hooks.clear();
    }

    // -----------------------------------------------------------------------
    // Host-side conveyor behaviour
    // -----------------------------------------------------------------------

    /// Run one step of hopper behaviour: every non-empty conveyor pushes one
    /// item into the conveyor or container below it, then every conveyor
    /// picks up the loose items resting on it.
    pub fn tick_conveyors(&mut self) -> Result<(), WorldError> {
        let sources: Vec<VoxelPos> = self
            .conveyors
            .iter()
            .filter(|(_, buffer)| !buffer.is_empty())
            .map(|(pos, _)| *pos)
            .collect();

        for from in sources {
            let to = from.down();
            let Some(item) = self.conveyors.get(&from).and_then(|b| {
                b.slots.iter().find(|s| !s.is_empty()).map(|s| s.item.clone())
            }) else {
                continue;
            };

            let capacity = if self.conveyors.contains_key(&to) {
                CONVEYOR_SLOTS
            } else {
                CONTAINER_SLOTS
            };
            let target = if let Some(buffer) = self.conveyors.get_mut(&to) {
                Some(buffer)
            } else {
                self.containers.get_mut(&to)
            };
            let Some(target) = target.filter(|buffer| buffer.accepts(&item, capacity)) else {
                continue;
            };
            let one = ItemStack::new(item, 1);
            if target.insert(&one, capacity) > 0 {
                if let Some(source) = self.conveyors.get_mut(&from) {
                    source.take_one();
                }
                trace!(%from, %to, item = %one.item, "conveyor pushed item");
            }
        }

        let conveyors: Vec<VoxelPos> = self.conveyors.keys().copied().collect();
        for pos in conveyors {
            for item in self.conveyor_input_items(pos) {
                self.conveyor_absorb(pos, item.id)?;
            }
        }
        Ok(())
    }

    fn item_bounds(item: &ItemEntity) -> Aabb {
        Aabb::new(
            Vec3::new(
                item.position.x - ITEM_HALF_WIDTH,
                item.position.y,
                item.position.z - ITEM_HALF_WIDTH,
            ),
            Vec3::new(
                item.position.x + ITEM_HALF_WIDTH,
                item.position.y + ITEM_HEIGHT,
                item.position.z + ITEM_HALF_WIDTH,
            ),
        )
    }

    fn in_build_range(&self, pos: VoxelPos) -> bool {
        pos.y >= self.min_y && pos.y <= self.max_y
    }
}

impl BlockRegistry for MemoryWorld {
    fn is_registered(&self, block: &Identifier) -> bool {
        self.registry.contains_key(block)
    }

    fn decode_state(
        &self,
        block: &Identifier,
        properties: &BTreeMap<String, String>,
    ) -> Option<BlockState> {
        let def = self.registry.get(block)?;
        let mut state = BlockState {
            block: block.clone(),
            properties: def
                .properties
                .iter()
                .map(|(name, prop)| (name.clone(), prop.default.clone()))
                .collect(),
        };
        for (name, value) in properties {
            let accepted = def
                .properties
                .get(name)
                .is_some_and(|prop| prop.allowed.contains(value));
            if accepted {
                state.properties.insert(name.clone(), value.clone());
            }
        }
        Some(state)
    }
}

impl WorldHost for MemoryWorld {
    fn world_id(&self) -> &WorldId {
        &self.id
    }

    fn time(&self) -> u64 {
        self.time
    }

    fn block_state(&self, pos: VoxelPos) -> BlockState {
        self.blocks.get(&pos).cloned().unwrap_or_else(BlockState::air)
    }

    fn set_block_state(&mut self, pos: VoxelPos, state: BlockState) -> Result<(), WorldError> {
        if !self.in_build_range(pos) {
            return Err(WorldError::OutOfBuildRange {
                pos,
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        if !self.is_registered(&state.block) {
            return Err(WorldError::UnknownBlock(state.block));
        }

        if self.is_conveyor(&state) {
            self.conveyors.entry(pos).or_default();
        } else {
            self.conveyors.remove(&pos);
        }
        if state.block == Identifier::vanilla("chest") {
            self.containers.entry(pos).or_default();
        } else {
            self.containers.remove(&pos);
        }

        if state.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, state);
        }
        Ok(())
    }

    fn block_has_tag(&self, state: &BlockState, tag: BlockTag) -> bool {
        self.block_tags
            .get(&tag)
            .is_some_and(|members| members.contains(&state.block))
    }

    fn can_place_sapling(&self, _sapling: &BlockState, pos: VoxelPos) -> bool {
        let soil = self.block_state(pos.down());
        self.soils.contains(&soil.block) && !self.dark.contains(&pos)
    }

    fn item_has_tag(&self, stack: &ItemStack, tag: ItemTag) -> bool {
        match tag {
            ItemTag::Axes => !stack.is_empty() && self.axes.contains(&stack.item),
        }
    }

    fn is_shears(&self, stack: &ItemStack) -> bool {
        stack.is_of(&Identifier::vanilla("shears"))
    }

    fn dropped_stacks(
        &self,
        state: &BlockState,
        pos: VoxelPos,
        tool: &ItemStack,
    ) -> Result<Vec<ItemStack>, WorldError> {
        if self.faulty.contains(&pos) {
            return Err(WorldError::HostFault {
                pos,
                reason: "loot table evaluation failed".to_owned(),
            });
        }
        if state.is_air() {
            return Ok(Vec::new());
        }
        if self.block_has_tag(state, BlockTag::Leaves) && !self.is_shears(tool) {
            return Ok(Vec::new());
        }
        Ok(vec![ItemStack::new(state.block.clone(), 1)])
    }

    fn on_stacks_dropped(
        &mut self,
        _state: &BlockState,
        pos: VoxelPos,
        _tool: &ItemStack,
    ) -> Result<(), WorldError> {
        self.drop_hooks.push(pos);
        Ok(())
    }

    fn spawn_item(&mut self, spawn: ItemSpawn) -> Result<ItemEntityId, WorldError> {
        let id = self.add_item(spawn.stack.clone(), spawn.position);
        self.spawns.push(spawn);
        Ok(id)
    }

    fn drop_stack(&mut self, pos: VoxelPos, stack: ItemStack) -> Result<(), WorldError> {
        let position = Vec3::new(
            f64::from(pos.x) + 0.5,
            f64::from(pos.y) + 0.25,
            f64::from(pos.z) + 0.5,
        );
        self.spawn_item(ItemSpawn::at_rest(stack, position))?;
        Ok(())
    }

    fn alive_markers(&self) -> Vec<Marker> {
        self.markers
            .values()
            .filter(|entity| entity.alive)
            .map(|entity| entity.marker.clone())
            .collect()
    }

    fn markers_in(&self, region: &Aabb) -> Vec<Marker> {
        self.markers
            .values()
            .filter(|entity| entity.alive && entity.marker.bounds.intersects(region))
            .map(|entity| entity.marker.clone())
            .collect()
    }

    fn items_in(&self, region: &Aabb) -> Vec<ItemEntity> {
        self.items
            .values()
            .filter(|item| Self::item_bounds(item).intersects(region))
            .cloned()
            .collect()
    }

    fn conveyor_state(&self) -> BlockState {
        BlockState::vanilla("hopper")
            .with("enabled", "true")
            .with("facing", "down")
    }

    fn is_conveyor(&self, state: &BlockState) -> bool {
        state.is_of(&Identifier::vanilla("hopper"))
    }

    fn conveyor_is_empty(&self, pos: VoxelPos) -> Option<bool> {
        self.conveyors.get(&pos).map(SlotBuffer::is_empty)
    }

    fn conveyor_pull(&mut self, pos: VoxelPos) -> Result<bool, WorldError> {
        let above = pos.up();
        let Some(item) = self.containers.get(&above).and_then(|c| {
            c.slots.iter().find(|s| !s.is_empty()).map(|s| s.item.clone())
        }) else {
            if self.conveyors.contains_key(&pos) {
                return Ok(false);
            }
            return Err(WorldError::NoConveyor(pos));
        };

        let buffer = self
            .conveyors
            .get_mut(&pos)
            .ok_or(WorldError::NoConveyor(pos))?;
        if !buffer.accepts(&item, CONVEYOR_SLOTS) {
            return Ok(false);
        }
        let one = ItemStack::new(item, 1);
        buffer.insert(&one, CONVEYOR_SLOTS);
        if let Some(container) = self.containers.get_mut(&above) {
            container.take_one();
        }
        Ok(true)
    }

    fn conveyor_input_items(&self, pos: VoxelPos) -> Vec<ItemEntity> {
        let region = Aabb::new(
            Vec3::new(f64::from(pos.x), f64::from(pos.y) + 1.0, f64::from(pos.z)),
            Vec3::new(
                f64::from(pos.x) + 1.0,
                f64::from(pos.y) + 2.0,
                f64::from(pos.z) + 1.0,
            ),
        );
        self.items_in(&region)
    }

    fn conveyor_absorb(&mut self, pos: VoxelPos, item: ItemEntityId) -> Result<bool, WorldError> {
        let buffer = self
            .conveyors
            .get_mut(&pos)
            .ok_or(WorldError::NoConveyor(pos))?;
        let Some(entity) = self.items.get_mut(&item) else {
            return Ok(false);
        };

        let inserted = buffer.insert(&entity.stack, CONVEYOR_SLOTS);
        if inserted == 0 {
            return Ok(false);
        }
        entity.stack.count = entity.stack.count.saturating_sub(inserted);
        if entity.stack.is_empty() {
            self.items.remove(&item);
        }
        Ok(true)
    }

    fn emit_break_effect(&mut self, pos: VoxelPos, state: &BlockState) {
        self.break_effects.push(BreakEffect {
            pos,
            state: state.clone(),
        });
    }

    fn play_sound(
        &mut self,
        pos: VoxelPos,
        sound: SoundEvent,
        category: SoundCategory,
        volume: f32,
        pitch: f32,
    ) {
        self.sounds.push(PlayedSound {
            pos,
            sound,
            category,
            volume,
            pitch,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn world() -> MemoryWorld {
        MemoryWorld::new(WorldId::new("minecraft:overworld"))
    }

    #[test]
    fn unset_positions_read_as_air() {
        let w = world();
        assert!(w.is_air(VoxelPos::new(0, 64, 0)));
    }

    #[test]
    fn place_uses_registry_defaults() {
        let mut w = world();
        let pos = VoxelPos::new(0, 64, 0);
        w.place(pos, "oak_log").unwrap();
        assert_eq!(w.block_state(pos).property("axis"), Some("y"));
    }

    #[test]
    fn writes_outside_build_range_fail() {
        let mut w = world().with_build_range(0, 10);
        let result = w.place(VoxelPos::new(0, 11, 0), "stone");
        assert!(matches!(result, Err(WorldError::OutOfBuildRange { .. })));
    }

    #[test]
    fn unknown_blocks_are_rejected() {
        let mut w = world();
        let state = BlockState::vanilla("unobtainium");
        let result = w.set_block_state(VoxelPos::new(0, 0, 0), state);
        assert!(matches!(result, Err(WorldError::UnknownBlock(_))));
    }

    #[test]
    fn logs_carry_species_tags() {
        let w = world();
        let dark = w.default_state("dark_oak_log").unwrap();
        assert!(w.block_has_tag(&dark, BlockTag::Logs));
        assert!(w.block_has_tag(&dark, BlockTag::DarkOakLogs));
        assert!(!w.block_has_tag(&dark, BlockTag::OakLogs));
        let stripped = w.default_state("stripped_birch_wood").unwrap();
        assert!(w.block_has_tag(&stripped, BlockTag::BirchLogs));
    }

    #[test]
    fn without_pale_oak_drops_registry_entries() {
        let w = world().without_pale_oak();
        assert!(!w.is_registered(&Identifier::vanilla("pale_oak_sapling")));
        assert!(w.is_registered(&Identifier::vanilla("oak_sapling")));
    }

    #[test]
    fn decode_state_skips_unknown_properties_and_values() {
        let w = world();
        let mut props = BTreeMap::new();
        props.insert("facing".to_owned(), "north".to_owned());
        props.insert("enabled".to_owned(), "maybe".to_owned());
        props.insert("colour".to_owned(), "red".to_owned());
        let state = w.decode_state(&Identifier::vanilla("hopper"), &props).unwrap();
        assert_eq!(state.property("facing"), Some("north"));
        assert_eq!(state.property("enabled"), Some("true"));
        assert_eq!(state.property("colour"), None);
    }

    #[test]
    fn decode_state_rejects_unregistered_blocks() {
        let w = world();
        assert!(w.decode_state(&Identifier::vanilla("nope"), &BTreeMap::new()).is_none());
    }

    #[test]
    fn placing_a_hopper_creates_a_buffer_and_removing_it_drops_it() {
        let mut w = world();
        let pos = VoxelPos::new(0, 63, 0);
        w.place(pos, "hopper").unwrap();
        assert_eq!(w.conveyor_is_empty(pos), Some(true));
        w.place(pos, "dirt").unwrap();
        assert_eq!(w.conveyor_is_empty(pos), None);
    }

    #[test]
    fn absorb_moves_loose_items_into_the_buffer() {
        let mut w = world();
        let hopper = VoxelPos::new(0, 63, 0);
        w.place(hopper, "hopper").unwrap();
        let id = w.add_item(
            ItemStack::new(Identifier::vanilla("oak_log"), 3),
            Vec3::new(0.5, 64.25, 0.5),
        );
        let inputs = w.conveyor_input_items(hopper);
        assert_eq!(inputs.len(), 1);
        assert!(w.conveyor_absorb(hopper, id).unwrap());
        assert!(w.items().is_empty());
        assert_eq!(w.conveyor_is_empty(hopper), Some(false));
    }

    #[test]
    fn absorb_is_limited_by_slot_capacity() {
        let mut w = world();
        let hopper = VoxelPos::new(0, 63, 0);
        w.place(hopper, "hopper").unwrap();
        let id = w.add_item(
            ItemStack::new(Identifier::vanilla("oak_log"), 400),
            Vec3::new(0.5, 64.25, 0.5),
        );
        assert!(w.conveyor_absorb(hopper, id).unwrap());
        let left = w.items();
        assert_eq!(left.len(), 1);
        assert_eq!(left.first().map(|i| i.stack.count), Some(80));
        assert!(!w.conveyor_absorb(hopper, id).unwrap());
    }

    #[test]
    fn tick_conveyors_pushes_one_item_down_per_step() {
        let mut w = world();
        let hopper = VoxelPos::new(0, 63, 0);
        let chest = VoxelPos::new(0, 62, 0);
        w.place(hopper, "hopper").unwrap();
        w.place(chest, "chest").unwrap();
        w.insert_into_conveyor(hopper, &ItemStack::new(Identifier::vanilla("oak_log"), 2))
            .unwrap();

        w.tick_conveyors().unwrap();
        let held: u32 = w.conveyor_contents(hopper).unwrap().iter().map(|s| s.count).sum();
        assert_eq!(held, 1);
        assert!(w.conveyor_contents(chest).is_none());
        w.tick_conveyors().unwrap();
        assert_eq!(w.conveyor_is_empty(hopper), Some(true));
        let stored: u32 = w.container_contents(chest).unwrap().iter().map(|s| s.count).sum();
        assert_eq!(stored, 2);
    }

    #[test]
    fn pull_takes_from_container_above() {
        let mut w = world();
        let hopper = VoxelPos::new(0, 63, 0);
        let chest = VoxelPos::new(0, 64, 0);
        w.place(hopper, "hopper").unwrap();
        w.place(chest, "chest").unwrap();
        assert!(!w.conveyor_pull(hopper).unwrap());
        w.insert_into_container(chest, &ItemStack::vanilla("stick")).unwrap();
        assert!(w.conveyor_pull(hopper).unwrap());
        assert_eq!(w.conveyor_is_empty(hopper), Some(false));
    }

    #[test]
    fn conveyor_ops_without_buffer_fail() {
        let mut w = world();
        let pos = VoxelPos::new(0, 63, 0);
        assert!(matches!(w.conveyor_pull(pos), Err(WorldError::NoConveyor(_))));
        let id = w.add_item(ItemStack::vanilla("stick"), Vec3::new(0.5, 64.0, 0.5));
        assert!(matches!(
            w.conveyor_absorb(pos, id),
            Err(WorldError::NoConveyor(_))
        ));
    }

    #[test]
    fn leaves_drop_only_with_shears() {
        let w = world();
        let leaves = w.default_state("oak_leaves").unwrap();
        let pos = VoxelPos::new(0, 70, 0);
        assert!(w.dropped_stacks(&leaves, pos, &ItemStack::empty()).unwrap().is_empty());
        let sheared = w
            .dropped_stacks(&leaves, pos, &ItemStack::vanilla("shears"))
            .unwrap();
        assert_eq!(sheared.len(), 1);
    }

    #[test]
    fn faulty_positions_fail_drop_computation() {
        let mut w = world();
        let pos = VoxelPos::new(0, 64, 0);
        w.set_faulty(pos);
        let log = w.default_state("oak_log").unwrap();
        assert!(w.dropped_stacks(&log, pos, &ItemStack::empty()).is_err());
    }

    #[test]
    fn sapling_needs_soil_and_light() {
        let mut w = world();
        let pos = VoxelPos::new(0, 64, 0);
        let sapling = w.default_state("oak_sapling").unwrap();
        assert!(!w.can_place_sapling(&sapling, pos));
        w.place(pos.down(), "grass_block").unwrap();
        assert!(w.can_place_sapling(&sapling, pos));
        w.set_dark(pos, true);
        assert!(!w.can_place_sapling(&sapling, pos));
    }

    #[test]
    fn removed_markers_are_not_alive() {
        let mut w = world();
        let id = w.add_marker(
            VoxelPos::new(1, 64, 0),
            Vec3::new(1.97, 64.5, 0.5),
            ItemStack::vanilla("iron_axe"),
        );
        assert_eq!(w.alive_markers().len(), 1);
        w.remove_marker(id);
        assert!(w.alive_markers().is_empty());
    }

    #[test]
    fn axes_tag_excludes_empty_stacks() {
        let w = world();
        assert!(w.item_has_tag(&ItemStack::vanilla("diamond_axe"), ItemTag::Axes));
        assert!(!w.item_has_tag(&ItemStack::vanilla("shears"), ItemTag::Axes));
        assert!(!w.item_has_tag(&ItemStack::empty(), ItemTag::Axes));
    }

    #[test]
    fn effects_are_recorded_until_cleared() {
        let mut w = world();
        let pos = VoxelPos::new(0, 64, 0);
        let log = w.default_state("oak_log").unwrap();
        w.emit_break_effect(pos, &log);
        w.play_sound(pos, SoundEvent::WoodBreak, SoundCategory::Blocks, 1.0, 1.0);
        w.spawn_item(ItemSpawn::at_rest(ItemStack::vanilla("oak_log"), pos.center()))
            .unwrap();
        assert_eq!(w.break_effects().len(), 1);
        assert_eq!(w.sounds().len(), 1);
        assert_eq!(w.spawns().len(), 1);

        w.clear_effects();
        assert!(w.break_effects().is_empty());
        assert!(w.sounds().is_empty());
        assert!(w.spawns().is_empty());
        assert!(w.drop_hooks().is_empty());
        assert_eq!(w.items().len(), 1);
    }
}
