//! The world host trait.
//!
//! Everything the harvester needs from the game world goes through
//! [`WorldHost`]. A host implements it once against its own world; the
//! harvester calls it from the world's tick thread only, so no method
//! needs to be thread-safe.
//!
//! Methods that mutate or compute on the host's behalf return
//! [`WorldError`] so host faults reach the tick driver instead of being
//! hidden. Pure queries are infallible.

use arbor_types::{
    Aabb, BlockRegistry, BlockState, BlockTag, ItemEntity, ItemEntityId, ItemSpawn, ItemStack,
    ItemTag, Marker, MaterialClass, SoundCategory, SoundEvent, VoxelPos, WorldId,
};

use crate::error::WorldError;

/// Capabilities the harvester consumes from a host world.
pub trait WorldHost: BlockRegistry {
    // -----------------------------------------------------------------------
    // Identity and time
    // -----------------------------------------------------------------------

    /// Registry key of this world.
    fn world_id(&self) -> &WorldId;

    /// Current world time in ticks.
    fn time(&self) -> u64;

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// The block state at `pos`. Unloaded or empty positions read as air.
    fn block_state(&self, pos: VoxelPos) -> BlockState;

    /// Replace the block at `pos`, notifying neighbours and clients.
    fn set_block_state(&mut self, pos: VoxelPos, state: BlockState) -> Result<(), WorldError>;

    /// Whether the block at `pos` is air.
    fn is_air(&self, pos: VoxelPos) -> bool {
        self.block_state(pos).is_air()
    }

    /// Whether `state` is a member of `tag`.
    fn block_has_tag(&self, state: &BlockState, tag: BlockTag) -> bool;

    /// Classify the block at `pos` for the flood-fill search.
    fn classify(&self, pos: VoxelPos) -> MaterialClass {
        let state = self.block_state(pos);
        if self.block_has_tag(&state, BlockTag::Logs) {
            MaterialClass::Trunk
        } else if self.block_has_tag(&state, BlockTag::Leaves) {
            MaterialClass::Canopy
        } else {
            MaterialClass::Other
        }
    }

    /// Whether the sapling `sapling` could survive at `pos` (soil, light).
    /// Does not check that `pos` is empty.
    fn can_place_sapling(&self, sapling: &BlockState, pos: VoxelPos) -> bool;

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Whether `stack` is a member of `tag`. Empty stacks belong to no tag.
    fn item_has_tag(&self, stack: &ItemStack, tag: ItemTag) -> bool;

    /// Whether `stack` is a pair of shears.
    fn is_shears(&self, stack: &ItemStack) -> bool;

    /// The stacks a block would drop when broken with `tool` (possibly the
    /// empty stack, meaning bare hands with no enchantment bonus).
    fn dropped_stacks(
        &self,
        state: &BlockState,
        pos: VoxelPos,
        tool: &ItemStack,
    ) -> Result<Vec<ItemStack>, WorldError>;

    /// Hook run right before a broken block's drops are handed out
    /// (experience orbs, silverfish, and similar host side effects).
    fn on_stacks_dropped(
        &mut self,
        state: &BlockState,
        pos: VoxelPos,
        tool: &ItemStack,
    ) -> Result<(), WorldError>;

    /// Spawn a loose item entity.
    fn spawn_item(&mut self, spawn: ItemSpawn) -> Result<ItemEntityId, WorldError>;

    /// Drop `stack` at the block position the way the host drops loot.
    fn drop_stack(&mut self, pos: VoxelPos, stack: ItemStack) -> Result<(), WorldError>;

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    /// Every alive trigger marker in the world.
    fn alive_markers(&self) -> Vec<Marker>;

    /// Alive markers whose bounding box intersects `region`.
    fn markers_in(&self, region: &Aabb) -> Vec<Marker>;

    /// Alive loose items whose bounding box intersects `region`.
    fn items_in(&self, region: &Aabb) -> Vec<ItemEntity>;

    // -----------------------------------------------------------------------
    // Conveyors
    // -----------------------------------------------------------------------

    /// The state used when installing a conveyor under a planting cell
    /// (a hopper facing down).
    fn conveyor_state(&self) -> BlockState;

    /// Whether `state` is a conveyor block.
    fn is_conveyor(&self, state: &BlockState) -> bool;

    /// Whether the conveyor buffer at `pos` is empty, or `None` when the
    /// position has no conveyor buffer.
    fn conveyor_is_empty(&self, pos: VoxelPos) -> Option<bool>;

    /// Let the conveyor at `pos` pull one item from whatever feeds it from
    /// above (an inventory block). Returns whether anything moved.
    fn conveyor_pull(&mut self, pos: VoxelPos) -> Result<bool, WorldError>;

    /// Loose items the conveyor at `pos` can pick up.
    fn conveyor_input_items(&self, pos: VoxelPos) -> Vec<ItemEntity>;

    /// Move as much of the loose item `item` as fits into the conveyor at
    /// `pos`. Returns whether anything moved.
    fn conveyor_absorb(&mut self, pos: VoxelPos, item: ItemEntityId) -> Result<bool, WorldError>;

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    /// Broadcast the block-break particles and sound for `state` at `pos`.
    fn emit_break_effect(&mut self, pos: VoxelPos, state: &BlockState);

    /// Play a sound at `pos`.
    fn play_sound(
        &mut self,
        pos: VoxelPos,
        sound: SoundEvent,
        category: SoundCategory,
        volume: f32,
        pitch: f32,
    );
}
