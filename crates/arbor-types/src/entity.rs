//! Views of host entities: trigger markers and loose items.
//!
//! The host owns the real entities. These structs are the snapshot the
//! harvester reads each tick, plus the request shape for spawning a new
//! loose item.

use serde::{Deserialize, Serialize};

use crate::ids::{ItemEntityId, MarkerId};
use crate::item::ItemStack;
use crate::pos::{Aabb, Vec3, VoxelPos};

/// A trigger marker (an item frame on the host) and the item it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Entity identifier.
    pub id: MarkerId,
    /// The item displayed by the marker.
    pub held: ItemStack,
    /// The block the marker hangs on.
    pub support: VoxelPos,
    /// Entity position.
    pub position: Vec3,
    /// Entity bounding box.
    pub bounds: Aabb,
}

/// A loose item lying in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEntity {
    /// Entity identifier.
    pub id: ItemEntityId,
    /// The items carried.
    pub stack: ItemStack,
    /// Entity position (bottom centre).
    pub position: Vec3,
}

/// Pickup delay applied to a spawned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PickupDelay {
    /// The host's default delay.
    #[default]
    Default,
    /// An explicit delay in ticks.
    Ticks(u32),
}

/// Request to spawn a loose item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpawn {
    /// The items to spawn.
    pub stack: ItemStack,
    /// Where to spawn them.
    pub position: Vec3,
    /// Initial velocity.
    pub velocity: Vec3,
    /// Pickup delay.
    pub pickup_delay: PickupDelay,
}

impl ItemSpawn {
    /// A motionless item with the default pickup delay.
    pub const fn at_rest(stack: ItemStack, position: Vec3) -> Self {
        Self {
            stack,
            position,
            velocity: Vec3::ZERO,
            pickup_delay: PickupDelay::Default,
        }
    }
}
