//! Shared value types for the Arbor tree harvesting core.
//!
//! Every crate in the workspace speaks in these types: grid positions,
//! block states, item stacks, tags, and the host entities the harvester
//! reacts to. Nothing in here touches a world; the types are plain values
//! with stable equality, ordering, and hashing so they can key maps.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers for worlds, markers, and item entities.
//! - [`ident`] -- Namespaced [`Identifier`] for blocks and items.
//! - [`pos`] -- [`VoxelPos`] grid coordinates, [`Vec3`] and [`Aabb`].
//! - [`block`] -- [`BlockState`]: identifier plus property map.
//! - [`item`] -- [`ItemStack`].
//! - [`enums`] -- Tags, material classes, sapling species, sounds.
//! - [`entity`] -- Host entity views: markers and loose items.
//! - [`replant`] -- [`PendingReplant`] records.
//! - [`registry`] -- The [`BlockRegistry`] capability used to decode
//!   stored block states.
//! - [`error`] -- [`TypesError`].
//!
//! [`Identifier`]: ident::Identifier
//! [`VoxelPos`]: pos::VoxelPos
//! [`Vec3`]: pos::Vec3
//! [`Aabb`]: pos::Aabb
//! [`BlockState`]: block::BlockState
//! [`ItemStack`]: item::ItemStack
//! [`BlockRegistry`]: registry::BlockRegistry
//! [`PendingReplant`]: replant::PendingReplant
//! [`TypesError`]: error::TypesError

pub mod block;
pub mod entity;
pub mod enums;
pub mod error;
pub mod ident;
pub mod ids;
pub mod item;
pub mod pos;
pub mod registry;
pub mod replant;

// Re-export all public types at crate root for convenience.
pub use block::BlockState;
pub use entity::{ItemEntity, ItemSpawn, Marker, PickupDelay};
pub use enums::{BlockTag, ItemTag, MaterialClass, SoundCategory, SoundEvent, Species};
pub use error::TypesError;
pub use ident::Identifier;
pub use ids::{ItemEntityId, MarkerId, WorldId};
pub use item::ItemStack;
pub use pos::{Aabb, Vec3, VoxelPos};
pub use registry::BlockRegistry;
pub use replant::PendingReplant;
