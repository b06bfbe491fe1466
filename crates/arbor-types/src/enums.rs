//! Enumeration types: tags, material classes, sapling species, sounds.
//!
//! Classification is always by tag membership, never by single block type,
//! so modded or mixed-species trunks are treated uniformly as long as the
//! host tags them.

use serde::{Deserialize, Serialize};

use crate::ident::Identifier;

/// Block tags the harvester queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    /// Any log or wood block.
    Logs,
    /// Any leaves block.
    Leaves,
    /// Oak logs and wood.
    OakLogs,
    /// Spruce logs and wood.
    SpruceLogs,
    /// Birch logs and wood.
    BirchLogs,
    /// Jungle logs and wood.
    JungleLogs,
    /// Acacia logs and wood.
    AcaciaLogs,
    /// Dark oak logs and wood.
    DarkOakLogs,
    /// Cherry logs and wood.
    CherryLogs,
    /// Pale oak logs and wood. Only present on hosts that ship pale oak.
    PaleOakLogs,
}

impl BlockTag {
    /// The host's registry key for this tag.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Logs => "minecraft:logs",
            Self::Leaves => "minecraft:leaves",
            Self::OakLogs => "minecraft:oak_logs",
            Self::SpruceLogs => "minecraft:spruce_logs",
            Self::BirchLogs => "minecraft:birch_logs",
            Self::JungleLogs => "minecraft:jungle_logs",
            Self::AcaciaLogs => "minecraft:acacia_logs",
            Self::DarkOakLogs => "minecraft:dark_oak_logs",
            Self::CherryLogs => "minecraft:cherry_logs",
            Self::PaleOakLogs => "minecraft:pale_oak_logs",
        }
    }
}

/// Item tags the harvester queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTag {
    /// Any axe.
    Axes,
}

/// Classification of a block for the flood-fill search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialClass {
    /// Woody structure of a tree.
    Trunk,
    /// Foliage of a tree.
    Canopy,
    /// Anything else.
    Other,
}

impl MaterialClass {
    /// The tag that defines membership in this class, if any.
    pub const fn tag(self) -> Option<BlockTag> {
        match self {
            Self::Trunk => Some(BlockTag::Logs),
            Self::Canopy => Some(BlockTag::Leaves),
            Self::Other => None,
        }
    }
}

/// Tree species, in the order the sapling lookup checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Oak.
    Oak,
    /// Spruce. Replanted as a 2x2 cluster.
    Spruce,
    /// Birch.
    Birch,
    /// Jungle. Replanted as a 2x2 cluster.
    Jungle,
    /// Acacia.
    Acacia,
    /// Dark oak. Replanted as a 2x2 cluster.
    DarkOak,
    /// Cherry.
    Cherry,
    /// Pale oak. Replanted as a 2x2 cluster when the host registers it.
    PaleOak,
}

impl Species {
    /// All species in lookup order. The first tag match wins.
    pub const LOOKUP_ORDER: [Self; 8] = [
        Self::Oak,
        Self::Spruce,
        Self::Birch,
        Self::Jungle,
        Self::Acacia,
        Self::DarkOak,
        Self::Cherry,
        Self::PaleOak,
    ];

    /// The log tag identifying this species' trunk.
    pub const fn log_tag(self) -> BlockTag {
        match self {
            Self::Oak => BlockTag::OakLogs,
            Self::Spruce => BlockTag::SpruceLogs,
            Self::Birch => BlockTag::BirchLogs,
            Self::Jungle => BlockTag::JungleLogs,
            Self::Acacia => BlockTag::AcaciaLogs,
            Self::DarkOak => BlockTag::DarkOakLogs,
            Self::Cherry => BlockTag::CherryLogs,
            Self::PaleOak => BlockTag::PaleOakLogs,
        }
    }

    /// Vanilla path of the sapling block.
    pub const fn sapling_path(self) -> &'static str {
        match self {
            Self::Oak => "oak_sapling",
            Self::Spruce => "spruce_sapling",
            Self::Birch => "birch_sapling",
            Self::Jungle => "jungle_sapling",
            Self::Acacia => "acacia_sapling",
            Self::DarkOak => "dark_oak_sapling",
            Self::Cherry => "cherry_sapling",
            Self::PaleOak => "pale_oak_sapling",
        }
    }

    /// Registry identifier of the sapling block.
    pub fn sapling_id(self) -> Identifier {
        Identifier::vanilla(self.sapling_path())
    }

    /// Whether the species only grows from a 2x2 sapling footprint.
    pub const fn requires_two_by_two(self) -> bool {
        matches!(
            self,
            Self::DarkOak | Self::Spruce | Self::Jungle | Self::PaleOak
        )
    }

    /// Whether the sapling may be missing from the host's registry.
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::PaleOak)
    }
}

/// Sound events the harvester plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEvent {
    /// Wood breaking.
    WoodBreak,
}

/// Mixer category for a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    /// Block sounds.
    Blocks,
}
