//! Type-safe identifiers for host worlds and entities.
//!
//! Entities (markers, loose items) carry UUIDs like the host assigns them;
//! worlds are addressed by their registry key string (for example
//! `minecraft:overworld`). Distinct newtypes keep them from being mixed up
//! at compile time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a trigger marker entity.
    MarkerId
}

define_id! {
    /// Unique identifier for a loose item entity lying in the world.
    ItemEntityId
}

/// Registry key of a host world (dimension).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorldId(pub String);

impl WorldId {
    /// Wrap a world key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for WorldId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let marker = MarkerId::new();
        let item = ItemEntityId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(marker.into_inner(), Uuid::nil());
        assert_ne!(item.into_inner(), Uuid::nil());
    }

    #[test]
    fn marker_ids_are_unique() {
        assert_ne!(MarkerId::new(), MarkerId::new());
    }

    #[test]
    fn world_id_displays_key() {
        let world = WorldId::new("minecraft:overworld");
        assert_eq!(world.to_string(), "minecraft:overworld");
        assert_eq!(world.as_str(), "minecraft:overworld");
    }
}
