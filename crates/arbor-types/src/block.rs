//! Block states: a block identifier plus its property values.
//!
//! Properties are kept as a sorted string map (`facing=down`,
//! `axis=y`, ...). That is exactly the shape persisted for pending
//! replants, so encoding a state for storage is a field copy and decoding
//! goes through the host's [`BlockRegistry`](crate::BlockRegistry).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ident::Identifier;

/// Path of the empty block.
pub const AIR: &str = "air";

/// A block identifier with its property values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockState {
    /// Registry identifier of the block.
    pub block: Identifier,
    /// Property name to value, e.g. `facing` -> `down`.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    /// A state with no properties set.
    pub const fn of(block: Identifier) -> Self {
        Self {
            block,
            properties: BTreeMap::new(),
        }
    }

    /// Shorthand for a vanilla block with no properties.
    pub fn vanilla(path: &str) -> Self {
        Self::of(Identifier::vanilla(path))
    }

    /// The empty block.
    pub fn air() -> Self {
        Self::vanilla(AIR)
    }

    /// Whether this is the empty block.
    pub fn is_air(&self) -> bool {
        self.block.namespace() == crate::ident::DEFAULT_NAMESPACE && self.block.path() == AIR
    }

    /// Whether this state belongs to `block`, regardless of properties.
    pub fn is_of(&self, block: &Identifier) -> bool {
        &self.block == block
    }

    /// Return a copy with one property set.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Look up a property value.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

impl core::fmt::Display for BlockState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.block)?;
        if !self.properties.is_empty() {
            let joined = self
                .properties
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "[{joined}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_air() {
        assert!(BlockState::air().is_air());
        assert!(!BlockState::vanilla("oak_log").is_air());
    }

    #[test]
    fn with_sets_property() {
        let hopper = BlockState::vanilla("hopper").with("facing", "down");
        assert_eq!(hopper.property("facing"), Some("down"));
        assert_eq!(hopper.property("enabled"), None);
    }

    #[test]
    fn display_lists_properties_sorted() {
        let state = BlockState::vanilla("hopper")
            .with("facing", "down")
            .with("enabled", "true");
        assert_eq!(state.to_string(), "minecraft:hopper[enabled=true,facing=down]");
    }

    #[test]
    fn equality_includes_properties() {
        let a = BlockState::vanilla("oak_sapling").with("stage", "0");
        let b = BlockState::vanilla("oak_sapling").with("stage", "1");
        assert_ne!(a, b);
        assert!(a.is_of(&b.block));
    }
}
