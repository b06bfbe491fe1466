//! The versioned pending-replant blob.
//!
//! A blob is `{"version": 1, "entries": [...]}`. Entries are kept as raw
//! JSON values until decode time so that one malformed entry (wrong field
//! types, an unparseable identifier, a block the host no longer registers)
//! is dropped on its own while the rest of the set loads.
//!
//! Entry fields:
//!
//! | Field           | Type              | Missing         |
//! |-----------------|-------------------|-----------------|
//! | `pos`           | packed `i64`      | entry dropped   |
//! | `sapling_id`    | identifier string | entry dropped   |
//! | `sapling_props` | string map        | empty map       |
//! | `below_id`      | identifier string | entry dropped   |
//! | `below_props`   | string map        | empty map       |
//! | `created_tick`  | `u64`             | `0`             |

use std::collections::BTreeMap;

use arbor_types::{BlockRegistry, BlockState, Identifier, PendingReplant, VoxelPos};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Blob format version this build reads and writes.
pub const BLOB_VERSION: u32 = 1;

/// One pending replant in its stored form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Packed planting position.
    pub pos: i64,
    /// Sapling block identifier.
    pub sapling_id: String,
    /// Sapling block properties.
    #[serde(default)]
    pub sapling_props: BTreeMap<String, String>,
    /// Identifier of the block captured below the planting cell.
    pub below_id: String,
    /// Properties of the block captured below the planting cell.
    #[serde(default)]
    pub below_props: BTreeMap<String, String>,
    /// World time the entry was created at.
    #[serde(default)]
    pub created_tick: u64,
}

impl StoredEntry {
    /// Encode a live entry.
    pub fn encode(pos: VoxelPos, replant: &PendingReplant) -> Self {
        Self {
            pos: pos.pack(),
            sapling_id: replant.sapling.block.to_string(),
            sapling_props: replant.sapling.properties.clone(),
            below_id: replant.below.block.to_string(),
            below_props: replant.below.properties.clone(),
            created_tick: replant.created_tick,
        }
    }

    /// Decode against the host registry.
    ///
    /// # Errors
    ///
    /// Returns a short reason when an identifier does not parse or names a
    /// block the registry does not know.
    pub fn decode<R>(&self, registry: &R) -> Result<(VoxelPos, PendingReplant), &'static str>
    where
        R: BlockRegistry + ?Sized,
    {
        let sapling = decode_state(registry, &self.sapling_id, &self.sapling_props)?;
        let below = decode_state(registry, &self.below_id, &self.below_props)?;
        Ok((
            VoxelPos::unpack(self.pos),
            PendingReplant::new(sapling, below, self.created_tick),
        ))
    }
}

fn decode_state<R>(
    registry: &R,
    raw: &str,
    properties: &BTreeMap<String, String>,
) -> Result<BlockState, &'static str>
where
    R: BlockRegistry + ?Sized,
{
    let id = Identifier::parse(raw).map_err(|_| "invalid identifier")?;
    registry
        .decode_state(&id, properties)
        .ok_or("unregistered block")
}

/// A world's pending replants as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBlob {
    /// Format version.
    pub version: u32,
    /// Entries, undecoded.
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
}

/// Result of decoding a blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBlob {
    /// Entries that decoded, in stored order.
    pub entries: Vec<(VoxelPos, PendingReplant)>,
    /// Number of entries that were dropped.
    pub dropped: usize,
}

impl PendingBlob {
    /// An empty blob at the current version.
    pub const fn empty() -> Self {
        Self {
            version: BLOB_VERSION,
            entries: Vec::new(),
        }
    }

    /// Encode live entries into a fresh blob.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if an entry cannot be turned
    /// into JSON.
    pub fn encode<'a, I>(entries: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (&'a VoxelPos, &'a PendingReplant)>,
    {
        let entries = entries
            .into_iter()
            .map(|(pos, replant)| serde_json::to_value(StoredEntry::encode(*pos, replant)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            version: BLOB_VERSION,
            entries,
        })
    }

    /// Parse a blob from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if the outer structure is not
    /// a blob.
    pub fn from_json(text: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the blob as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if rendering fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode every entry against the host registry, dropping the ones
    /// that fail.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnsupportedVersion`] if the blob is from
    /// another format version. Individual entry failures are not errors.
    pub fn decode<R>(&self, registry: &R) -> Result<DecodedBlob, StorageError>
    where
        R: BlockRegistry + ?Sized,
    {
        if self.version != BLOB_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: self.version,
                expected: BLOB_VERSION,
            });
        }

        let mut decoded = DecodedBlob::default();
        for (index, raw) in self.entries.iter().enumerate() {
            let entry = match StoredEntry::deserialize(raw) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping malformed pending replant");
                    decoded.dropped = decoded.dropped.saturating_add(1);
                    continue;
                }
            };
            match entry.decode(registry) {
                Ok(pair) => decoded.entries.push(pair),
                Err(reason) => {
                    tracing::warn!(
                        index,
                        reason,
                        sapling = %entry.sapling_id,
                        below = %entry.below_id,
                        "Dropping undecodable pending replant"
                    );
                    decoded.dropped = decoded.dropped.saturating_add(1);
                }
            }
        }
        Ok(decoded)
    }
}

impl Default for PendingBlob {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use arbor_types::WorldId;
    use arbor_world::MemoryWorld;

    use super::*;

    fn registry() -> MemoryWorld {
        MemoryWorld::new(WorldId::new("minecraft:overworld"))
    }

    fn entry(tick: u64) -> PendingReplant {
        PendingReplant::new(
            BlockState::vanilla("dark_oak_sapling").with("stage", "0"),
            BlockState::vanilla("grass_block"),
            tick,
        )
    }

    #[test]
    fn encode_then_decode_preserves_entries() {
        let pos = VoxelPos::new(-3, 64, 1_000_000);
        let replant = entry(1234);
        let blob = PendingBlob::encode([(&pos, &replant)]).unwrap();
        let text = blob.to_json().unwrap();
        let decoded = PendingBlob::from_json(&text).unwrap().decode(&registry()).unwrap();
        assert_eq!(decoded.dropped, 0);
        assert_eq!(decoded.entries, vec![(pos, replant)]);
    }

    #[test]
    fn missing_props_and_tick_take_defaults() {
        let text = r#"{"version":1,"entries":[
            {"pos":0,"sapling_id":"minecraft:oak_sapling","below_id":"minecraft:dirt"}
        ]}"#;
        let decoded = PendingBlob::from_json(text).unwrap().decode(&registry()).unwrap();
        let (_, replant) = decoded.entries.first().unwrap();
        assert_eq!(replant.created_tick, 0);
        assert_eq!(replant.sapling.property("stage"), Some("0"));
        assert!(replant.below.properties.is_empty());
    }

    #[test]
    fn bad_entries_are_dropped_individually() {
        let text = r#"{"version":1,"entries":[
            {"pos":1,"sapling_id":"minecraft:oak_sapling","below_id":"minecraft:dirt","created_tick":5},
            {"pos":2,"sapling_id":"Not A Valid Id","below_id":"minecraft:dirt"},
            {"pos":3,"sapling_id":"modded:ghost_sapling","below_id":"minecraft:dirt"},
            {"pos":"four","sapling_id":"minecraft:oak_sapling","below_id":"minecraft:dirt"},
            {"sapling_id":"minecraft:oak_sapling","below_id":"minecraft:dirt"}
        ]}"#;
        let decoded = PendingBlob::from_json(text).unwrap().decode(&registry()).unwrap();
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.dropped, 4);
    }

    #[test]
    fn unknown_property_values_fall_back_to_defaults() {
        let text = r#"{"version":1,"entries":[
            {"pos":0,"sapling_id":"minecraft:oak_sapling","sapling_props":{"stage":"9","age":"3"},
             "below_id":"minecraft:hopper","below_props":{"facing":"west"}}
        ]}"#;
        let decoded = PendingBlob::from_json(text).unwrap().decode(&registry()).unwrap();
        let (_, replant) = decoded.entries.first().unwrap();
        assert_eq!(replant.sapling.property("stage"), Some("0"));
        assert_eq!(replant.sapling.property("age"), None);
        assert_eq!(replant.below.property("facing"), Some("west"));
    }

    #[test]
    fn other_versions_are_rejected() {
        let blob = PendingBlob {
            version: 2,
            entries: Vec::new(),
        };
        assert!(matches!(
            blob.decode(&registry()),
            Err(StorageError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn unregistered_pale_oak_entries_drop_on_older_hosts() {
        let pos = VoxelPos::new(0, 64, 0);
        let replant = PendingReplant::new(
            BlockState::vanilla("pale_oak_sapling"),
            BlockState::vanilla("grass_block"),
            7,
        );
        let blob = PendingBlob::encode([(&pos, &replant)]).unwrap();
        let decoded = blob.decode(&registry().without_pale_oak()).unwrap();
        assert!(decoded.entries.is_empty());
        assert_eq!(decoded.dropped, 1);
    }
}
