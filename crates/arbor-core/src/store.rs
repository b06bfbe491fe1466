//! Pending replants, keyed by world.
//!
//! The store is owned by whoever drives the tick (normally
//! [`HarvestService`](crate::service::HarvestService)); nothing here is
//! global. Each world's set carries a dirty flag that is raised by
//! additions, removals, and entries dropped during load, and cleared when
//! the set is persisted. Reads never mark dirty.
//!
//! A world's set also remembers whether its stored blob has been read. Sets
//! that were never loaded are not written back, since that would replace
//! the stored entries with whatever happened to be added since startup.
//! [`PendingReplantStore::ensure_loaded`] merges the stored entries in
//! before the first save.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use arbor_db::{PendingBlob, StorageBackend};
use arbor_types::{BlockRegistry, PendingReplant, VoxelPos, WorldId};

use crate::error::CoreError;

/// One world's pending replants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct WorldReplants {
    entries: BTreeMap<VoxelPos, PendingReplant>,
    dirty: bool,
    loaded: bool,
}

/// Pending replants for every world.
#[derive(Debug, Clone, Default)]
pub struct PendingReplantStore {
    worlds: BTreeMap<WorldId, WorldReplants>,
}

impl PendingReplantStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `pos` in `world` already has a pending replant.
    pub fn contains(&self, world: &WorldId, pos: VoxelPos) -> bool {
        self.worlds
            .get(world)
            .is_some_and(|set| set.entries.contains_key(&pos))
    }

    /// The pending replant at `pos`, if any.
    pub fn get(&self, world: &WorldId, pos: VoxelPos) -> Option<&PendingReplant> {
        self.worlds.get(world)?.entries.get(&pos)
    }

    /// Insert unless `pos` is already pending. Returns whether it was
    /// inserted.
    pub fn insert(&mut self, world: &WorldId, pos: VoxelPos, replant: PendingReplant) -> bool {
        let set = self.worlds.entry(world.clone()).or_default();
        if set.entries.contains_key(&pos) {
            return false;
        }
        set.entries.insert(pos, replant);
        set.dirty = true;
        true
    }

    /// Remove the entry at `pos`.
    pub fn remove(&mut self, world: &WorldId, pos: VoxelPos) -> Option<PendingReplant> {
        let set = self.worlds.get_mut(world)?;
        let removed = set.entries.remove(&pos)?;
        set.dirty = true;
        Some(removed)
    }

    /// Positions pending in `world`, in position order.
    pub fn positions(&self, world: &WorldId) -> Vec<VoxelPos> {
        self.worlds
            .get(world)
            .map(|set| set.entries.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of entries pending in `world`.
    pub fn len(&self, world: &WorldId) -> usize {
        self.worlds.get(world).map_or(0, |set| set.entries.len())
    }

    /// Whether `world` has no pending entries.
    pub fn is_empty(&self, world: &WorldId) -> bool {
        self.len(world) == 0
    }

    /// Whether `world` has unsaved changes.
    pub fn is_dirty(&self, world: &WorldId) -> bool {
        self.worlds.get(world).is_some_and(|set| set.dirty)
    }

    /// Whether `world`'s stored set has been read into the store.
    pub fn is_loaded(&self, world: &WorldId) -> bool {
        self.worlds.get(world).is_some_and(|set| set.loaded)
    }

    // =========================================================================
    // Persistence boundary
    // =========================================================================

    /// Encode `world`'s set as a storage blob.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if an entry cannot be encoded.
    pub fn snapshot(&self, world: &WorldId) -> Result<PendingBlob, CoreError> {
        match self.worlds.get(world) {
            Some(set) => Ok(PendingBlob::encode(&set.entries)?),
            None => Ok(PendingBlob::empty()),
        }
    }

    /// Replace `world`'s set with the decoded contents of `blob`.
    ///
    /// Entries that fail to decode are dropped and leave the set dirty so
    /// the next save purges them. Returns the number of entries restored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the blob version is unsupported.
    pub fn restore<R>(
        &mut self,
        world: &WorldId,
        blob: &PendingBlob,
        registry: &R,
    ) -> Result<usize, CoreError>
    where
        R: BlockRegistry + ?Sized,
    {
        let decoded = blob.decode(registry)?;
        let restored = decoded.entries.len();
        if decoded.dropped > 0 {
            tracing::warn!(
                world = %world,
                dropped = decoded.dropped,
                "Dropped corrupt pending replants; set marked dirty"
            );
        }
        self.worlds.insert(
            world.clone(),
            WorldReplants {
                entries: decoded.entries.into_iter().collect(),
                dirty: decoded.dropped > 0,
                loaded: true,
            },
        );
        Ok(restored)
    }

    /// Load `world`'s set from `backend`. Missing storage yields an empty,
    /// clean set. Returns the number of entries loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the stored blob cannot be read,
    /// parsed, or is from an unsupported version.
    pub fn load_world<B, R>(
        &mut self,
        world: &WorldId,
        backend: &B,
        registry: &R,
    ) -> Result<usize, CoreError>
    where
        B: StorageBackend + ?Sized,
        R: BlockRegistry + ?Sized,
    {
        let Some(blob) = backend.load(world)? else {
            self.worlds.insert(
                world.clone(),
                WorldReplants {
                    loaded: true,
                    ..WorldReplants::default()
                },
            );
            return Ok(0);
        };
        let loaded = self.restore(world, &blob, registry)?;
        tracing::info!(world = %world, loaded, "Loaded pending replants");
        Ok(loaded)
    }

    /// Read `world`'s stored set unless that already happened.
    ///
    /// Unlike [`load_world`](Self::load_world) this keeps entries added
    /// before the load: stored entries fill only positions not already
    /// pending. Returns the number of stored entries merged in.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the stored blob cannot be read,
    /// parsed, or is from an unsupported version. The set stays unloaded.
    pub fn ensure_loaded<B, R>(
        &mut self,
        world: &WorldId,
        backend: &B,
        registry: &R,
    ) -> Result<usize, CoreError>
    where
        B: StorageBackend + ?Sized,
        R: BlockRegistry + ?Sized,
    {
        if self.is_loaded(world) {
            return Ok(0);
        }
        let decoded = match backend.load(world)? {
            Some(blob) => Some(blob.decode(registry)?),
            None => None,
        };

        let set = self.worlds.entry(world.clone()).or_default();
        set.loaded = true;
        let Some(decoded) = decoded else {
            return Ok(0);
        };
        if decoded.dropped > 0 {
            tracing::warn!(
                world = %world,
                dropped = decoded.dropped,
                "Dropped corrupt pending replants; set marked dirty"
            );
            set.dirty = true;
        }
        let mut merged: usize = 0;
        for (pos, replant) in decoded.entries {
            if let Entry::Vacant(slot) = set.entries.entry(pos) {
                slot.insert(replant);
                merged = merged.saturating_add(1);
            }
        }
        tracing::info!(world = %world, merged, "Loaded pending replants");
        Ok(merged)
    }

    /// Persist every dirty, loaded world to `backend` and clear its flag.
    /// Dirty worlds that were never loaded are skipped and stay dirty.
    /// Returns how many worlds were written.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] on the first failed write; worlds not
    /// yet written stay dirty.
    pub fn persist_dirty<B>(&mut self, backend: &B) -> Result<usize, CoreError>
    where
        B: StorageBackend + ?Sized,
    {
        let mut written: usize = 0;
        for (world, set) in self.worlds.iter_mut().filter(|(_, set)| set.dirty) {
            if !set.loaded {
                tracing::warn!(
                    world = %world,
                    entries = set.entries.len(),
                    "Not saving pending replants for a world that was never loaded"
                );
                continue;
            }
            let blob = PendingBlob::encode(&set.entries)?;
            backend.persist(world, &blob)?;
            set.dirty = false;
            written = written.saturating_add(1);
            tracing::debug!(world = %world, entries = set.entries.len(), "Persisted pending replants");
        }
        Ok(written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use arbor_db::StorageError;
    use arbor_types::BlockState;
    use arbor_world::MemoryWorld;

    use super::*;

    /// Blobs kept in memory, keyed by world.
    #[derive(Default)]
    struct MemoryBackend {
        blobs: RefCell<BTreeMap<WorldId, PendingBlob>>,
    }

    impl StorageBackend for MemoryBackend {
        fn load(&self, world: &WorldId) -> Result<Option<PendingBlob>, StorageError> {
            Ok(self.blobs.borrow().get(world).cloned())
        }

        fn persist(&self, world: &WorldId, blob: &PendingBlob) -> Result<(), StorageError> {
            self.blobs.borrow_mut().insert(world.clone(), blob.clone());
            Ok(())
        }
    }

    fn overworld() -> WorldId {
        WorldId::new("minecraft:overworld")
    }

    fn replant(tick: u64) -> PendingReplant {
        PendingReplant::new(
            BlockState::vanilla("oak_sapling").with("stage", "0"),
            BlockState::vanilla("grass_block"),
            tick,
        )
    }

    #[test]
    fn insert_is_idempotent_on_position() {
        let mut store = PendingReplantStore::new();
        let pos = VoxelPos::new(0, 64, 0);
        assert!(store.insert(&overworld(), pos, replant(1)));
        assert!(!store.insert(&overworld(), pos, replant(2)));
        assert_eq!(store.len(&overworld()), 1);
        assert_eq!(store.get(&overworld(), pos).unwrap().created_tick, 1);
    }

    #[test]
    fn worlds_are_independent() {
        let mut store = PendingReplantStore::new();
        let nether = WorldId::new("minecraft:the_nether");
        let pos = VoxelPos::new(0, 64, 0);
        store.insert(&overworld(), pos, replant(1));
        assert!(store.insert(&nether, pos, replant(1)));
        store.remove(&nether, pos);
        assert!(store.contains(&overworld(), pos));
        assert!(!store.contains(&nether, pos));
    }

    #[test]
    fn additions_and_removals_mark_dirty_reads_do_not() {
        let mut store = PendingReplantStore::new();
        let registry = MemoryWorld::new(overworld());
        let pos = VoxelPos::new(0, 64, 0);
        store.insert(&overworld(), pos, replant(1));
        let blob = store.snapshot(&overworld()).unwrap();

        let mut fresh = PendingReplantStore::new();
        fresh.restore(&overworld(), &blob, &registry).unwrap();
        assert!(!fresh.is_dirty(&overworld()));
        let _ = fresh.get(&overworld(), pos);
        let _ = fresh.positions(&overworld());
        assert!(!fresh.is_dirty(&overworld()));
        fresh.remove(&overworld(), pos);
        assert!(fresh.is_dirty(&overworld()));
    }

    #[test]
    fn restore_with_dropped_entries_is_dirty() {
        let registry = MemoryWorld::new(overworld());
        let blob = PendingBlob::from_json(
            r#"{"version":1,"entries":[
                {"pos":0,"sapling_id":"minecraft:oak_sapling","below_id":"minecraft:dirt"},
                {"pos":1,"sapling_id":"modded:gone","below_id":"minecraft:dirt"}
            ]}"#,
        )
        .unwrap();
        let mut store = PendingReplantStore::new();
        assert_eq!(store.restore(&overworld(), &blob, &registry).unwrap(), 1);
        assert!(store.is_dirty(&overworld()));
    }

    #[test]
    fn persist_skips_worlds_that_were_never_loaded() {
        let backend = MemoryBackend::default();
        let mut store = PendingReplantStore::new();
        store.insert(&overworld(), VoxelPos::new(0, 64, 0), replant(1));

        assert_eq!(store.persist_dirty(&backend).unwrap(), 0);
        assert!(store.is_dirty(&overworld()));
        assert!(backend.load(&overworld()).unwrap().is_none());
    }

    #[test]
    fn ensure_loaded_keeps_entries_added_before_the_load() {
        let backend = MemoryBackend::default();
        let registry = MemoryWorld::new(overworld());
        let stored = VoxelPos::new(5, 64, 5);
        let added = VoxelPos::new(0, 64, 0);
        let both = VoxelPos::new(9, 64, 9);
        backend
            .persist(
                &overworld(),
                &PendingBlob::encode([(&stored, &replant(1)), (&both, &replant(2))]).unwrap(),
            )
            .unwrap();

        let mut store = PendingReplantStore::new();
        store.insert(&overworld(), added, replant(3));
        store.insert(&overworld(), both, replant(4));
        assert!(!store.is_loaded(&overworld()));

        assert_eq!(store.ensure_loaded(&overworld(), &backend, &registry).unwrap(), 1);
        assert!(store.is_loaded(&overworld()));
        assert_eq!(store.positions(&overworld()), vec![added, stored, both]);
        assert_eq!(store.get(&overworld(), both).unwrap().created_tick, 4);

        // A second call does not read storage again.
        assert_eq!(store.ensure_loaded(&overworld(), &backend, &registry).unwrap(), 0);

        assert_eq!(store.persist_dirty(&backend).unwrap(), 1);
        let blob = backend.load(&overworld()).unwrap().unwrap();
        assert_eq!(blob.entries.len(), 3);
    }

    #[test]
    fn loading_a_missing_world_allows_saving() {
        let backend = MemoryBackend::default();
        let registry = MemoryWorld::new(overworld());
        let mut store = PendingReplantStore::new();
        assert_eq!(store.ensure_loaded(&overworld(), &backend, &registry).unwrap(), 0);
        assert!(!store.is_dirty(&overworld()));

        store.insert(&overworld(), VoxelPos::new(0, 64, 0), replant(1));
        assert_eq!(store.persist_dirty(&backend).unwrap(), 1);
        assert!(!store.is_dirty(&overworld()));
    }
}
