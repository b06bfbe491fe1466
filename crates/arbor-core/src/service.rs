//! The per-world tick driver.
//!
//! [`HarvestService`] owns every piece of harvester state: the pending
//! replant store, the trigger throttle, and the jitter generator inside
//! the [`Harvester`]. A host calls [`HarvestService::tick_world`] once per
//! world tick from the world's own thread. The first tick of each world
//! reads its stored pending set before anything is scheduled.

use std::collections::BTreeSet;

use arbor_db::StorageBackend;
use arbor_types::MarkerId;
use arbor_world::WorldHost;

use crate::advance::{AdvanceSummary, ReplantAdvancer};
use crate::config::ArborConfig;
use crate::error::CoreError;
use crate::harvest::{HarvestOutcome, Harvester};
use crate::store::PendingReplantStore;
use crate::throttle::TriggerThrottle;

/// What one world tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Markers that passed the throttle.
    pub markers_admitted: usize,
    /// Admitted markers that harvested a tree.
    pub harvests: usize,
    /// Admitted markers that skipped.
    pub skipped: usize,
    /// Replant entries scheduled by this tick's harvests.
    pub replants_scheduled: usize,
    /// The replant advance pass.
    pub advance: AdvanceSummary,
}

/// Harvesting and replanting for every world a host ticks.
#[derive(Debug, Clone)]
pub struct HarvestService {
    harvester: Harvester,
    advancer: ReplantAdvancer,
    throttle: TriggerThrottle,
    store: PendingReplantStore,
}

impl HarvestService {
    /// Build a service with an empty store.
    pub fn new(config: &ArborConfig) -> Self {
        Self {
            harvester: Harvester::new(&config.harvest, &config.replant),
            advancer: ReplantAdvancer::new(&config.replant),
            throttle: TriggerThrottle::new(config.throttle.interval_ticks),
            store: PendingReplantStore::new(),
        }
    }

    /// Make sure the ticking world's stored pending set is loaded, then run
    /// [`on_world_tick`](Self::on_world_tick).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the stored set cannot be read; the
    /// tick does not run. Otherwise as [`on_world_tick`](Self::on_world_tick).
    pub fn tick_world<W, B>(
        &mut self,
        world: &mut W,
        backend: &B,
    ) -> Result<TickSummary, CoreError>
    where
        W: WorldHost + ?Sized,
        B: StorageBackend + ?Sized,
    {
        let world_id = world.world_id().clone();
        self.store.ensure_loaded(&world_id, backend, &*world)?;
        self.on_world_tick(world)
    }

    /// Run one world tick: every admitted marker harvests, then pending
    /// replants advance once.
    ///
    /// Storage is not consulted. A world ticked this way without a prior
    /// load is not saved by [`persist_dirty`](Self::persist_dirty).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::World`] if the host faults. Work done earlier
    /// in the tick is kept.
    pub fn on_world_tick<W>(&mut self, world: &mut W) -> Result<TickSummary, CoreError>
    where
        W: WorldHost + ?Sized,
    {
        let now = world.time();
        let markers = world.alive_markers();
        let alive: BTreeSet<MarkerId> = markers.iter().map(|marker| marker.id).collect();
        self.throttle.prune(&alive);

        let mut summary = TickSummary::default();
        for marker in &markers {
            if !self.throttle.admit(marker.id, now) {
                continue;
            }
            summary.markers_admitted = summary.markers_admitted.saturating_add(1);
            match self
                .harvester
                .on_trigger_tick(world, &mut self.store, marker)?
            {
                HarvestOutcome::Harvested(report) => {
                    summary.harvests = summary.harvests.saturating_add(1);
                    summary.replants_scheduled = summary
                        .replants_scheduled
                        .saturating_add(report.replants_scheduled);
                }
                HarvestOutcome::Skipped(skip) => {
                    summary.skipped = summary.skipped.saturating_add(1);
                    tracing::debug!(marker = %marker.id, ?skip, "Trigger skipped");
                }
            }
        }

        summary.advance = self.advancer.advance(world, &mut self.store)?;
        Ok(summary)
    }

    /// Load the ticking world's pending replants from `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the stored set cannot be read.
    pub fn load_world<W, B>(&mut self, world: &W, backend: &B) -> Result<usize, CoreError>
    where
        W: WorldHost + ?Sized,
        B: StorageBackend + ?Sized,
    {
        let world_id = world.world_id().clone();
        self.store.load_world(&world_id, backend, world)
    }

    /// Save every loaded world with unsaved changes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] on the first failed write.
    pub fn persist_dirty<B>(&mut self, backend: &B) -> Result<usize, CoreError>
    where
        B: StorageBackend + ?Sized,
    {
        self.store.persist_dirty(backend)
    }

    /// The pending replant store.
    pub const fn store(&self) -> &PendingReplantStore {
        &self.store
    }

    /// Number of markers the throttle is tracking.
    pub fn throttled_markers(&self) -> usize {
        self.throttle.tracked()
    }
}
