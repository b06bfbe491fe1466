//! The demo tick loop.
//!
//! Each tick advances world time by one, lets the farm's conveyors move
//! items, then hands the world to [`HarvestService::tick_world`]. Dirty
//! pending sets are persisted every `persist_interval_ticks` ticks and once
//! more when the loop ends.

use std::future::Future;
use std::time::Duration;

use arbor_core::{ArborConfig, HarvestService};
use arbor_db::StorageBackend;
use arbor_types::WorldId;
use arbor_world::{MemoryWorld, build_demo_farm};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::error::EngineError;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `engine.max_ticks` was reached.
    MaxTicks,
    /// The shutdown future resolved.
    Shutdown,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Ticks executed.
    pub ticks: u64,
    /// Trees harvested.
    pub harvests: usize,
    /// Saplings placed.
    pub planted: usize,
    /// Saplings dropped as items because the soil no longer held them.
    pub dropped: usize,
    /// Pending replants abandoned.
    pub abandoned: usize,
}

/// Build the demo farm and tick it until `max_ticks` or `shutdown`.
///
/// # Errors
///
/// Returns an [`EngineError`] if the farm cannot be built, the stored
/// pending set cannot be loaded, or a tick or persistence pass fails.
pub async fn run<B, F>(
    config: &ArborConfig,
    storage: &B,
    shutdown: F,
) -> Result<(RunSummary, MemoryWorld), EngineError>
where
    B: StorageBackend + ?Sized,
    F: Future<Output = ()>,
{
    let (mut world, farm) = build_demo_farm(WorldId::new(config.engine.world.as_str()))?;
    info!(
        world = %config.engine.world,
        oak_base = %farm.oak_base,
        dark_oak_base = %farm.dark_oak_base,
        "Demo farm built"
    );

    let mut service = HarvestService::new(config);
    let loaded = service.load_world(&world, storage)?;
    info!(pending = loaded, "Pending replants restored");

    let engine = &config.engine;
    let period = Duration::from_millis(engine.tick_interval_ms.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut summary = RunSummary {
        end_reason: EndReason::Shutdown,
        ticks: 0,
        harvests: 0,
        planted: 0,
        dropped: 0,
        abandoned: 0,
    };

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!(tick = summary.ticks, "Shutdown requested");
                break;
            }
            _ = interval.tick() => {}
        }

        world.advance_time(1);
        world.tick_conveyors()?;
        let tick = service.tick_world(&mut world, storage)?;
        summary.ticks = summary.ticks.saturating_add(1);
        summary.harvests = summary.harvests.saturating_add(tick.harvests);
        summary.planted = summary.planted.saturating_add(tick.advance.planted);
        summary.dropped = summary.dropped.saturating_add(tick.advance.dropped);
        summary.abandoned = summary.abandoned.saturating_add(tick.advance.abandoned);

        if tick.harvests > 0 || tick.advance.resolved() > 0 {
            info!(
                tick = summary.ticks,
                harvests = tick.harvests,
                scheduled = tick.replants_scheduled,
                planted = tick.advance.planted,
                dropped = tick.advance.dropped,
                abandoned = tick.advance.abandoned,
                "Tick"
            );
        }

        if summary.ticks.checked_rem(engine.persist_interval_ticks) == Some(0) {
            let written = service.persist_dirty(storage)?;
            if written > 0 {
                debug!(tick = summary.ticks, worlds = written, "Periodic save");
            }
        }

        if engine.max_ticks > 0 && summary.ticks >= engine.max_ticks {
            summary.end_reason = EndReason::MaxTicks;
            break;
        }
    }

    let written = service.persist_dirty(storage)?;
    info!(
        reason = ?summary.end_reason,
        ticks = summary.ticks,
        harvests = summary.harvests,
        planted = summary.planted,
        worlds_saved = written,
        "Engine stopped"
    );
    Ok((summary, world))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use arbor_db::FileStorage;
    use arbor_types::VoxelPos;
    use arbor_world::WorldHost;

    use super::*;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir().join(format!("arbor-engine-{}", uuid::Uuid::new_v4()))
    }

    fn fast_config(max_ticks: u64) -> ArborConfig {
        let mut config = ArborConfig::default();
        config.engine.tick_interval_ms = 1;
        config.engine.max_ticks = max_ticks;
        config
    }

    #[tokio::test]
    async fn demo_run_harvests_and_regrows() {
        let storage = FileStorage::open(scratch_root()).unwrap();
        let config = fast_config(400);
        let (summary, world) = run(&config, &storage, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.end_reason, EndReason::MaxTicks);
        assert_eq!(summary.ticks, 400);
        assert_eq!(summary.harvests, 2);
        assert_eq!(summary.planted, 5);
        assert_eq!(
            world.block_state(VoxelPos::new(0, 64, 0)).block.path(),
            "oak_sapling"
        );

        std::fs::remove_dir_all(storage.root()).unwrap();
    }

    #[tokio::test]
    async fn pending_replants_are_saved_when_the_loop_stops() {
        let storage = FileStorage::open(scratch_root()).unwrap();
        let config = fast_config(10);
        let (summary, world) = run(&config, &storage, std::future::pending())
            .await
            .unwrap();
        assert_eq!(summary.planted, 0);

        let blob = storage.load(world.world_id()).unwrap().unwrap();
        assert_eq!(blob.entries.len(), 5);

        std::fs::remove_dir_all(storage.root()).unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_before_the_first_tick() {
        let storage = FileStorage::open(scratch_root()).unwrap();
        let config = fast_config(0);
        let (summary, _) = run(&config, &storage, std::future::ready(()))
            .await
            .unwrap();
        assert_eq!(summary.end_reason, EndReason::Shutdown);
        assert_eq!(summary.ticks, 0);

        std::fs::remove_dir_all(storage.root()).unwrap();
    }
}
