//! Tree search, harvest orchestration, and durable replanting.
//!
//! This crate owns the per-world tick that drives the harvester. Each tick
//! runs in two phases:
//!
//! ```text
//! on_world_tick
//!     |
//!     +-- for every alive marker ---> TriggerThrottle::admit
//!     |                                   |
//!     |                                   +-- Harvester::on_trigger_tick
//!     |                                         (search, break, drops, schedule)
//!     |
//!     +-- once ----------------------> ReplantAdvancer::advance
//!                                         (delay, drain, chain gate, plant)
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `arbor-config.yaml` into
//!   strongly-typed structs.
//! - [`search`] -- Bounded 26-connected flood fill and the tree base finder.
//! - [`harvest`] -- [`Harvester`]: one trigger's worth of harvesting.
//! - [`replant`] -- Species resolution, the 2x2 anchor, and scheduling.
//! - [`advance`] -- [`ReplantAdvancer`]: the per-tick replant state machine.
//! - [`store`] -- [`PendingReplantStore`]: pending replants keyed by world.
//! - [`throttle`] -- [`TriggerThrottle`]: per-marker admission stamps.
//! - [`service`] -- [`HarvestService`]: the per-world tick driver.
//! - [`error`] -- [`CoreError`].
//!
//! [`Harvester`]: harvest::Harvester
//! [`ReplantAdvancer`]: advance::ReplantAdvancer
//! [`PendingReplantStore`]: store::PendingReplantStore
//! [`TriggerThrottle`]: throttle::TriggerThrottle
//! [`HarvestService`]: service::HarvestService
//! [`CoreError`]: error::CoreError

pub mod advance;
pub mod config;
pub mod error;
pub mod harvest;
pub mod replant;
pub mod search;
pub mod service;
pub mod store;
pub mod throttle;

pub use advance::{AbandonReason, AdvanceSummary, EntryOutcome, ReplantAdvancer};
pub use config::{ArborConfig, ConfigError};
pub use error::CoreError;
pub use harvest::{HarvestOutcome, HarvestReport, HarvestSkip, Harvester};
pub use replant::{ReplantPlan, ReplantSkip};
pub use search::{HarvestSet, SearchBounds};
pub use service::{HarvestService, TickSummary};
pub use store::PendingReplantStore;
pub use throttle::TriggerThrottle;
