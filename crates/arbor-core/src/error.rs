//! Error types for the harvesting core.
//!
//! No-op conditions (wrong tool, no tree, nothing to replant) are values,
//! not errors. [`CoreError`] only carries host faults and storage failures
//! up to whoever drives the tick.

use arbor_db::StorageError;
use arbor_world::WorldError;

use crate::config::ConfigError;

/// Errors that can occur while ticking, loading, or persisting.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The world host failed.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// Loading or persisting pending replants failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
