//! Error types for the demo engine.

/// Top-level error for the engine binary.
///
/// Each variant wraps one subsystem's error so the tick loop can
/// propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: arbor_core::ConfigError,
    },

    /// Pending replant storage failed.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying storage error.
        #[from]
        source: arbor_db::StorageError,
    },

    /// The in-memory world rejected an operation.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: arbor_world::WorldError,
    },

    /// The harvest service failed during a tick.
    #[error("harvest error: {source}")]
    Harvest {
        /// The underlying core error.
        #[from]
        source: arbor_core::CoreError,
    },
}
