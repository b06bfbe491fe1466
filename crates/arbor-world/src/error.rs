//! Error types for the `arbor-world` crate.
//!
//! Host operations that can fail return [`WorldError`]. The harvester never
//! swallows these; they propagate to whoever drives the tick.

use arbor_types::{Identifier, VoxelPos};

/// Errors raised by a world host.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A write targeted a position outside the world's build height.
    #[error("position {pos} is outside the build range {min_y}..={max_y}")]
    OutOfBuildRange {
        /// The rejected position.
        pos: VoxelPos,
        /// Lowest buildable Y.
        min_y: i32,
        /// Highest buildable Y.
        max_y: i32,
    },

    /// A block state referenced a block the registry does not know.
    #[error("unknown block: {0}")]
    UnknownBlock(Identifier),

    /// A conveyor operation targeted a position without a conveyor buffer.
    #[error("no conveyor at {0}")]
    NoConveyor(VoxelPos),

    /// The host failed while servicing a request.
    #[error("host fault at {pos}: {reason}")]
    HostFault {
        /// Where the fault occurred.
        pos: VoxelPos,
        /// Host-supplied description.
        reason: String,
    },
}
