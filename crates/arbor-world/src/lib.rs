//! World adapter surface for the Arbor harvester.
//!
//! The harvester never owns a world. It talks to the host through the
//! [`WorldHost`] trait: block reads and writes, tag queries, drop
//! computation, entity queries, conveyor operations, and effects. This
//! crate defines that trait and ships [`MemoryWorld`], a complete
//! in-memory host used by the tests and the demo engine.
//!
//! # Modules
//!
//! - [`host`] -- The [`WorldHost`] trait.
//! - [`memory`] -- [`MemoryWorld`], the in-memory reference host.
//! - [`demo`] -- A small tree farm layout for the demo engine.
//! - [`error`] -- Error types for host operations.

pub mod demo;
pub mod error;
pub mod host;
pub mod memory;

// Re-export primary types at crate root.
pub use demo::{DemoFarm, build_demo_farm};
pub use error::WorldError;
pub use host::WorldHost;
pub use memory::{BreakEffect, MemoryWorld, PlayedSound};
