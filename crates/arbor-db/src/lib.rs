//! Durable storage for pending replants.
//!
//! Pending replants survive restarts. Each world's set is written as one
//! versioned JSON blob; loading decodes entries one at a time against the
//! host's block registry so a single bad entry costs only itself.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!     minecraft~3aoverworld/
//!         arbor_pending_replants.json   {"version": 1, "entries": [...]}
//!     minecraft~3athe_nether/
//!         arbor_pending_replants.json
//! ```
//!
//! # Modules
//!
//! - [`blob`] -- The versioned blob and per-entry codec
//! - [`backend`] -- The [`StorageBackend`] trait
//! - [`file`] -- [`FileStorage`], the on-disk backend
//! - [`error`] -- Shared error types

pub mod backend;
pub mod blob;
pub mod error;
pub mod file;

// Re-export primary types for convenience.
pub use backend::StorageBackend;
pub use blob::{BLOB_VERSION, DecodedBlob, PendingBlob, StoredEntry};
pub use error::StorageError;
pub use file::{FILE_NAME, FileStorage};
