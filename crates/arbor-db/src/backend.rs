//! The storage backend trait.

use arbor_types::WorldId;

use crate::blob::PendingBlob;
use crate::error::StorageError;

/// Where pending-replant blobs live between runs.
pub trait StorageBackend {
    /// Load the blob for `world`. Missing storage is `Ok(None)`, which
    /// callers treat as an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the blob exists but cannot be read or
    /// parsed.
    fn load(&self, world: &WorldId) -> Result<Option<PendingBlob>, StorageError>;

    /// Replace the stored blob for `world`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the blob cannot be serialized or written.
    fn persist(&self, world: &WorldId, blob: &PendingBlob) -> Result<(), StorageError>;
}
