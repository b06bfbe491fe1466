//! On-disk storage backend.
//!
//! One directory per world under a configured root, holding a single JSON
//! blob. Directory names escape the world key, so two worlds never share a
//! directory and no key can climb out of the root. Writes go to a temporary sibling first and are renamed into
//! place, so a crash mid-write leaves the previous blob intact.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use arbor_types::WorldId;

use crate::backend::StorageBackend;
use crate::blob::PendingBlob;
use crate::error::StorageError;

/// File name of the per-world blob.
pub const FILE_NAME: &str = "arbor_pending_replants.json";

/// Suffix of the temporary file written before the rename.
const TEMP_SUFFIX: &str = ".tmp";

/// Marks an escaped byte in a directory name.
const ESCAPE: char = '~';

/// Pending-replant storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unsupported`] if the root cannot be created
    /// or exists but is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        if let Err(e) = fs::create_dir_all(&root) {
            return Err(StorageError::Unsupported {
                root,
                reason: e.to_string(),
            });
        }
        if !root.is_dir() {
            return Err(StorageError::Unsupported {
                root,
                reason: "not a directory".to_owned(),
            });
        }
        tracing::info!(root = %root.display(), "Opened pending replant storage");
        Ok(Self { root })
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the blob for `world` lives.
    pub fn path_for(&self, world: &WorldId) -> PathBuf {
        self.root.join(dir_name(world.as_str())).join(FILE_NAME)
    }
}

/// Map a world key to one directory name.
///
/// `[a-z0-9_-]` pass through, as does `.` anywhere but the first position.
/// Every other byte is written as `~` and two hex digits. Distinct keys get
/// distinct names, and no name starts with a dot. The empty key is `~`.
fn dir_name(key: &str) -> String {
    if key.is_empty() {
        return ESCAPE.to_string();
    }
    let mut name = String::with_capacity(key.len());
    for (i, byte) in key.bytes().enumerate() {
        let plain = byte.is_ascii_lowercase()
            || byte.is_ascii_digit()
            || matches!(byte, b'_' | b'-')
            || (byte == b'.' && i > 0);
        if plain {
            name.push(char::from(byte));
        } else {
            let _ = write!(name, "{ESCAPE}{byte:02x}");
        }
    }
    name
}

impl StorageBackend for FileStorage {
    fn load(&self, world: &WorldId) -> Result<Option<PendingBlob>, StorageError> {
        let path = self.path_for(world);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };
        let blob = PendingBlob::from_json(&text)?;
        tracing::debug!(
            world = %world,
            entries = blob.entries.len(),
            "Loaded pending replant blob"
        );
        Ok(Some(blob))
    }

    fn persist(&self, world: &WorldId, blob: &PendingBlob) -> Result<(), StorageError> {
        let path = self.path_for(world);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }

        let mut temp = path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        fs::write(&temp, blob.to_json()?).map_err(|e| StorageError::io(&temp, e))?;
        fs::rename(&temp, &path).map_err(|e| StorageError::io(&path, e))?;

        tracing::debug!(
            world = %world,
            entries = blob.entries.len(),
            path = %path.display(),
            "Persisted pending replant blob"
        );
        Ok(())
    }
}
