//! Snapshot persistence.
//!
//! A [`StoredSnapshot`] wraps a [`WorldSnapshot`] with a fixed key and the
//! time it was written. [`FileSnapshotStore`] keeps one such document as
//! JSON on disk; [`MemorySnapshotStore`] keeps it in memory for tests and
//! ephemeral runs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use granary_types::WorldSnapshot;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::state::SimulationState;

/// Key every snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "world";

/// Errors that can occur while saving, loading, or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading or writing the snapshot file failed.
    #[error("snapshot I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The snapshot document is not valid JSON for a [`StoredSnapshot`].
    #[error("snapshot serialization error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// The document was written under a different key.
    #[error("snapshot key mismatch: expected `{expected}`, found `{found}`")]
    KeyMismatch {
        /// Key this store reads.
        expected: String,
        /// Key found in the document.
        found: String,
    },

    /// The snapshot holds a state the engine cannot resume from.
    #[error("invalid snapshot: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

/// A persisted snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    /// Fixed document key.
    pub key: String,
    /// When the document was written.
    pub saved_at: DateTime<Utc>,
    /// The world itself.
    pub snapshot: WorldSnapshot,
}

impl StoredSnapshot {
    /// Wrap `snapshot` under the standard key, stamped now.
    pub fn now(snapshot: WorldSnapshot) -> Self {
        Self {
            key: SNAPSHOT_KEY.to_owned(),
            saved_at: Utc::now(),
            snapshot,
        }
    }
}

/// Somewhere a single world snapshot can be kept.
pub trait SnapshotStore {
    /// Persist `snapshot`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the snapshot cannot be written.
    fn save(&mut self, snapshot: &WorldSnapshot) -> Result<StoredSnapshot, SnapshotError>;

    /// Load the stored snapshot, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if a stored snapshot exists but cannot be
    /// read.
    fn load(&self) -> Result<Option<StoredSnapshot>, SnapshotError>;
}

/// Resume from `store` if it holds a snapshot, otherwise start a fresh
/// world.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if a stored snapshot exists but cannot be
/// read or restored.
pub fn resume_or_start(
    store: &dyn SnapshotStore,
    config: SimulationConfig,
    seed: u64,
) -> Result<SimulationState, SnapshotError> {
    match store.load()? {
        Some(stored) => {
            info!(
                day = stored.snapshot.world.day,
                subphase = %stored.snapshot.world.subphase,
                "Resuming saved world"
            );
            SimulationState::restore(stored.snapshot, config, seed)
        }
        None => Ok(SimulationState::new(config, seed)),
    }
}

/// JSON snapshot file on local disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store backed by the file at `path`. Nothing is touched until
    /// the first save or load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&mut self, snapshot: &WorldSnapshot) -> Result<StoredSnapshot, SnapshotError> {
        let stored = StoredSnapshot::now(snapshot.clone());
        let json = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Write-then-rename: readers never see a partial document.
        let tmp = self.temp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        info!(
            path = %self.path.display(),
            day = snapshot.world.day,
            subphase = %snapshot.world.subphase,
            "Snapshot saved"
        );
        Ok(stored)
    }

    fn load(&self) -> Result<Option<StoredSnapshot>, SnapshotError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let stored: StoredSnapshot = serde_json::from_slice(&bytes)?;
        if stored.key != SNAPSHOT_KEY {
            return Err(SnapshotError::KeyMismatch {
                expected: SNAPSHOT_KEY.to_owned(),
                found: stored.key,
            });
        }
        info!(
            path = %self.path.display(),
            saved_at = %stored.saved_at,
            day = stored.snapshot.world.day,
            "Snapshot loaded"
        );
        Ok(Some(stored))
    }
}

/// In-memory snapshot slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    slot: Option<StoredSnapshot>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self { slot: None }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, snapshot: &WorldSnapshot) -> Result<StoredSnapshot, SnapshotError> {
        let stored = StoredSnapshot::now(snapshot.clone());
        self.slot = Some(stored.clone());
        Ok(stored)
    }

    fn load(&self) -> Result<Option<StoredSnapshot>, SnapshotError> {
        Ok(self.slot.clone())
    }
}
