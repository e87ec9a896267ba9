//! Checkpointer trait and the two built-in savers

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Unique identifier for a thread
pub type ThreadId = String;

/// Stores and retrieves per-thread state snapshots
///
/// Object-safe so callers can hold `Arc<dyn Checkpointer>` and swap the
/// backing store without touching the core.
pub trait Checkpointer: Send + Sync {
    /// Save (or replace) the snapshot for a thread
    fn save(&self, thread: &str, snapshot: Value) -> Result<()>;

    /// Load the snapshot for a thread, if one exists
    fn load(&self, thread: &str) -> Result<Option<Value>>;

    /// Discard the snapshot for a thread (no-op if absent)
    fn remove(&self, thread: &str) -> Result<()>;

    /// List all thread ids with a stored snapshot
    fn threads(&self) -> Result<Vec<ThreadId>>;
}

/// In-memory saver - snapshots live for the process lifetime only
#[derive(Default)]
pub struct MemorySaver {
    slots: RwLock<HashMap<ThreadId, Value>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checkpointer for MemorySaver {
    fn save(&self, thread: &str, snapshot: Value) -> Result<()> {
        debug!(%thread, "MemorySaver::save");
        let mut slots = self.slots.write().map_err(|_| eyre!("saver lock poisoned"))?;
        slots.insert(thread.to_string(), snapshot);
        Ok(())
    }

    fn load(&self, thread: &str) -> Result<Option<Value>> {
        let slots = self.slots.read().map_err(|_| eyre!("saver lock poisoned"))?;
        Ok(slots.get(thread).cloned())
    }

    fn remove(&self, thread: &str) -> Result<()> {
        debug!(%thread, "MemorySaver::remove");
        let mut slots = self.slots.write().map_err(|_| eyre!("saver lock poisoned"))?;
        slots.remove(thread);
        Ok(())
    }

    fn threads(&self) -> Result<Vec<ThreadId>> {
        let slots = self.slots.read().map_err(|_| eyre!("saver lock poisoned"))?;
        Ok(slots.keys().cloned().collect())
    }
}

/// On-disk envelope for one thread snapshot
#[derive(Debug, Serialize, Deserialize)]
struct ThreadRecord {
    thread: ThreadId,
    saved_at: DateTime<Utc>,
    snapshot: Value,
}

/// File-backed saver - one JSON document per thread under a root directory
pub struct FileSaver {
    root: PathBuf,
}

impl FileSaver {
    /// Open or create a saver rooted at the given directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).context("Failed to create thread store directory")?;
        debug!(?root, "Opened thread store");
        Ok(Self { root })
    }

    fn path_for(&self, thread: &str) -> Result<PathBuf> {
        // Thread ids are uuids in practice; reject anything that could
        // escape the root directory.
        if thread.is_empty() || !thread.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(eyre!("Invalid thread id: {:?}", thread));
        }
        Ok(self.root.join(format!("{}.json", thread)))
    }
}

impl Checkpointer for FileSaver {
    fn save(&self, thread: &str, snapshot: Value) -> Result<()> {
        let path = self.path_for(thread)?;
        let record = ThreadRecord {
            thread: thread.to_string(),
            saved_at: Utc::now(),
            snapshot,
        };
        let json = serde_json::to_string_pretty(&record).context("Failed to serialize thread record")?;
        fs::write(&path, json).context(format!("Failed to write {}", path.display()))?;
        debug!(%thread, path = %path.display(), "FileSaver::save");
        Ok(())
    }

    fn load(&self, thread: &str) -> Result<Option<Value>> {
        let path = self.path_for(thread)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
        let record: ThreadRecord =
            serde_json::from_str(&content).context(format!("Corrupt thread record: {}", path.display()))?;
        Ok(Some(record.snapshot))
    }

    fn remove(&self, thread: &str) -> Result<()> {
        let path = self.path_for(thread)?;
        if path.exists() {
            fs::remove_file(&path).context(format!("Failed to remove {}", path.display()))?;
            debug!(%thread, "FileSaver::remove");
        }
        Ok(())
    }

    fn threads(&self) -> Result<Vec<ThreadId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root).context("Failed to read thread store directory")? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(id) = name.strip_suffix(".json") {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
