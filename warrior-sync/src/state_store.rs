//! Sync state store — durable "have we created this before" knowledge.
//!
//! Persists a [`SyncState`] JSON document at
//! `<home>/.reminder-warrior/sync-state.json` (or any path the caller picks).
//! Writes use the atomic `.tmp` + fsync + rename pattern; a file that fails
//! to parse is moved aside to `<name>.<timestamp>.bak` and an empty state is
//! used in its place.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warrior_core::{paths, ItemId, ListName, TaskUuid};

use crate::error::{io_err, SyncError};

/// Schema version written by this build.
pub const STATE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Proof that one source item has been materialised as a destination task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub destination_task_id: TaskUuid,
    pub list_name: ListName,
    pub synced_at: DateTime<Utc>,
    pub content_hash: String,
}

/// On-disk and in-memory sync state, keyed by source identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub version: u32,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    records: BTreeMap<ItemId, SyncRecord>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_run_at: None,
            records: BTreeMap::new(),
        }
    }
}

impl SyncState {
    pub fn has(&self, id: &ItemId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&SyncRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = (&ItemId, &SyncRecord)> {
        self.records.iter()
    }

    /// Record that `id` was created as `task`.
    ///
    /// Returns `Ok(true)` when a record was added and `Ok(false)` when the
    /// identical mapping already existed. A different task id for an already
    /// recorded identifier is a [`SyncError::DuplicateRecord`]; the existing
    /// record is left untouched.
    pub fn record(
        &mut self,
        id: ItemId,
        task: TaskUuid,
        list: ListName,
        content_hash: String,
    ) -> Result<bool, SyncError> {
        if let Some(existing) = self.records.get(&id) {
            if existing.destination_task_id == task {
                return Ok(false);
            }
            return Err(SyncError::DuplicateRecord {
                id,
                existing: existing.destination_task_id.clone(),
                attempted: task,
            });
        }
        self.records.insert(
            id,
            SyncRecord {
                destination_task_id: task,
                list_name: list,
                synced_at: Utc::now(),
                content_hash,
            },
        );
        Ok(true)
    }

    /// Per-list record counts and most recent sync time.
    pub fn summary_by_list(&self) -> BTreeMap<ListName, ListSummary> {
        let mut out: BTreeMap<ListName, ListSummary> = BTreeMap::new();
        for record in self.records.values() {
            let entry = out.entry(record.list_name.clone()).or_default();
            entry.records += 1;
            if entry.last_synced_at.map_or(true, |t| record.synced_at > t) {
                entry.last_synced_at = Some(record.synced_at);
            }
        }
        out
    }
}

/// Aggregate of the records that came from one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSummary {
    pub records: usize,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u32,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Location of the persisted [`SyncState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.reminder-warrior/sync-state.json` rooted at `home`.
    pub fn at_home(home: &Path) -> Self {
        Self::new(paths::state_path(home))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state.
    ///
    /// Returns an empty state if the file does not exist. Content that cannot
    /// be parsed is quarantined and replaced by an empty state; if it cannot
    /// be moved aside it stays where it is. Only read failures and states
    /// from a newer schema are errors.
    pub fn load(&self) -> Result<SyncState, SyncError> {
        self.read(true)
    }

    /// Load the state without touching the file.
    ///
    /// Like [`StateStore::load`], except that corrupt content is left in
    /// place. Dry runs use this.
    pub fn peek(&self) -> Result<SyncState, SyncError> {
        self.read(false)
    }

    fn read(&self, quarantine: bool) -> Result<SyncState, SyncError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SyncState::default());
            }
            Err(e) => return Err(io_err(&self.path, e)),
        };

        let parse_err = match serde_json::from_slice::<SyncState>(&bytes) {
            Ok(state) if state.version > STATE_VERSION => {
                return Err(self.unsupported(state.version))
            }
            Ok(state) => {
                tracing::debug!(
                    "loaded {} sync record(s) from {}",
                    state.len(),
                    self.path.display()
                );
                return Ok(state);
            }
            Err(parse_err) => parse_err,
        };

        if let Ok(probe) = serde_json::from_slice::<VersionProbe>(&bytes) {
            if probe.version > STATE_VERSION {
                return Err(self.unsupported(probe.version));
            }
        }

        let path = self.path.display();
        if !quarantine {
            tracing::warn!("sync state at {path} is corrupt ({parse_err}); left in place, starting empty");
        } else {
            match self.quarantine() {
                Ok(bak) => tracing::warn!(
                    "sync state at {path} is corrupt ({parse_err}); moved to {} and starting empty",
                    bak.display()
                ),
                Err(e) => tracing::warn!(
                    "sync state at {path} is corrupt ({parse_err}) and could not be moved aside ({e}); starting empty"
                ),
            }
        }
        Ok(SyncState::default())
    }

    /// Save the state atomically.
    ///
    /// Writes `<path>.tmp` in the same directory, fsyncs it, then renames it
    /// over `<path>`.
    pub fn save(&self, state: &SyncState) -> Result<(), SyncError> {
        let Some(dir) = self.path.parent() else {
            return Err(io_err(
                &self.path,
                std::io::Error::other("invalid sync state path"),
            ));
        };
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.tmp_path();
        let written = write_synced(&tmp, &json).and_then(|()| {
            std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))
        });
        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written?;
        tracing::debug!(
            "saved {} sync record(s) to {}",
            state.len(),
            self.path.display()
        );
        Ok(())
    }

    pub(crate) fn tmp_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.tmp", self.path.display()))
    }

    fn unsupported(&self, found: u32) -> SyncError {
        SyncError::UnsupportedStateVersion {
            path: self.path.clone(),
            found,
            supported: STATE_VERSION,
        }
    }

    /// Move the current file to a fresh `<path>.<timestamp>[-n].bak`.
    fn quarantine(&self) -> Result<PathBuf, SyncError> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let mut bak = PathBuf::from(format!("{}.{stamp}.bak", self.path.display()));
        let mut n = 1;
        while bak.exists() {
            bak = PathBuf::from(format!("{}.{stamp}-{n}.bak", self.path.display()));
            n += 1;
        }
        std::fs::rename(&self.path, &bak).map_err(|e| io_err(&bak, e))?;
        Ok(bak)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    let mut file = std::fs::File::create(path).map_err(|e| io_err(path, e))?;
    file.write_all(bytes).map_err(|e| io_err(path, e))?;
    file.sync_all().map_err(|e| io_err(path, e))?;
    set_file_permissions(path)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), SyncError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), SyncError> {
    Ok(())
}
