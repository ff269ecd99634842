//! Error types for warrior-sync.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use warrior_core::{ItemId, ListName, TaskUuid};

/// Failures reported by the source or destination collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The external tool is missing (e.g. not running on macOS).
    #[error("`{tool}` is not available: {detail}")]
    Unavailable { tool: String, detail: String },

    /// The external tool did not finish in time.
    #[error("`{tool}` timed out after {}s", .after.as_secs())]
    Timeout { tool: String, after: Duration },

    /// The tool ran but exited unsuccessfully; `diagnostic` is its stderr.
    #[error("`{tool}` failed: {diagnostic}")]
    Failed { tool: String, diagnostic: String },

    /// The tool succeeded but its output could not be understood.
    #[error("unexpected output from `{tool}`: {detail}")]
    Malformed { tool: String, detail: String },
}

impl CollaboratorError {
    /// User-facing hint for failures with a known remedy.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            CollaboratorError::Timeout { tool, .. } if tool == "osascript" => Some(
                "grant your terminal Automation access to Reminders in System Settings → Privacy & Security",
            ),
            CollaboratorError::Timeout { .. } => {
                Some("the tool may be waiting on an interactive prompt; run it once by hand")
            }
            CollaboratorError::Unavailable { tool, .. } if tool == "osascript" => {
                Some("Apple Reminders access requires macOS")
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CollaboratorError::Timeout { .. })
    }
}

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching a list's items from the source failed.
    #[error("failed to fetch list '{list}': {source}")]
    Fetch {
        list: ListName,
        #[source]
        source: CollaboratorError,
    },

    /// The destination rejected or failed to create one task.
    #[error("failed to create task for '{item}': {source}")]
    Creation {
        item: ItemId,
        #[source]
        source: CollaboratorError,
    },

    /// Any other collaborator failure (catalog, bulk fetch, attribute setup).
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// An identifier already maps to a different destination task.
    #[error("'{id}' is already synced to task {existing}; refusing to record {attempted}")]
    DuplicateRecord {
        id: ItemId,
        existing: TaskUuid,
        attempted: TaskUuid,
    },

    /// An identifier recorded from one list turned up in another.
    #[error("'{id}' is already synced from list '{recorded_in}' as task {existing}; found again in '{seen_in}'")]
    CrossListRecord {
        id: ItemId,
        existing: TaskUuid,
        recorded_in: ListName,
        seen_in: ListName,
    },

    /// The state file could not be durably saved.
    #[error("could not save sync state to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<SyncError>,
    },

    /// The state file was written by a newer schema.
    #[error("sync state at {path} has version {found}; this build understands up to {supported}")]
    UnsupportedStateVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    /// The destination has an incompatible attribute definition.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (state store).
    #[error("sync state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Walks down to the collaborator failure, if that is what caused this error.
    pub fn collaborator(&self) -> Option<&CollaboratorError> {
        match self {
            SyncError::Fetch { source, .. } | SyncError::Creation { source, .. } => Some(source),
            SyncError::Collaborator(source) => Some(source),
            _ => None,
        }
    }

    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            SyncError::Persistence { .. } => {
                Some("tasks created in this run may be created again on the next run")
            }
            _ => self.collaborator().and_then(CollaboratorError::guidance),
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
