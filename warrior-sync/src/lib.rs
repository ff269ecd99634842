//! # warrior-sync
//!
//! One-way reconciliation of source items into destination tasks.
//!
//! Call [`orchestrator::run`] to sync one list or every list, or
//! [`engine::reconcile`] to reconcile an already-fetched item set.
//! [`setup::ensure_attribute`] prepares the destination beforehand.

pub mod collaborator;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod orchestrator;
pub mod progress;
pub mod setup;
pub mod state_store;

pub use collaborator::{AttributeDefinition, AttributeKind, NewTask, SourceReader, TaskDestination};
pub use engine::{reconcile, ItemFailure, ListStats};
pub use error::{CollaboratorError, SyncError};
pub use orchestrator::{run, FetchMode, ListOutcome, RunOptions, RunReport, Totals};
pub use progress::{ItemOutcome, NoProgress, ProgressSink};
pub use state_store::{StateStore, SyncRecord, SyncState, STATE_VERSION};
