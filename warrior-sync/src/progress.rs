//! Progress hook for long-running syncs.

use warrior_core::{ListName, SourceItem, TaskUuid};

/// What the engine decided for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Created in the destination and recorded.
    Created(TaskUuid),
    /// `--dry-run`: the item *would* have been created.
    WouldCreate,
    /// Already synced. `drifted` is set when its content changed since.
    Skipped { drifted: bool },
    /// Creation failed; the diagnostic is kept for reporting.
    Failed(String),
}

/// Observer notified as lists and items are processed. Has no effect on results.
pub trait ProgressSink {
    fn list_started(&mut self, _list: &ListName, _total: usize) {}

    fn item_processed(&mut self, _list: &ListName, _item: &SourceItem, _outcome: &ItemOutcome) {}

    fn list_finished(&mut self, _list: &ListName) {}
}

/// A [`ProgressSink`] that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}
