//! Batch orchestration: one list, or every list in the source catalog.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use warrior_core::{ListName, ListSelector, SourceItem};

use crate::collaborator::{NewTask, SourceReader, TaskDestination};
use crate::engine::{reconcile, ListStats};
use crate::error::SyncError;
use crate::progress::ProgressSink;
use crate::state_store::StateStore;

/// How items are pulled from the source in all-lists mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// One fetch per list, each under the per-call timeout.
    #[default]
    PerList,
    /// A single unbounded fetch of every list.
    Bulk,
}

/// Knobs for [`run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Stop before the next list once a list has failed.
    pub fail_fast: bool,
    pub fetch: FetchMode,
    /// Tag created tasks with the source identifier attribute.
    pub tag_with_source_id: bool,
}

/// Result for one list of a run.
#[derive(Debug)]
pub enum ListOutcome {
    Synced(ListStats),
    Failed { list: ListName, error: SyncError },
    /// Not attempted because `fail_fast` tripped on an earlier list.
    NotRun { list: ListName },
}

impl ListOutcome {
    pub fn list(&self) -> &ListName {
        match self {
            ListOutcome::Synced(stats) => &stats.list,
            ListOutcome::Failed { list, .. } | ListOutcome::NotRun { list } => list,
        }
    }
}

/// Sums over the lists that synced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: usize,
    pub new: usize,
    pub skipped: usize,
    pub failed: usize,
    pub drifted: usize,
    pub elapsed: Duration,
}

impl Totals {
    fn add(&mut self, stats: &ListStats) {
        self.total += stats.total;
        self.new += stats.new;
        self.skipped += stats.skipped;
        self.failed += stats.failed;
        self.drifted += stats.drifted;
    }
}

/// Everything a run did, list by list.
#[derive(Debug)]
pub struct RunReport {
    pub selector: ListSelector,
    pub dry_run: bool,
    pub lists: Vec<ListOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Aggregate of every successfully reconciled list. Failed lists contribute nothing.
    pub fn overall(&self) -> Totals {
        let mut totals = Totals {
            elapsed: self.elapsed,
            ..Totals::default()
        };
        for stats in self.synced() {
            totals.add(stats);
        }
        totals
    }

    pub fn synced(&self) -> impl Iterator<Item = &ListStats> {
        self.lists.iter().filter_map(|o| match o {
            ListOutcome::Synced(stats) => Some(stats),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ListName, &SyncError)> {
        self.lists.iter().filter_map(|o| match o {
            ListOutcome::Failed { list, error } => Some((list, error)),
            _ => None,
        })
    }

    /// True if any list failed, or any list's state could not be saved.
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some() || self.synced().any(ListStats::persistence_failed)
    }
}

/// Run reconciliation for `selector`.
///
/// The sync state is loaded once and threaded through every list; each list
/// saves it independently. A dry run never quarantines a corrupt state file.
/// Per-list failures are captured in the report. Only state loading and catalog (or bulk) fetch failures return `Err`.
pub fn run(
    source: &dyn SourceReader,
    destination: &mut dyn TaskDestination,
    store: &StateStore,
    selector: &ListSelector,
    options: &RunOptions,
    progress: &mut dyn ProgressSink,
) -> Result<RunReport, SyncError> {
    let started = Instant::now();
    let mut state = if options.dry_run {
        store.peek()?
    } else {
        store.load()?
    };

    let lists = match selector {
        ListSelector::Named(name) => vec![name.clone()],
        ListSelector::All => source.list_catalog()?,
    };
    if lists.is_empty() {
        tracing::info!("source catalog is empty; nothing to sync");
    }

    let mut prefetched: Option<BTreeMap<ListName, Vec<SourceItem>>> =
        match (selector, options.fetch) {
            (ListSelector::All, FetchMode::Bulk) if !lists.is_empty() => {
                Some(source.fetch_all_active_items()?)
            }
            _ => None,
        };

    let mut outcomes = Vec::with_capacity(lists.len());
    let mut tripped = false;

    for list in lists {
        if tripped {
            outcomes.push(ListOutcome::NotRun { list });
            continue;
        }

        let items = match prefetched.as_mut() {
            Some(all) => Ok(all.remove(&list).unwrap_or_default()),
            None => source
                .fetch_active_items(&list)
                .map_err(|source| SyncError::Fetch {
                    list: list.clone(),
                    source,
                }),
        };

        let result = items.and_then(|items| {
            reconcile(
                &list,
                &items,
                &mut state,
                store,
                options.dry_run,
                |item| destination.create_task(&NewTask::from_item(item, options.tag_with_source_id)),
                progress,
            )
        });

        match result {
            Ok(stats) => outcomes.push(ListOutcome::Synced(stats)),
            Err(error) => {
                tracing::warn!("[{list}] sync failed: {error}");
                tripped = options.fail_fast;
                outcomes.push(ListOutcome::Failed { list, error });
            }
        }
    }

    Ok(RunReport {
        selector: selector.clone(),
        dry_run: options.dry_run,
        lists: outcomes,
        elapsed: started.elapsed(),
    })
}
