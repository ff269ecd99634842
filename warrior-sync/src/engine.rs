//! Reconciliation engine.
//!
//! ## `reconcile` protocol
//!
//! 1. For each fetched item, look its identifier up in the sync state.
//! 2. Recorded → skipped (drift in content is counted, never acted on).
//! 3. Not recorded → new. In dry-run, count only. Otherwise create it in
//!    the destination and record the returned task id in memory.
//! 4. A failed creation is counted and the loop moves on.
//!    An identifier already recorded under another list is never created
//!    again; it fails the whole list once the loop is done.
//! 5. If any record was added, stamp `last_run_at` and save the state once.
//!
//! A crash between a successful creation and step 5 means that item is
//! created again on the next run. Saving per list instead of per item keeps
//! that window bounded to one list.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::Utc;

use warrior_core::{ItemId, ListName, SourceItem, TaskUuid};

use crate::error::{CollaboratorError, SyncError};
use crate::fingerprint::content_hash;
use crate::progress::{ItemOutcome, ProgressSink};
use crate::state_store::{StateStore, SyncState};

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// One item that could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub id: ItemId,
    pub title: String,
    pub message: String,
}

/// Outcome of reconciling one list. `new + skipped + failed == total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStats {
    pub list: ListName,
    pub total: usize,
    /// Created (or, in dry-run, would be created).
    pub new: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Skipped items whose content changed since they were synced.
    pub drifted: usize,
    pub elapsed: Duration,
    pub dry_run: bool,
    pub failures: Vec<ItemFailure>,
    /// Set when the final save failed; created tasks may be re-created next run.
    pub persistence_error: Option<String>,
}

impl ListStats {
    fn empty(list: &ListName, total: usize, dry_run: bool) -> Self {
        Self {
            list: list.clone(),
            total,
            new: 0,
            skipped: 0,
            failed: 0,
            drifted: 0,
            elapsed: Duration::ZERO,
            dry_run,
            failures: Vec::new(),
            persistence_error: None,
        }
    }

    pub fn persistence_failed(&self) -> bool {
        self.persistence_error.is_some()
    }
}

// ---------------------------------------------------------------------------
// reconcile
// ---------------------------------------------------------------------------

/// Reconcile one list's fetched items against `state`.
///
/// `create` is called once per new item (never in dry-run) and returns the
/// destination task id. On success `state` holds every new record and, unless
/// nothing was added, has been saved through `store`. A failed save is
/// reported in [`ListStats::persistence_error`] rather than as an `Err`.
pub fn reconcile<F>(
    list: &ListName,
    items: &[SourceItem],
    state: &mut SyncState,
    store: &StateStore,
    dry_run: bool,
    mut create: F,
    progress: &mut dyn ProgressSink,
) -> Result<ListStats, SyncError>
where
    F: FnMut(&SourceItem) -> Result<TaskUuid, CollaboratorError>,
{
    let started = Instant::now();
    let mut stats = ListStats::empty(list, items.len(), dry_run);
    let mut seen: HashSet<&ItemId> = HashSet::with_capacity(items.len());
    let mut added = 0usize;
    let mut consistency: Result<(), SyncError> = Ok(());

    progress.list_started(list, items.len());

    for item in items {
        let hash = content_hash(item);

        let outcome = if !seen.insert(&item.id) {
            tracing::warn!("[{list}] '{}' appears twice in one fetch; skipping repeat", item.id);
            stats.skipped += 1;
            ItemOutcome::Skipped { drifted: false }
        } else if let Some(existing) = state.get(&item.id).filter(|r| r.list_name != *list) {
            let err = SyncError::CrossListRecord {
                id: item.id.clone(),
                existing: existing.destination_task_id.clone(),
                recorded_in: existing.list_name.clone(),
                seen_in: list.clone(),
            };
            tracing::warn!("[{list}] {err}");
            stats.failed += 1;
            stats.failures.push(ItemFailure {
                id: item.id.clone(),
                title: item.title.clone(),
                message: err.to_string(),
            });
            let message = err.to_string();
            if consistency.is_ok() {
                consistency = Err(err);
            }
            ItemOutcome::Failed(message)
        } else if let Some(existing) = state.get(&item.id) {
            let drifted = existing.content_hash != hash;
            if drifted {
                stats.drifted += 1;
                tracing::debug!("[{list}] skip (content changed since sync): {}", item.title);
            } else {
                tracing::debug!("[{list}] skip: {}", item.title);
            }
            stats.skipped += 1;
            ItemOutcome::Skipped { drifted }
        } else if dry_run {
            tracing::info!("[dry-run] [{list}] would create: {}", item.title);
            stats.new += 1;
            ItemOutcome::WouldCreate
        } else {
            match create(item) {
                Ok(task) => {
                    match state.record(item.id.clone(), task.clone(), list.clone(), hash) {
                        Ok(inserted) => {
                            if inserted {
                                added += 1;
                            }
                            stats.new += 1;
                            tracing::info!("[{list}] created {task}: {}", item.title);
                            ItemOutcome::Created(task)
                        }
                        Err(e) => {
                            consistency = Err(e);
                            break;
                        }
                    }
                }
                Err(source) => {
                    let err = SyncError::Creation {
                        item: item.id.clone(),
                        source,
                    };
                    tracing::warn!("[{list}] {err}");
                    stats.failed += 1;
                    stats.failures.push(ItemFailure {
                        id: item.id.clone(),
                        title: item.title.clone(),
                        message: err.to_string(),
                    });
                    ItemOutcome::Failed(err.to_string())
                }
            }
        };

        progress.item_processed(list, item, &outcome);
    }

    if !dry_run && added > 0 {
        state.last_run_at = Some(Utc::now());
        if let Err(source) = store.save(state) {
            let err = SyncError::Persistence {
                path: store.path().to_path_buf(),
                source: Box::new(source),
            };
            tracing::warn!("[{list}] {err}");
            stats.persistence_error = Some(err.to_string());
        } else {
            tracing::info!("[{list}] recorded {added} new sync record(s)");
        }
    }

    progress.list_finished(list);
    consistency?;

    stats.elapsed = started.elapsed();
    debug_assert_eq!(stats.new + stats.skipped + stats.failed, stats.total);
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use tempfile::TempDir;

    fn items() -> Vec<SourceItem> {
        vec![
            SourceItem::new("A", "Buy milk"),
            SourceItem::new("B", "Call dentist"),
        ]
    }

    fn home() -> ListName {
        ListName::from("Home")
    }

    fn uuid_for(item: &SourceItem) -> Result<TaskUuid, CollaboratorError> {
        Ok(TaskUuid::from(format!("uuid-{}", item.id)))
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<(ListName, usize)>,
        outcomes: Vec<ItemOutcome>,
        finished: usize,
    }

    impl ProgressSink for Recorder {
        fn list_started(&mut self, list: &ListName, total: usize) {
            self.started.push((list.clone(), total));
        }
        fn item_processed(&mut self, _: &ListName, _: &SourceItem, outcome: &ItemOutcome) {
            self.outcomes.push(outcome.clone());
        }
        fn list_finished(&mut self, _: &ListName) {
            self.finished += 1;
        }
    }

    #[test]
    fn first_run_creates_everything_and_saves() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();

        let stats = reconcile(&home(), &items(), &mut state, &store, false, uuid_for, &mut NoProgress)
            .unwrap();

        assert_eq!((stats.total, stats.new, stats.skipped, stats.failed), (2, 2, 0, 0));
        assert!(state.has(&ItemId::from("A")));
        assert!(state.has(&ItemId::from("B")));
        assert!(state.last_run_at.is_some());
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn second_run_skips_everything() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();
        reconcile(&home(), &items(), &mut state, &store, false, uuid_for, &mut NoProgress).unwrap();
        let after_first = state.clone();

        let mut calls = 0;
        let stats = reconcile(
            &home(),
            &items(),
            &mut state,
            &store,
            false,
            |item| {
                calls += 1;
                uuid_for(item)
            },
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!((stats.new, stats.skipped), (0, 2));
        assert_eq!(calls, 0);
        assert_eq!(state, after_first);
    }

    #[test]
    fn dry_run_counts_but_never_creates_or_saves() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();

        let stats = reconcile(
            &home(),
            &items(),
            &mut state,
            &store,
            true,
            |_| panic!("create must not be called in dry-run"),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!((stats.new, stats.skipped, stats.failed), (2, 0, 0));
        assert!(stats.dry_run);
        assert!(state.is_empty());
        assert!(!store.path().exists(), "dry-run must not write the state file");
    }

    #[test]
    fn failed_creation_is_counted_and_not_recorded() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();

        let stats = reconcile(
            &home(),
            &items(),
            &mut state,
            &store,
            false,
            |item| {
                if item.id.as_str() == "A" {
                    Err(CollaboratorError::Failed {
                        tool: "task".to_string(),
                        diagnostic: "Unrecognized date".to_string(),
                    })
                } else {
                    uuid_for(item)
                }
            },
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!((stats.total, stats.new, stats.skipped, stats.failed), (2, 1, 0, 1));
        assert!(!state.has(&ItemId::from("A")));
        assert!(state.has(&ItemId::from("B")));
        assert_eq!(stats.failures.len(), 1);
        assert!(stats.failures[0].message.contains("Unrecognized date"));
    }

    #[test]
    fn nothing_added_means_nothing_saved() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();

        let stats = reconcile(
            &home(),
            &items(),
            &mut state,
            &store,
            false,
            |_| {
                Err(CollaboratorError::Unavailable {
                    tool: "task".to_string(),
                    detail: "not found".to_string(),
                })
            },
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(stats.failed, 2);
        assert!(!store.path().exists());
        assert!(state.last_run_at.is_none());
    }

    #[test]
    fn repeated_identifier_in_one_fetch_is_created_once() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();
        let fetched = vec![
            SourceItem::new("A", "Buy milk"),
            SourceItem::new("A", "Buy milk"),
        ];

        let mut calls = 0;
        let stats = reconcile(
            &home(),
            &fetched,
            &mut state,
            &store,
            false,
            |item| {
                calls += 1;
                uuid_for(item)
            },
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!((stats.new, stats.skipped), (1, 1));
    }

    #[test]
    fn changed_content_is_detected_but_still_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();
        reconcile(&home(), &items(), &mut state, &store, false, uuid_for, &mut NoProgress).unwrap();

        let edited = vec![
            SourceItem::new("A", "Buy milk").with_notes("oat"),
            SourceItem::new("B", "Call dentist"),
        ];
        let stats = reconcile(&home(), &edited, &mut state, &store, false, uuid_for, &mut NoProgress)
            .unwrap();

        assert_eq!((stats.new, stats.skipped, stats.drifted), (0, 2, 1));
    }

    #[test]
    fn identifier_recorded_under_another_list_fails_that_list() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();
        reconcile(&home(), &items()[..1], &mut state, &store, false, uuid_for, &mut NoProgress)
            .unwrap();

        let work = ListName::from("Work");
        let fetched = vec![
            SourceItem::new("A", "Buy milk"),
            SourceItem::new("W", "Ship it"),
        ];
        let mut calls = 0;
        let err = reconcile(
            &work,
            &fetched,
            &mut state,
            &store,
            false,
            |item| {
                calls += 1;
                uuid_for(item)
            },
            &mut NoProgress,
        )
        .unwrap_err();

        match err {
            SyncError::CrossListRecord {
                id,
                recorded_in,
                seen_in,
                ..
            } => {
                assert_eq!(id, ItemId::from("A"));
                assert_eq!(recorded_in, home());
                assert_eq!(seen_in, work);
            }
            other => panic!("expected CrossListRecord, got {other:?}"),
        }
        assert_eq!(calls, 1, "the colliding item is never created again");
        assert!(state.has(&ItemId::from("W")), "the rest of the list still syncs");
        assert!(store.load().unwrap().has(&ItemId::from("W")));
        assert_eq!(state.get(&ItemId::from("A")).unwrap().list_name, home());
    }

    #[test]
    #[cfg(unix)]
    fn save_failure_is_flagged_but_stats_returned() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the state directory should be makes the save fail.
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = StateStore::new(blocker.join("sync-state.json"));
        let mut state = SyncState::default();

        let stats = reconcile(&home(), &items(), &mut state, &store, false, uuid_for, &mut NoProgress)
            .unwrap();

        assert_eq!(stats.new, 2);
        assert!(stats.persistence_failed());
        assert_eq!(state.len(), 2, "in-memory state keeps what was created");
    }

    #[test]
    fn progress_hook_sees_every_item() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();
        let mut recorder = Recorder::default();

        reconcile(&home(), &items(), &mut state, &store, true, uuid_for, &mut recorder).unwrap();

        assert_eq!(recorder.started, vec![(home(), 2)]);
        assert_eq!(
            recorder.outcomes,
            vec![ItemOutcome::WouldCreate, ItemOutcome::WouldCreate]
        );
        assert_eq!(recorder.finished, 1);
    }

    #[test]
    fn empty_list_is_zero_work() {
        let tmp = TempDir::new().unwrap();
        let store = StateStore::at_home(tmp.path());
        let mut state = SyncState::default();
        let stats =
            reconcile(&home(), &[], &mut state, &store, false, uuid_for, &mut NoProgress).unwrap();
        assert_eq!((stats.total, stats.new, stats.skipped, stats.failed), (0, 0, 0, 0));
        assert!(!store.path().exists());
    }
}
