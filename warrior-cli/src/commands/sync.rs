//! `reminder-warrior sync` — create tasks for reminders not yet synced.

use anyhow::{bail, Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use warrior_core::{config::resolve_selector, ListName, ListSelector};
use warrior_sync::{
    orchestrator::{self, FetchMode, ListOutcome, RunOptions, RunReport, Totals},
    setup::ensure_attribute,
    ListStats, NoProgress, ProgressSink,
};

use super::{print_hint, progress::BarProgress, Context};
use crate::GlobalArgs;

/// Arguments for `reminder-warrior sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Reminders list to sync (overrides the configured default).
    #[arg(long, short = 'l', value_name = "NAME", conflicts_with = "all")]
    pub list: Option<String>,

    /// Sync every Reminders list.
    #[arg(long)]
    pub all: bool,

    /// Report what would be created without creating anything.
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Show a progress bar per list.
    #[arg(long)]
    pub progress: bool,

    /// Fetch all lists in one call (all-lists mode only; no timeout).
    #[arg(long)]
    pub bulk: bool,

    /// Stop after the first list that fails.
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip the Taskwarrior attribute check; tasks are created untagged.
    #[arg(long)]
    pub no_setup: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let selector = resolve_selector(self.list.clone().map(ListName::from), self.all, &ctx.config)?;

        tracing::debug!("syncing {selector}");

        let source = ctx.source();
        let mut destination = ctx.destination();

        let tag_with_source_id = if self.no_setup {
            false
        } else {
            ensure_attribute(&mut destination, &ctx.attribute(), self.dry_run)
                .context("failed to set up the Taskwarrior attribute")?
        };

        let options = RunOptions {
            dry_run: self.dry_run,
            fail_fast: self.fail_fast,
            fetch: if self.bulk {
                FetchMode::Bulk
            } else {
                FetchMode::PerList
            },
            tag_with_source_id,
        };

        let mut bars;
        let mut quiet = NoProgress;
        let progress: &mut dyn ProgressSink = if self.progress && !self.json {
            bars = BarProgress::new(self.dry_run);
            &mut bars
        } else {
            &mut quiet
        };

        let report = orchestrator::run(
            &source,
            &mut destination,
            &ctx.store,
            &selector,
            &options,
            progress,
        )
        .with_context(|| format!("sync failed for {selector}"))?;

        if self.json {
            print_json(&report)?;
        } else {
            print_report(&report);
        }

        if report.has_failures() {
            bail!("sync finished with failures");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

fn print_report(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if report.lists.is_empty() {
        println!("{prefix}No Reminders lists found.");
        return;
    }

    for outcome in &report.lists {
        match outcome {
            ListOutcome::Synced(stats) => print_list(prefix, stats),
            ListOutcome::Failed { list, error } => {
                println!(
                    "{prefix}{} Sync failed for list '{list}': {error}",
                    "✗".red().bold()
                );
                print_hint(error.guidance());
            }
            ListOutcome::NotRun { list } => {
                println!("{prefix}{} '{list}' not attempted (--fail-fast)", "·".bright_black());
            }
        }
    }

    if report.selector == ListSelector::All {
        println!("{prefix}Overall: {}", counts(&report.overall()));
    }
}

fn print_list(prefix: &str, stats: &ListStats) {
    let t = Totals {
        total: stats.total,
        new: stats.new,
        skipped: stats.skipped,
        failed: stats.failed,
        drifted: stats.drifted,
        elapsed: stats.elapsed,
    };
    println!("{prefix}[{}] Done: {}", stats.list, counts(&t));

    for failure in &stats.failures {
        println!(
            "  {} '{}' ({}): {}",
            "✗".red(),
            failure.title,
            failure.id,
            failure.message
        );
    }
    if stats.drifted > 0 {
        println!(
            "  {} {} synced reminder(s) changed since they were synced; tasks left as-is",
            "~".yellow(),
            stats.drifted
        );
    }
    if let Some(err) = &stats.persistence_error {
        println!(
            "  {} could not save sync state: {err}",
            "warning:".yellow().bold()
        );
        print_hint(Some(
            "tasks created in this run may be created again on the next run",
        ));
    }
}

fn counts(t: &Totals) -> String {
    format!(
        "total={} new={} skipped={} failed={} time={:.2}s",
        t.total,
        t.new,
        t.skipped,
        t.failed,
        t.elapsed.as_secs_f64()
    )
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RunReportJson {
    selector: String,
    dry_run: bool,
    lists: Vec<ListReportJson>,
    overall: CountsJson,
}

#[derive(Serialize)]
struct ListReportJson {
    list: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    counts: Option<CountsJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed_items: Vec<FailedItemJson>,
}

#[derive(Serialize)]
struct CountsJson {
    total: usize,
    new: usize,
    skipped: usize,
    failed: usize,
    drifted: usize,
    elapsed_secs: f64,
}

#[derive(Serialize)]
struct FailedItemJson {
    id: String,
    title: String,
    message: String,
}

impl From<&ListStats> for CountsJson {
    fn from(stats: &ListStats) -> Self {
        Self {
            total: stats.total,
            new: stats.new,
            skipped: stats.skipped,
            failed: stats.failed,
            drifted: stats.drifted,
            elapsed_secs: stats.elapsed.as_secs_f64(),
        }
    }
}

impl From<Totals> for CountsJson {
    fn from(t: Totals) -> Self {
        Self {
            total: t.total,
            new: t.new,
            skipped: t.skipped,
            failed: t.failed,
            drifted: t.drifted,
            elapsed_secs: t.elapsed.as_secs_f64(),
        }
    }
}

fn list_json(outcome: &ListOutcome) -> ListReportJson {
    match outcome {
        ListOutcome::Synced(stats) => ListReportJson {
            list: stats.list.to_string(),
            status: if stats.persistence_failed() {
                "unsaved"
            } else {
                "synced"
            },
            counts: Some(stats.into()),
            error: stats.persistence_error.clone(),
            hint: None,
            failed_items: stats
                .failures
                .iter()
                .map(|f| FailedItemJson {
                    id: f.id.to_string(),
                    title: f.title.clone(),
                    message: f.message.clone(),
                })
                .collect(),
        },
        ListOutcome::Failed { list, error } => ListReportJson {
            list: list.to_string(),
            status: "failed",
            counts: None,
            error: Some(error.to_string()),
            hint: error.guidance(),
            failed_items: Vec::new(),
        },
        ListOutcome::NotRun { list } => ListReportJson {
            list: list.to_string(),
            status: "not_run",
            counts: None,
            error: None,
            hint: None,
            failed_items: Vec::new(),
        },
    }
}

fn print_json(report: &RunReport) -> Result<()> {
    let payload = RunReportJson {
        selector: report.selector.clone().into(),
        dry_run: report.dry_run,
        lists: report.lists.iter().map(list_json).collect(),
        overall: report.overall().into(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync report")?
    );
    Ok(())
}
