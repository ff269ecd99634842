//! `reminder-warrior status` — what the sync state says has been synced.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use warrior_core::ListSelector;
use warrior_sync::SyncState;

use super::Context;
use crate::GlobalArgs;

/// Arguments for `reminder-warrior status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let state = ctx.store.load().with_context(|| {
            format!("failed to load sync state from {}", ctx.store.path().display())
        })?;

        let report = build_report(&ctx, &state);
        if self.json {
            print_json(report)?;
            return Ok(());
        }

        print_table(report);
        Ok(())
    }
}

#[derive(Debug)]
struct StatusReport {
    default_list: Option<ListSelector>,
    state_file: String,
    last_run_at: Option<DateTime<Utc>>,
    records: usize,
    lists: Vec<ListRow>,
}

#[derive(Debug)]
struct ListRow {
    list: String,
    records: usize,
    last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct StatusReportJson {
    default_list: Option<String>,
    state_file: String,
    last_run_at: Option<String>,
    records: usize,
    lists: Vec<ListStatusJson>,
}

#[derive(Serialize)]
struct ListStatusJson {
    list: String,
    records: usize,
    last_synced_at: Option<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "list")]
    list: String,
    #[tabled(rename = "synced reminders")]
    records: usize,
    #[tabled(rename = "last sync")]
    last_sync: String,
}

fn build_report(ctx: &Context, state: &SyncState) -> StatusReport {
    let lists = state
        .summary_by_list()
        .into_iter()
        .map(|(list, summary)| ListRow {
            list: list.to_string(),
            records: summary.records,
            last_synced_at: summary.last_synced_at,
        })
        .collect();

    StatusReport {
        default_list: ctx.config.default_list.clone(),
        state_file: ctx.store.path().display().to_string(),
        last_run_at: state.last_run_at,
        records: state.len(),
        lists,
    }
}

fn print_json(report: StatusReport) -> Result<()> {
    let payload = StatusReportJson {
        default_list: report.default_list.map(String::from),
        state_file: report.state_file,
        last_run_at: report.last_run_at.map(|t| t.to_rfc3339()),
        records: report.records,
        lists: report
            .lists
            .into_iter()
            .map(|row| ListStatusJson {
                list: row.list,
                records: row.records,
                last_synced_at: row.last_synced_at.map(|t| t.to_rfc3339()),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(report: StatusReport) {
    let default_list = report
        .default_list
        .as_ref()
        .map_or_else(|| "not set".to_string(), ToString::to_string);
    println!(
        "reminder-warrior v{} | default: {} | {} synced reminders | last run: {}",
        env!("CARGO_PKG_VERSION"),
        default_list,
        report.records,
        report.last_run_at.map_or_else(|| "never".to_string(), format_age),
    );
    println!("{}", format!("state: {}", report.state_file).bright_black());

    if report.lists.is_empty() {
        println!("Nothing synced yet. Run 'reminder-warrior sync' to start.");
        return;
    }

    let rows: Vec<StatusTableRow> = report
        .lists
        .into_iter()
        .map(|row| StatusTableRow {
            list: row.list,
            records: row.records,
            last_sync: row.last_synced_at.map_or_else(|| "never".to_string(), format_age),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

/// `42s ago`, `5m ago`, `3h ago`, `2d ago`.
fn format_age(timestamp: DateTime<Utc>) -> String {
    let secs = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0);
    match secs {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}
