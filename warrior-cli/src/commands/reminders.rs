//! `reminder-warrior reminders` — print active reminders.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use warrior_core::{config::resolve_selector, ListName, ListSelector, SourceItem};
use warrior_sync::SourceReader;

use super::{collaborator_failure, print_hint, Context};
use crate::GlobalArgs;

/// Arguments for `reminder-warrior reminders`.
#[derive(Args, Debug)]
pub struct RemindersArgs {
    /// List to show (overrides the configured default).
    #[arg(long, short = 'l', value_name = "NAME", conflicts_with = "all")]
    pub list: Option<String>,

    /// Show every list.
    #[arg(long)]
    pub all: bool,
}

impl RemindersArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let selector = resolve_selector(self.list.map(ListName::from), self.all, &ctx.config)?;
        let source = ctx.source();

        match selector {
            ListSelector::All => {
                let grouped: BTreeMap<ListName, Vec<SourceItem>> = source
                    .fetch_all_active_items()
                    .map_err(|e| collaborator_failure(e, "failed to read reminders"))?;
                if grouped.is_empty() {
                    println!("No active reminders.");
                }
                for (list, items) in &grouped {
                    print_list(list, items);
                }
            }
            ListSelector::Named(list) => match source.fetch_active_items(&list) {
                Ok(items) => print_list(&list, &items),
                Err(e) => {
                    println!("{} Could not read list '{list}': {e}", "✗".red().bold());
                    print_hint(e.guidance());
                    bail!("failed to read list '{list}'");
                }
            },
        }
        Ok(())
    }
}

fn print_list(list: &ListName, items: &[SourceItem]) {
    println!("== {} ==", list.to_string().bold());
    if items.is_empty() {
        println!("  (no reminders)");
        return;
    }
    for item in items {
        println!("  {}", describe(item));
    }
}

fn describe(item: &SourceItem) -> String {
    match item.due {
        Some(due) => format!(
            "{}: {} (due: {})",
            item.id,
            item.title,
            due.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => format!("{}: {}", item.id, item.title),
    }
}
