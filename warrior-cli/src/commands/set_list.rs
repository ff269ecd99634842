//! `reminder-warrior set-list` — choose the default list for `sync`.

use std::io::IsTerminal;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use dialoguer::Select;

use warrior_core::{config as app_config, ListName, ListSelector};
use warrior_sync::SourceReader;

use super::{collaborator_failure, Context};
use crate::GlobalArgs;

/// Arguments for `reminder-warrior set-list`.
#[derive(Args, Debug)]
pub struct SetListArgs {
    /// List to use by default. Omit (and omit `--all`) to pick interactively.
    #[arg(value_name = "NAME", conflicts_with = "all")]
    pub name: Option<String>,

    /// Sync every list by default.
    #[arg(long)]
    pub all: bool,
}

impl SetListArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let mut ctx = Context::load(global)?;

        let selector = match (self.name, self.all) {
            (_, true) => ListSelector::All,
            (Some(name), false) => ListSelector::Named(ListName::from(name)),
            (None, false) => pick(&ctx)?,
        };

        ctx.config.default_list = Some(selector.clone());
        app_config::save_at(&ctx.home, &ctx.config).context("failed to save config")?;
        println!("Default Reminders list set to: {selector}");
        Ok(())
    }
}

fn pick(ctx: &Context) -> Result<ListSelector> {
    if !(std::io::stdin().is_terminal() && std::io::stdout().is_terminal()) {
        bail!("no terminal for the list picker; pass a list name or --all");
    }

    let lists = ctx
        .source()
        .list_catalog()
        .map_err(|e| collaborator_failure(e, "failed to read Reminders lists"))?;
    if lists.is_empty() {
        bail!("no Reminders lists available");
    }

    let mut options = vec!["All lists".to_string()];
    options.extend(lists.iter().map(ToString::to_string));
    let current = match &ctx.config.default_list {
        Some(ListSelector::Named(name)) => lists.iter().position(|l| l == name).map_or(0, |i| i + 1),
        _ => 0,
    };

    let choice = Select::new()
        .with_prompt("Default Reminders list")
        .items(&options)
        .default(current)
        .interact()
        .context("list selection cancelled")?;

    Ok(match choice {
        0 => ListSelector::All,
        i => ListSelector::Named(lists[i - 1].clone()),
    })
}
