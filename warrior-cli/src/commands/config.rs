//! `reminder-warrior config` — define the Taskwarrior attribute for reminder ids.

use anyhow::{bail, Context as _, Result};
use clap::Args;
use colored::Colorize;

use warrior_sync::setup::ensure_attribute;

use super::Context;
use crate::GlobalArgs;

/// Arguments for `reminder-warrior config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Check the attribute without changing the Taskwarrior config.
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

impl ConfigArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let attribute = ctx.attribute();
        let mut destination = ctx.destination();

        let ready = ensure_attribute(&mut destination, &attribute, self.dry_run)
            .context("attribute setup failed")?;
        if !ready {
            bail!(
                "attribute '{}' is still missing after configuring Taskwarrior",
                attribute.name
            );
        }

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!(
            "{prefix}{} Taskwarrior attribute '{}' ({}) is configured",
            "✓".green().bold(),
            attribute.name,
            attribute.label
        );
        Ok(())
    }
}
