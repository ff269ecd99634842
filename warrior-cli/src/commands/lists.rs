//! `reminder-warrior lists` — print the Reminders list catalog.

use anyhow::Result;
use clap::Args;

use warrior_sync::SourceReader;

use super::{collaborator_failure, Context};
use crate::GlobalArgs;

/// Arguments for `reminder-warrior lists`.
#[derive(Args, Debug)]
pub struct ListsArgs {}

impl ListsArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let ctx = Context::load(global)?;
        let lists = ctx
            .source()
            .list_catalog()
            .map_err(|e| collaborator_failure(e, "failed to read Reminders lists"))?;

        if lists.is_empty() {
            println!("No Reminders lists found.");
            return Ok(());
        }
        for list in lists {
            println!("{list}");
        }
        Ok(())
    }
}
