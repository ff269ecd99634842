//! Subcommand implementations and the bits they share.

pub mod config;
pub mod lists;
pub mod progress;
pub mod reminders;
pub mod set_list;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use colored::Colorize;

use warrior_bridge::{RemindersClient, TaskwarriorClient};
use warrior_core::{config as app_config, Config};
use warrior_sync::{AttributeDefinition, AttributeKind, CollaboratorError, StateStore};

use crate::GlobalArgs;

/// Home directory, loaded config and state location for one invocation.
pub struct Context {
    pub home: PathBuf,
    pub config: Config,
    pub store: StateStore,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let config = app_config::load_at(&home).context("failed to load config")?;
        let store = match &global.sync_state_file {
            Some(path) => StateStore::new(path),
            None => StateStore::at_home(&home),
        };
        tracing::debug!("sync state at {}", store.path().display());
        Ok(Self {
            home,
            config,
            store,
        })
    }

    pub fn source(&self) -> RemindersClient {
        RemindersClient::from_config(&self.config.bridge)
    }

    pub fn destination(&self) -> TaskwarriorClient {
        TaskwarriorClient::from_config(&self.config.bridge, self.config.attribute.name.clone())
    }

    /// The string UDA that carries reminder ids on created tasks.
    pub fn attribute(&self) -> AttributeDefinition {
        AttributeDefinition {
            name: self.config.attribute.name.clone(),
            kind: Some(AttributeKind::String),
            label: self.config.attribute.label.clone(),
        }
    }
}

/// Wrap a collaborator error for `anyhow`, folding any hint into the message.
pub fn collaborator_failure(err: CollaboratorError, what: &str) -> anyhow::Error {
    let message = match err.guidance() {
        Some(hint) => format!("{what} (hint: {hint})"),
        None => what.to_string(),
    };
    anyhow::Error::new(err).context(message)
}

pub fn print_hint(hint: Option<&str>) {
    if let Some(hint) = hint {
        println!("   {} {hint}", "hint:".yellow());
    }
}
