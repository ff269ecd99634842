//! reminder-warrior core library — domain types, configuration, errors.
//!
//! - [`types`] — newtypes, [`SourceItem`] and [`ListSelector`]
//! - [`config`] — persisted user configuration (default list, bridge tools)
//! - [`paths`] — `~/.reminder-warrior/` layout
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use config::{AttributeConfig, BridgeConfig, Config};
pub use error::ConfigError;
pub use types::{ItemId, ListName, ListSelector, SourceItem, TaskUuid};
