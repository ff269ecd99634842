//! Persisted user configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.reminder-warrior/
//!   config.yaml       (mode 0600)
//!   config.yaml.bak   (previous config, only if it failed to parse)
//!   sync-state.json   (owned by warrior-sync)
//! ```
//!
//! # API pattern
//!
//! Every function that touches disk has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::paths;
use crate::types::{ListName, ListSelector};

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ATTRIBUTE_NAME: &str = "reminderid";
pub const DEFAULT_ATTRIBUTE_LABEL: &str = "Reminder ID";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Root of `config.yaml`. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// List synced when neither `--list` nor `--all` is given. `"*"` = all lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_list: Option<ListSelector>,
    pub bridge: BridgeConfig,
    pub attribute: AttributeConfig,
}

/// External executables used by the Reminders and Taskwarrior bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub osascript: String,
    pub task: String,
    /// Per-call timeout. Bulk fetches are not bounded.
    pub timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            osascript: "osascript".to_string(),
            task: "task".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Destination attribute (Taskwarrior UDA) that carries the reminder id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeConfig {
    pub name: String,
    pub label: String,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ATTRIBUTE_NAME.to_string(),
            label: DEFAULT_ATTRIBUTE_LABEL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.reminder-warrior/config.yaml`.
///
/// A missing file yields [`Config::default`]. A file that fails to parse is
/// moved to `config.yaml.bak` and defaults are returned.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = paths::config_path(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    match serde_yaml::from_str::<Config>(&contents) {
        Ok(config) => Ok(config),
        Err(err) => {
            let bak = path.with_extension("yaml.bak");
            std::fs::rename(&path, &bak).map_err(|e| io_err(&bak, e))?;
            tracing::warn!(
                "config at {} could not be parsed ({err}); moved to {} and using defaults",
                path.display(),
                bak.display()
            );
            Ok(Config::default())
        }
    }
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&paths::home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config: serialize → `config.yaml.tmp` → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = paths::app_root(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    let path = paths::config_path(home);
    let tmp_path = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&paths::home()?, config)
}

// ---------------------------------------------------------------------------
// 4. Selector resolution
// ---------------------------------------------------------------------------

/// Pick the lists to sync: an explicit `--list` wins, then `--all`, then the
/// configured default.
pub fn resolve_selector(
    explicit: Option<ListName>,
    all: bool,
    config: &Config,
) -> Result<ListSelector, ConfigError> {
    if let Some(name) = explicit {
        return Ok(ListSelector::Named(name));
    }
    if all {
        return Ok(ListSelector::All);
    }
    config
        .default_list
        .clone()
        .ok_or(ConfigError::NoListSelected)
}

// ---------------------------------------------------------------------------
// 5. Permissions
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
