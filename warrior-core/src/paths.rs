use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const APP_DIR: &str = ".reminder-warrior";
pub const CONFIG_FILE: &str = "config.yaml";
pub const STATE_FILE: &str = "sync-state.json";

pub fn app_root(home: &Path) -> PathBuf {
    home.join(APP_DIR)
}

pub fn config_path(home: &Path) -> PathBuf {
    app_root(home).join(CONFIG_FILE)
}

pub fn state_path(home: &Path) -> PathBuf {
    app_root(home).join(STATE_FILE)
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
