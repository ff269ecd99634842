//! Error types for warrior-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure, with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.reminder-warrior/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// Neither `--list`, `--all` nor a configured default selected anything.
    #[error(
        "no reminders list specified; use --list or run `reminder-warrior set-list` to configure a default"
    )]
    NoListSelected,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
