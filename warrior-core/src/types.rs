//! Domain types shared by the sync engine, the bridges and the CLI.
//!
//! Identifiers are opaque strings assigned by the external tools; the
//! newtypes only keep them from being mixed up with each other.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Source-assigned identifier of a reminder (e.g. `x-apple-reminder://…`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name of a list in the source (a Reminders list).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListName(pub String);

impl ListName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ListName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ListName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a task created in the destination (a Taskwarrior UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskUuid(pub String);

impl TaskUuid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskUuid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskUuid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Source items
// ---------------------------------------------------------------------------

/// An active (incomplete) reminder as returned by one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
}

impl SourceItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            notes: String::new(),
            due: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }
}

// ---------------------------------------------------------------------------
// List selection
// ---------------------------------------------------------------------------

/// Persisted spelling of [`ListSelector::All`].
pub const ALL_LISTS: &str = "*";

/// Which source list(s) a run should reconcile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListSelector {
    /// A single named list.
    Named(ListName),
    /// Every list in the source catalog.
    All,
}

impl From<String> for ListSelector {
    fn from(s: String) -> Self {
        if s == ALL_LISTS {
            Self::All
        } else {
            Self::Named(ListName(s))
        }
    }
}

impl From<&str> for ListSelector {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<ListSelector> for String {
    fn from(selector: ListSelector) -> Self {
        match selector {
            ListSelector::Named(name) => name.0,
            ListSelector::All => ALL_LISTS.to_string(),
        }
    }
}

impl fmt::Display for ListSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListSelector::Named(name) => name.fmt(f),
            ListSelector::All => write!(f, "all lists"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
