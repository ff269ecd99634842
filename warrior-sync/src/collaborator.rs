//! Interfaces to the external systems on both sides of a sync.
//!
//! The engine never talks to Reminders or Taskwarrior directly; `warrior-bridge`
//! implements these traits over the real tools and tests use in-memory fakes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use warrior_core::{ItemId, ListName, SourceItem, TaskUuid};

use crate::error::CollaboratorError;

/// Read side: the task list being synced from.
pub trait SourceReader {
    /// Names of every list in the source.
    fn list_catalog(&self) -> Result<Vec<ListName>, CollaboratorError>;

    /// Active (incomplete) items of one list, in source order.
    fn fetch_active_items(&self, list: &ListName) -> Result<Vec<SourceItem>, CollaboratorError>;

    /// Active items of every list in one call. May take longer than the
    /// per-list fetch; implementations should not apply the per-call timeout.
    fn fetch_all_active_items(
        &self,
    ) -> Result<BTreeMap<ListName, Vec<SourceItem>>, CollaboratorError>;
}

/// A task about to be created in the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub notes: &'a str,
    pub due: Option<DateTime<Utc>>,
    /// Set when the identifier attribute is available.
    pub source_id: Option<&'a ItemId>,
}

impl<'a> NewTask<'a> {
    pub fn from_item(item: &'a SourceItem, tag_with_source_id: bool) -> Self {
        Self {
            title: &item.title,
            notes: &item.notes,
            due: item.due,
            source_id: tag_with_source_id.then_some(&item.id),
        }
    }
}

/// Value kind of a destination-side custom attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Numeric,
    Date,
    Duration,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Numeric => "numeric",
            AttributeKind::Date => "date",
            AttributeKind::Duration => "duration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "string" => Some(AttributeKind::String),
            "numeric" => Some(AttributeKind::Numeric),
            "date" => Some(AttributeKind::Date),
            "duration" => Some(AttributeKind::Duration),
            _ => None,
        }
    }
}

/// Definition of the attribute that carries the source identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub name: String,
    /// `None` when the destination reports a kind this crate does not know.
    pub kind: Option<AttributeKind>,
    pub label: String,
}

impl AttributeDefinition {
    pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(AttributeKind::String),
            label: label.into(),
        }
    }
}

/// Write side: the task manager being synced into.
pub trait TaskDestination {
    /// Create one task and return its destination id.
    fn create_task(&mut self, task: &NewTask<'_>) -> Result<TaskUuid, CollaboratorError>;

    /// Current definition of a custom attribute, or `None` if undefined.
    fn attribute(&self, name: &str) -> Result<Option<AttributeDefinition>, CollaboratorError>;

    /// Define (or redefine) a custom attribute.
    fn define_attribute(&mut self, definition: &AttributeDefinition)
        -> Result<(), CollaboratorError>;
}
