//! Collaborators that shell out to the real tools.
//!
//! - [`RemindersClient`] — Apple Reminders via `osascript` ([`warrior_sync::SourceReader`])
//! - [`TaskwarriorClient`] — Taskwarrior via `task` ([`warrior_sync::TaskDestination`])

mod process;
pub mod reminders;
pub mod taskwarrior;

pub use reminders::RemindersClient;
pub use taskwarrior::TaskwarriorClient;
