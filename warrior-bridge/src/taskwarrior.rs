//! Taskwarrior over the `task` CLI.

use std::time::Duration;

use chrono::{DateTime, Utc};

use warrior_core::{BridgeConfig, TaskUuid};
use warrior_sync::{AttributeDefinition, AttributeKind, CollaboratorError, NewTask, TaskDestination};

use crate::process::run_tool;

const TOOL: &str = "task";
const UNTITLED: &str = "(untitled reminder)";

/// [`TaskDestination`] backed by a local Taskwarrior install.
#[derive(Debug, Clone)]
pub struct TaskwarriorClient {
    program: String,
    timeout: Duration,
    attribute: String,
}

impl TaskwarriorClient {
    /// `attribute` is the UDA written on created tasks when the source id is known.
    pub fn new(program: impl Into<String>, timeout: Duration, attribute: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout,
            attribute: attribute.into(),
        }
    }

    pub fn from_config(config: &BridgeConfig, attribute: impl Into<String>) -> Self {
        Self::new(config.task.clone(), config.timeout(), attribute)
    }

    fn task(&self, args: Vec<String>) -> Result<String, CollaboratorError> {
        let mut full = vec!["rc.confirmation=off".to_string()];
        full.extend(args);
        run_tool(TOOL, &self.program, &full, Some(self.timeout))
    }
}

impl TaskDestination for TaskwarriorClient {
    fn create_task(&mut self, task: &NewTask<'_>) -> Result<TaskUuid, CollaboratorError> {
        let out = self.task(add_args(task, &self.attribute))?;
        let uuid = parse_created_uuid(&out).ok_or_else(|| CollaboratorError::Malformed {
            tool: TOOL.to_string(),
            detail: format!("no task UUID in `task add` output: {}", out.trim()),
        })?;

        let notes = task.notes.trim();
        if !notes.is_empty() {
            let annotate = vec![
                uuid.to_string(),
                "annotate".to_string(),
                "--".to_string(),
                notes.to_string(),
            ];
            if let Err(e) = self.task(annotate) {
                tracing::warn!("created {uuid} but could not attach notes: {e}");
            }
        }
        Ok(uuid)
    }

    fn attribute(&self, name: &str) -> Result<Option<AttributeDefinition>, CollaboratorError> {
        let out = self.task(vec!["rc.verbose=nothing".to_string(), "_show".to_string()])?;
        Ok(parse_attribute(&out, name))
    }

    fn define_attribute(
        &mut self,
        definition: &AttributeDefinition,
    ) -> Result<(), CollaboratorError> {
        let kind = definition.kind.unwrap_or(AttributeKind::String);
        self.task(vec![
            "config".to_string(),
            format!("uda.{}.type", definition.name),
            kind.as_str().to_string(),
        ])?;
        self.task(vec![
            "config".to_string(),
            format!("uda.{}.label", definition.name),
            definition.label.clone(),
        ])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Argument building and parsing
// ---------------------------------------------------------------------------

/// `task add` arguments. Modifiers come before `--`; everything after it is
/// the description, so titles with colons are not parsed as attributes.
pub(crate) fn add_args(task: &NewTask<'_>, attribute: &str) -> Vec<String> {
    let mut args = vec!["rc.verbose=new-uuid".to_string(), "add".to_string()];
    if let Some(due) = task.due {
        args.push(format!("due:{}", format_due(due)));
    }
    if let Some(id) = task.source_id {
        args.push(format!("{attribute}:{id}"));
    }
    args.push("--".to_string());
    let title = task.title.trim();
    args.push(if title.is_empty() { UNTITLED } else { title }.to_string());
    args
}

/// Taskwarrior's native `YYYYMMDDTHHMMSSZ` form.
fn format_due(due: DateTime<Utc>) -> String {
    due.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Pick the UUID out of `Created task <uuid>.`.
pub(crate) fn parse_created_uuid(out: &str) -> Option<TaskUuid> {
    out.split_whitespace()
        .map(|token| token.trim_end_matches('.'))
        .find(|token| looks_like_uuid(token))
        .map(TaskUuid::from)
}

fn looks_like_uuid(s: &str) -> bool {
    s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

/// Read `uda.<name>.type` / `uda.<name>.label` out of `task _show`.
pub(crate) fn parse_attribute(show: &str, name: &str) -> Option<AttributeDefinition> {
    let type_key = format!("uda.{name}.type=");
    let label_key = format!("uda.{name}.label=");
    let mut kind = None;
    let mut label = String::new();
    for line in show.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix(&type_key) {
            kind = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(&label_key) {
            label = value.trim().to_string();
        }
    }
    kind.map(|k| AttributeDefinition {
        name: name.to_string(),
        kind: AttributeKind::parse(&k),
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use warrior_core::ItemId;

    #[test]
    fn add_args_put_modifiers_before_description() {
        let id = ItemId::from("x-apple-reminder://AB-12");
        let due = Utc.with_ymd_and_hms(2024, 5, 14, 7, 30, 0).unwrap();
        let task = NewTask {
            title: "Meeting: budget",
            notes: "",
            due: Some(due),
            source_id: Some(&id),
        };
        assert_eq!(
            add_args(&task, "reminderid"),
            vec![
                "rc.verbose=new-uuid",
                "add",
                "due:20240514T073000Z",
                "reminderid:x-apple-reminder://AB-12",
                "--",
                "Meeting: budget",
            ]
        );
    }

    #[test]
    fn add_args_without_due_or_tag() {
        let task = NewTask {
            title: "  ",
            notes: "",
            due: None,
            source_id: None,
        };
        assert_eq!(
            add_args(&task, "reminderid"),
            vec!["rc.verbose=new-uuid", "add", "--", "(untitled reminder)"]
        );
    }

    #[test]
    fn uuid_is_found_in_created_message() {
        let out = "Created task 3f2a1b4c-0d5e-4f60-8a7b-9c0d1e2f3a4b.\n";
        assert_eq!(
            parse_created_uuid(out),
            Some(TaskUuid::from("3f2a1b4c-0d5e-4f60-8a7b-9c0d1e2f3a4b"))
        );
        assert_eq!(parse_created_uuid("Created task 12."), None);
    }

    #[rstest]
    #[case("3f2a1b4c-0d5e-4f60-8a7b-9c0d1e2f3a4b", true)]
    #[case("3F2A1B4C-0D5E-4F60-8A7B-9C0D1E2F3A4B", true)]
    #[case("3f2a1b4c-0d5e-4f60-8a7b-9c0d1e2f3a4", false)]
    #[case("3f2a1b4c00d5e-4f60-8a7b-9c0d1e2f3a4b", false)]
    #[case("zf2a1b4c-0d5e-4f60-8a7b-9c0d1e2f3a4b", false)]
    fn uuid_shape(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(looks_like_uuid(candidate), expected);
    }

    #[test]
    fn attribute_definition_read_from_show() {
        let show = "color=on\nuda.reminderid.type=string\nuda.reminderid.label=Reminder ID\nuda.other.type=numeric\n";
        let def = parse_attribute(show, "reminderid").expect("defined");
        assert_eq!(def.kind, Some(AttributeKind::String));
        assert_eq!(def.label, "Reminder ID");

        let other = parse_attribute(show, "other").expect("defined");
        assert_eq!(other.kind, Some(AttributeKind::Numeric));

        assert!(parse_attribute(show, "missing").is_none());
    }
}
