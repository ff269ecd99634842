//! Apple Reminders over `osascript`.
//!
//! Every reminder is emitted as one record:
//!
//! ```text
//! <list> US <id> US <title> US <notes> US <due> RS
//! ```
//!
//! with `US` = U+001F and `RS` = U+001E, so notes may contain newlines.
//! `<due>` is local wall-clock time as `YYYY-MM-DDTHH:MM:SS`, or empty.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use warrior_core::{BridgeConfig, ItemId, ListName, SourceItem};
use warrior_sync::{CollaboratorError, SourceReader};

use crate::process::run_tool;

const TOOL: &str = "osascript";
const UNIT_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';
const DUE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Handlers shared by the per-list and bulk scripts.
const HANDLERS: &str = r#"on pad(n)
    return text -2 thru -1 of ("0" & n)
end pad

on isoDate(d)
    return (year of d as string) & "-" & my pad(month of d as integer) & "-" & my pad(day of d) & "T" & my pad(hours of d) & ":" & my pad(minutes of d) & ":" & my pad(seconds of d)
end isoDate

on describe(r, listName)
    tell application "Reminders"
        set US to character id 31
        set rBody to body of r
        if rBody is missing value then set rBody to ""
        set rDue to ""
        if due date of r is not missing value then set rDue to my isoDate(due date of r)
        return listName & US & (id of r) & US & (name of r) & US & rBody & US & rDue & (character id 30)
    end tell
end describe
"#;

const CATALOG_SCRIPT: &str = r#"tell application "Reminders"
    set AppleScript's text item delimiters to linefeed
    return (name of lists) as text
end tell"#;

/// [`SourceReader`] backed by the Reminders app.
#[derive(Debug, Clone)]
pub struct RemindersClient {
    program: String,
    timeout: Duration,
}

impl RemindersClient {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.osascript.clone(), config.timeout())
    }

    fn run_script(&self, script: &str, timeout: Option<Duration>) -> Result<String, CollaboratorError> {
        run_tool(TOOL, &self.program, &script_args(script), timeout)
    }
}

impl SourceReader for RemindersClient {
    fn list_catalog(&self) -> Result<Vec<ListName>, CollaboratorError> {
        let out = self.run_script(CATALOG_SCRIPT, Some(self.timeout))?;
        Ok(parse_catalog(&out))
    }

    fn fetch_active_items(&self, list: &ListName) -> Result<Vec<SourceItem>, CollaboratorError> {
        let out = self.run_script(&list_script(list), Some(self.timeout))?;
        Ok(parse_records(&out)
            .into_iter()
            .map(|(_, item)| item)
            .collect())
    }

    fn fetch_all_active_items(
        &self,
    ) -> Result<BTreeMap<ListName, Vec<SourceItem>>, CollaboratorError> {
        let out = self.run_script(&bulk_script(), None)?;
        let mut grouped: BTreeMap<ListName, Vec<SourceItem>> = BTreeMap::new();
        for (list, item) in parse_records(&out) {
            grouped.entry(list).or_default().push(item);
        }
        Ok(grouped)
    }
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

/// `osascript -e line -e line …` — one `-e` per script line.
fn script_args(script: &str) -> Vec<String> {
    script
        .lines()
        .flat_map(|line| ["-e".to_string(), line.to_string()])
        .collect()
}

/// Quote `s` as an AppleScript string literal.
pub(crate) fn applescript_quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

pub(crate) fn list_script(list: &ListName) -> String {
    let name = applescript_quote(list.as_str());
    format!(
        r#"{HANDLERS}
tell application "Reminders"
    set output to ""
    repeat with r in (reminders of list {name} whose completed is false)
        set output to output & my describe(r, {name})
    end repeat
    return output
end tell"#
    )
}

pub(crate) fn bulk_script() -> String {
    format!(
        r#"{HANDLERS}
tell application "Reminders"
    set output to ""
    repeat with l in lists
        set listName to name of l
        repeat with r in (reminders of l whose completed is false)
            set output to output & my describe(r, listName)
        end repeat
    end repeat
    return output
end tell"#
    )
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub(crate) fn parse_catalog(out: &str) -> Vec<ListName> {
    out.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ListName::from)
        .collect()
}

/// Parse the record stream. Records with the wrong field count are skipped.
pub(crate) fn parse_records(out: &str) -> Vec<(ListName, SourceItem)> {
    let body = out.strip_suffix('\n').unwrap_or(out);
    let mut parsed = Vec::new();
    for record in body.split(RECORD_SEP) {
        if record.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = record.split(UNIT_SEP).collect();
        let &[list, id, title, notes, due] = fields.as_slice() else {
            tracing::warn!(
                "skipping reminder record with {} field(s), expected 5",
                fields.len()
            );
            continue;
        };
        let list = list.trim_start_matches('\n');
        let mut item = SourceItem::new(ItemId::from(id), title).with_notes(notes);
        if !due.is_empty() {
            match parse_local_due(due) {
                Some(due) => item.due = Some(due),
                None => tracing::warn!("ignoring unparseable due date '{due}' on '{title}'"),
            }
        }
        parsed.push((ListName::from(list), item));
    }
    parsed
}

fn parse_local_due(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, DUE_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
