//! Pure editor-descriptor construction.
//!
//! Maps `(column, current value)` to a description of the edit control the
//! presentation layer should show: kind, initial display string, and
//! options for one-of selections. No render-tree coupling; everything here
//! is data.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::{GridError, Result};
use crate::types::{Column, Datatype};

/// Kind of edit control to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    /// Free-form text input.
    Text,
    /// Calendar date input (`YYYY-MM-DD`).
    Date,
    /// Date-and-time input (`YYYY-MM-DDTHH:MM`).
    DateTime,
    /// One-of selection.
    Select,
}

/// One selectable option of a `Select` editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Raw value submitted on commit: the literal string, or the JSON
    /// encoding of a structured value.
    pub value: String,
    /// Human-readable label.
    pub label: String,
    /// Whether this option matches the cell's current value.
    pub selected: bool,
}

/// Description of the edit control for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorDescriptor {
    pub kind: EditorKind,
    /// Initial display string shown in the control.
    pub initial: String,
    /// Whether the control should select its content on focus.
    pub select_all: bool,
    /// Options for `Select` editors; empty otherwise.
    pub options: Vec<SelectOption>,
}

/// Build the editor descriptor for a cell.
///
/// # Errors
///
/// `GridError::Config` when an enumerated column carries an empty option
/// list; a broken control must not render silently.
pub fn editor_descriptor(column: &Column, current: Option<&Value>) -> Result<EditorDescriptor> {
    match &column.datatype {
        Datatype::Text => Ok(EditorDescriptor {
            kind: EditorKind::Text,
            initial: display_string(current),
            select_all: true,
            options: Vec::new(),
        }),
        Datatype::Date => Ok(EditorDescriptor {
            kind: EditorKind::Date,
            initial: parse_datetime_value(current)
                .map(|dt| format_date(dt.date()))
                .unwrap_or_default(),
            select_all: false,
            options: Vec::new(),
        }),
        Datatype::DateTime => Ok(EditorDescriptor {
            kind: EditorKind::DateTime,
            initial: parse_datetime_value(current)
                .map(format_datetime)
                .unwrap_or_default(),
            select_all: false,
            options: Vec::new(),
        }),
        Datatype::Options(list) => {
            if list.is_empty() {
                return Err(GridError::Config(
                    "no data list specified for list column type".to_string(),
                ));
            }
            Ok(EditorDescriptor {
                kind: EditorKind::Select,
                initial: display_string(current),
                select_all: false,
                options: select_options(list, current)?,
            })
        }
    }
}

/// Build the option list for a select editor. A leading blank option is
/// added when the cell has no current value, so an unset value is not
/// silently replaced by the first real option.
fn select_options(list: &[Value], current: Option<&Value>) -> Result<Vec<SelectOption>> {
    let absent = value_absent(current);
    let mut options = Vec::with_capacity(list.len() + usize::from(absent));

    if absent {
        options.push(SelectOption {
            value: String::new(),
            label: String::new(),
            selected: true,
        });
    }

    for data in list {
        let value = match data {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        let label = data
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| display_string(Some(data)));
        let selected = !absent && current.is_some_and(|cur| cur == data || ids_match(cur, data));
        options.push(SelectOption {
            value,
            label,
            selected,
        });
    }

    Ok(options)
}

/// Structured option values match by their `id` field.
fn ids_match(current: &Value, data: &Value) -> bool {
    match (current.get("id"), data.get("id")) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn value_absent(current: Option<&Value>) -> bool {
    match current {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Display string of a cell value.
pub(crate) fn display_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Format the ISO-prefix shown by date controls.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format the ISO-prefix shown by datetime controls (minute precision).
pub(crate) fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M").to_string()
}

/// Parse a cell value into a naive datetime, accepting the formats a date
/// control may have produced plus RFC 3339 and epoch milliseconds.
pub(crate) fn parse_datetime_value(value: Option<&Value>) -> Option<NaiveDateTime> {
    match value {
        Some(Value::String(s)) => parse_datetime_str(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

pub(crate) fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
