//! Value coercion and the commit path.
//!
//! A finished edit becomes an explicit `CellPatch` (old value, raw input,
//! coerced value) applied through a single function, so the one place the
//! row collection is mutated stays auditable and testable.

use serde::Serialize;
use serde_json::Value;

use crate::types::{Column, Datatype, Record};

use super::control::{format_date, format_datetime, parse_datetime_str};
use super::CellCoord;

/// Whether a commit changed anything. A no-op commit is reported
/// distinctly so collaborators can skip redundant downstream work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditStatus {
    /// The committed value equals the existing one.
    Same,
    /// The cell value was replaced.
    Updated,
}

/// Snapshot of the cell an edit session is bound to.
#[derive(Debug, Clone, Serialize)]
pub struct EditContext {
    /// Cursor coordinate at session open (x into displayed columns, y into
    /// the rendered window).
    pub coord: CellCoord,
    /// Absolute logical index of the edited row.
    pub row_index: usize,
    /// The column as it was when the session opened.
    pub column: Column,
}

/// Emitted when an edit session commits.
#[derive(Debug, Clone, Serialize)]
pub struct EndEdit {
    pub status: EditStatus,
    /// The raw value the control submitted.
    pub new_value: String,
    /// The session the commit belongs to.
    pub context: EditContext,
}

/// An auditable cell mutation: everything needed to apply, display, or
/// undo the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellPatch {
    pub row_index: usize,
    pub prop: String,
    /// Value before the edit (`None` when the prop was absent).
    pub old: Option<Value>,
    /// Raw control input.
    pub raw: String,
    /// The value actually written.
    pub coerced: Value,
}

/// Coerce a raw control value and compare it against the existing cell
/// value.
///
/// Returns `None` when nothing should be emitted at all: an enumerated
/// column receiving an empty selection (the blank option standing in for
/// an unset value must not clobber it). Otherwise returns the patch and
/// whether applying it would change the row.
pub fn build_patch(
    column: &Column,
    existing: Option<&Value>,
    raw: &str,
    row_index: usize,
) -> Option<(CellPatch, EditStatus)> {
    if matches!(column.datatype, Datatype::Options(_)) && raw.is_empty() {
        return None;
    }

    // Structured select values ({id, code, label}, arrays, or an explicit
    // null) are compared by serialized equality and decoded back to
    // structured form only when changed.
    let structured = matches!(
        existing,
        Some(Value::Object(_) | Value::Array(_) | Value::Null)
    );
    let (coerced, status) = if structured && is_json(raw) {
        let serialized = existing
            .and_then(|v| serde_json::to_string(v).ok())
            .unwrap_or_default();
        if serialized == raw {
            (existing.cloned().unwrap_or(Value::Null), EditStatus::Same)
        } else {
            let decoded = serde_json::from_str(raw).unwrap_or(Value::String(raw.to_string()));
            (decoded, EditStatus::Updated)
        }
    } else {
        let coerced = coerce_scalar(&column.datatype, raw);
        let status = if existing == Some(&coerced) {
            EditStatus::Same
        } else {
            EditStatus::Updated
        };
        (coerced, status)
    };

    Some((
        CellPatch {
            row_index,
            prop: column.prop.clone(),
            old: existing.cloned(),
            raw: raw.to_string(),
            coerced,
        },
        status,
    ))
}

/// Apply a patch to the row collection. The single mutation point for
/// cell edits.
pub fn apply_patch(rows: &mut [Record], patch: &CellPatch) {
    if let Some(row) = rows.get_mut(patch.row_index) {
        row.insert(patch.prop.clone(), patch.coerced.clone());
    }
}

/// Coerce a raw scalar per column datatype. Date and datetime inputs are
/// parsed back from the ISO prefix the control displayed and re-serialized
/// canonically; unparseable input falls back to the raw string.
fn coerce_scalar(datatype: &Datatype, raw: &str) -> Value {
    match datatype {
        Datatype::Date => parse_datetime_str(raw)
            .map(|dt| Value::String(format_date(dt.date())))
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Datatype::DateTime => parse_datetime_str(raw)
            .map(|dt| Value::String(format_datetime(dt)))
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Datatype::Text | Datatype::Options(_) => Value::String(raw.to_string()),
    }
}

fn is_json(raw: &str) -> bool {
    serde_json::from_str::<Value>(raw).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_column(prop: &str) -> Column {
        Column::editable(prop, Datatype::Text)
    }

    fn select_column(prop: &str) -> Column {
        Column::editable(prop, Datatype::Options(vec![json!("a"), json!("b")]))
    }

    #[test]
    fn changed_scalar_is_updated() {
        let existing = json!("old");
        let (patch, status) = build_patch(&text_column("p"), Some(&existing), "new", 0).unwrap();
        assert_eq!(status, EditStatus::Updated);
        assert_eq!(patch.coerced, json!("new"));
        assert_eq!(patch.old, Some(json!("old")));
    }

    #[test]
    fn unchanged_scalar_is_same() {
        let existing = json!("v");
        let (_, status) = build_patch(&text_column("p"), Some(&existing), "v", 0).unwrap();
        assert_eq!(status, EditStatus::Same);
    }

    #[test]
    fn empty_selection_on_select_column_is_silent() {
        assert!(build_patch(&select_column("p"), None, "", 0).is_none());
        let existing = json!("a");
        assert!(build_patch(&select_column("p"), Some(&existing), "", 0).is_none());
    }

    #[test]
    fn structured_value_compares_by_serialization() {
        let existing = json!({"id": 1, "code": "A"});
        let raw = serde_json::to_string(&existing).unwrap();
        let (_, status) = build_patch(&select_column("p"), Some(&existing), &raw, 0).unwrap();
        assert_eq!(status, EditStatus::Same);

        let (patch, status) =
            build_patch(&select_column("p"), Some(&existing), r#"{"id":2,"code":"B"}"#, 0)
                .unwrap();
        assert_eq!(status, EditStatus::Updated);
        assert_eq!(patch.coerced, json!({"id": 2, "code": "B"}));
    }

    #[test]
    fn null_existing_with_json_raw_decodes() {
        let existing = Value::Null;
        let (patch, status) =
            build_patch(&select_column("p"), Some(&existing), r#"{"id":1}"#, 0).unwrap();
        assert_eq!(status, EditStatus::Updated);
        assert_eq!(patch.coerced, json!({"id": 1}));
    }

    #[test]
    fn date_input_is_canonicalized() {
        let column = Column::editable("d", Datatype::Date);
        let (patch, status) = build_patch(&column, None, "2022-03-04", 0).unwrap();
        assert_eq!(status, EditStatus::Updated);
        assert_eq!(patch.coerced, json!("2022-03-04"));

        // Second commit of the identical value is a no-op.
        let existing = patch.coerced.clone();
        let (_, status) = build_patch(&column, Some(&existing), "2022-03-04", 0).unwrap();
        assert_eq!(status, EditStatus::Same);
    }

    #[test]
    fn unparseable_date_falls_back_to_raw() {
        let column = Column::editable("d", Datatype::Date);
        let (patch, _) = build_patch(&column, None, "whenever", 0).unwrap();
        assert_eq!(patch.coerced, json!("whenever"));
    }

    #[test]
    fn apply_patch_writes_the_coerced_value() {
        let mut row = Record::new();
        row.insert("p".to_string(), json!("old"));
        let mut rows = vec![row];
        let (patch, _) =
            build_patch(&text_column("p"), rows[0].get("p"), "new", 0).unwrap();
        apply_patch(&mut rows, &patch);
        assert_eq!(rows[0].get("p"), Some(&json!("new")));
    }
}
