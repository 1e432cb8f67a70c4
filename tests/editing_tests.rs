//! Cell editing tests
//!
//! Session lifecycle, value coercion per datatype, the distinguishable
//! same/updated statuses, and the escape/blur interaction.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridbody::{
    BodyConfig, Column, Datatype, EditKey, EditStatus, EditorKind, GridBody, GridEdit,
};
use serde_json::json;
use test_case::test_case;

mod common;

/// A paged, editable grid: 5 rows, id/name/qty columns.
fn edit_grid() -> GridEdit {
    let mut body = GridBody::new(BodyConfig::default()).unwrap();
    body.set_page_size(10);
    body.set_columns(common::editable_columns());
    body.set_rows(common::rows(5));
    GridEdit::new(body)
}

fn edit_grid_with(columns: Vec<Column>, rows: Vec<gridbody::Record>) -> GridEdit {
    let mut body = GridBody::new(BodyConfig::default()).unwrap();
    body.set_page_size(10);
    body.set_columns(columns);
    body.set_rows(rows);
    GridEdit::new(body)
}

// =============================================================================
// SESSION LIFECYCLE
// =============================================================================

#[test]
fn activating_an_editable_cell_opens_a_session() {
    let mut grid = edit_grid();
    let editor = grid.begin_edit(1, 2).unwrap().unwrap();
    assert_eq!(editor.kind, EditorKind::Text);
    assert_eq!(editor.initial, "row 2");
    assert!(grid.is_editing());
    assert_eq!(grid.edit_context().unwrap().row_index, 2);
}

#[test]
fn activating_a_read_only_cell_is_rejected() {
    let mut grid = edit_grid();
    // Column 0 (id) is not editable.
    assert!(grid.begin_edit(0, 2).unwrap().is_none());
    assert!(!grid.is_editing());
}

#[test]
fn activating_outside_the_window_is_rejected() {
    let mut grid = edit_grid();
    assert!(grid.begin_edit(1, 99).unwrap().is_none());
    assert!(!grid.is_editing());
}

#[test]
fn cancel_leaves_the_row_untouched() {
    let mut grid = edit_grid();
    grid.begin_edit(1, 2).unwrap();
    grid.cancel_edit();
    assert!(!grid.is_editing());
    assert_eq!(grid.body().rows()[2].get("name"), Some(&json!("row 2")));
}

#[test]
fn replacing_rows_force_cancels_the_session() {
    let mut grid = edit_grid();
    grid.begin_edit(1, 2).unwrap();
    assert!(grid.is_editing());
    grid.set_rows(common::rows(3));
    assert!(!grid.is_editing());
    assert!(grid.editing_cell().is_none());
}

// =============================================================================
// COMMIT
// =============================================================================

#[test]
fn commit_writes_and_reports_updated() {
    let mut grid = edit_grid();
    grid.begin_edit(1, 2).unwrap();
    let end = grid.commit_edit("renamed").unwrap();
    assert_eq!(end.status, EditStatus::Updated);
    assert_eq!(end.new_value, "renamed");
    assert!(!grid.is_editing());
    assert_eq!(grid.body().rows()[2].get("name"), Some(&json!("renamed")));
}

#[test]
fn second_commit_of_same_value_reports_same() {
    let mut grid = edit_grid();
    grid.begin_edit(1, 2).unwrap();
    let end = grid.commit_edit("renamed").unwrap();
    assert_eq!(end.status, EditStatus::Updated);

    grid.begin_edit(1, 2).unwrap();
    let end = grid.commit_edit("renamed").unwrap();
    assert_eq!(end.status, EditStatus::Same);
    assert_eq!(grid.body().rows()[2].get("name"), Some(&json!("renamed")));
}

#[test_case("2023-01-15", "2023-01-15"; "plain date round trips")]
#[test_case("bogus", "bogus"; "unparseable input falls back to raw")]
fn date_commit_coerces(input: &str, stored: &str) {
    let columns = vec![Column::editable("due", Datatype::Date)];
    let rows = vec![common::row(&[("due", json!("2022-12-31T08:00:00Z"))])];
    let mut grid = edit_grid_with(columns, rows);

    grid.begin_edit(0, 0).unwrap();
    let end = grid.commit_edit(input).unwrap();
    assert_eq!(end.status, EditStatus::Updated);
    assert_eq!(grid.body().rows()[0].get("due"), Some(&json!(stored)));
}

#[test]
fn datetime_editor_and_commit_agree_on_format() {
    let columns = vec![Column::editable("at", Datatype::DateTime)];
    let rows = vec![common::row(&[("at", json!("2022-12-31T08:45:00Z"))])];
    let mut grid = edit_grid_with(columns, rows);

    let editor = grid.begin_edit(0, 0).unwrap().unwrap();
    assert_eq!(editor.kind, EditorKind::DateTime);
    assert_eq!(editor.initial, "2022-12-31T08:45");

    // Committing exactly what the control displayed writes the canonical
    // minute-precision form; a second commit is then a no-op.
    let end = grid.commit_edit("2022-12-31T08:45").unwrap();
    assert_eq!(end.status, EditStatus::Updated);
    grid.begin_edit(0, 0).unwrap();
    let end = grid.commit_edit("2022-12-31T08:45").unwrap();
    assert_eq!(end.status, EditStatus::Same);
}

// =============================================================================
// ENUMERATED COLUMNS
// =============================================================================

fn options_column() -> Column {
    Column::editable(
        "state",
        Datatype::Options(vec![
            json!({"id": 1, "code": "OPEN", "label": "Open"}),
            json!({"id": 2, "code": "DONE", "label": "Done"}),
        ]),
    )
}

#[test]
fn empty_selection_with_absent_value_emits_nothing() {
    let columns = vec![options_column()];
    let rows = vec![common::row(&[("other", json!(1))])];
    let mut grid = edit_grid_with(columns, rows);

    let editor = grid.begin_edit(0, 0).unwrap().unwrap();
    assert_eq!(editor.options[0].value, "", "blank option leads when unset");

    assert!(grid.commit_edit("").is_none(), "no emission");
    assert!(!grid.is_editing(), "session still closed");
    assert_eq!(grid.body().rows()[0].get("state"), None, "row unchanged");
}

#[test]
fn structured_selection_decodes_on_change_only() {
    let columns = vec![options_column()];
    let rows = vec![common::row(&[(
        "state",
        json!({"id": 1, "code": "OPEN", "label": "Open"}),
    )])];
    let mut grid = edit_grid_with(columns, rows);

    // Re-submitting the serialized current value is a no-op.
    let current = serde_json::to_string(&json!({"id": 1, "code": "OPEN", "label": "Open"})).unwrap();
    grid.begin_edit(0, 0).unwrap();
    let end = grid.commit_edit(&current).unwrap();
    assert_eq!(end.status, EditStatus::Same);

    // A different option decodes back to structured form.
    grid.begin_edit(0, 0).unwrap();
    let end = grid
        .commit_edit(r#"{"id":2,"code":"DONE","label":"Done"}"#)
        .unwrap();
    assert_eq!(end.status, EditStatus::Updated);
    assert_eq!(
        grid.body().rows()[0].get("state"),
        Some(&json!({"id": 2, "code": "DONE", "label": "Done"}))
    );
}

#[test]
fn empty_option_list_raises_immediately() {
    let columns = vec![Column::editable("state", Datatype::Options(vec![]))];
    let rows = vec![common::row(&[("state", json!("x"))])];
    let mut grid = edit_grid_with(columns, rows);
    assert!(grid.begin_edit(0, 0).is_err());
}

// =============================================================================
// ESCAPE / BLUR
// =============================================================================

#[test]
fn escape_suppresses_exactly_one_blur() {
    let mut grid = edit_grid();
    grid.begin_edit(1, 2).unwrap();

    let outcome = grid.on_key_down(&EditKey::Escape, "half-typed").unwrap();
    assert!(outcome.handled);
    assert!(outcome.end_edit.is_none());
    assert!(!grid.is_editing());

    // The blur raised by tearing down the control is swallowed...
    assert!(grid.on_blur("half-typed").is_none());
    assert_eq!(grid.body().rows()[2].get("name"), Some(&json!("row 2")));

    // ...but only that one: a later session blurs normally.
    grid.begin_edit(1, 2).unwrap();
    let end = grid.on_blur("typed").unwrap();
    assert_eq!(end.status, EditStatus::Updated);
}

#[test]
fn blur_without_escape_commits() {
    let mut grid = edit_grid();
    grid.begin_edit(2, 1).unwrap();
    let end = grid.on_blur("55").unwrap();
    assert_eq!(end.status, EditStatus::Updated);
    assert_eq!(grid.body().rows()[1].get("qty"), Some(&json!("55")));
}

#[test]
fn enter_is_a_passthrough() {
    let mut grid = edit_grid();
    grid.begin_edit(1, 2).unwrap();
    let outcome = grid.on_key_down(&EditKey::Enter, "typed").unwrap();
    assert!(!outcome.handled);
    assert!(grid.is_editing(), "session stays open on Enter");
}
