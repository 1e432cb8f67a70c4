//! Shared builders for integration tests.

#![allow(dead_code)]

use gridbody::{BodyConfig, Column, Datatype, GridBody, Record, RowHeight};
use serde_json::json;

/// Build `n` rows of the form `{id, name, qty}`.
pub fn rows(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let mut row = Record::new();
            row.insert("id".to_string(), json!(i));
            row.insert("name".to_string(), json!(format!("row {i}")));
            row.insert("qty".to_string(), json!(i * 10));
            row
        })
        .collect()
}

/// A single row from prop/value pairs.
pub fn row(pairs: &[(&str, serde_json::Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// A virtualized grid body: fixed row height, vertical scrollbar, the
/// given viewport height, loaded with `n` rows.
pub fn virtual_body(n: usize, row_height: f32, body_height: f32) -> GridBody {
    let mut body = GridBody::new(BodyConfig {
        scrollbar_v: true,
        virtualization: true,
        row_height: RowHeight::Fixed(row_height),
        ..BodyConfig::default()
    })
    .expect("finite fixed height");
    body.set_body_height(body_height);
    body.set_rows(rows(n));
    body
}

/// A classic-pagination body (no vertical scrollbar).
pub fn paged_body(n: usize, page_size: usize) -> GridBody {
    let mut body = GridBody::new(BodyConfig::default()).expect("finite fixed height");
    body.set_page_size(page_size);
    body.set_rows(rows(n));
    body
}

/// Columns: `id` (read-only), `name` (editable text), `qty` (editable text).
pub fn editable_columns() -> Vec<Column> {
    vec![
        Column::new("id"),
        Column::editable("name", Datatype::Text),
        Column::editable("qty", Datatype::Text),
    ]
}
