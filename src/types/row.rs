//! Row, group, and height-provider types.
//!
//! Rows are opaque JSON-like records owned by the caller; the grid reads
//! them through column props and mutates them only via the commit path.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque row record: column prop → value.
pub type Record = serde_json::Map<String, Value>;

/// Stable identity key for a row or group.
///
/// Expansion state and window bookkeeping are keyed by `RowKey` instead of
/// object identity, so state survives re-sorting, filtering, and structural
/// cloning of the row set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(String);

impl RowKey {
    /// Key for a row with no usable tracking value: its logical index.
    pub fn from_index(index: usize) -> Self {
        RowKey(index.to_string())
    }

    /// Key derived from an arbitrary JSON value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => RowKey(s.clone()),
            other => RowKey(other.to_string()),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey(s)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey(s.to_string())
    }
}

/// How rows are mapped to stable keys.
///
/// Defaults to the logical index, which is correct as long as the caller
/// replaces the row set wholesale on reorder (expansion state is cleared on
/// replacement anyway).
pub enum RowIdentity {
    /// Identity is the row's logical index.
    Index,
    /// Identity is the value of a tracking prop; rows missing the prop fall
    /// back to their index.
    TrackBy(String),
    /// Caller-supplied identity function.
    Custom(Box<dyn Fn(usize, &Record) -> RowKey>),
}

impl Default for RowIdentity {
    fn default() -> Self {
        RowIdentity::Index
    }
}

impl RowIdentity {
    /// Resolve the key for a row at its logical index.
    pub fn key(&self, index: usize, row: &Record) -> RowKey {
        match self {
            RowIdentity::Index => RowKey::from_index(index),
            RowIdentity::TrackBy(prop) => row
                .get(prop)
                .map(RowKey::from_value)
                .unwrap_or_else(|| RowKey::from_index(index)),
            RowIdentity::Custom(f) => f(index, row),
        }
    }
}

impl fmt::Debug for RowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIdentity::Index => f.write_str("RowIdentity::Index"),
            RowIdentity::TrackBy(prop) => write!(f, "RowIdentity::TrackBy({prop})"),
            RowIdentity::Custom(_) => f.write_str("RowIdentity::Custom(..)"),
        }
    }
}

/// A group of rows sharing a grouping key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    /// The grouping key value.
    pub key: Value,
    /// Member rows, in display order.
    pub value: Vec<Record>,
}

impl Group {
    /// Stable key for the group itself (expansion state for group headers).
    pub fn row_key(&self) -> RowKey {
        RowKey::from_value(&self.key)
    }
}

/// Base row height: a fixed pixel value or a per-row function.
///
/// The function receives `None` for slots beyond the supplied row slice
/// (external paging combined with virtual scroll).
pub enum RowHeight {
    /// Every row has this height.
    Fixed(f32),
    /// Height computed per row.
    PerRow(Box<dyn Fn(Option<&Record>) -> f32>),
}

impl RowHeight {
    /// Height of one row.
    pub fn of(&self, row: Option<&Record>) -> f32 {
        match self {
            RowHeight::Fixed(h) => *h,
            RowHeight::PerRow(f) => f(row),
        }
    }
}

impl fmt::Debug for RowHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowHeight::Fixed(h) => write!(f, "RowHeight::Fixed({h})"),
            RowHeight::PerRow(_) => f.write_str("RowHeight::PerRow(..)"),
        }
    }
}

/// Detail panel height: fixed or computed from `(row, index)`.
pub enum DetailHeight {
    /// Every detail panel has this height.
    Fixed(f32),
    /// Height computed per row and logical index.
    PerRow(Box<dyn Fn(Option<&Record>, Option<usize>) -> f32>),
}

impl DetailHeight {
    /// Height of one detail panel.
    pub fn of(&self, row: Option<&Record>, index: Option<usize>) -> f32 {
        match self {
            DetailHeight::Fixed(h) => *h,
            DetailHeight::PerRow(f) => f(row, index),
        }
    }
}

impl fmt::Debug for DetailHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailHeight::Fixed(h) => write!(f, "DetailHeight::Fixed({h})"),
            DetailHeight::PerRow(_) => f.write_str("DetailHeight::PerRow(..)"),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn index_identity_uses_position() {
        let identity = RowIdentity::Index;
        let r = row(&[("a", json!(1))]);
        assert_eq!(identity.key(3, &r), RowKey::from("3"));
    }

    #[test]
    fn track_by_uses_prop_value() {
        let identity = RowIdentity::TrackBy("id".to_string());
        let r = row(&[("id", json!("abc"))]);
        assert_eq!(identity.key(0, &r), RowKey::from("abc"));
    }

    #[test]
    fn track_by_falls_back_to_index() {
        let identity = RowIdentity::TrackBy("id".to_string());
        let r = row(&[("other", json!(1))]);
        assert_eq!(identity.key(7, &r), RowKey::from("7"));
    }

    #[test]
    fn numeric_keys_are_stable() {
        assert_eq!(RowKey::from_value(&json!(42)), RowKey::from("42"));
    }

    #[test]
    fn per_row_height_receives_row() {
        let height = RowHeight::PerRow(Box::new(|row| {
            row.and_then(|r| r.get("h"))
                .and_then(serde_json::Value::as_f64)
                .map_or(10.0, |h| h as f32)
        }));
        let r = row(&[("h", json!(25.0))]);
        assert_eq!(height.of(Some(&r)), 25.0);
        assert_eq!(height.of(None), 10.0);
    }
}
