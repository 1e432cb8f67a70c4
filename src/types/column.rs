//! Column descriptors, visibility filtering, and pin-group widths.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default column width in pixels.
pub const DEFAULT_COL_WIDTH: f32 = 150.0;

/// Horizontal pin group a column is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinGroup {
    /// Fixed to the left edge, offset with the horizontal scroll.
    Left,
    /// Scrolls normally.
    #[default]
    Center,
    /// Fixed to the right edge.
    Right,
}

/// Datatype of an editable cell, driving editor construction and commit
/// coercion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// Plain scalar; committed as-is.
    #[default]
    Text,
    /// Calendar date, displayed and parsed as `YYYY-MM-DD`.
    Date,
    /// Date and time, displayed and parsed as `YYYY-MM-DDTHH:MM`.
    DateTime,
    /// One-of selection. Options are either plain strings or structured
    /// JSON values (compared by serialized equality on commit).
    Options(Vec<Value>),
}

/// A column descriptor. Supplied externally and read-only to the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Prop looked up in each row record.
    pub prop: String,
    /// Whether cells in this column can be edited.
    #[serde(default)]
    pub editable: bool,
    /// Cell datatype.
    #[serde(default)]
    pub datatype: Datatype,
    /// Pin group the column is rendered in.
    #[serde(default)]
    pub pin: PinGroup,
    /// Column width in pixels.
    #[serde(default = "default_col_width")]
    pub width: f32,
    /// Whether the column participates in hide-by-prop filtering.
    #[serde(default = "default_hideable")]
    pub hideable: bool,
}

fn default_col_width() -> f32 {
    DEFAULT_COL_WIDTH
}

fn default_hideable() -> bool {
    true
}

impl Column {
    /// A plain text column.
    pub fn new(prop: impl Into<String>) -> Self {
        Column {
            prop: prop.into(),
            editable: false,
            datatype: Datatype::Text,
            pin: PinGroup::Center,
            width: DEFAULT_COL_WIDTH,
            hideable: true,
        }
    }

    /// An editable column with the given datatype.
    pub fn editable(prop: impl Into<String>, datatype: Datatype) -> Self {
        Column {
            editable: true,
            datatype,
            ..Column::new(prop)
        }
    }
}

/// Filter columns to those currently displayed.
///
/// A column is excluded only when it is hideable *and* its prop is in the
/// hidden set. Edit-cursor x coordinates index into the result of this
/// filter, never into the raw column sequence.
pub fn displayed_columns<'a>(columns: &'a [Column], hidden: &[String]) -> Vec<&'a Column> {
    columns
        .iter()
        .filter(|c| !c.hideable || !hidden.contains(&c.prop))
        .collect()
}

/// Columns partitioned by pin group, preserving order within each group.
#[derive(Debug, Default)]
pub struct ColumnsByPin<'a> {
    pub left: Vec<&'a Column>,
    pub center: Vec<&'a Column>,
    pub right: Vec<&'a Column>,
}

/// Partition columns by their pin group.
pub fn columns_by_pin<'a>(columns: &[&'a Column]) -> ColumnsByPin<'a> {
    let mut by_pin = ColumnsByPin::default();
    for column in columns {
        match column.pin {
            PinGroup::Left => by_pin.left.push(column),
            PinGroup::Center => by_pin.center.push(column),
            PinGroup::Right => by_pin.right.push(column),
        }
    }
    by_pin
}

/// Cumulative widths per pin group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ColumnGroupWidths {
    pub left: f32,
    pub center: f32,
    pub right: f32,
    pub total: f32,
}

/// Sum displayed-column widths per pin group.
pub fn column_group_widths(columns: &[&Column]) -> ColumnGroupWidths {
    let mut widths = ColumnGroupWidths::default();
    for column in columns {
        match column.pin {
            PinGroup::Left => widths.left += column.width,
            PinGroup::Center => widths.center += column.width,
            PinGroup::Right => widths.right += column.width,
        }
        widths.total += column.width;
    }
    widths
}
