//! Core data types shared across the grid body.

pub mod column;
pub mod row;

pub use column::{
    column_group_widths, columns_by_pin, displayed_columns, Column, ColumnGroupWidths,
    ColumnsByPin, Datatype, PinGroup, DEFAULT_COL_WIDTH,
};
pub use row::{DetailHeight, Group, Record, RowHeight, RowIdentity, RowKey};
