//! Window materialization and positional transforms.
//!
//! Projects the `[first, last)` window onto the logical row or group
//! sequence and computes the pure-data 2-D transforms the presentation
//! layer applies as absolute positioning. All geometry here is numbers;
//! nothing touches a render tree.

use std::collections::HashMap;

use serde::Serialize;

use crate::layout::height_cache::RowHeightCache;
use crate::layout::viewport::IndexWindow;
use crate::types::{ColumnGroupWidths, Group, PinGroup, Record, RowIdentity, RowKey};

/// Project a flat window onto the row slice.
///
/// Returns the absolute logical indexes of present rows, skipping absent
/// slots (external paging can leave the tail of the window unloaded), and
/// rebuilds the key → index map used by height and edit lookups.
pub fn materialize_flat(
    window: IndexWindow,
    rows: &[Record],
    row_count: usize,
    identity: &RowIdentity,
    row_indexes: &mut HashMap<RowKey, usize>,
) -> Vec<usize> {
    row_indexes.clear();
    let mut out = Vec::with_capacity(window.last.saturating_sub(window.first));
    for index in window.first..window.last.min(row_count) {
        if let Some(row) = rows.get(index) {
            row_indexes.insert(identity.key(index, row), index);
            out.push(index);
        }
    }
    out
}

/// Project a grouped window onto the group sequence.
///
/// The window indexes groups, not member rows. The key → index map is
/// rebuilt over *member rows* in concatenated group order, so group
/// transforms can anchor on the flat index of a group's last member.
pub fn materialize_grouped(
    window: IndexWindow,
    groups: &[Group],
    identity: &RowIdentity,
    row_indexes: &mut HashMap<RowKey, usize>,
) -> Vec<usize> {
    row_indexes.clear();
    let mut flat_index = 0;
    for group in groups {
        for row in &group.value {
            row_indexes.insert(identity.key(flat_index, row), flat_index);
            flat_index += 1;
        }
    }

    (window.first..window.last.min(groups.len())).collect()
}

/// Pure 2-D transform for one row or group wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RowStyles {
    pub translate_x: f32,
    pub translate_y: f32,
    /// Explicit width, set for group wrappers.
    pub width: Option<f32>,
}

/// Vertical transform of the row at a logical index: the cumulative height
/// of every row before it when virtualized, 0 otherwise.
pub fn row_translate_y(cache: &RowHeightCache, index: usize, virtualized: bool) -> f32 {
    if virtualized {
        cache.offset_before(index)
    } else {
        0.0
    }
}

/// Vertical transform of a bottom summary row: pinned just past the last
/// data row.
pub fn bottom_summary_translate_y(cache: &RowHeightCache, rows_len: usize) -> f32 {
    cache.offset_before(rows_len)
}

/// Transform + width for one pin group of columns.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PinStyles {
    pub width: f32,
    pub translate_x: f32,
}

/// Horizontal transform of a pin group for the current scroll offset.
///
/// Left-pinned columns ride along with the scroll (`+offset_x`);
/// right-pinned columns are pulled back from the far edge; the center
/// group scrolls naturally.
pub fn styles_by_group(
    pin: PinGroup,
    widths: &ColumnGroupWidths,
    offset_x: f32,
    inner_width: f32,
) -> PinStyles {
    match pin {
        PinGroup::Left => PinStyles {
            width: widths.left,
            translate_x: offset_x,
        },
        PinGroup::Center => PinStyles {
            width: widths.center,
            translate_x: 0.0,
        },
        PinGroup::Right => {
            let total_diff = widths.total - inner_width;
            PinStyles {
                width: widths.right,
                translate_x: -(total_diff - offset_x),
            }
        }
    }
}
