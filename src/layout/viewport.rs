//! Viewport index resolution: scroll offset → visible row window.

use serde::{Deserialize, Serialize};

use crate::layout::height_cache::RowHeightCache;

/// Direction of a scroll event, when the scroller knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Half-open `[first, last)` window into the logical row sequence.
///
/// Derived state: recomputed from scroll position and never persisted
/// across row-set changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IndexWindow {
    pub first: usize,
    pub last: usize,
}

/// Inputs to a window computation.
#[derive(Debug, Clone, Copy)]
pub struct IndexParams {
    /// Vertical scrollbar present.
    pub scrollbar_v: bool,
    /// Row virtualization active.
    pub virtualization: bool,
    /// Paging is handled by the caller (rows arrive pre-sliced).
    pub external_paging: bool,
    /// Current vertical scroll offset in pixels.
    pub offset_y: f32,
    /// Visible body height in pixels.
    pub body_height: f32,
    /// Total logical row count.
    pub row_count: usize,
    /// Rows per page (classic pagination).
    pub page_size: usize,
    /// Current page index (classic pagination).
    pub page_offset: usize,
}

/// Compute the visible `[first, last)` window.
///
/// - Virtualized vertical scroll: binary lookup of the rows containing the
///   top and bottom viewport edges.
/// - Non-virtualized vertical scroll: render everything.
/// - Classic pagination: one page worth, starting at 0 when the caller
///   already sliced the array (external paging).
///
/// For a fixed row count and non-decreasing `offset_y`, `first` and `last`
/// never decrease.
pub fn update_indexes(params: &IndexParams, cache: &RowHeightCache) -> IndexWindow {
    let (first, last) = if params.scrollbar_v {
        if params.virtualization {
            let first = cache.row_index_at(params.offset_y);
            let last = cache.row_index_at(params.body_height + params.offset_y) + 1;
            (first, last)
        } else {
            (0, params.row_count)
        }
    } else {
        let first = if params.external_paging {
            0
        } else {
            params.page_offset.saturating_mul(params.page_size)
        };
        let last = (first + params.page_size).min(params.row_count);
        (first, last)
    };

    IndexWindow { first, last }
}

/// Page-change event derived from a directional scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageEvent {
    /// The page the viewport now starts in.
    pub offset: usize,
}

/// Compute the page offset after a directional scroll.
///
/// Scrolling up rounds the fractional page up, scrolling down rounds it
/// down. No event without a direction or with a zero page size.
pub fn update_page(
    direction: Option<ScrollDirection>,
    first: usize,
    page_size: usize,
) -> Option<PageEvent> {
    let direction = direction?;
    if page_size == 0 {
        return None;
    }
    let offset = match direction {
        ScrollDirection::Up => first.div_ceil(page_size),
        ScrollDirection::Down => first / page_size,
    };
    Some(PageEvent { offset })
}

/// Pixel offset of the first row of a page, for scroll restoration after a
/// collaborator-driven page change. 0 when not virtualized (the scroller
/// handles its own geometry there).
pub fn scroll_offset_for_page(
    page_offset: usize,
    page_size: usize,
    virtualized: bool,
    cache: &RowHeightCache,
) -> f32 {
    if !virtualized {
        return 0.0;
    }
    cache.offset_before(page_offset.saturating_mul(page_size))
}
