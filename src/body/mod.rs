//! Grid body controller.
//!
//! `GridBody` exclusively owns the row height cache, the expansion
//! tracker, and the materialized window. Collaborators push scroll and
//! toggle events in and read derived values (window, transforms) back out
//! through the query methods; nothing else may write to the shared state.
//!
//! All mutation is synchronous and re-entrant-unsafe: a caller must not
//! trigger a second structural mutation from inside a callback running
//! during a recalculation.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{GridError, Result};
use crate::expansion::ExpansionTracker;
use crate::layout::height_cache::{CacheInitParams, RowHeightCache};
use crate::layout::materializer::{
    self, bottom_summary_translate_y, row_translate_y, PinStyles, RowStyles,
};
use crate::layout::viewport::{
    self, IndexParams, IndexWindow, PageEvent, ScrollDirection,
};
use crate::session::ScrollSession;
use crate::types::{
    column_group_widths, displayed_columns, Column, ColumnGroupWidths, DetailHeight, Group,
    PinGroup, Record, RowHeight, RowIdentity, RowKey,
};

/// Static configuration of a grid body.
pub struct BodyConfig {
    /// Vertical scrollbar present.
    pub scrollbar_v: bool,
    /// Horizontal scrollbar present.
    pub scrollbar_h: bool,
    /// Row virtualization active (render only the visible window).
    pub virtualization: bool,
    /// Paging handled by the caller: rows arrive pre-sliced.
    pub external_paging: bool,
    /// Base row height provider.
    pub row_height: RowHeight,
    /// Detail panel height provider; `None` disables detail rows.
    pub detail_row_height: Option<DetailHeight>,
    /// Expand every group on first expansion-state read.
    pub group_expansion_default: bool,
    /// Row identity mapping for expansion and window bookkeeping.
    pub identity: RowIdentity,
}

impl Default for BodyConfig {
    fn default() -> Self {
        BodyConfig {
            scrollbar_v: false,
            scrollbar_h: false,
            virtualization: true,
            external_paging: false,
            row_height: RowHeight::Fixed(30.0),
            detail_row_height: None,
            group_expansion_default: false,
            identity: RowIdentity::Index,
        }
    }
}

/// A scroll event pushed in by the scroller collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, serde::Deserialize)]
pub struct ScrollEvent {
    pub scroll_y_pos: f32,
    pub scroll_x_pos: f32,
    /// Scroll direction, when the scroller knows it.
    pub direction: Option<ScrollDirection>,
}

/// Offset change emitted when a scroll event actually moved the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetChange {
    pub offset_y: f32,
    pub offset_x: f32,
}

/// Everything a scroll event produced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BodyScrollOutcome {
    /// Present only when the offset differs from the previous one.
    pub offset: Option<OffsetChange>,
    /// Present when a directional scroll crossed into another page.
    pub page: Option<PageEvent>,
}

/// Externally-sourced expansion toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEvent {
    /// Toggle one row's detail panel by logical index.
    Row { index: usize },
    /// Toggle one group header by group index.
    Group { index: usize },
    /// Expand or collapse every row.
    All { expanded: bool },
}

/// Emitted after each expansion toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailToggle {
    /// Logical indexes of the affected rows.
    pub rows: Vec<usize>,
    /// First visible index to re-anchor the viewport on, adjusted so that
    /// expanding a row just above the fold does not cause a visual jump.
    pub current_index: usize,
}

/// The grid body: virtual scroll engine plus expansion state.
pub struct GridBody {
    config: BodyConfig,
    rows: Vec<Record>,
    grouped_rows: Option<Vec<Group>>,
    columns: Vec<Column>,
    hidden_columns: Vec<String>,
    row_count: usize,
    page_size: usize,
    page_offset: usize,
    body_height: f32,
    inner_width: f32,
    offset_x: f32,
    offset_y: f32,
    indexes: IndexWindow,
    window: Vec<usize>,
    row_indexes: HashMap<RowKey, usize>,
    row_expansions: ExpansionTracker,
    height_cache: RowHeightCache,
    needs_scrolling: bool,
}

impl GridBody {
    /// Create a body with the given configuration.
    ///
    /// # Errors
    ///
    /// `GridError::Config` when a fixed row or detail height is not finite.
    pub fn new(config: BodyConfig) -> Result<Self> {
        if let RowHeight::Fixed(h) = &config.row_height {
            if !h.is_finite() {
                return Err(GridError::Config(format!(
                    "row height must be a finite number, got {h}"
                )));
            }
        }
        if let Some(DetailHeight::Fixed(h)) = &config.detail_row_height {
            if !h.is_finite() {
                return Err(GridError::Config(format!(
                    "detail row height must be a finite number, got {h}"
                )));
            }
        }

        Ok(GridBody {
            config,
            rows: Vec::new(),
            grouped_rows: None,
            columns: Vec::new(),
            hidden_columns: Vec::new(),
            row_count: 0,
            page_size: 0,
            page_offset: 0,
            body_height: 0.0,
            inner_width: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            indexes: IndexWindow::default(),
            window: Vec::new(),
            row_indexes: HashMap::new(),
            row_expansions: ExpansionTracker::new(),
            height_cache: RowHeightCache::new(),
            needs_scrolling: false,
        })
    }

    // ---- Inputs -----------------------------------------------------------

    /// Replace the row collection wholesale.
    ///
    /// Clears all expansion state. Unless paging is external, the logical
    /// row count follows the new collection.
    pub fn set_rows(&mut self, rows: Vec<Record>) {
        if self.rows.is_empty() {
            self.needs_scrolling = true;
        }
        log::debug!("row collection replaced: {} rows", rows.len());
        self.rows = rows;
        if !self.config.external_paging {
            self.row_count = self.rows.len();
        }
        self.row_expansions.clear();
        self.recalc_layout();
    }

    /// Replace the grouped view of the rows (or disable grouping).
    pub fn set_grouped_rows(&mut self, groups: Option<Vec<Group>>) {
        self.grouped_rows = groups;
        self.recalc_layout();
    }

    /// Replace the column set. Never rebuilds the height cache.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    /// Replace the hidden-prop set. Never rebuilds the height cache.
    pub fn set_hidden_columns(&mut self, hidden: Vec<String>) {
        self.hidden_columns = hidden;
    }

    /// Set the total logical row count (external paging).
    pub fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
        self.recalc_layout();
    }

    /// Set the page size.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.recalc_layout();
    }

    /// Set the current page (classic pagination).
    pub fn set_page_offset(&mut self, page_offset: usize) {
        self.page_offset = page_offset;
        self.recalc_layout();
    }

    /// Set the visible body height in pixels.
    pub fn set_body_height(&mut self, body_height: f32) {
        self.body_height = body_height;
        self.recalc_layout();
    }

    /// Set the visible body width in pixels.
    pub fn set_inner_width(&mut self, inner_width: f32) {
        self.inner_width = inner_width;
    }

    /// Set the horizontal offset directly (header sync).
    pub fn set_offset_x(&mut self, offset_x: f32) {
        self.offset_x = offset_x;
    }

    // ---- Accessors --------------------------------------------------------

    pub fn config(&self) -> &BodyConfig {
        &self.config
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn grouped_rows(&self) -> Option<&[Group]> {
        self.grouped_rows.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Columns currently displayed (hidden props filtered out).
    pub fn displayed_columns(&self) -> Vec<&Column> {
        displayed_columns(&self.columns, &self.hidden_columns)
    }

    /// Cumulative widths of the displayed columns per pin group.
    pub fn column_group_widths(&self) -> ColumnGroupWidths {
        column_group_widths(&self.displayed_columns())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    /// The current `[first, last)` window.
    pub fn indexes(&self) -> IndexWindow {
        self.indexes
    }

    /// Absolute logical indexes of the materialized window.
    pub fn window(&self) -> &[usize] {
        &self.window
    }

    /// Materialized rows with their absolute logical indexes (flat mode).
    pub fn window_rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.window
            .iter()
            .filter_map(move |&index| self.rows.get(index).map(|row| (index, row)))
    }

    /// Materialized groups with their group indexes (grouped mode).
    pub fn window_groups(&self) -> impl Iterator<Item = (usize, &Group)> {
        let groups = self.grouped_rows.as_deref().unwrap_or(&[]);
        self.window
            .iter()
            .filter_map(move |&index| groups.get(index).map(|group| (index, group)))
    }

    /// Read-only view of the height cache.
    pub fn height_cache(&self) -> &RowHeightCache {
        &self.height_cache
    }

    /// Total scrollable height, when the fake scrollbar needs one
    /// (virtual scroll only; other modes size themselves).
    pub fn scroll_height(&self) -> Option<f32> {
        if self.config.scrollbar_v && self.config.virtualization && self.row_count > 0 {
            Some(self.height_cache.query(self.row_count - 1))
        } else {
            None
        }
    }

    /// Find a row's logical index by record equality.
    pub fn find_row_index(&self, row: &Record) -> Option<usize> {
        self.rows.iter().position(|r| r == row)
    }

    /// Apply a committed cell patch to the row collection. The only write
    /// path into caller-owned rows.
    pub fn apply_patch(&mut self, patch: &crate::editor::CellPatch) {
        crate::editor::apply_patch(&mut self.rows, patch);
    }

    // ---- Heights ----------------------------------------------------------

    /// Base height of one row.
    pub fn row_height(&self, row: Option<&Record>) -> f32 {
        self.config.row_height.of(row)
    }

    /// Height of a row's detail panel; 0 when detail rows are not
    /// configured.
    pub fn detail_row_height(&self, row: Option<&Record>, index: Option<usize>) -> f32 {
        self.config
            .detail_row_height
            .as_ref()
            .map_or(0.0, |d| d.of(row, index))
    }

    /// Base height plus detail height (when expanded) of the row at a
    /// logical index.
    pub fn row_and_detail_height(&self, index: usize) -> f32 {
        self.row_and_detail_height_at(index, self.rows.get(index))
    }

    fn row_and_detail_height_at(&self, index: usize, row: Option<&Record>) -> f32 {
        let mut height = self.config.row_height.of(row);
        if let (Some(row), Some(detail)) = (row, &self.config.detail_row_height) {
            let key = self.config.identity.key(index, row);
            if self.row_expansions.is_expanded(&key) {
                height += detail.of(Some(row), Some(index));
            }
        }
        height
    }

    /// Height of a whole group: the sum of its member rows' heights,
    /// including expanded detail panels.
    pub fn group_height(&self, group_index: usize) -> f32 {
        let Some(groups) = self.grouped_rows.as_deref() else {
            return 0.0;
        };
        let Some(group) = groups.get(group_index) else {
            return 0.0;
        };
        let flat_start: usize = groups
            .iter()
            .take(group_index)
            .map(|g| g.value.len())
            .sum();
        group
            .value
            .iter()
            .enumerate()
            .map(|(i, row)| self.row_and_detail_height_at(flat_start + i, Some(row)))
            .sum()
    }

    // ---- Scroll -----------------------------------------------------------

    /// Process a scroll event: move the viewport, recompute the window, and
    /// report the offset change (only when it changed) and any page
    /// crossing.
    pub fn on_body_scroll(&mut self, event: &ScrollEvent) -> BodyScrollOutcome {
        let moved = (self.offset_y - event.scroll_y_pos).abs() > f32::EPSILON
            || (self.offset_x - event.scroll_x_pos).abs() > f32::EPSILON;

        self.offset_y = event.scroll_y_pos;
        self.offset_x = event.scroll_x_pos;

        self.update_indexes();
        let page = viewport::update_page(event.direction, self.indexes.first, self.page_size);
        self.update_rows();

        BodyScrollOutcome {
            offset: moved.then_some(OffsetChange {
                offset_y: self.offset_y,
                offset_x: self.offset_x,
            }),
            page,
        }
    }

    /// Pixel offset to scroll to for a collaborator-driven page change.
    pub fn scroll_offset_for_page(&self, page_offset: usize) -> f32 {
        viewport::scroll_offset_for_page(
            page_offset,
            self.page_size,
            self.config.scrollbar_v && self.config.virtualization,
            &self.height_cache,
        )
    }

    /// Hand back the remembered horizontal position exactly once after the
    /// rows first arrive.
    pub fn restore_scroll_x(&mut self, session: &ScrollSession) -> Option<f32> {
        if !self.needs_scrolling {
            return None;
        }
        self.needs_scrolling = false;
        session.restore()
    }

    // ---- Layout -----------------------------------------------------------

    /// Recompute the `[first, last)` window from the current scroll state.
    pub fn update_indexes(&mut self) {
        let params = IndexParams {
            scrollbar_v: self.config.scrollbar_v,
            virtualization: self.config.virtualization,
            external_paging: self.config.external_paging,
            offset_y: self.offset_y,
            body_height: self.body_height,
            row_count: self.row_count,
            page_size: self.page_size,
            page_offset: self.page_offset,
        };
        self.indexes = viewport::update_indexes(&params, &self.height_cache);
    }

    /// Materialize the window onto the row or group collection.
    pub fn update_rows(&mut self) {
        self.window = match self.grouped_rows.as_deref() {
            Some(groups) => materializer::materialize_grouped(
                self.indexes,
                groups,
                &self.config.identity,
                &mut self.row_indexes,
            ),
            None => materializer::materialize_flat(
                self.indexes,
                &self.rows,
                self.row_count,
                &self.config.identity,
                &mut self.row_indexes,
            ),
        };
        log::trace!(
            "window materialized: [{}, {}) -> {} slots",
            self.indexes.first,
            self.indexes.last,
            self.window.len()
        );
    }

    /// Rebuild the full row height cache. Used whenever the row array
    /// state changed wholesale (replacement, sort, filter, expand-all).
    pub fn refresh_row_height_cache(&mut self) {
        if !self.config.scrollbar_v || !self.config.virtualization {
            return;
        }
        self.height_cache.clear_cache();
        if self.rows.is_empty() {
            return;
        }
        let params = CacheInitParams {
            rows: &self.rows,
            row_height: &self.config.row_height,
            detail_row_height: self.config.detail_row_height.as_ref(),
            external_virtual: self.config.scrollbar_v && self.config.external_paging,
            row_count: self.row_count,
            row_indexes: &self.row_indexes,
            row_expansions: &self.row_expansions,
            identity: &self.config.identity,
        };
        if let Err(err) = self.height_cache.init_cache(&params) {
            // Fixed heights were validated at construction; only a
            // caller-swapped provider can fail here.
            log::error!("row height cache rebuild failed: {err}");
        }
    }

    /// Full recalculation: cache, window indexes, materialized rows.
    pub fn recalc_layout(&mut self) {
        self.refresh_row_height_cache();
        self.update_indexes();
        self.update_rows();
    }

    // ---- Styles -----------------------------------------------------------

    /// Transform for the row at a logical index.
    pub fn row_styles(&self, index: usize) -> RowStyles {
        RowStyles {
            translate_x: 0.0,
            translate_y: row_translate_y(
                &self.height_cache,
                index,
                self.config.scrollbar_v && self.config.virtualization,
            ),
            width: None,
        }
    }

    /// Transform for a group wrapper, anchored on the flat index of the
    /// group's last member row.
    pub fn group_styles(&self, group_index: usize) -> RowStyles {
        let widths = self.column_group_widths();
        let anchor = self
            .grouped_rows
            .as_deref()
            .and_then(|groups| {
                let flat_end: usize = groups
                    .iter()
                    .take(group_index + 1)
                    .map(|g| g.value.len())
                    .sum();
                flat_end.checked_sub(1)
            })
            .unwrap_or(0);
        RowStyles {
            translate_x: 0.0,
            translate_y: row_translate_y(
                &self.height_cache,
                anchor,
                self.config.scrollbar_v && self.config.virtualization,
            ),
            width: Some(widths.total),
        }
    }

    /// Transform for one pin group of columns at the current horizontal
    /// offset.
    pub fn pin_styles(&self, pin: PinGroup) -> PinStyles {
        materializer::styles_by_group(
            pin,
            &self.column_group_widths(),
            self.offset_x,
            self.inner_width,
        )
    }

    /// Transform for a bottom summary row, pinned past the last data row.
    pub fn bottom_summary_styles(&self) -> Option<RowStyles> {
        if !self.config.scrollbar_v || self.rows.is_empty() {
            return None;
        }
        Some(RowStyles {
            translate_x: 0.0,
            translate_y: bottom_summary_translate_y(&self.height_cache, self.rows.len()),
            width: None,
        })
    }

    // ---- Expansion --------------------------------------------------------

    /// First visible index to anchor the viewport on across a toggle. When
    /// the previous row's cumulative end offset is already at or behind the
    /// live scroll offset, that previous row is the anchor instead.
    pub fn adjusted_viewport_index(&self) -> usize {
        let first = self.indexes.first;
        if self.config.scrollbar_v && self.config.virtualization {
            let offset_scroll = self.height_cache.offset_before(first);
            if offset_scroll <= self.offset_y {
                return first.saturating_sub(1);
            }
        }
        first
    }

    /// Whether the row at a logical index is expanded.
    pub fn row_expanded(&mut self, index: usize) -> bool {
        self.apply_default_expansion();
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        let key = self.config.identity.key(index, row);
        self.row_expansions.is_expanded(&key)
    }

    /// Whether a group header is expanded.
    pub fn group_expanded(&mut self, group_index: usize) -> bool {
        self.apply_default_expansion();
        self.grouped_rows
            .as_deref()
            .and_then(|groups| groups.get(group_index))
            .map(|group| self.row_expansions.is_expanded(&group.row_key()))
            .unwrap_or(false)
    }

    /// Lazy default-expand-all: on the first expansion-state read with an
    /// empty map and the policy flag set, every group starts expanded.
    fn apply_default_expansion(&mut self) {
        if !self.row_expansions.is_empty() || !self.config.group_expansion_default {
            return;
        }
        let Some(groups) = self.grouped_rows.as_deref() else {
            return;
        };
        for group in groups {
            self.row_expansions.set(group.row_key(), true);
        }
    }

    /// Dispatch an externally-sourced toggle request.
    pub fn on_toggle(&mut self, event: &ToggleEvent) -> Option<DetailToggle> {
        match *event {
            ToggleEvent::Row { index } => self.toggle_row_expansion(index),
            ToggleEvent::Group { index } => self.toggle_group_expansion(index),
            ToggleEvent::All { expanded } => Some(self.toggle_all_rows(expanded)),
        }
    }

    /// Flip one row's expansion state, patching its height into the cache
    /// in O(log n) instead of rebuilding.
    pub fn toggle_row_expansion(&mut self, index: usize) -> Option<DetailToggle> {
        let current_index = self.adjusted_viewport_index();
        let row = self.rows.get(index)?;
        let key = self.config.identity.key(index, row);
        let expanded = self.row_expansions.is_expanded(&key);

        if self.config.scrollbar_v && self.config.virtualization {
            let detail = self.detail_row_height(Some(row), Some(index));
            let delta = if expanded { -detail } else { detail };
            self.height_cache.update(index, delta);
        }

        self.row_expansions.set(key, !expanded);
        log::trace!("row {index} detail toggled -> expanded={}", !expanded);

        self.update_indexes();
        self.update_rows();
        Some(DetailToggle {
            rows: vec![index],
            current_index,
        })
    }

    /// Flip one group header's expansion state. Group expansion changes
    /// which members render, so the cache is rebuilt rather than patched.
    pub fn toggle_group_expansion(&mut self, group_index: usize) -> Option<DetailToggle> {
        let current_index = self.adjusted_viewport_index();
        let (key, members) = {
            let groups = self.grouped_rows.as_deref()?;
            let group = groups.get(group_index)?;
            let flat_start: usize = groups
                .iter()
                .take(group_index)
                .map(|g| g.value.len())
                .sum();
            (
                group.row_key(),
                (flat_start..flat_start + group.value.len()).collect::<Vec<_>>(),
            )
        };

        self.row_expansions.toggle(key);
        if self.config.scrollbar_v {
            self.recalc_layout();
        } else {
            self.update_indexes();
            self.update_rows();
        }
        Some(DetailToggle {
            rows: members,
            current_index,
        })
    }

    /// Expand or collapse every row, rebuilding the cache once instead of
    /// patching n times.
    pub fn toggle_all_rows(&mut self, expanded: bool) -> DetailToggle {
        let current_index = self.adjusted_viewport_index();
        self.row_expansions.clear();

        for (index, row) in self.rows.iter().enumerate() {
            let key = self.config.identity.key(index, row);
            self.row_expansions.set(key, expanded);
        }
        if let Some(groups) = self.grouped_rows.as_deref() {
            for group in groups {
                self.row_expansions.set(group.row_key(), expanded);
            }
        }

        if self.config.scrollbar_v {
            self.recalc_layout();
        } else {
            self.update_indexes();
            self.update_rows();
        }

        DetailToggle {
            rows: (0..self.rows.len()).collect(),
            current_index,
        }
    }
}
