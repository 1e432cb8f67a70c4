//! Incrementally-updatable row height cache.
//!
//! An order-statistics (Fenwick) tree over per-row pixel heights. Point
//! updates and cumulative-offset queries are O(log n); the inverse lookup
//! (pixel offset → row index) walks the tree in O(log n) instead of
//! rescanning. A full rebuild is O(n).
//!
//! The cache is deliberately tolerant of transient inconsistency: queries
//! against a stale or empty tree clamp instead of panicking, because scroll
//! events can race a row-count change ahead of the rebuild listener.

use std::collections::HashMap;

use crate::error::{GridError, Result};
use crate::expansion::ExpansionTracker;
use crate::types::{DetailHeight, Record, RowHeight, RowIdentity, RowKey};

/// Parameters for a full cache rebuild.
pub struct CacheInitParams<'a> {
    /// The current (possibly externally-paged) row slice.
    pub rows: &'a [Record],
    /// Base row height provider.
    pub row_height: &'a RowHeight,
    /// Detail panel height provider, if detail rows are configured.
    pub detail_row_height: Option<&'a DetailHeight>,
    /// Virtual scroll combined with external paging: size the tree by
    /// `row_count` even though only a slice of rows is loaded.
    pub external_virtual: bool,
    /// Total logical row count.
    pub row_count: usize,
    /// Row key → logical index, for per-row detail height functions.
    pub row_indexes: &'a HashMap<RowKey, usize>,
    /// Expansion state; expanded rows contribute their detail height.
    pub row_expansions: &'a ExpansionTracker,
    /// Identity mapping for expansion lookups.
    pub identity: &'a RowIdentity,
}

/// Fenwick tree over row heights, indexed `0..row_count`.
#[derive(Debug, Clone, Default)]
pub struct RowHeightCache {
    tree: Vec<f32>,
}

impl RowHeightCache {
    /// An empty cache of size 0.
    pub fn new() -> Self {
        RowHeightCache { tree: Vec::new() }
    }

    /// Number of row slots in the cache.
    pub fn row_count(&self) -> usize {
        self.tree.len()
    }

    /// Whether the cache holds no rows.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Reset to empty, size 0.
    pub fn clear_cache(&mut self) {
        self.tree.clear();
    }

    /// Rebuild the full tree in O(n).
    ///
    /// Height of row `i` is its base height plus its detail height when the
    /// row is expanded. Slots beyond the supplied row slice (external
    /// virtual paging) get the base height of an absent row.
    ///
    /// # Errors
    ///
    /// `GridError::Config` when a fixed base height is not a finite number.
    pub fn init_cache(&mut self, params: &CacheInitParams<'_>) -> Result<()> {
        if let RowHeight::Fixed(h) = params.row_height {
            if !h.is_finite() {
                return Err(GridError::Config(format!(
                    "row height must be a finite number, got {h}"
                )));
            }
        }

        let n = if params.external_virtual {
            params.row_count
        } else {
            params.rows.len()
        };

        let mut tree = vec![0.0_f32; n];
        for (i, slot) in tree.iter_mut().enumerate() {
            let row = params.rows.get(i);
            let mut height = params.row_height.of(row);
            if let (Some(row), Some(detail)) = (row, params.detail_row_height) {
                let key = params.identity.key(i, row);
                if params.row_expansions.is_expanded(&key) {
                    let index = params.row_indexes.get(&key).copied();
                    height += detail.of(Some(row), index);
                }
            }
            *slot = height;
        }

        // O(n) Fenwick construction: push each node's value to its parent.
        for i in 0..n {
            let parent = i | (i + 1);
            if parent < n {
                let value = tree.get(i).copied().unwrap_or(0.0);
                if let Some(p) = tree.get_mut(parent) {
                    *p += value;
                }
            }
        }

        self.tree = tree;
        log::debug!("row height cache rebuilt: {n} rows");
        Ok(())
    }

    /// Cumulative pixel offset of the end of row `index` (sum of heights of
    /// rows `0..=index`). Out-of-range indexes clamp to the last row; an
    /// empty cache yields 0.
    pub fn query(&self, index: usize) -> f32 {
        if self.tree.is_empty() {
            return 0.0;
        }
        let mut i = index.min(self.tree.len() - 1);
        let mut sum = 0.0;
        loop {
            sum += self.tree.get(i).copied().unwrap_or(0.0);
            let next = i & (i + 1);
            if next == 0 {
                break;
            }
            i = next - 1;
        }
        sum
    }

    /// Cumulative pixel offset of the start of row `index`; `offset_before(0)`
    /// is 0 for any cache state.
    pub fn offset_before(&self, index: usize) -> f32 {
        if index == 0 {
            return 0.0;
        }
        self.query(index - 1)
    }

    /// Total height between the start of row `a` and the end of row `b`.
    pub fn query_between(&self, a: usize, b: usize) -> f32 {
        self.query(b) - self.offset_before(a)
    }

    /// Total pixel height of all rows.
    pub fn total_height(&self) -> f32 {
        self.offset_before(self.tree.len())
    }

    /// Adjust one row's height by `delta`, propagating aggregates in
    /// O(log n). Out-of-range indexes are a tolerated no-op.
    pub fn update(&mut self, index: usize, delta: f32) {
        let n = self.tree.len();
        if index >= n {
            return;
        }
        let mut i = index;
        while i < n {
            if let Some(node) = self.tree.get_mut(i) {
                *node += delta;
            }
            i |= i + 1;
        }
    }

    /// Inverse lookup: the index of the row containing the given pixel
    /// offset, i.e. the unique `r` with `offset_before(r) <= offset <
    /// query(r)`. Offsets at or past the total height clamp to the last
    /// row; an empty cache yields 0.
    pub fn row_index_at(&self, offset: f32) -> usize {
        let n = self.tree.len();
        if n == 0 || offset <= 0.0 {
            return 0;
        }

        let mut remaining = offset;
        // `pos` is one past the last fully-consumed row.
        let mut pos: usize = 0;
        let mut block_size = 1_usize << (usize::BITS - 1 - n.leading_zeros());
        while block_size != 0 {
            let next = pos + block_size;
            if next <= n {
                let node = self.tree.get(next - 1).copied().unwrap_or(0.0);
                if remaining >= node {
                    remaining -= node;
                    pos = next;
                }
            }
            block_size >>= 1;
        }
        pos.min(n - 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn fixed_cache(heights: &[f32]) -> RowHeightCache {
        let mut cache = RowHeightCache::new();
        let mut tree = heights.to_vec();
        let n = tree.len();
        for i in 0..n {
            let parent = i | (i + 1);
            if parent < n {
                let v = tree[i];
                tree[parent] += v;
            }
        }
        cache.tree = tree;
        cache
    }

    #[test]
    fn query_is_cumulative() {
        let cache = fixed_cache(&[30.0, 30.0, 30.0]);
        assert_eq!(cache.query(0), 30.0);
        assert_eq!(cache.query(1), 60.0);
        assert_eq!(cache.query(2), 90.0);
    }

    #[test]
    fn offset_before_zero_is_zero() {
        let cache = fixed_cache(&[30.0, 30.0]);
        assert_eq!(cache.offset_before(0), 0.0);
        let empty = RowHeightCache::new();
        assert_eq!(empty.offset_before(0), 0.0);
    }

    #[test]
    fn out_of_range_query_clamps() {
        let cache = fixed_cache(&[10.0, 20.0]);
        assert_eq!(cache.query(99), 30.0);
        let empty = RowHeightCache::new();
        assert_eq!(empty.query(5), 0.0);
    }

    #[test]
    fn update_propagates() {
        let mut cache = fixed_cache(&[30.0, 30.0, 30.0, 30.0]);
        cache.update(1, 20.0);
        assert_eq!(cache.query(0), 30.0);
        assert_eq!(cache.query(1), 80.0);
        assert_eq!(cache.query(3), 140.0);
    }

    #[test]
    fn update_out_of_range_is_noop() {
        let mut cache = fixed_cache(&[30.0]);
        cache.update(5, 20.0);
        assert_eq!(cache.query(0), 30.0);
        let mut empty = RowHeightCache::new();
        empty.update(0, 20.0);
        assert_eq!(empty.query(0), 0.0);
    }

    #[test]
    fn row_index_at_finds_containing_row() {
        let cache = fixed_cache(&[30.0, 30.0, 30.0]);
        assert_eq!(cache.row_index_at(0.0), 0);
        assert_eq!(cache.row_index_at(29.9), 0);
        assert_eq!(cache.row_index_at(30.0), 1);
        assert_eq!(cache.row_index_at(80.0), 2);
    }

    #[test]
    fn row_index_at_clamps_past_end() {
        let cache = fixed_cache(&[30.0, 30.0]);
        assert_eq!(cache.row_index_at(60.0), 1);
        assert_eq!(cache.row_index_at(1000.0), 1);
    }

    #[test]
    fn row_index_at_uneven_heights() {
        let cache = fixed_cache(&[10.0, 100.0, 5.0, 50.0]);
        assert_eq!(cache.row_index_at(9.9), 0);
        assert_eq!(cache.row_index_at(10.0), 1);
        assert_eq!(cache.row_index_at(109.9), 1);
        assert_eq!(cache.row_index_at(110.0), 2);
        assert_eq!(cache.row_index_at(115.0), 3);
    }

    #[test]
    fn query_between_spans() {
        let cache = fixed_cache(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(cache.query_between(1, 2), 50.0);
        assert_eq!(cache.query_between(0, 3), 100.0);
    }
}
