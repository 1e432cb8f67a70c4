//! Layout engine: row-height bookkeeping, viewport windowing, and
//! positional transforms.

pub mod height_cache;
pub mod materializer;
pub mod viewport;

pub use height_cache::{CacheInitParams, RowHeightCache};
pub use materializer::{
    bottom_summary_translate_y, materialize_flat, materialize_grouped, row_translate_y,
    styles_by_group, PinStyles, RowStyles,
};
pub use viewport::{
    scroll_offset_for_page, update_indexes, update_page, IndexParams, IndexWindow, PageEvent,
    ScrollDirection,
};
