//! gridbody - virtualized, editable data-grid body engine
//!
//! The core of a data-grid UI component, kept free of any render tree:
//! - Row height bookkeeping via an order-statistics tree (O(log n) point
//!   update, cumulative-offset query, and inverse pixel→row lookup)
//! - Viewport windowing: scroll offset (or page) → `[first, last)` visible
//!   rows
//! - Window materialization with pure-data 2-D transforms (virtual scroll,
//!   pinned column groups)
//! - Expandable detail rows and row grouping
//! - A keyboard-driven cell edit cursor with per-datatype value coercion
//!
//! Rendering, column resize/reorder, selection, and styling are external
//! collaborators: they push scroll/toggle/key events in and read derived
//! values (window, transforms, editor descriptors) back out.
//!
//! # Usage
//!
//! ```
//! use gridbody::{BodyConfig, GridBody, GridEdit, RowHeight, ScrollEvent};
//!
//! let mut body = GridBody::new(BodyConfig {
//!     scrollbar_v: true,
//!     virtualization: true,
//!     row_height: RowHeight::Fixed(30.0),
//!     ..BodyConfig::default()
//! })
//! .unwrap();
//! body.set_body_height(50.0);
//! body.set_rows(vec![]);
//!
//! let outcome = body.on_body_scroll(&ScrollEvent {
//!     scroll_y_pos: 0.0,
//!     scroll_x_pos: 0.0,
//!     direction: None,
//! });
//! assert!(outcome.offset.is_none());
//!
//! let grid = GridEdit::new(body);
//! assert!(!grid.is_editing());
//! ```

pub mod body;
pub mod editor;
pub mod error;
pub mod expansion;
pub mod layout;
pub mod session;
pub mod types;

pub use body::{
    BodyConfig, BodyScrollOutcome, DetailToggle, GridBody, OffsetChange, ScrollEvent, ToggleEvent,
};
pub use editor::{
    CellCoord, CellPatch, EditContext, EditKey, EditStatus, EditorDescriptor, EditorKind, EndEdit,
    GridEdit, KeyOutcome, SelectOption,
};
pub use error::{GridError, Result};
pub use expansion::ExpansionTracker;
pub use layout::{
    IndexWindow, PageEvent, PinStyles, RowHeightCache, RowStyles, ScrollDirection,
};
pub use session::ScrollSession;
pub use types::{
    Column, ColumnGroupWidths, Datatype, DetailHeight, Group, PinGroup, Record, RowHeight,
    RowIdentity, RowKey,
};

/// Get the library version.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
