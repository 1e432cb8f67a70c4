//! Cell editing wrapper around `GridBody`.
//!
//! `GridEdit` wraps the scrolling body, adding:
//! - The edit cursor state machine (Idle ↔ Editing)
//! - Keyboard navigation across editable cells (Tab/Shift+Tab, arrows)
//! - Commit/cancel with per-datatype value coercion
//!
//! The cursor `{x, y}` indexes the displayed-column sequence and the
//! rendered window; it exists only while a session is open and dies on
//! commit, cancel, or window re-render.

pub mod commit;
pub mod control;

pub use commit::{apply_patch, build_patch, CellPatch, EditContext, EditStatus, EndEdit};
pub use control::{editor_descriptor, EditorDescriptor, EditorKind, SelectOption};

use serde::Serialize;

use crate::body::GridBody;
use crate::error::Result;
use crate::types::Record;

/// Cursor position of an open edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellCoord {
    /// Index into the displayed (non-hidden) columns.
    pub x: usize,
    /// Index into the rendered window.
    pub y: usize,
}

/// A keyboard event forwarded by the presentation layer.
///
/// Caret positions live in the native control, so horizontal arrows carry
/// a caret-at-boundary flag; the grid only moves the cursor when the caret
/// has nowhere further to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// Move to the next (or previous, with shift) editable cell, wrapping
    /// across rows.
    Tab { shift: bool },
    /// Cancel the session and suppress the next blur.
    Escape,
    /// Currently a no-op passthrough.
    Enter,
    /// Move left when the caret is at the start of the text.
    ArrowLeft { caret_at_start: bool },
    /// Move right when the caret is at the end of the text.
    ArrowRight { caret_at_end: bool },
    /// Move up one row; blocked at the first row of the page.
    ArrowUp,
    /// Move down one row; blocked at the last row of the page.
    ArrowDown,
}

/// What a keyboard event produced.
#[derive(Debug, Clone, Default)]
pub struct KeyOutcome {
    /// Commit emitted for the cell the cursor left.
    pub end_edit: Option<EndEdit>,
    /// Editor to present for the newly entered cell.
    pub editor: Option<EditorDescriptor>,
    /// Whether the grid consumed the event (the presentation layer should
    /// suppress the control's default behavior).
    pub handled: bool,
}

impl KeyOutcome {
    fn ignored() -> Self {
        KeyOutcome::default()
    }
}

/// The editable grid: a `GridBody` plus the edit cursor state machine.
pub struct GridEdit {
    body: GridBody,
    cell: Option<CellCoord>,
    context: Option<EditContext>,
    cell_was_escaped: bool,
}

impl GridEdit {
    /// Wrap a body with editing support.
    pub fn new(body: GridBody) -> Self {
        GridEdit {
            body,
            cell: None,
            context: None,
            cell_was_escaped: false,
        }
    }

    /// Read access to the wrapped body.
    pub fn body(&self) -> &GridBody {
        &self.body
    }

    /// Mutable access to the wrapped body for non-structural inputs.
    /// Replace the row collection through [`GridEdit::set_rows`] so the
    /// open session policy applies.
    pub fn body_mut(&mut self) -> &mut GridBody {
        &mut self.body
    }

    /// Replace the row collection wholesale. Any open edit session is
    /// force-cancelled first: a cursor pointed at a replaced collection is
    /// meaningless.
    pub fn set_rows(&mut self, rows: Vec<Record>) {
        self.cancel_edit();
        self.body.set_rows(rows);
    }

    /// Whether an edit session is open.
    pub fn is_editing(&self) -> bool {
        self.context.is_some()
    }

    /// Cursor position of the open session, if any.
    pub fn editing_cell(&self) -> Option<CellCoord> {
        self.cell
    }

    /// Context of the open session, if any.
    pub fn edit_context(&self) -> Option<&EditContext> {
        self.context.as_ref()
    }

    // ---- Session lifecycle ------------------------------------------------

    /// Activate editing at a cell.
    ///
    /// `x` indexes the displayed columns, `y` the rendered window. Returns
    /// the editor to present, or `None` (staying idle) when the target is
    /// not displayed, not loaded, or not editable.
    ///
    /// # Errors
    ///
    /// Configuration errors from editor construction (empty option list).
    pub fn begin_edit(&mut self, x: usize, y: usize) -> Result<Option<EditorDescriptor>> {
        self.cell = Some(CellCoord { x, y });
        let editor = self.enter_cell()?;
        if editor.is_none() {
            self.cell = None;
        }
        Ok(editor)
    }

    /// Commit the open session with the control's raw value.
    pub fn commit_edit(&mut self, raw_value: &str) -> Option<EndEdit> {
        let end_edit = self.exit_cell(raw_value);
        self.cell = None;
        end_edit
    }

    /// Cancel the open session without touching the row collection.
    pub fn cancel_edit(&mut self) {
        self.context = None;
        self.cell = None;
    }

    /// The control lost focus. Commits unless the immediately preceding
    /// Escape armed the suppress-one-blur flag.
    pub fn on_blur(&mut self, raw_value: &str) -> Option<EndEdit> {
        if self.cell_was_escaped {
            self.cell_was_escaped = false;
            return None;
        }
        let end_edit = self.exit_cell(raw_value);
        self.cell = None;
        end_edit
    }

    /// Keyboard input while a session is open.
    ///
    /// `raw_value` is the control's current content; cursor moves commit
    /// the cell being left before entering the next one.
    ///
    /// # Errors
    ///
    /// Configuration errors from editor construction for the entered cell.
    pub fn on_key_down(&mut self, key: &EditKey, raw_value: &str) -> Result<KeyOutcome> {
        if self.context.is_none() {
            return Ok(KeyOutcome::ignored());
        }

        match *key {
            EditKey::Tab { shift } => {
                let end_edit = self.exit_cell(raw_value);
                if shift {
                    self.set_prev_x(true);
                } else {
                    self.set_next_x(true);
                }
                let editor = self.enter_cell()?;
                Ok(KeyOutcome {
                    end_edit,
                    editor,
                    handled: true,
                })
            }
            EditKey::Escape => {
                self.cell_was_escaped = true;
                self.cancel_edit();
                Ok(KeyOutcome {
                    end_edit: None,
                    editor: None,
                    handled: true,
                })
            }
            EditKey::Enter => Ok(KeyOutcome::ignored()),
            EditKey::ArrowLeft { caret_at_start } => {
                if !caret_at_start {
                    return Ok(KeyOutcome::ignored());
                }
                let end_edit = self.exit_cell(raw_value);
                self.set_prev_x(false);
                let editor = self.enter_cell()?;
                Ok(KeyOutcome {
                    end_edit,
                    editor,
                    handled: true,
                })
            }
            EditKey::ArrowRight { caret_at_end } => {
                if !caret_at_end {
                    return Ok(KeyOutcome::ignored());
                }
                let end_edit = self.exit_cell(raw_value);
                self.set_next_x(false);
                let editor = self.enter_cell()?;
                Ok(KeyOutcome {
                    end_edit,
                    editor,
                    handled: true,
                })
            }
            EditKey::ArrowUp => {
                let at_top = self.cell.is_none_or(|cell| cell.y == 0);
                if at_top {
                    return Ok(KeyOutcome {
                        end_edit: None,
                        editor: None,
                        handled: true,
                    });
                }
                let end_edit = self.exit_cell(raw_value);
                self.set_prev_y();
                let editor = self.enter_cell()?;
                Ok(KeyOutcome {
                    end_edit,
                    editor,
                    handled: true,
                })
            }
            EditKey::ArrowDown => {
                let at_bottom = self
                    .cell
                    .is_none_or(|cell| cell.y + 1 >= self.lower_bound());
                if at_bottom {
                    return Ok(KeyOutcome {
                        end_edit: None,
                        editor: None,
                        handled: true,
                    });
                }
                let end_edit = self.exit_cell(raw_value);
                self.set_next_y();
                let editor = self.enter_cell()?;
                Ok(KeyOutcome {
                    end_edit,
                    editor,
                    handled: true,
                })
            }
        }
    }

    // ---- Cursor movement --------------------------------------------------

    /// Rows the cursor may move across vertically: the page, or the
    /// rendered window when no page size is configured.
    fn lower_bound(&self) -> usize {
        let page_size = self.body.page_size();
        if page_size > 0 {
            page_size
        } else {
            self.body.window().len()
        }
    }

    fn editable_flags(&self) -> Vec<bool> {
        self.body
            .displayed_columns()
            .iter()
            .map(|c| c.editable)
            .collect()
    }

    /// Advance the cursor to the next editable column, wrapping to the next
    /// row when `newline` is set. Skips non-editable columns and stops at
    /// the lower-right corner if none is found, so an all-non-editable row
    /// cannot loop forever.
    fn set_next_x(&mut self, newline: bool) {
        let editable = self.editable_flags();
        if editable.is_empty() {
            return;
        }
        let lower_bound = self.lower_bound();
        let Some(mut cell) = self.cell else {
            return;
        };

        loop {
            let at_right = cell.x + 1 >= editable.len();
            let at_lower = cell.y + 1 >= lower_bound;
            if newline && at_right && !at_lower {
                cell.y += 1;
            }
            cell.x = if at_right { 0 } else { cell.x + 1 };

            let is_editable = editable.get(cell.x).copied().unwrap_or(false);
            let at_corner = cell.x + 1 >= editable.len() && cell.y + 1 >= lower_bound;
            if is_editable || at_corner {
                break;
            }
        }
        self.cell = Some(cell);
    }

    /// Move the cursor to the previous editable column, wrapping to the
    /// previous row when `prevline` is set. Stops at the upper-left corner.
    fn set_prev_x(&mut self, prevline: bool) {
        let editable = self.editable_flags();
        if editable.is_empty() {
            return;
        }
        let Some(mut cell) = self.cell else {
            return;
        };

        loop {
            let at_left = cell.x == 0;
            let at_upper = cell.y == 0;
            if prevline && at_left && !at_upper {
                cell.y -= 1;
            }
            cell.x = if at_left { editable.len() - 1 } else { cell.x - 1 };

            let is_editable = editable.get(cell.x).copied().unwrap_or(false);
            let at_corner = cell.x == 0 && cell.y == 0;
            if is_editable || at_corner {
                break;
            }
        }
        self.cell = Some(cell);
    }

    fn set_next_y(&mut self) {
        let lower_bound = self.lower_bound();
        if let Some(cell) = self.cell.as_mut() {
            if cell.y + 1 < lower_bound {
                cell.y += 1;
            }
        }
    }

    fn set_prev_y(&mut self) {
        if let Some(cell) = self.cell.as_mut() {
            if cell.y > 0 {
                cell.y -= 1;
            }
        }
    }

    // ---- Enter / exit -----------------------------------------------------

    /// Open a session at the current cursor position, if it points at a
    /// displayed, loaded, editable cell. Grouped windows are not editable.
    fn enter_cell(&mut self) -> Result<Option<EditorDescriptor>> {
        let Some(cell) = self.cell else {
            return Ok(None);
        };
        if self.body.grouped_rows().is_some() {
            self.context = None;
            return Ok(None);
        }

        let column = {
            let displayed = self.body.displayed_columns();
            match displayed.get(cell.x) {
                Some(c) if c.editable => (*c).clone(),
                _ => {
                    self.context = None;
                    return Ok(None);
                }
            }
        };
        let Some(&row_index) = self.body.window().get(cell.y) else {
            self.context = None;
            return Ok(None);
        };

        let current = self
            .body
            .rows()
            .get(row_index)
            .and_then(|row| row.get(&column.prop));
        let descriptor = editor_descriptor(&column, current)?;

        self.context = Some(EditContext {
            coord: cell,
            row_index,
            column,
        });
        Ok(Some(descriptor))
    }

    /// Close the session and commit the control's raw value, keeping the
    /// cursor in place for a follow-up move. Returns the commit report, or
    /// `None` when nothing is emitted (no session, or a blank enumerated
    /// selection).
    fn exit_cell(&mut self, raw_value: &str) -> Option<EndEdit> {
        let context = self.context.take()?;
        self.set_cell_value(context, raw_value)
    }

    /// Coerce, compare, and apply the committed value.
    fn set_cell_value(&mut self, context: EditContext, raw_value: &str) -> Option<EndEdit> {
        let existing = self
            .body
            .rows()
            .get(context.row_index)
            .and_then(|row| row.get(&context.column.prop))
            .cloned();

        let (patch, status) = build_patch(
            &context.column,
            existing.as_ref(),
            raw_value,
            context.row_index,
        )?;

        if status == EditStatus::Updated {
            self.body.apply_patch(&patch);
        }

        Some(EndEdit {
            status,
            new_value: raw_value.to_string(),
            context,
        })
    }
}
