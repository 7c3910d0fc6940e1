//! At-most-one selection over a rendered error-row table.
//!
//! Rows are identified by the segment index they carry. The model never looks at the
//! row set itself; the owning controller checks membership before calling [`Selection::click`]
//! and calls [`Selection::reset`] whenever the row set is replaced.

/// Single-selection state: either nothing, or one row id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<u32>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected row id, if any.
    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn is_selected(&self, row: u32) -> bool {
        self.selected == Some(row)
    }

    /// Toggles `row`: clicking the selected row clears the selection, clicking any other
    /// row replaces it. Returns the new selection.
    pub fn click(&mut self, row: u32) -> Option<u32> {
        self.selected = if self.selected == Some(row) { None } else { Some(row) };
        self.selected
    }

    /// Row set replaced: selection never carries over.
    pub fn reset(&mut self) {
        self.selected = None;
    }
}
