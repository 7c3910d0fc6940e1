//! UI rendering module for segrev.
//!
//! `render()` is the single entry point called by the event loop's `terminal.draw()`
//! closure. Layout arithmetic lives in `layout.rs`; each panel and dialog has its own
//! renderer. Overlays are drawn last so they sit on top of the panels.

mod layout;
pub mod dialogs;
pub mod error_table;
pub mod help;
pub mod keybindings;
pub mod segment_list;

use ratatui::Frame;
use segrev_core::types::ErrorClass;

use crate::app::{AppState, Mode, PanelRects};
use crate::theme::Theme;
use layout::{compute_layout, render_status_bar};

/// Renders one complete frame. Panel areas are written back into `state` for mouse hit
/// testing on the next event.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let layout = compute_layout(frame, state);
    state.panel_rects = PanelRects {
        segments: layout.segments,
        tags: layout.tags,
        spaces: layout.spaces,
    };

    segment_list::render_segment_list(frame, layout.segments, state, theme);
    if layout.tags.width > 0 {
        error_table::render_error_table(frame, layout.tags, ErrorClass::Tags, state, theme);
    }
    if layout.spaces.width > 0 {
        error_table::render_error_table(frame, layout.spaces, ErrorClass::Spaces, state, theme);
    }
    render_status_bar(frame, layout.status_bar, state, theme);

    match state.mode {
        Mode::Normal => {}
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::Filter => dialogs::render_filter_dialog(frame, state, theme),
        Mode::Sort => dialogs::render_sort_dialog(frame, state, theme),
        Mode::GoTo => dialogs::render_goto_dialog(frame, state, theme),
        Mode::Meta => dialogs::render_meta_dialog(frame, state, theme),
    }

    if let Some(notice) = state.notices.front() {
        dialogs::render_notice(frame, notice, state.notices.len(), theme);
    }
}
