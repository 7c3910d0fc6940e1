//! Keybinding dispatcher for segrev.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue or quit. A pending notice
//! swallows the next key; otherwise the dispatcher branches on `state.mode` so every
//! dialog has an isolated handler.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Margin, Position, Rect};
use segrev_core::navigation::{GoToOutcome, NavKey};
use segrev_core::protocol::EngineRequest;
use segrev_core::sort::SortMode;
use segrev_core::types::{ErrorClass, LanguageSide};

use crate::app::{AppState, FilterField, MetaField, Mode, PanelFocus, SortField};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if !state.notices.is_empty() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            state.dismiss_notice();
        }
        return KeyAction::Continue;
    }
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Filter => handle_filter(key, state),
        Mode::Sort => handle_sort(key, state),
        Mode::GoTo => handle_goto(key, state),
        Mode::Meta => handle_meta(key, state),
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let now = Instant::now();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.move_cursor(true, 1),
        KeyCode::Char('k') | KeyCode::Up => state.move_cursor(false, 1),
        KeyCode::PageDown => state.move_cursor(true, 10),
        KeyCode::PageUp => state.move_cursor(false, 10),

        KeyCode::Tab | KeyCode::Char('L') => state.cycle_focus(true),
        KeyCode::BackTab | KeyCode::Char('H') => state.cycle_focus(false),

        KeyCode::Char('f') => state.open_filter(),
        KeyCode::Char('F') => state.clear_filter(),
        KeyCode::Char('s') => state.open_sort(),
        KeyCode::Char('S') => state.clear_sort(),
        KeyCode::Char(':') => state.open_goto(),
        KeyCode::Char('m') => state.open_meta(),

        KeyCode::Char('t') => state.toggle_panel(ErrorClass::Tags, now),
        KeyCode::Char('w') => state.toggle_panel(ErrorClass::Spaces, now),
        KeyCode::Char('r') => match state.focus.class() {
            Some(class) => state.refresh_panel(class, now),
            None => {
                state.send(EngineRequest::GetSegments);
            }
        },
        KeyCode::Char(' ') => {
            if let Some(class) = state.focus.class() {
                if let Some(row) = state.cursor_row(class) {
                    state.click_error_row(class, row, now);
                }
            }
        }
        KeyCode::Enter => match state.focus.class() {
            Some(class) => state.go_to_selected(class),
            None => {
                if let Some(segment) = state.highlighted_segment().map(|s| s.index) {
                    state.send(EngineRequest::GoToSegment { segment });
                }
            }
        },
        KeyCode::Char('x') => {
            if state.focus == PanelFocus::SpaceErrors {
                state.fix_all(ErrorClass::Spaces, now);
            }
        }

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        _ if is_ctrl(&key, 'c') => return KeyAction::Quit,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Filter dialog
// ---------------------------------------------------------------------------

/// Enter applies, Esc cancels, Ctrl-l clears. Tab moves between fields; Space toggles the
/// focused checkbox or radio; typing edits the text field.
fn handle_filter(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if is_ctrl(&key, 'l') {
        state.clear_filter();
        return KeyAction::Continue;
    }
    match key.code {
        KeyCode::Esc => {
            state.close_dialog();
            return KeyAction::Continue;
        }
        KeyCode::Enter => {
            state.apply_filter();
            return KeyAction::Continue;
        }
        _ => {}
    }
    let dialog = &mut state.filter;
    match key.code {
        KeyCode::Tab | KeyCode::Down => dialog.field = dialog.field.next(),
        KeyCode::BackTab | KeyCode::Up => dialog.field = dialog.field.prev(),
        KeyCode::Backspace if dialog.field == FilterField::Text => {
            dialog.form.text.pop();
        }
        KeyCode::Char(c) if dialog.field == FilterField::Text => dialog.form.text.push(c),
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
            let form = &mut dialog.form;
            match dialog.field {
                FilterField::Text => {}
                FilterField::Language => {
                    form.language = Some(form.language.unwrap_or_default().flip());
                }
                FilterField::CaseSensitive => form.case_sensitive = !form.case_sensitive,
                FilterField::Regex => form.regex = !form.regex,
                FilterField::Untranslated => form.show_untranslated = !form.show_untranslated,
                FilterField::Translated => form.show_translated = !form.show_translated,
                FilterField::Confirmed => form.show_confirmed = !form.show_confirmed,
            }
        }
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Sort dialog
// ---------------------------------------------------------------------------

fn handle_sort(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if is_ctrl(&key, 'l') {
        state.clear_sort();
        return KeyAction::Continue;
    }
    match key.code {
        KeyCode::Esc => {
            state.close_dialog();
            return KeyAction::Continue;
        }
        KeyCode::Enter => {
            state.apply_sort();
            return KeyAction::Continue;
        }
        _ => {}
    }
    let dialog = &mut state.sort;
    match key.code {
        KeyCode::Tab | KeyCode::Down => dialog.step(true),
        KeyCode::BackTab | KeyCode::Up => dialog.step(false),
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => match dialog.field {
            SortField::Mode => {
                dialog.form.mode = match dialog.form.mode {
                    SortMode::Language => SortMode::Status,
                    SortMode::Status => SortMode::Language,
                };
            }
            SortField::Language => {
                let side = dialog.form.language.unwrap_or(LanguageSide::Source);
                dialog.form.language = Some(side.flip());
            }
            SortField::Descending => dialog.form.descending = !dialog.form.descending,
        },
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Go-to dialog
// ---------------------------------------------------------------------------

fn nav_key(code: KeyCode) -> Option<NavKey> {
    Some(match code {
        KeyCode::Char(c) => NavKey::Char(c),
        KeyCode::Backspace => NavKey::Backspace,
        KeyCode::Delete => NavKey::Delete,
        KeyCode::Left => NavKey::Left,
        KeyCode::Right => NavKey::Right,
        KeyCode::Home => NavKey::Home,
        KeyCode::End => NavKey::End,
        KeyCode::Enter => NavKey::Enter,
        KeyCode::Esc => NavKey::Escape,
        _ => return None,
    })
}

fn handle_goto(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let Some(nav) = nav_key(key.code) else {
        return KeyAction::Continue;
    };
    match state.goto.handle(nav) {
        GoToOutcome::Editing | GoToOutcome::Rejected(_) => {}
        GoToOutcome::Invalid(e) => state.warn(e, "Go To"),
        GoToOutcome::Submit(request) => {
            state.send(request);
            state.close_dialog();
        }
        GoToOutcome::Cancel => state.close_dialog(),
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Metadata dialog
// ---------------------------------------------------------------------------

/// Tab cycles Type / Value / Entries. Enter saves from the text fields and loads the
/// highlighted entry for editing from the list. Ctrl-n starts a new entry.
fn handle_meta(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if is_ctrl(&key, 'n') {
        state.new_meta_entry();
        return KeyAction::Continue;
    }
    let field = match &state.meta {
        Some(dialog) => dialog.field,
        None => {
            state.close_dialog();
            return KeyAction::Continue;
        }
    };
    match key.code {
        KeyCode::Esc => state.close_dialog(),
        KeyCode::Enter if field == MetaField::Entries => state.edit_meta_entry(),
        KeyCode::Enter => state.submit_meta(),
        _ => {
            let Some(dialog) = state.meta.as_mut() else {
                return KeyAction::Continue;
            };
            match (key.code, field) {
                (KeyCode::Tab, _) => dialog.field = field.next(),
                (KeyCode::BackTab, _) => dialog.field = field.prev(),
                (KeyCode::Down, MetaField::Entries) => dialog.list.select_next(),
                (KeyCode::Up, MetaField::Entries) => dialog.list.select_previous(),
                (KeyCode::Backspace, MetaField::Type) => {
                    dialog.form.kind.pop();
                }
                (KeyCode::Backspace, MetaField::Value) => {
                    dialog.form.value.pop();
                }
                (KeyCode::Char(c), MetaField::Type) => dialog.form.kind.push(c),
                (KeyCode::Char(c), MetaField::Value) => dialog.form.value.push(c),
                _ => {}
            }
        }
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses a panel; on an error table body row it also clicks that row.
/// The scroll wheel moves the cursor of the focused panel.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    if state.mode != Mode::Normal || !state.notices.is_empty() {
        return KeyAction::Continue;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_mouse_click(mouse.column, mouse.row, state, Instant::now())
        }
        MouseEventKind::ScrollUp => state.move_cursor(false, 3),
        MouseEventKind::ScrollDown => state.move_cursor(true, 3),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_mouse_click(col: u16, row: u16, state: &mut AppState, now: Instant) {
    let pos = Position { x: col, y: row };
    let rects = state.panel_rects;

    if rects.segments.contains(pos) {
        state.focus = PanelFocus::Segments;
        return;
    }
    for (class, rect) in [(ErrorClass::Tags, rects.tags), (ErrorClass::Spaces, rects.spaces)] {
        if rect.width == 0 || !rect.contains(pos) {
            continue;
        }
        state.focus = PanelFocus::of(class);
        if let Some(index) = table_row_at(rect, row, state.table_mut(class).offset()) {
            if let Some(segment) = state.review(class).rows().get(index).map(|r| r.index) {
                state.table_mut(class).select(Some(index));
                state.click_error_row(class, segment, now);
            }
        }
        return;
    }
}

/// Row index under screen row `y` of a bordered table with a one-line header.
fn table_row_at(panel: Rect, y: u16, offset: usize) -> Option<usize> {
    let inner = panel.inner(Margin { vertical: 1, horizontal: 1 });
    let body_top = inner.y.checked_add(1)?;
    if y < body_top || y >= inner.y.saturating_add(inner.height) {
        return None;
    }
    Some(offset + usize::from(y - body_top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Receiver;
    use crossterm::event::KeyEventState;
    use segrev_core::error::Severity;
    use segrev_core::protocol::{EngineContext, EngineResponse, Envelope, Reply};
    use segrev_core::sort::{SortOption, SortSpec};
    use segrev_core::types::ErrorRow;
    use std::time::Duration;

    fn state() -> (AppState, Receiver<Envelope>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let state = AppState::new(
            EngineContext::new("demo"),
            tx,
            Duration::from_secs(5),
            Duration::from_millis(400),
        );
        (state, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(state: &mut AppState, code: KeyCode) -> KeyAction {
        handle_key(key(code), state)
    }

    fn type_str(state: &mut AppState, s: &str) {
        for c in s.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn goto_input_keeps_only_digits() {
        let (mut state, rx) = state();
        press(&mut state, KeyCode::Char(':'));
        assert_eq!(state.mode, Mode::GoTo);
        type_str(&mut state, "12a3");
        assert_eq!(state.goto.value(), "123");
        press(&mut state, KeyCode::Enter);
        assert_eq!(rx.try_recv().unwrap().request, EngineRequest::GoToSegment { segment: 123 });
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn goto_empty_submit_warns_and_keeps_dialog() {
        let (mut state, rx) = state();
        press(&mut state, KeyCode::Char(':'));
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.mode, Mode::GoTo);
        assert_eq!(state.notices.front().unwrap().message, "Enter segment number");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_filter_text_is_rejected_locally() {
        let (mut state, rx) = state();
        press(&mut state, KeyCode::Char('f'));
        press(&mut state, KeyCode::Enter);
        let notice = state.notices.front().unwrap();
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(notice.message, "Enter text to search");
        assert_eq!(notice.origin, "Filter");
        assert!(rx.try_recv().is_err());
        assert_eq!(state.mode, Mode::Filter);
    }

    #[test]
    fn filter_without_status_is_rejected_locally() {
        let (mut state, rx) = state();
        press(&mut state, KeyCode::Char('f'));
        type_str(&mut state, "hello");
        press(&mut state, KeyCode::Tab); // language
        press(&mut state, KeyCode::Char(' ')); // source -> target
        assert_eq!(state.filter.form.language, Some(LanguageSide::Target));
        for _ in 0..3 {
            press(&mut state, KeyCode::Tab);
        }
        for _ in 0..3 {
            press(&mut state, KeyCode::Char(' '));
            press(&mut state, KeyCode::Tab);
        }
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.notices.front().unwrap().message, "Select segments to display");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn valid_filter_sends_one_request_and_reopens_populated() {
        let (mut state, rx) = state();
        press(&mut state, KeyCode::Char('f'));
        type_str(&mut state, "hello");
        press(&mut state, KeyCode::Enter);
        match rx.try_recv().unwrap().request {
            EngineRequest::FilterOptions(spec) => assert_eq!(spec.filter_text, "hello"),
            other => panic!("unexpected request: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
        press(&mut state, KeyCode::Char('f'));
        assert_eq!(state.filter.form.text, "hello");
    }

    #[test]
    fn status_sort_skips_language_field() {
        let (mut state, rx) = state();
        press(&mut state, KeyCode::Char('s'));
        press(&mut state, KeyCode::Char(' ')); // language -> status
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.sort.field, SortField::Descending);
        press(&mut state, KeyCode::Enter);
        assert_eq!(
            rx.try_recv().unwrap().request,
            EngineRequest::SortOptions(SortSpec {
                sort_option: SortOption::Status,
                sort_desc: false
            })
        );
    }

    #[test]
    fn notice_swallows_keys_until_dismissed() {
        let (mut state, _rx) = state();
        press(&mut state, KeyCode::Char('f'));
        press(&mut state, KeyCode::Enter);
        assert_eq!(press(&mut state, KeyCode::Char('q')), KeyAction::Continue);
        assert_eq!(state.notices.len(), 1);
        press(&mut state, KeyCode::Enter);
        assert!(state.notices.is_empty());
    }

    #[test]
    fn space_and_enter_drive_the_focused_error_table() {
        let (mut state, rx) = state();
        press(&mut state, KeyCode::Char('t'));
        let fetch = rx.try_recv().unwrap();
        state.apply_reply(Reply {
            request: fetch.id,
            response: EngineResponse::TagErrors {
                errors: vec![ErrorRow::new(5, "Extra tags"), ErrorRow::new(9, "Tag mismatch")],
            },
        });
        press(&mut state, KeyCode::Char('j'));
        press(&mut state, KeyCode::Char(' '));
        assert_eq!(state.tags.selected(), Some(9));
        press(&mut state, KeyCode::Enter);
        assert_eq!(rx.try_recv().unwrap().request, EngineRequest::GoToSegment { segment: 9 });
    }

    #[test]
    fn mouse_row_mapping_accounts_for_border_and_header() {
        let panel = Rect::new(0, 0, 40, 10);
        assert_eq!(table_row_at(panel, 0, 0), None);
        assert_eq!(table_row_at(panel, 1, 0), None);
        assert_eq!(table_row_at(panel, 2, 0), Some(0));
        assert_eq!(table_row_at(panel, 4, 3), Some(5));
        assert_eq!(table_row_at(panel, 9, 0), None);
    }

    #[test]
    fn meta_dialog_types_into_focused_field() {
        let (mut state, rx) = state();
        let id = state.send(EngineRequest::GetSegments);
        let _ = rx.try_recv();
        state.apply_reply(Reply {
            request: id,
            response: EngineResponse::Segments {
                segments: vec![segrev_core::types::Segment {
                    index: 2,
                    file: "f".into(),
                    unit: "u".into(),
                    source: "s".into(),
                    target: String::new(),
                    state: segrev_core::types::SegmentState::Untranslated,
                    tag_errors: false,
                    space_errors: false,
                }],
                total: 1,
            },
        });
        press(&mut state, KeyCode::Char('m'));
        let _ = rx.try_recv();
        type_str(&mut state, "1abc");
        press(&mut state, KeyCode::Tab);
        type_str(&mut state, "v");
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.notices.front().unwrap().message, "Invalid type");
        assert!(rx.try_recv().is_err());
    }
}
