//! Segment list panel.
//!
//! One row per segment in the engine's current (filtered, sorted) order: index, state
//! badge, error flags, then source → target. The focused segment from the last go-to is
//! drawn with a tinted background.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};
use segrev_core::types::{Segment, SegmentState};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

pub fn render_segment_list(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Segments;
    let title = if state.segments.len() == state.total_segments {
        format!("Segments ({})", state.total_segments)
    } else {
        format!("Segments ({} of {})", state.segments.len(), state.total_segments)
    };
    let block = panel_block(title, is_focused, theme);

    let items: Vec<ListItem> = if state.segments.is_empty() {
        let msg = if state.segments_loading { "Loading..." } else { "No segments" };
        vec![ListItem::new(Line::raw(msg))]
    } else {
        state
            .segments
            .iter()
            .map(|s| segment_item(s, state.focused_segment == Some(s.index), theme))
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut state.segment_list);
}

fn state_badge(state: SegmentState) -> &'static str {
    match state {
        SegmentState::Untranslated => "[ ]",
        SegmentState::Translated => "[~]",
        SegmentState::Confirmed => "[✓]",
    }
}

/// Format: `  12 [~] T· Save → Guardar`, where `T`/`S` flag tag/space errors.
fn segment_item(s: &Segment, focused: bool, theme: &Theme) -> ListItem<'static> {
    let flag = |on: bool, c: &'static str| {
        if on {
            Span::styled(c, Style::default().fg(theme.error_flag))
        } else {
            Span::raw("·")
        }
    };
    let target = if s.target.is_empty() {
        Span::styled("(untranslated)", Style::default().fg(theme.muted))
    } else {
        Span::raw(s.target.clone())
    };
    let line = Line::from(vec![
        Span::raw(format!("{:>5} ", s.index)),
        Span::styled(state_badge(s.state), Style::default().fg(theme.state_color(s.state))),
        Span::raw(" "),
        flag(s.tag_errors, "T"),
        flag(s.space_errors, "S"),
        Span::raw(format!(" {} → ", s.source)),
        target,
    ]);
    let item = ListItem::new(line);
    if focused {
        item.style(Style::default().bg(theme.focus_bg))
    } else {
        item
    }
}
