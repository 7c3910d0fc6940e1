//! Responsive panel layout for segrev.
//!
//! Pure layout arithmetic, recomputed inside `terminal.draw()` on every render so each
//! frame reflects the current terminal size.
//!
//! # Panel geometry
//!
//! The segment list always shows. Open error panels stack in a column to its right when
//! the terminal is at least 100 columns wide, and below it otherwise.
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)` makes
//! adjacent panel borders share a single cell and merge their junction characters.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;

/// Panel areas for one frame. Closed error panels get a zero-sized `Rect`.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayout {
    pub segments: Rect,
    pub tags: Rect,
    pub spaces: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(frame: &Frame, state: &AppState) -> FrameLayout {
    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let tags_open = state.tags.is_open();
    let spaces_open = state.spaces.is_open();
    if !tags_open && !spaces_open {
        return FrameLayout {
            segments: main_area,
            tags: Rect::default(),
            spaces: Rect::default(),
            status_bar,
        };
    }

    let split = if main_area.width >= 100 {
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
    } else {
        Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
    }
    .spacing(Spacing::Overlap(1));
    let [segments, errors] = main_area.layout(&split);

    let (tags, spaces) = match (tags_open, spaces_open) {
        (true, true) => {
            let [top, bottom] = errors.layout(
                &Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)])
                    .spacing(Spacing::Overlap(1)),
            );
            (top, bottom)
        }
        (true, false) => (errors, Rect::default()),
        _ => (Rect::default(), errors),
    };

    FrameLayout { segments, tags, spaces, status_bar }
}

/// Inner area of a bordered panel.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered panel block: thick and highlighted when focused, plain otherwise. Fuzzy merge
/// because `Exact` produces wrong junctions when mixing `Thick` and `Plain`.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// One-row status bar: mode, project, segment counts, and the active filter and sort.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mode_text = match state.mode {
        Mode::Normal | Mode::HelpOverlay => " NORMAL ",
        Mode::Filter => " FILTER ",
        Mode::Sort => " SORT ",
        Mode::GoTo => " GO TO ",
        Mode::Meta => " META ",
    };
    let mode_span = Span::styled(
        mode_text,
        Style::default().fg(theme.status_mode).add_modifier(Modifier::BOLD),
    );

    let mut spans = vec![
        mode_span,
        Span::raw(format!(
            " {} | {}/{} segments | filter: {} | sort: {}",
            state.project(),
            state.segments.len(),
            state.total_segments,
            state.filter_spec.summary(),
            state.sort_spec.summary(),
        )),
    ];
    if state.segments_loading {
        spans.push(Span::styled(" | loading…", Style::default().fg(theme.muted)));
    }
    if state.engine_down {
        spans.push(Span::styled(" | engine stopped", Style::default().fg(theme.notice_error)));
    }
    spans.push(Span::styled("  ? help", Style::default().fg(theme.muted)));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
