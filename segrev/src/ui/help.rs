//! Help overlay renderer for segrev.
//!
//! Draws a centred modal over the panel layout, using ratatui's `Clear` widget to erase
//! the background first, inside the same `terminal.draw()` closure as the panels.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns to avoid a zero-height `Rect`.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Move down / up"),
        Line::from("  PgDn / PgUp   Move ten rows"),
        Line::from("  Tab / L, H    Next / previous open panel"),
        Line::from("  :             Go to segment number"),
        Line::from("  Enter         Go to the highlighted segment, or the selected error row"),
        Line::from(""),
        Line::from("Segment list"),
        Line::from("  f / F         Filter dialog / clear filter"),
        Line::from("  s / S         Sort dialog / clear sort"),
        Line::from("  m             Metadata for the highlighted segment"),
        Line::from("  r             Re-render the list"),
        Line::from(""),
        Line::from("Error panels"),
        Line::from("  t / w         Open or close Tag Errors / Space Errors"),
        Line::from("  r             Refresh the focused panel"),
        Line::from("  Space         Select / deselect the row under the cursor"),
        Line::from("  x             Fix all space errors"),
        Line::from("  click         Select / deselect a row"),
        Line::from("  double click  Go to the row's segment"),
        Line::from(""),
        Line::from("Dialogs"),
        Line::from("  Tab / S-Tab   Next / previous field"),
        Line::from("  Space         Toggle checkbox or option"),
        Line::from("  Enter         Apply (filter, sort, go to) or save (metadata)"),
        Line::from("  Ctrl-l        Clear filter or sort"),
        Line::from("  Ctrl-n        New metadata entry"),
        Line::from("  Esc           Close without applying"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  Enter / Esc   Dismiss a notice"),
        Line::from("  q / Esc       Quit"),
    ])
}
