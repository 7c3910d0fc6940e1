//! Error review panels (Tag Errors / Space Errors).
//!
//! A `Table` of `Segment | Type` rows with a keyboard cursor (the table's own highlight)
//! and a separate selection mark driven by the review controller. While a fetch is
//! outstanding the body shows a loading line, upgraded to a "still working" hint once the
//! fetch has stalled.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table},
};
use segrev_core::review::ReviewPhase;
use segrev_core::types::ErrorClass;

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_error_table(
    frame: &mut Frame,
    area: Rect,
    class: ErrorClass,
    state: &mut AppState,
    theme: &Theme,
) {
    let is_focused = state.focus == PanelFocus::of(class);
    let review = state.review(class);

    let mut title = format!("{} ({})", class.title(), review.rows().len());
    if class.supports_fix_all() {
        title.push_str(" · x fix all");
    }
    let block = panel_block(title, is_focused, theme);

    if let ReviewPhase::Loading { stalled, .. } = review.phase() {
        let msg = if stalled { "Still working… press r to retry" } else { "Loading..." };
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Line::styled(msg, Style::default().fg(theme.muted))),
            inner_rect(area),
        );
        return;
    }

    let selected = review.selected();
    let rows: Vec<Row> = review
        .rows()
        .iter()
        .map(|r| {
            let mark = if selected == Some(r.index) { "●" } else { " " };
            let row = Row::new(vec![
                Cell::from(format!("{mark} {}", r.index)),
                Cell::from(r.kind.clone()),
            ]);
            if selected == Some(r.index) {
                row.style(Style::default().bg(theme.selected_bg))
            } else {
                row
            }
        })
        .collect();

    let header = Row::new(vec!["Segment", "Type"])
        .style(Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD));
    let table = Table::new(rows, [Constraint::Length(10), Constraint::Fill(1)])
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(table, area, state.table_mut(class));
}
