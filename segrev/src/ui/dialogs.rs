//! Modal dialogs: filter, sort, go-to, metadata, and the notice box.
//!
//! Each is drawn like the help overlay: `Clear` over a centred area, then a bordered
//! `Paragraph`. The field that receives keys is marked with `›` and the active color.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, List, ListItem, Paragraph, Wrap},
};
use segrev_core::error::{Notice, Severity};
use segrev_core::meta::MetaMode;
use segrev_core::sort::SortMode;
use segrev_core::types::LanguageSide;

use crate::app::{AppState, FilterField, MetaField, SortField};
use crate::theme::Theme;

/// Clears and returns a centred area of at most `width` × `height` cells.
fn modal_area(frame: &mut Frame, width: u16, height: u16) -> Rect {
    let area = frame.area().centered(Constraint::Length(width), Constraint::Length(height));
    frame.render_widget(Clear, area);
    area
}

fn modal_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::bordered().title(title).border_style(Style::default().fg(theme.border_active))
}

fn checkbox(on: bool) -> &'static str {
    if on { "[x]" } else { "[ ]" }
}

fn radio(on: bool) -> &'static str {
    if on { "(•)" } else { "( )" }
}

/// One dialog row: a focus marker, the label, and the value spans.
fn field_line<'a>(active: bool, label: &'a str, value: Vec<Span<'a>>, theme: &Theme) -> Line<'a> {
    let (marker, style) = if active {
        ("› ", Style::default().fg(theme.field_active).add_modifier(Modifier::BOLD))
    } else {
        ("  ", Style::default())
    };
    let mut spans = vec![Span::styled(marker, style), Span::styled(format!("{label:<14}"), style)];
    spans.extend(value);
    Line::from(spans)
}

fn hint(text: &str, theme: &Theme) -> Line<'static> {
    Line::styled(text.to_owned(), Style::default().fg(theme.muted))
}

pub fn render_filter_dialog(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let dialog = &state.filter;
    let form = &dialog.form;
    let side = form.language.unwrap_or_default();
    let at = |f: FilterField| dialog.field == f;

    let text_value = if at(FilterField::Text) {
        format!("{}▏", form.text)
    } else {
        form.text.clone()
    };
    let lines = vec![
        field_line(at(FilterField::Text), "Text", vec![Span::raw(text_value)], theme),
        field_line(
            at(FilterField::Language),
            "Language",
            vec![Span::raw(format!(
                "{} Source  {} Target",
                radio(side == LanguageSide::Source),
                radio(side == LanguageSide::Target)
            ))],
            theme,
        ),
        field_line(
            at(FilterField::CaseSensitive),
            "Match case",
            vec![Span::raw(checkbox(form.case_sensitive))],
            theme,
        ),
        field_line(at(FilterField::Regex), "Regex", vec![Span::raw(checkbox(form.regex))], theme),
        Line::raw(""),
        field_line(
            at(FilterField::Untranslated),
            "Untranslated",
            vec![Span::raw(checkbox(form.show_untranslated))],
            theme,
        ),
        field_line(
            at(FilterField::Translated),
            "Translated",
            vec![Span::raw(checkbox(form.show_translated))],
            theme,
        ),
        field_line(
            at(FilterField::Confirmed),
            "Confirmed",
            vec![Span::raw(checkbox(form.show_confirmed))],
            theme,
        ),
        Line::raw(""),
        hint("Enter apply · Ctrl-l clear · Esc cancel · Space toggle", theme),
    ];

    let area = modal_area(frame, 60, lines.len() as u16 + 2);
    frame.render_widget(Paragraph::new(lines).block(modal_block(" Filter ", theme)), area);
}

pub fn render_sort_dialog(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let dialog = &state.sort;
    let form = &dialog.form;
    let at = |f: SortField| dialog.field == f;
    let by_language = form.mode == SortMode::Language;
    let side = form.language.unwrap_or_default();

    let language_spans = if form.language_enabled() {
        vec![Span::raw(format!(
            "{} Source  {} Target",
            radio(side == LanguageSide::Source),
            radio(side == LanguageSide::Target)
        ))]
    } else {
        vec![Span::styled("(disabled for status sort)", Style::default().fg(theme.muted))]
    };
    let lines = vec![
        field_line(
            at(SortField::Mode),
            "Sort by",
            vec![Span::raw(format!("{} Text  {} Status", radio(by_language), radio(!by_language)))],
            theme,
        ),
        field_line(at(SortField::Language), "Language", language_spans, theme),
        field_line(
            at(SortField::Descending),
            "Descending",
            vec![Span::raw(checkbox(form.descending))],
            theme,
        ),
        Line::raw(""),
        hint("Enter apply · Ctrl-l clear · Esc cancel · Space toggle", theme),
    ];

    let area = modal_area(frame, 60, lines.len() as u16 + 2);
    frame.render_widget(Paragraph::new(lines).block(modal_block(" Sort ", theme)), area);
}

pub fn render_goto_dialog(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let value = state.goto.value();
    let cursor = state.goto.cursor();
    let (before, after) = value.split_at(cursor.min(value.len()));
    let lines = vec![
        Line::from(vec![
            Span::raw("Segment: "),
            Span::styled(before.to_owned(), Style::default().fg(theme.field_active)),
            Span::styled("▏", Style::default().fg(theme.field_active)),
            Span::styled(after.to_owned(), Style::default().fg(theme.field_active)),
        ]),
        Line::raw(""),
        hint("Digits only · Enter go · Esc cancel", theme),
    ];
    let area = modal_area(frame, 40, lines.len() as u16 + 2);
    frame.render_widget(Paragraph::new(lines).block(modal_block(" Go To ", theme)), area);
}

pub fn render_meta_dialog(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let Some(dialog) = state.meta.as_mut() else {
        return;
    };
    let area = modal_area(frame, 64, 16);
    let title = match &dialog.form.mode {
        MetaMode::Create => format!(" Metadata · segment {} · new ", dialog.form.segment),
        MetaMode::Edit(_) => format!(" Metadata · segment {} · editing ", dialog.form.segment),
    };
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(theme.border_active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [form_area, list_area, hint_area] = inner.layout(&ratatui::layout::Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]));

    let cursor = |on: bool| if on { "▏" } else { "" };
    let at = |f: MetaField| dialog.field == f;
    let form_lines = vec![
        field_line(
            at(MetaField::Type),
            "Type",
            vec![Span::raw(format!("{}{}", dialog.form.kind, cursor(at(MetaField::Type))))],
            theme,
        ),
        field_line(
            at(MetaField::Value),
            "Value",
            vec![Span::raw(format!("{}{}", dialog.form.value, cursor(at(MetaField::Value))))],
            theme,
        ),
        field_line(
            at(MetaField::Entries),
            "Entries",
            vec![Span::raw(dialog.entries.len().to_string())],
            theme,
        ),
    ];
    frame.render_widget(Paragraph::new(form_lines), form_area);

    let items: Vec<ListItem> = if dialog.entries.is_empty() {
        vec![ListItem::new(Line::styled("No metadata", Style::default().fg(theme.muted)))]
    } else {
        dialog
            .entries
            .iter()
            .map(|m| ListItem::new(format!("{} = {}", m.entry.kind, m.entry.value)))
            .collect()
    };
    let list_focused = at(MetaField::Entries);
    let list = List::new(items)
        .block(Block::bordered().border_style(Style::default().fg(if list_focused {
            theme.border_active
        } else {
            theme.border_inactive
        })))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut dialog.list);

    frame.render_widget(
        Paragraph::new(hint("Enter save/edit · Tab field · Ctrl-n new · Esc close", theme)),
        hint_area,
    );
}

pub fn render_notice(frame: &mut Frame, notice: &Notice, pending: usize, theme: &Theme) {
    let label = match notice.severity {
        Severity::Info => "Info",
        Severity::Warning => "Warning",
        Severity::Error => "Error",
    };
    let color = theme.severity_color(notice.severity);
    let title = format!(" {label} · {} ", notice.origin);
    let mut lines = vec![Line::raw(notice.message.clone()), Line::raw("")];
    let more = if pending > 1 { format!(" ({} more)", pending - 1) } else { String::new() };
    lines.push(hint(&format!("Enter to dismiss{more}"), theme));

    let width = (notice.message.chars().count() as u16 + 6).clamp(30, 70);
    let area = modal_area(frame, width, 6);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .title(Span::styled(
                        title,
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ))
                    .border_style(Style::default().fg(color)),
            ),
        area,
    );
}
