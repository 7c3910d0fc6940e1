//! Central application state for segrev.
//!
//! This module owns all mutable UI state: the current mode, which panel has focus, the
//! segment view, both error review controllers, the open dialog's form, and the notice
//! queue. No ratatui rendering logic lives here; `app.rs` is read by the render module and
//! mutated by the keybinding dispatcher and by engine replies.
//!
//! Every request leaves through [`AppState::send`], which stamps it with a fresh
//! [`RequestId`] and the explicit [`EngineContext`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use ratatui::layout::Rect;
use ratatui::widgets::{ListState, TableState};
use segrev_core::error::{Notice, ValidationError};
use segrev_core::filter::{FilterForm, FilterSpec};
use segrev_core::meta::MetaForm;
use segrev_core::navigation::GoToInput;
use segrev_core::protocol::{
    EngineContext, EngineRequest, EngineResponse, Envelope, Reply, RequestCounter, RequestId,
};
use segrev_core::review::{ErrorReview, Outbound, ReplyOutcome};
use segrev_core::sort::{SortForm, SortSpec};
use segrev_core::types::{ErrorClass, Segment, StoredMeta};

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    HelpOverlay,
    Filter,
    Sort,
    GoTo,
    Meta,
}

/// Which panel currently has keyboard focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    #[default]
    Segments,
    TagErrors,
    SpaceErrors,
}

impl PanelFocus {
    const ORDER: [PanelFocus; 3] =
        [PanelFocus::Segments, PanelFocus::TagErrors, PanelFocus::SpaceErrors];

    pub fn class(self) -> Option<ErrorClass> {
        match self {
            PanelFocus::Segments => None,
            PanelFocus::TagErrors => Some(ErrorClass::Tags),
            PanelFocus::SpaceErrors => Some(ErrorClass::Spaces),
        }
    }

    pub fn of(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Tags => PanelFocus::TagErrors,
            ErrorClass::Spaces => PanelFocus::SpaceErrors,
        }
    }
}

/// Fields of the filter dialog, in tab order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    #[default]
    Text,
    Language,
    CaseSensitive,
    Regex,
    Untranslated,
    Translated,
    Confirmed,
}

impl FilterField {
    const ORDER: [FilterField; 7] = [
        FilterField::Text,
        FilterField::Language,
        FilterField::CaseSensitive,
        FilterField::Regex,
        FilterField::Untranslated,
        FilterField::Translated,
        FilterField::Confirmed,
    ];

    pub fn next(self) -> Self {
        cycle(&Self::ORDER, self, true)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ORDER, self, false)
    }
}

/// Fields of the sort dialog, in tab order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Mode,
    Language,
    Descending,
}

/// Fields of the metadata dialog, in tab order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    #[default]
    Type,
    Value,
    Entries,
}

impl MetaField {
    pub fn next(self) -> Self {
        cycle(&[MetaField::Type, MetaField::Value, MetaField::Entries], self, true)
    }

    pub fn prev(self) -> Self {
        cycle(&[MetaField::Type, MetaField::Value, MetaField::Entries], self, false)
    }
}

fn cycle<T: Copy + PartialEq>(order: &[T], current: T, forward: bool) -> T {
    let pos = order.iter().position(|f| *f == current).unwrap_or(0);
    let len = order.len();
    let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
    order[next]
}

#[derive(Debug, Clone, Default)]
pub struct FilterDialog {
    pub form: FilterForm,
    pub field: FilterField,
}

#[derive(Debug, Clone, Default)]
pub struct SortDialog {
    pub form: SortForm,
    pub field: SortField,
}

impl SortDialog {
    /// Moves to the next field, skipping the language choice while it is disabled.
    pub fn step(&mut self, forward: bool) {
        let order = [SortField::Mode, SortField::Language, SortField::Descending];
        self.field = cycle(&order, self.field, forward);
        if self.field == SortField::Language && !self.form.language_enabled() {
            self.field = cycle(&order, self.field, forward);
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetaDialog {
    pub form: MetaForm,
    pub field: MetaField,
    pub entries: Vec<StoredMeta>,
    pub list: ListState,
}

impl MetaDialog {
    pub fn new(segment: u32) -> Self {
        Self {
            form: MetaForm::create(segment),
            field: MetaField::Type,
            entries: Vec::new(),
            list: ListState::default(),
        }
    }
}

/// Screen areas of the panels from the last frame, for mouse hit testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelRects {
    pub segments: Rect,
    pub tags: Rect,
    pub spaces: Rect,
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    context: EngineContext,
    ids: RequestCounter,
    engine_tx: Sender<Envelope>,
    /// Set once the engine thread reports it has stopped.
    pub engine_down: bool,

    // Segment list
    pub segments: Vec<Segment>,
    pub total_segments: usize,
    pub segment_list: ListState,
    /// Segment the engine last asked the viewport to show.
    pub focused_segment: Option<u32>,
    segments_applied: Option<RequestId>,
    pub segments_loading: bool,

    // Active view options; dialogs are re-populated from these.
    pub filter_spec: FilterSpec,
    pub sort_spec: SortSpec,

    // Error review
    pub tags: ErrorReview,
    pub spaces: ErrorReview,
    pub tag_table: TableState,
    pub space_table: TableState,
    last_click: Option<(ErrorClass, u32, Instant)>,
    double_click: Duration,

    // Dialogs
    pub filter: FilterDialog,
    pub sort: SortDialog,
    pub goto: GoToInput,
    pub meta: Option<MetaDialog>,

    /// Pending user notices; the front one is shown as a modal.
    pub notices: VecDeque<Notice>,
    pub help_scroll: u16,
    pub panel_rects: PanelRects,
}

impl AppState {
    pub fn new(
        context: EngineContext,
        engine_tx: Sender<Envelope>,
        stall_after: Duration,
        double_click: Duration,
    ) -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            context,
            ids: RequestCounter::new(),
            engine_tx,
            engine_down: false,
            segments: Vec::new(),
            total_segments: 0,
            segment_list: ListState::default(),
            focused_segment: None,
            segments_applied: None,
            segments_loading: false,
            filter_spec: FilterSpec::cleared(),
            sort_spec: SortSpec::cleared(),
            tags: ErrorReview::new(ErrorClass::Tags, stall_after),
            spaces: ErrorReview::new(ErrorClass::Spaces, stall_after),
            tag_table: TableState::default(),
            space_table: TableState::default(),
            last_click: None,
            double_click,
            filter: FilterDialog::default(),
            sort: SortDialog::default(),
            goto: GoToInput::new(),
            meta: None,
            notices: VecDeque::new(),
            help_scroll: 0,
            panel_rects: PanelRects::default(),
        }
    }

    pub fn project(&self) -> &str {
        &self.context.project
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Stamps `request` with a fresh id and the engine context and sends it.
    pub fn send(&mut self, request: EngineRequest) -> RequestId {
        let id = self.ids.next_id();
        self.dispatch(Outbound { id, request });
        id
    }

    fn dispatch(&mut self, outbound: Outbound) {
        let Outbound { id, request } = outbound;
        if matches!(
            request,
            EngineRequest::GetSegments
                | EngineRequest::FilterOptions(_)
                | EngineRequest::SortOptions(_)
        ) {
            self.segments_loading = true;
        }
        tracing::debug!(request = %id, topic = request.topic(), "sending");
        let envelope = Envelope { id, context: self.context.clone(), request };
        if self.engine_tx.send(envelope).is_err() && !self.engine_down {
            self.engine_down = true;
            self.notify(Notice::error("Engine", "The engine is not running"));
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        tracing::info!(
            origin = notice.origin,
            severity = ?notice.severity,
            message = %notice.message,
            "notice"
        );
        self.notices.push_back(notice);
    }

    pub fn warn(&mut self, error: ValidationError, origin: &'static str) {
        tracing::warn!(origin, %error, "input rejected");
        self.notify(error.notice(origin));
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    // -----------------------------------------------------------------------
    // Segment list
    // -----------------------------------------------------------------------

    pub fn highlighted_segment(&self) -> Option<&Segment> {
        self.segment_list.selected().and_then(|i| self.segments.get(i))
    }

    pub fn move_cursor(&mut self, down: bool, lines: u16) {
        match self.focus {
            PanelFocus::Segments => {
                if down {
                    self.segment_list.scroll_down_by(lines);
                } else {
                    self.segment_list.scroll_up_by(lines);
                }
            }
            PanelFocus::TagErrors | PanelFocus::SpaceErrors => {
                let table = match self.focus {
                    PanelFocus::TagErrors => &mut self.tag_table,
                    _ => &mut self.space_table,
                };
                if down {
                    table.scroll_down_by(lines);
                } else {
                    table.scroll_up_by(lines);
                }
            }
        }
    }

    fn place_cursor_on(&mut self, segment: u32) -> bool {
        match self.segments.iter().position(|s| s.index == segment) {
            Some(pos) => {
                self.segment_list.select(Some(pos));
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Error panels
    // -----------------------------------------------------------------------

    pub fn review(&self, class: ErrorClass) -> &ErrorReview {
        match class {
            ErrorClass::Tags => &self.tags,
            ErrorClass::Spaces => &self.spaces,
        }
    }

    fn review_mut(&mut self, class: ErrorClass) -> &mut ErrorReview {
        match class {
            ErrorClass::Tags => &mut self.tags,
            ErrorClass::Spaces => &mut self.spaces,
        }
    }

    pub fn table_mut(&mut self, class: ErrorClass) -> &mut TableState {
        match class {
            ErrorClass::Tags => &mut self.tag_table,
            ErrorClass::Spaces => &mut self.space_table,
        }
    }

    /// Opens a closed error panel (fetching its rows) or closes an open one.
    pub fn toggle_panel(&mut self, class: ErrorClass, now: Instant) {
        if self.review(class).is_open() {
            self.review_mut(class).close();
            *self.table_mut(class) = TableState::default();
            if self.focus == PanelFocus::of(class) {
                self.focus = PanelFocus::Segments;
            }
        } else {
            self.refresh_panel(class, now);
            self.focus = PanelFocus::of(class);
        }
    }

    pub fn refresh_panel(&mut self, class: ErrorClass, now: Instant) {
        let outbound = {
            let ids = &mut self.ids;
            match class {
                ErrorClass::Tags => self.tags.refresh(ids, now),
                ErrorClass::Spaces => self.spaces.refresh(ids, now),
            }
        };
        *self.table_mut(class) = TableState::default();
        self.dispatch(outbound);
    }

    /// Cycles keyboard focus across the open panels.
    pub fn cycle_focus(&mut self, forward: bool) {
        let mut next = self.focus;
        for _ in 0..PanelFocus::ORDER.len() {
            next = cycle(&PanelFocus::ORDER, next, forward);
            let open = next.class().is_none_or(|class| self.review(class).is_open());
            if open {
                break;
            }
        }
        self.focus = next;
    }

    /// Error row under the keyboard cursor of `class`'s table.
    pub fn cursor_row(&self, class: ErrorClass) -> Option<u32> {
        let table = match class {
            ErrorClass::Tags => &self.tag_table,
            ErrorClass::Spaces => &self.space_table,
        };
        table.selected().and_then(|i| self.review(class).rows().get(i)).map(|r| r.index)
    }

    /// A click on an error row. A second click on the same row within the double-click
    /// window navigates instead of toggling again.
    pub fn click_error_row(&mut self, class: ErrorClass, row: u32, now: Instant) {
        let is_double = matches!(
            self.last_click,
            Some((c, r, at))
                if c == class && r == row && now.saturating_duration_since(at) <= self.double_click
        );
        if is_double {
            // The second click of a pair only navigates.
            self.last_click = None;
            if let Some(request) = self.review(class).double_click(row) {
                self.send(request);
            }
        } else {
            self.last_click = Some((class, row, now));
            self.review_mut(class).click(row);
        }
    }

    /// The "go to" action of an error panel.
    pub fn go_to_selected(&mut self, class: ErrorClass) {
        match self.review(class).go_to() {
            Ok(request) => {
                self.send(request);
            }
            Err(e) => self.warn(e, class.title()),
        }
    }

    pub fn fix_all(&mut self, class: ErrorClass, now: Instant) {
        let outbound = {
            let ids = &mut self.ids;
            match class {
                ErrorClass::Tags => self.tags.fix_all(ids, now),
                ErrorClass::Spaces => self.spaces.fix_all(ids, now),
            }
        };
        match outbound {
            Some(requests) => {
                *self.table_mut(class) = TableState::default();
                for outbound in requests {
                    self.dispatch(outbound);
                }
            }
            None => tracing::debug!(?class, "fix-all ignored in current phase"),
        }
    }

    /// Logic tick: flags long-outstanding fetches.
    pub fn tick(&mut self, now: Instant) {
        self.tags.tick(now);
        self.spaces.tick(now);
    }

    // -----------------------------------------------------------------------
    // Dialogs
    // -----------------------------------------------------------------------

    pub fn open_filter(&mut self) {
        self.filter = FilterDialog {
            form: FilterForm::from_spec(&self.filter_spec),
            field: FilterField::Text,
        };
        self.mode = Mode::Filter;
    }

    /// Apply button: validates, sends exactly one `filter-options`, closes the dialog.
    pub fn apply_filter(&mut self) {
        match self.filter.form.apply() {
            Ok(request) => {
                if let EngineRequest::FilterOptions(spec) = &request {
                    self.filter_spec = spec.clone();
                }
                self.send(request);
                self.mode = Mode::Normal;
            }
            Err(e) => self.warn(e, "Filter"),
        }
    }

    pub fn clear_filter(&mut self) {
        let request = self.filter.form.clear();
        self.filter_spec = FilterSpec::cleared();
        self.send(request);
        self.mode = Mode::Normal;
    }

    pub fn open_sort(&mut self) {
        self.sort = SortDialog {
            form: SortForm::from_spec(&self.sort_spec),
            field: SortField::Mode,
        };
        self.mode = Mode::Sort;
    }

    pub fn apply_sort(&mut self) {
        let request = self.sort.form.apply();
        if let EngineRequest::SortOptions(spec) = &request {
            self.sort_spec = *spec;
        }
        self.send(request);
        self.mode = Mode::Normal;
    }

    pub fn clear_sort(&mut self) {
        let request = self.sort.form.clear();
        self.sort_spec = SortSpec::cleared();
        self.send(request);
        self.mode = Mode::Normal;
    }

    pub fn open_goto(&mut self) {
        self.goto = GoToInput::new();
        self.mode = Mode::GoTo;
    }

    /// Opens the metadata dialog for the highlighted segment and requests its entries.
    pub fn open_meta(&mut self) {
        let Some(segment) = self.highlighted_segment().map(|s| s.index) else {
            self.warn(ValidationError::NoSelection, "Metadata");
            return;
        };
        self.meta = Some(MetaDialog::new(segment));
        self.mode = Mode::Meta;
        self.send(EngineRequest::GetMeta { segment });
    }

    pub fn submit_meta(&mut self) {
        let Some(dialog) = &self.meta else { return };
        match dialog.form.submit() {
            Ok(request) => {
                self.send(request);
            }
            Err(e) => self.warn(e, "Metadata"),
        }
    }

    /// Switches the metadata form to edit the entry under the list cursor.
    pub fn edit_meta_entry(&mut self) {
        if let Some(dialog) = &mut self.meta {
            if let Some(stored) = dialog.list.selected().and_then(|i| dialog.entries.get(i)) {
                dialog.form = MetaForm::edit(stored);
                dialog.field = MetaField::Type;
            }
        }
    }

    pub fn new_meta_entry(&mut self) {
        if let Some(dialog) = &mut self.meta {
            dialog.form = MetaForm::create(dialog.form.segment);
            dialog.field = MetaField::Type;
        }
    }

    pub fn close_dialog(&mut self) {
        if self.mode == Mode::Meta {
            self.meta = None;
        }
        self.mode = Mode::Normal;
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Applies one engine reply.
    pub fn apply_reply(&mut self, reply: Reply) {
        let Reply { request, response } = reply;
        match response {
            EngineResponse::Segments { segments, total } => {
                // Out-of-band renders: an older render never overwrites a newer one.
                if self.segments_applied.is_some_and(|applied| applied > request) {
                    tracing::warn!(%request, "discarding stale segment render");
                    return;
                }
                self.segments_applied = Some(request);
                self.segments_loading = false;
                let keep = self.highlighted_segment().map(|s| s.index).or(self.focused_segment);
                self.segments = segments;
                self.total_segments = total;
                let placed = keep.is_some_and(|index| self.place_cursor_on(index));
                if !placed {
                    self.segment_list.select(if self.segments.is_empty() { None } else { Some(0) });
                }
            }
            EngineResponse::Focus { segment } => {
                self.focused_segment = Some(segment);
                if !self.place_cursor_on(segment) {
                    self.notify(Notice::info(
                        "Go To",
                        format!("Segment {segment} is hidden by the current filter"),
                    ));
                }
            }
            EngineResponse::TagErrors { errors } => {
                self.apply_errors(ErrorClass::Tags, request, errors)
            }
            EngineResponse::SpaceErrors { errors } => {
                self.apply_errors(ErrorClass::Spaces, request, errors)
            }
            EngineResponse::Meta { segment, entries } => {
                if let Some(dialog) = self.meta.as_mut().filter(|d| d.form.segment == segment) {
                    dialog.entries = entries;
                    let selected = dialog.list.selected().filter(|i| *i < dialog.entries.len());
                    dialog.list.select(selected.or((!dialog.entries.is_empty()).then_some(0)));
                }
            }
            EngineResponse::MetaSaved { stored } => {
                tracing::info!(id = %stored.id, segment = stored.segment, "metadata saved");
                let editing = self.meta.as_mut().filter(|d| d.form.segment == stored.segment);
                if let Some(dialog) = editing {
                    dialog.form = MetaForm::create(stored.segment);
                    dialog.field = MetaField::Type;
                }
            }
            EngineResponse::SpacesFixed { changed } => {
                self.notify(Notice::info(
                    ErrorClass::Spaces.title(),
                    format!("Fixed {changed} segment(s)"),
                ));
            }
            EngineResponse::Failed { topic, message } => {
                self.apply_failure(request, topic, &message)
            }
        }
    }

    fn apply_errors(
        &mut self,
        class: ErrorClass,
        request: RequestId,
        errors: Vec<segrev_core::types::ErrorRow>,
    ) {
        match self.review_mut(class).receive(request, errors) {
            ReplyOutcome::Stale => {}
            ReplyOutcome::Rows(_) => self.table_mut(class).select(Some(0)),
            ReplyOutcome::Empty(notice) => {
                *self.table_mut(class) = TableState::default();
                self.notify(notice);
            }
        }
    }

    fn apply_failure(&mut self, request: RequestId, topic: &'static str, message: &str) {
        let class = match topic {
            "get-tagsErrors" => Some(ErrorClass::Tags),
            "get-spaceErrors" => Some(ErrorClass::Spaces),
            _ => None,
        };
        if let Some(class) = class {
            if let Some(notice) = self.review_mut(class).receive_failure(request, message) {
                self.notify(notice);
            }
            return;
        }
        if matches!(topic, "get-segments" | "filter-options" | "sort-options") {
            self.segments_loading = false;
        }
        self.notify(Notice::error(origin_for_topic(topic), message));
    }
}

/// Panel a failed request is reported under.
fn origin_for_topic(topic: &str) -> &'static str {
    match topic {
        "filter-options" => "Filter",
        "sort-options" => "Sort",
        "go-to-segment" => "Go To",
        "get-meta" | "add-meta" | "edit-meta" => "Metadata",
        "fix-spaceErrors" => "Space Errors",
        "get-segments" => "Segments",
        _ => "Engine",
    }
}
