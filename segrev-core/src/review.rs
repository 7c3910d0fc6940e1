//! Error review controller: one instance per error class.
//!
//! Lifecycle: `Idle` (panel closed) → `Loading` on open/refresh → `Displaying` when the
//! matching reply arrives. Rows and selection are cleared on every transition into
//! `Loading` and replaced wholesale on every accepted reply. A reply is accepted only if
//! its request id is the one currently outstanding; anything else is a late answer to a
//! superseded refresh (or to a closed panel) and is dropped.
//!
//! There is no timeout that aborts a request. A `Loading` state older than `stall_after`
//! is flagged as stalled so the panel can show a "still working" hint; the user may refresh
//! again, which supersedes the outstanding request.

use std::time::{Duration, Instant};

use crate::error::{Notice, ValidationError};
use crate::protocol::{EngineRequest, RequestCounter, RequestId};
use crate::selection::Selection;
use crate::types::{ErrorClass, ErrorRow};

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    /// Panel closed; replies are ignored.
    Idle,
    /// Waiting for the reply to `request`.
    Loading { request: RequestId, since: Instant, stalled: bool },
    /// Rows are shown (possibly none).
    Displaying,
}

/// A request the owner must send, already bound to its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub id: RequestId,
    pub request: EngineRequest,
}

/// What an incoming error list did to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Not the outstanding request; nothing changed.
    Stale,
    /// Rows replaced; the count is the new row total.
    Rows(usize),
    /// Rows cleared; show this informational notice.
    Empty(Notice),
}

#[derive(Debug, Clone)]
pub struct ErrorReview {
    class: ErrorClass,
    phase: ReviewPhase,
    rows: Vec<ErrorRow>,
    selection: Selection,
    stall_after: Duration,
}

impl ErrorReview {
    pub fn new(class: ErrorClass, stall_after: Duration) -> Self {
        Self {
            class,
            phase: ReviewPhase::Idle,
            rows: Vec::new(),
            selection: Selection::new(),
            stall_after,
        }
    }

    pub fn class(&self) -> ErrorClass {
        self.class
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    /// Rows in the order the engine sent them.
    pub fn rows(&self) -> &[ErrorRow] {
        &self.rows
    }

    pub fn selected(&self) -> Option<u32> {
        self.selection.selected()
    }

    pub fn is_open(&self) -> bool {
        self.phase != ReviewPhase::Idle
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, ReviewPhase::Loading { .. })
    }

    pub fn is_stalled(&self) -> bool {
        matches!(self.phase, ReviewPhase::Loading { stalled: true, .. })
    }

    fn fetch_request(&self) -> EngineRequest {
        match self.class {
            ErrorClass::Tags => EngineRequest::GetTagErrors,
            ErrorClass::Spaces => EngineRequest::GetSpaceErrors,
        }
    }

    /// Opens the panel (or refreshes it if already open) and returns the fetch to send.
    pub fn refresh(&mut self, ids: &mut RequestCounter, now: Instant) -> Outbound {
        let id = ids.next_id();
        if let ReviewPhase::Loading { request, .. } = self.phase {
            tracing::debug!(
                class = ?self.class,
                superseded = %request,
                by = %id,
                "refresh supersedes outstanding fetch"
            );
        }
        self.rows.clear();
        self.selection.reset();
        self.phase = ReviewPhase::Loading { request: id, since: now, stalled: false };
        Outbound { id, request: self.fetch_request() }
    }

    /// Closes the panel. Any in-flight reply will be treated as stale.
    pub fn close(&mut self) {
        self.phase = ReviewPhase::Idle;
        self.rows.clear();
        self.selection.reset();
    }

    fn is_outstanding(&self, request: RequestId) -> bool {
        matches!(
            self.phase,
            ReviewPhase::Loading { request: outstanding, .. } if outstanding == request
        )
    }

    /// Applies an error list reply.
    pub fn receive(&mut self, request: RequestId, errors: Vec<ErrorRow>) -> ReplyOutcome {
        if !self.is_outstanding(request) {
            tracing::warn!(class = ?self.class, %request, "discarding stale error list");
            return ReplyOutcome::Stale;
        }
        self.rows = errors;
        self.selection.reset();
        self.phase = ReviewPhase::Displaying;
        if self.rows.is_empty() {
            ReplyOutcome::Empty(Notice::info(self.class.title(), self.class.empty_notice()))
        } else {
            ReplyOutcome::Rows(self.rows.len())
        }
    }

    /// Applies an engine failure for a fetch. Returns the notice to show, or `None` when the
    /// failure belongs to a superseded request.
    pub fn receive_failure(&mut self, request: RequestId, message: &str) -> Option<Notice> {
        if !self.is_outstanding(request) {
            return None;
        }
        self.phase = ReviewPhase::Displaying;
        Some(Notice::error(self.class.title(), message))
    }

    fn contains(&self, row: u32) -> bool {
        self.rows.iter().any(|r| r.index == row)
    }

    /// Single click on `row`. Returns `false` if the row is not in the current set.
    pub fn click(&mut self, row: u32) -> bool {
        if self.phase != ReviewPhase::Displaying || !self.contains(row) {
            return false;
        }
        self.selection.click(row);
        true
    }

    /// Double click navigates directly, leaving the selection untouched.
    pub fn double_click(&self, row: u32) -> Option<EngineRequest> {
        (self.phase == ReviewPhase::Displaying && self.contains(row))
            .then_some(EngineRequest::GoToSegment { segment: row })
    }

    /// The "go to" button.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoSelection`] when no row is selected.
    pub fn go_to(&self) -> Result<EngineRequest, ValidationError> {
        self.selection
            .selected()
            .map(|segment| EngineRequest::GoToSegment { segment })
            .ok_or(ValidationError::NoSelection)
    }

    /// Bulk fix followed by an implicit refresh, in that order.
    ///
    /// Returns `None` when the class has no bulk fix, the panel is closed, or a fetch is
    /// already outstanding. Rows are never patched locally.
    pub fn fix_all(&mut self, ids: &mut RequestCounter, now: Instant) -> Option<Vec<Outbound>> {
        if !self.class.supports_fix_all() || self.phase != ReviewPhase::Displaying {
            return None;
        }
        let fix = Outbound { id: ids.next_id(), request: EngineRequest::FixSpaceErrors };
        let refresh = self.refresh(ids, now);
        Some(vec![fix, refresh])
    }

    /// Marks a long-running fetch as stalled. Returns `true` on the tick that flips it.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let ReviewPhase::Loading { request, since, stalled: false } = self.phase {
            if now.saturating_duration_since(since) >= self.stall_after {
                tracing::warn!(class = ?self.class, %request, "error fetch still outstanding");
                self.phase = ReviewPhase::Loading { request, since, stalled: true };
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;

    fn loaded(class: ErrorClass, rows: Vec<ErrorRow>) -> (ErrorReview, RequestCounter) {
        let mut ids = RequestCounter::new();
        let mut review = ErrorReview::new(class, Duration::from_secs(5));
        let out = review.refresh(&mut ids, Instant::now());
        review.receive(out.id, rows);
        (review, ids)
    }

    #[test]
    fn open_emits_class_specific_fetch() {
        let mut ids = RequestCounter::new();
        let mut tags = ErrorReview::new(ErrorClass::Tags, Duration::from_secs(5));
        let mut spaces = ErrorReview::new(ErrorClass::Spaces, Duration::from_secs(5));
        assert!(!tags.is_open());
        assert_eq!(tags.refresh(&mut ids, Instant::now()).request, EngineRequest::GetTagErrors);
        assert_eq!(spaces.refresh(&mut ids, Instant::now()).request, EngineRequest::GetSpaceErrors);
        assert!(tags.is_loading() && spaces.is_loading());
    }

    #[test]
    fn empty_reply_gives_info_notice_and_clears_table() {
        let mut ids = RequestCounter::new();
        let mut review = ErrorReview::new(ErrorClass::Tags, Duration::from_secs(5));
        let out = review.refresh(&mut ids, Instant::now());
        match review.receive(out.id, Vec::new()) {
            ReplyOutcome::Empty(notice) => {
                assert_eq!(notice.severity, Severity::Info);
                assert_eq!(notice.message, "There are no tag errors");
            }
            other => panic!("expected empty outcome, got {other:?}"),
        }
        assert!(review.rows().is_empty());
        assert_eq!(review.phase(), ReviewPhase::Displaying);
    }

    #[test]
    fn click_then_go_to_navigates_to_selected_row() {
        let (mut review, _) = loaded(
            ErrorClass::Tags,
            vec![ErrorRow::new(5, "X"), ErrorRow::new(9, "Y")],
        );
        assert!(review.click(5));
        assert!(review.click(9));
        assert_eq!(review.selected(), Some(9));
        assert_eq!(review.go_to(), Ok(EngineRequest::GoToSegment { segment: 9 }));
    }

    #[test]
    fn go_to_without_selection_warns() {
        let (review, _) = loaded(ErrorClass::Spaces, vec![ErrorRow::new(2, "Initial space")]);
        let err = review.go_to().unwrap_err();
        assert_eq!(err, ValidationError::NoSelection);
        assert_eq!(err.to_string(), "Select a segment");
    }

    #[test]
    fn double_click_navigates_without_touching_selection() {
        let (mut review, _) = loaded(
            ErrorClass::Tags,
            vec![ErrorRow::new(5, "X"), ErrorRow::new(9, "Y")],
        );
        review.click(5);
        assert_eq!(review.double_click(9), Some(EngineRequest::GoToSegment { segment: 9 }));
        assert_eq!(review.selected(), Some(5));
        assert_eq!(review.double_click(42), None);
    }

    #[test]
    fn clicking_unknown_row_is_ignored() {
        let (mut review, _) = loaded(ErrorClass::Tags, vec![ErrorRow::new(5, "X")]);
        assert!(!review.click(6));
        assert_eq!(review.selected(), None);
    }

    #[test]
    fn rows_keep_engine_order() {
        let (review, _) = loaded(
            ErrorClass::Tags,
            vec![ErrorRow::new(9, "Y"), ErrorRow::new(5, "X"), ErrorRow::new(7, "Z")],
        );
        let order: Vec<u32> = review.rows().iter().map(|r| r.index).collect();
        assert_eq!(order, vec![9, 5, 7]);
    }

    #[test]
    fn stale_reply_is_discarded() {
        let mut ids = RequestCounter::new();
        let mut review = ErrorReview::new(ErrorClass::Tags, Duration::from_secs(5));
        let first = review.refresh(&mut ids, Instant::now());
        let second = review.refresh(&mut ids, Instant::now());
        assert_eq!(review.receive(first.id, vec![ErrorRow::new(1, "old")]), ReplyOutcome::Stale);
        assert!(review.is_loading());
        assert_eq!(review.receive(second.id, vec![ErrorRow::new(2, "new")]), ReplyOutcome::Rows(1));
        assert_eq!(review.rows()[0].index, 2);
        assert_eq!(review.receive(second.id, vec![]), ReplyOutcome::Stale);
    }

    #[test]
    fn replacing_rows_resets_selection() {
        let (mut review, mut ids) = loaded(ErrorClass::Tags, vec![ErrorRow::new(5, "X")]);
        review.click(5);
        let out = review.refresh(&mut ids, Instant::now());
        assert_eq!(review.selected(), None);
        review.receive(out.id, vec![ErrorRow::new(5, "X")]);
        assert_eq!(review.selected(), None);
    }

    #[test]
    fn closed_panel_ignores_late_reply() {
        let mut ids = RequestCounter::new();
        let mut review = ErrorReview::new(ErrorClass::Spaces, Duration::from_secs(5));
        let out = review.refresh(&mut ids, Instant::now());
        review.close();
        assert_eq!(review.receive(out.id, vec![ErrorRow::new(1, "x")]), ReplyOutcome::Stale);
        assert_eq!(review.phase(), ReviewPhase::Idle);
        assert!(review.receive_failure(out.id, "boom").is_none());
    }

    #[test]
    fn fix_all_sends_fix_then_refresh_and_reloads() {
        let rows = vec![ErrorRow::new(3, "Trailing space")];
        let (mut review, mut ids) = loaded(ErrorClass::Spaces, rows);
        let out = review.fix_all(&mut ids, Instant::now()).expect("fix-all available");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].request, EngineRequest::FixSpaceErrors);
        assert_eq!(out[1].request, EngineRequest::GetSpaceErrors);
        assert!(out[0].id < out[1].id);
        assert!(review.is_loading());
        assert!(review.rows().is_empty());
        assert!(review.fix_all(&mut ids, Instant::now()).is_none());
    }

    #[test]
    fn fix_all_unavailable_for_tags() {
        let rows = vec![ErrorRow::new(3, "Missing tags")];
        let (mut review, mut ids) = loaded(ErrorClass::Tags, rows);
        assert!(review.fix_all(&mut ids, Instant::now()).is_none());
        assert_eq!(review.phase(), ReviewPhase::Displaying);
    }

    #[test]
    fn long_fetch_is_flagged_stalled_once() {
        let mut ids = RequestCounter::new();
        let mut review = ErrorReview::new(ErrorClass::Tags, Duration::from_millis(100));
        let start = Instant::now();
        review.refresh(&mut ids, start);
        assert!(!review.tick(start + Duration::from_millis(50)));
        assert!(review.tick(start + Duration::from_millis(150)));
        assert!(review.is_stalled());
        assert!(!review.tick(start + Duration::from_millis(300)));
    }

    #[test]
    fn failure_for_outstanding_fetch_surfaces_error() {
        let mut ids = RequestCounter::new();
        let mut review = ErrorReview::new(ErrorClass::Tags, Duration::from_secs(5));
        let out = review.refresh(&mut ids, Instant::now());
        let notice = review.receive_failure(out.id, "database is locked").expect("notice");
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.origin, "Tag Errors");
        assert_eq!(review.phase(), ReviewPhase::Displaying);
    }
}
