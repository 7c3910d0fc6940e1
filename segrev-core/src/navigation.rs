//! "Go to segment N" input.
//!
//! Filtering happens per keystroke: a non-digit never reaches the buffer, so the submitted
//! value is always a (possibly empty) run of ASCII digits. Bounds are the engine's job.

use crate::error::ValidationError;
use crate::protocol::EngineRequest;

/// Keys the navigation input understands. Anything else is the caller's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Enter,
    Escape,
}

/// Result of feeding one key to [`GoToInput::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoToOutcome {
    /// Buffer or cursor changed (or the edit was a no-op at a boundary).
    Editing,
    /// Character refused at input time; buffer unchanged.
    Rejected(char),
    /// Submit failed validation; the input keeps focus.
    Invalid(ValidationError),
    /// Emit this request and close the dialog.
    Submit(EngineRequest),
    /// Close the dialog without emitting anything.
    Cancel,
}

/// Digit-only text field with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoToInput {
    digits: String,
    cursor: usize,
}

impl GoToInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored digits.
    pub fn value(&self) -> &str {
        &self.digits
    }

    /// Cursor position (0..=len). Digits are ASCII, so this is both a char and byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle(&mut self, key: NavKey) -> GoToOutcome {
        match key {
            NavKey::Char(c) if c.is_ascii_digit() => {
                self.digits.insert(self.cursor, c);
                self.cursor += 1;
                GoToOutcome::Editing
            }
            NavKey::Char(c) => {
                tracing::debug!(rejected = %c, "go-to input refused non-digit");
                GoToOutcome::Rejected(c)
            }
            NavKey::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.digits.remove(self.cursor);
                }
                GoToOutcome::Editing
            }
            NavKey::Delete => {
                if self.cursor < self.digits.len() {
                    self.digits.remove(self.cursor);
                }
                GoToOutcome::Editing
            }
            NavKey::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                GoToOutcome::Editing
            }
            NavKey::Right => {
                self.cursor = (self.cursor + 1).min(self.digits.len());
                GoToOutcome::Editing
            }
            NavKey::Home => {
                self.cursor = 0;
                GoToOutcome::Editing
            }
            NavKey::End => {
                self.cursor = self.digits.len();
                GoToOutcome::Editing
            }
            NavKey::Enter => match self.request() {
                Ok(request) => GoToOutcome::Submit(request),
                Err(e) => GoToOutcome::Invalid(e),
            },
            NavKey::Escape => GoToOutcome::Cancel,
        }
    }

    /// Parses the buffer as a base-10 segment number.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptySegmentNumber`] for an empty buffer,
    /// [`ValidationError::InvalidSegmentNumber`] when the digits overflow `u32`.
    pub fn submit(&self) -> Result<u32, ValidationError> {
        if self.digits.is_empty() {
            return Err(ValidationError::EmptySegmentNumber);
        }
        self.digits.parse::<u32>().map_err(|_| ValidationError::InvalidSegmentNumber)
    }

    pub fn request(&self) -> Result<EngineRequest, ValidationError> {
        self.submit().map(|segment| EngineRequest::GoToSegment { segment })
    }
}
