//! Error types and the user-notice channel.
//!
//! [`ValidationError`] covers every local input failure. Its `Display` text is exactly
//! what the user sees, so panels turn it into a warning with [`ValidationError::notice`]
//! and never forward it to the engine. [`StoreError`] is the local engine's error type.

use thiserror::Error;

/// Local input validation failures. Detected before anything is sent; no state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter text to search")]
    EmptyFilterText,

    #[error("Select segments to display")]
    NoStatusSelected,

    #[error("Invalid regular expression: {0}")]
    InvalidPattern(String),

    #[error("Enter segment number")]
    EmptySegmentNumber,

    #[error("Segment number is too large")]
    InvalidSegmentNumber,

    #[error("Select a segment")]
    NoSelection,

    #[error("Enter type")]
    MissingMetaType,

    #[error("Invalid type")]
    InvalidMetaType,

    #[error("Enter value")]
    MissingMetaValue,
}

impl ValidationError {
    /// Wraps the failure as a warning attributed to `origin`.
    pub fn notice(&self, origin: &'static str) -> Notice {
        Notice::warning(origin, self.to_string())
    }
}

/// Local engine failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database task error: {0}")]
    DatabaseTask(#[from] tokio_rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document parse error: {0}")]
    Document(#[from] toml::de::Error),

    #[error("Segment {0} does not exist")]
    SegmentNotFound(u32),

    #[error("Metadata entry not found: {0}")]
    MetaNotFound(String),
}

/// Severity of a user notice. `Info` is never used for failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A modal message for the user, tagged with the panel it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub origin: &'static str,
    pub message: String,
}

impl Notice {
    pub fn info(origin: &'static str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, origin, message: message.into() }
    }

    pub fn warning(origin: &'static str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, origin, message: message.into() }
    }

    pub fn error(origin: &'static str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, origin, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_notice_is_a_warning_with_display_text() {
        let notice = ValidationError::EmptyFilterText.notice("Filter");
        assert_eq!(notice.severity, Severity::Warning);
        assert_eq!(notice.origin, "Filter");
        assert_eq!(notice.message, "Enter text to search");
    }

    #[test]
    fn missing_and_invalid_type_are_distinct() {
        assert_ne!(
            ValidationError::MissingMetaType.to_string(),
            ValidationError::InvalidMetaType.to_string()
        );
    }
}
