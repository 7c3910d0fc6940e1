//! Owned value types shared by the review panels, the protocol, and the local engine.
//!
//! Everything here is plain data: no channel handles, no database handles. Types that
//! cross the engine boundary derive `Serialize`/`Deserialize` with the engine's camelCase
//! field names so a spec can be logged or persisted verbatim.

use serde::{Deserialize, Serialize};

/// Translation state of a segment. Mutually exclusive.
///
/// The derived `Ord` is the status sort order: untranslated < translated < confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentState {
    /// Target is empty or has never been touched.
    #[default]
    Untranslated,
    /// Target text exists but has not been signed off.
    Translated,
    /// Target text has been confirmed by the translator.
    Confirmed,
}

impl SegmentState {
    /// Stable text form used in the `segments.state` column.
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentState::Untranslated => "untranslated",
            SegmentState::Translated => "translated",
            SegmentState::Confirmed => "confirmed",
        }
    }

    /// Parses the column text written by [`SegmentState::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "untranslated" => Some(SegmentState::Untranslated),
            "translated" => Some(SegmentState::Translated),
            "confirmed" => Some(SegmentState::Confirmed),
            _ => None,
        }
    }
}

/// One translation unit as rendered by the segment list.
///
/// `index` is 1-based and stable for as long as the document stays open.
/// `tag_errors` / `space_errors` are computed by the engine, never by the panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub index: u32,
    pub file: String,
    pub unit: String,
    pub source: String,
    pub target: String,
    pub state: SegmentState,
    pub tag_errors: bool,
    pub space_errors: bool,
}

/// Which side of the bilingual pair a filter or sort looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageSide {
    #[default]
    Source,
    Target,
}

impl LanguageSide {
    pub fn label(self) -> &'static str {
        match self {
            LanguageSide::Source => "Source",
            LanguageSide::Target => "Target",
        }
    }

    /// The other side.
    pub fn flip(self) -> Self {
        match self {
            LanguageSide::Source => LanguageSide::Target,
            LanguageSide::Target => LanguageSide::Source,
        }
    }
}

/// The two independent error-review classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Inline markup differs between source and target.
    Tags,
    /// Leading/trailing whitespace differs between source and target.
    Spaces,
}

impl ErrorClass {
    /// Panel title.
    pub fn title(self) -> &'static str {
        match self {
            ErrorClass::Tags => "Tag Errors",
            ErrorClass::Spaces => "Space Errors",
        }
    }

    /// Informational notice shown when a refresh comes back empty.
    pub fn empty_notice(self) -> &'static str {
        match self {
            ErrorClass::Tags => "There are no tag errors",
            ErrorClass::Spaces => "There are no space errors",
        }
    }

    /// Only whitespace errors have an engine-side bulk fix.
    pub fn supports_fix_all(self) -> bool {
        matches!(self, ErrorClass::Spaces)
    }
}

/// One reported error. Identity is the segment index within its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRow {
    pub index: u32,
    /// Free-form classification from the engine, e.g. `"Missing tags"`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ErrorRow {
    pub fn new(index: u32, kind: impl Into<String>) -> Self {
        Self { index, kind: kind.into() }
    }
}

/// A user-entered metadata pair attached to a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    /// Must be an XML `Name`/`Nmtoken`; see [`crate::nmtoken::is_nm_token`].
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Engine-assigned identifier of a stored metadata entry (UUID v4 text).
pub type MetaId = String;

/// A metadata entry as persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMeta {
    pub id: MetaId,
    pub segment: u32,
    pub entry: MetaEntry,
}

/// Import record for one segment; indices are assigned in document order on import.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SegmentDraft {
    pub file: String,
    pub unit: String,
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub state: Option<SegmentState>,
}

impl SegmentDraft {
    /// Explicit state if given, otherwise derived from whether a target exists.
    pub fn effective_state(&self) -> SegmentState {
        match self.state {
            Some(state) => state,
            None if self.target.is_empty() => SegmentState::Untranslated,
            None => SegmentState::Translated,
        }
    }
}
