//! Segment-list filter: the dialog form, the normalized [`FilterSpec`] it produces, and
//! the compiled predicate the engine evaluates.
//!
//! A spec is rebuilt wholesale on every submit. Nothing is sent while the user types;
//! only [`FilterForm::apply`] and [`FilterForm::clear`] produce an outbound request.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::protocol::EngineRequest;
use crate::types::{LanguageSide, Segment, SegmentState};

/// Engine-facing description of the active segment filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Empty means "no text filter".
    pub filter_text: String,
    /// `None` only in the cleared default.
    pub filter_language: Option<LanguageSide>,
    pub case_sensitive_filter: bool,
    pub reg_exp: bool,
    pub show_untranslated: bool,
    pub show_translated: bool,
    pub show_confirmed: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::cleared()
    }
}

impl FilterSpec {
    /// The all-visible default produced by the clear action.
    pub fn cleared() -> Self {
        Self {
            filter_text: String::new(),
            filter_language: None,
            case_sensitive_filter: false,
            reg_exp: false,
            show_untranslated: true,
            show_translated: true,
            show_confirmed: true,
        }
    }

    /// True when the spec hides nothing.
    pub fn is_cleared(&self) -> bool {
        self.filter_text.is_empty()
            && self.show_untranslated
            && self.show_translated
            && self.show_confirmed
    }

    pub fn shows(&self, state: SegmentState) -> bool {
        match state {
            SegmentState::Untranslated => self.show_untranslated,
            SegmentState::Translated => self.show_translated,
            SegmentState::Confirmed => self.show_confirmed,
        }
    }

    /// Compiles the spec into a reusable predicate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] when `reg_exp` is set and the text is
    /// not a valid regular expression.
    pub fn matcher(&self) -> Result<SegmentMatcher, ValidationError> {
        let side = self.filter_language.unwrap_or_default();
        let text = if self.filter_text.is_empty() {
            TextMatch::Any
        } else if self.reg_exp {
            let regex = RegexBuilder::new(&self.filter_text)
                .case_insensitive(!self.case_sensitive_filter)
                .build()
                .map_err(|e| ValidationError::InvalidPattern(e.to_string()))?;
            TextMatch::Pattern(regex)
        } else if self.case_sensitive_filter {
            TextMatch::Exact(self.filter_text.clone())
        } else {
            TextMatch::Folded(self.filter_text.to_lowercase())
        };
        Ok(SegmentMatcher { spec: self.clone(), side, text })
    }

    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        if self.is_cleared() {
            return "all segments".to_owned();
        }
        let mut parts = Vec::new();
        if !self.filter_text.is_empty() {
            let side = self.filter_language.unwrap_or_default().label().to_lowercase();
            let kind = if self.reg_exp { "regex" } else { "text" };
            parts.push(format!("{kind} '{}' in {side}", self.filter_text));
        }
        let states: Vec<&str> = [
            (self.show_untranslated, "untranslated"),
            (self.show_translated, "translated"),
            (self.show_confirmed, "confirmed"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        if states.len() < 3 {
            parts.push(states.join("+"));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone)]
enum TextMatch {
    Any,
    Exact(String),
    Folded(String),
    Pattern(Regex),
}

/// A compiled [`FilterSpec`].
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    spec: FilterSpec,
    side: LanguageSide,
    text: TextMatch,
}

impl SegmentMatcher {
    /// Matcher for the cleared spec: every segment passes.
    pub fn all() -> Self {
        Self { spec: FilterSpec::cleared(), side: LanguageSide::Source, text: TextMatch::Any }
    }

    pub fn matches(&self, segment: &Segment) -> bool {
        if !self.spec.shows(segment.state) {
            return false;
        }
        let haystack = match self.side {
            LanguageSide::Source => &segment.source,
            LanguageSide::Target => &segment.target,
        };
        match &self.text {
            TextMatch::Any => true,
            TextMatch::Exact(needle) => haystack.contains(needle.as_str()),
            TextMatch::Folded(needle) => haystack.to_lowercase().contains(needle.as_str()),
            TextMatch::Pattern(regex) => regex.is_match(haystack),
        }
    }
}

/// Raw state of the filter dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterForm {
    pub text: String,
    /// Active language radio, if any.
    pub language: Option<LanguageSide>,
    pub case_sensitive: bool,
    pub regex: bool,
    pub show_untranslated: bool,
    pub show_translated: bool,
    pub show_confirmed: bool,
}

impl Default for FilterForm {
    fn default() -> Self {
        Self::from_spec(&FilterSpec::cleared())
    }
}

impl FilterForm {
    /// Re-populates the dialog from the active spec for edit-in-place.
    pub fn from_spec(spec: &FilterSpec) -> Self {
        Self {
            text: spec.filter_text.clone(),
            language: spec.filter_language,
            case_sensitive: spec.case_sensitive_filter,
            regex: spec.reg_exp,
            show_untranslated: spec.show_untranslated,
            show_translated: spec.show_translated,
            show_confirmed: spec.show_confirmed,
        }
    }

    /// Validates the form and wraps the spec as a `filter-options` request.
    ///
    /// # Errors
    ///
    /// See [`build_filter`].
    pub fn apply(&self) -> Result<EngineRequest, ValidationError> {
        build_filter(self).map(EngineRequest::FilterOptions)
    }

    /// Resets the form to the all-visible default. Always succeeds.
    pub fn clear(&mut self) -> EngineRequest {
        *self = Self::default();
        EngineRequest::FilterOptions(FilterSpec::cleared())
    }
}

/// Normalizes a submitted filter form.
///
/// # Errors
///
/// - [`ValidationError::EmptyFilterText`] when the text field is empty.
/// - [`ValidationError::NoStatusSelected`] when no status flag is checked.
/// - [`ValidationError::InvalidPattern`] when the regex flag is set and the text does not
///   compile.
pub fn build_filter(form: &FilterForm) -> Result<FilterSpec, ValidationError> {
    if form.text.is_empty() {
        return Err(ValidationError::EmptyFilterText);
    }
    if !(form.show_untranslated || form.show_translated || form.show_confirmed) {
        return Err(ValidationError::NoStatusSelected);
    }
    let spec = FilterSpec {
        filter_text: form.text.clone(),
        filter_language: Some(form.language.unwrap_or(LanguageSide::Source)),
        case_sensitive_filter: form.case_sensitive,
        reg_exp: form.regex,
        show_untranslated: form.show_untranslated,
        show_translated: form.show_translated,
        show_confirmed: form.show_confirmed,
    };
    spec.matcher()?;
    Ok(spec)
}
