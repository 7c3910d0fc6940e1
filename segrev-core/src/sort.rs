//! Segment-list sort order: dialog form, normalized [`SortSpec`], and the comparator the
//! engine uses.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::protocol::EngineRequest;
use crate::types::{LanguageSide, Segment};

/// Sort key sent to the engine. `None` keeps document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    None,
    Source,
    Target,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub sort_option: SortOption,
    pub sort_desc: bool,
}

impl SortSpec {
    /// The constant produced by the clear action.
    pub const fn cleared() -> Self {
        Self { sort_option: SortOption::None, sort_desc: false }
    }

    /// Orders two segments. Ties on the primary key fall back to ascending index so the
    /// order is total and stable across refreshes; `sort_desc` reverses the primary key only.
    pub fn compare(&self, a: &Segment, b: &Segment) -> Ordering {
        let primary = match self.sort_option {
            SortOption::None => Ordering::Equal,
            SortOption::Source => a.source.cmp(&b.source),
            SortOption::Target => a.target.cmp(&b.target),
            SortOption::Status => a.state.cmp(&b.state),
        };
        let primary = if self.sort_desc { primary.reverse() } else { primary };
        primary.then(a.index.cmp(&b.index))
    }

    pub fn summary(&self) -> String {
        let key = match self.sort_option {
            SortOption::None => return "document order".to_owned(),
            SortOption::Source => "source",
            SortOption::Target => "target",
            SortOption::Status => "status",
        };
        let dir = if self.sort_desc { "desc" } else { "asc" };
        format!("{key} {dir}")
    }
}

/// Top-level radio in the sort dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Language,
    Status,
}

/// Raw state of the sort dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortForm {
    pub mode: SortMode,
    /// May hold a stale value while `mode` is `Status`; ignored in that case.
    pub language: Option<LanguageSide>,
    pub descending: bool,
}

impl SortForm {
    /// Re-populates the dialog from the active spec.
    pub fn from_spec(spec: &SortSpec) -> Self {
        let (mode, language) = match spec.sort_option {
            SortOption::Status => (SortMode::Status, None),
            SortOption::Target => (SortMode::Language, Some(LanguageSide::Target)),
            SortOption::Source => (SortMode::Language, Some(LanguageSide::Source)),
            SortOption::None => (SortMode::Language, None),
        };
        Self { mode, language, descending: spec.sort_desc }
    }

    /// Whether the language sub-choice is editable.
    pub fn language_enabled(&self) -> bool {
        self.mode == SortMode::Language
    }

    pub fn apply(&self) -> EngineRequest {
        EngineRequest::SortOptions(build_sort(self))
    }

    pub fn clear(&mut self) -> EngineRequest {
        *self = Self::default();
        EngineRequest::SortOptions(SortSpec::cleared())
    }
}

/// Normalizes a sort form. Never fails.
pub fn build_sort(form: &SortForm) -> SortSpec {
    let sort_option = match form.mode {
        SortMode::Status => SortOption::Status,
        SortMode::Language => match form.language.unwrap_or_default() {
            LanguageSide::Source => SortOption::Source,
            LanguageSide::Target => SortOption::Target,
        },
    };
    SortSpec { sort_option, sort_desc: form.descending }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SegmentState;

    fn seg(index: u32, source: &str, state: SegmentState) -> Segment {
        Segment {
            index,
            file: "f".into(),
            unit: index.to_string(),
            source: source.into(),
            target: String::new(),
            state,
            tag_errors: false,
            space_errors: false,
        }
    }

    #[test]
    fn status_mode_ignores_stale_language() {
        for language in [None, Some(LanguageSide::Source), Some(LanguageSide::Target)] {
            let form = SortForm { mode: SortMode::Status, language, descending: true };
            let spec = build_sort(&form);
            assert_eq!(spec.sort_option, SortOption::Status);
            assert!(spec.sort_desc);
            assert!(!form.language_enabled());
        }
    }

    #[test]
    fn language_mode_defaults_to_source() {
        let spec = build_sort(&SortForm::default());
        assert_eq!(spec, SortSpec { sort_option: SortOption::Source, sort_desc: false });
        let spec = build_sort(&SortForm {
            language: Some(LanguageSide::Target),
            ..SortForm::default()
        });
        assert_eq!(spec.sort_option, SortOption::Target);
    }

    #[test]
    fn clear_is_constant() {
        let mut form = SortForm { mode: SortMode::Status, language: None, descending: true };
        assert_eq!(
            form.clear(),
            EngineRequest::SortOptions(SortSpec { sort_option: SortOption::None, sort_desc: false })
        );
        assert_eq!(form, SortForm::default());
    }

    #[test]
    fn compare_breaks_ties_by_index_and_reverses_primary_only() {
        let mut rows = vec![
            seg(1, "b", SegmentState::Confirmed),
            seg(2, "a", SegmentState::Untranslated),
            seg(3, "a", SegmentState::Translated),
        ];
        let spec = SortSpec { sort_option: SortOption::Source, sort_desc: true };
        rows.sort_by(|a, b| spec.compare(a, b));
        let order: Vec<u32> = rows.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 2, 3]);

        let spec = SortSpec { sort_option: SortOption::Status, sort_desc: false };
        rows.sort_by(|a, b| spec.compare(a, b));
        let order: Vec<u32> = rows.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![2, 3, 1]);

        rows.sort_by(|a, b| SortSpec::cleared().compare(a, b));
        let order: Vec<u32> = rows.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn from_spec_round_trips_language_sorts() {
        let form = SortForm {
            mode: SortMode::Language,
            language: Some(LanguageSide::Target),
            descending: true,
        };
        assert_eq!(SortForm::from_spec(&build_sort(&form)), form);
    }
}
