//! Metadata editor form.
//!
//! Whether a submit creates or edits is decided by the [`MetaMode`] the form was built
//! with, never by what messages happened to arrive first.

use crate::error::ValidationError;
use crate::nmtoken::is_nm_token;
use crate::protocol::EngineRequest;
use crate::types::{MetaEntry, MetaId, StoredMeta};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaMode {
    Create,
    Edit(MetaId),
}

/// Raw state of the metadata dialog for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaForm {
    pub mode: MetaMode,
    pub segment: u32,
    pub kind: String,
    pub value: String,
}

impl MetaForm {
    /// Empty form that appends a new entry to `segment`.
    pub fn create(segment: u32) -> Self {
        Self { mode: MetaMode::Create, segment, kind: String::new(), value: String::new() }
    }

    /// Form pre-filled from an existing entry, editing it in place.
    pub fn edit(stored: &StoredMeta) -> Self {
        Self {
            mode: MetaMode::Edit(stored.id.clone()),
            segment: stored.segment,
            kind: stored.entry.kind.clone(),
            value: stored.entry.value.clone(),
        }
    }

    /// Validates the entry and builds `add-meta` or `edit-meta`.
    ///
    /// # Errors
    ///
    /// Missing type, a type that is not an XML name, or a missing value; checked in that
    /// order so the user fixes the type first.
    pub fn submit(&self) -> Result<EngineRequest, ValidationError> {
        let entry = validate_entry(&self.kind, &self.value)?;
        Ok(match &self.mode {
            MetaMode::Create => EngineRequest::AddMeta { segment: self.segment, entry },
            MetaMode::Edit(id) => EngineRequest::EditMeta { id: id.clone(), entry },
        })
    }
}

pub fn validate_entry(kind: &str, value: &str) -> Result<MetaEntry, ValidationError> {
    if kind.is_empty() {
        return Err(ValidationError::MissingMetaType);
    }
    if !is_nm_token(kind) {
        return Err(ValidationError::InvalidMetaType);
    }
    if value.is_empty() {
        return Err(ValidationError::MissingMetaValue);
    }
    Ok(MetaEntry { kind: kind.to_owned(), value: value.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_type_differs_from_invalid_type() {
        let mut form = MetaForm::create(3);
        form.value = "v".into();
        assert_eq!(form.submit(), Err(ValidationError::MissingMetaType));
        form.kind = "1abc".into();
        assert_eq!(form.submit(), Err(ValidationError::InvalidMetaType));
    }

    #[test]
    fn empty_value_is_rejected() {
        let mut form = MetaForm::create(3);
        form.kind = "x-note".into();
        assert_eq!(form.submit(), Err(ValidationError::MissingMetaValue));
    }

    #[test]
    fn mode_selects_topic() {
        let mut form = MetaForm::create(3);
        form.kind = "reviewer".into();
        form.value = "ana".into();
        assert_eq!(form.submit().unwrap().topic(), "add-meta");

        let stored = StoredMeta {
            id: "m-1".into(),
            segment: 3,
            entry: MetaEntry { kind: "reviewer".into(), value: "ana".into() },
        };
        let mut form = MetaForm::edit(&stored);
        form.value = "luis".into();
        assert_eq!(
            form.submit(),
            Ok(EngineRequest::EditMeta {
                id: "m-1".into(),
                entry: MetaEntry { kind: "reviewer".into(), value: "luis".into() },
            })
        );
    }
}
