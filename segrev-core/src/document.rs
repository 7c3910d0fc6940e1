//! TOML document import.
//!
//! ```toml
//! project = "manual"
//!
//! [[segment]]
//! file = "ui.xlf"
//! unit = "save"
//! source = "<b>Save</b>"
//! target = "<b>Guardar</b>"
//! state = "confirmed"
//! ```
//!
//! `target` and `state` are optional; a missing state is derived from whether a target exists.

use std::path::Path;

use serde::Deserialize;

use crate::error::StoreError;
use crate::types::SegmentDraft;

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default, rename = "segment")]
    pub segments: Vec<SegmentDraft>,
}

pub fn parse_document(text: &str) -> Result<Document, StoreError> {
    Ok(toml::from_str(text)?)
}

/// Reads and parses a document file.
///
/// # Errors
///
/// `StoreError::Io` when the file cannot be read, `StoreError::Document` when it is not
/// a valid segment document.
pub fn load_document(path: &Path) -> Result<Document, StoreError> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&text)
}
