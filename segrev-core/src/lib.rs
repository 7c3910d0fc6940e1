//! Core of the segrev segment review tool.
//!
//! The review panels' logic lives here as plain state machines with no terminal or
//! channel dependencies: token validation, selection, filter/sort/navigation forms,
//! the error review controller, and the metadata form. The typed engine protocol and a
//! small SQLite-backed reference engine (store, checks, document import) sit alongside.

pub mod checks;
pub mod db;
pub mod document;
pub mod error;
pub mod filter;
pub mod meta;
pub mod navigation;
pub mod nmtoken;
pub mod protocol;
pub mod review;
pub mod schema;
pub mod selection;
pub mod sort;
pub mod store;
pub mod types;
