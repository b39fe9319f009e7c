//! rewind-session: document persistence for hosts of the history engine.
//!
//! Design rules:
//! - Only the document content is saved. Undo history never touches disk.
//! - Documents carry a stable id and a schema version for forward compatibility.
//! - Saving plugs into the engine through [`rewind_core::SaveHandler`], so the
//!   dirty flag is cleared only after the file is actually written.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Schema version written into every document.
pub const DOCUMENT_SCHEMA_VERSION: &str = "1.0";

/// v1 document envelope. `T` is whatever the host edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentV1<T> {
    pub document_id: Uuid,
    pub schema_version: String,
    pub title: String,
    pub content: T,
}

impl<T> DocumentV1<T> {
    /// Wrap content in a new document with a fresh id.
    pub fn new(title: impl Into<String>, content: T) -> Self {
        Self::with_id(Uuid::new_v4(), title, content)
    }

    /// Wrap content under an existing id (re-saving the same document).
    pub fn with_id(document_id: Uuid, title: impl Into<String>, content: T) -> Self {
        Self {
            document_id,
            schema_version: DOCUMENT_SCHEMA_VERSION.to_string(),
            title: title.into(),
            content,
        }
    }

    /// Reject documents written by an incompatible schema.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.schema_version != DOCUMENT_SCHEMA_VERSION {
            return Err(DocumentError::UnsupportedSchema {
                found: self.schema_version.clone(),
            });
        }
        if self.title.trim().is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        Ok(())
    }
}

/// Document-level validation errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document schema version: {found}")]
    UnsupportedSchema { found: String },

    #[error("document title must not be empty")]
    EmptyTitle,
}

pub mod document;
pub mod handler;

pub use document::{load_document, save_document};
pub use handler::JsonSaveHandler;
