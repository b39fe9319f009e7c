//! Save handler that writes the host's document to a JSON file.

use std::path::PathBuf;

use rewind_core::SaveHandler;
use serde::Serialize;
use uuid::Uuid;

use crate::{save_document, DocumentV1};

/// Snapshots the host's content through `snapshot` and writes it to `path`
/// every time the engine acknowledges a save. The document id stays the same
/// across saves.
pub struct JsonSaveHandler<F> {
    path: PathBuf,
    document_id: Uuid,
    title: String,
    snapshot: F,
}

impl<T, F> JsonSaveHandler<F>
where
    T: Serialize,
    F: FnMut() -> T,
{
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>, snapshot: F) -> Self {
        Self {
            path: path.into(),
            document_id: Uuid::new_v4(),
            title: title.into(),
            snapshot,
        }
    }

    /// Keep saving under the id of a previously loaded document.
    pub fn with_document_id(mut self, document_id: Uuid) -> Self {
        self.document_id = document_id;
        self
    }
}

impl<F> JsonSaveHandler<F> {
    pub fn document_id(&self) -> Uuid {
        self.document_id
    }
}

impl<T, F> SaveHandler for JsonSaveHandler<F>
where
    T: Serialize,
    F: FnMut() -> T,
{
    fn save(&mut self) -> anyhow::Result<()> {
        let content = (self.snapshot)();
        let document = DocumentV1::with_id(self.document_id, self.title.clone(), content);
        save_document(&self.path, &document)
    }
}
