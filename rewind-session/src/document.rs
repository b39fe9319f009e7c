//! JSON save/load for [`DocumentV1`].

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::DocumentV1;

/// Save a document to disk as pretty JSON. Documents that [`load_document`]
/// would reject are not written.
pub fn save_document<T: Serialize>(
    path: impl AsRef<Path>,
    document: &DocumentV1<T>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    document
        .validate()
        .with_context(|| format!("refusing to save invalid document: {}", path.display()))?;

    if let Some(parent) = path.parent() {
        // fs::write does NOT create directories; tests may run with missing `target/`
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(document).context("serialize document to json")?;
    fs::write(path, json).with_context(|| format!("write document file: {}", path.display()))?;
    info!(
        document_id = %document.document_id,
        path = %path.display(),
        "document saved"
    );
    Ok(())
}

/// Load a document from disk and validate its envelope.
pub fn load_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<DocumentV1<T>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read document file: {}", path.display()))?;
    let document: DocumentV1<T> = serde_json::from_str(&data).context("parse document json")?;
    document
        .validate()
        .with_context(|| format!("validate document: {}", path.display()))?;
    debug!(document_id = %document.document_id, "document loaded");
    Ok(document)
}
