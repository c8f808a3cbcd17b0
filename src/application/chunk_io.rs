//! Reading and writing chunk documents on disk.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

use crate::domain::models::RequestDocument;

/// Load a request document from a JSON file.
pub async fn read_document(path: &Path) -> Result<RequestDocument> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read chunk {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("Chunk {} is not a valid request document", path.display()))
}

/// Write a request document as pretty JSON, creating parent directories.
pub async fn write_document(path: &Path, document: &RequestDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let body = serde_json::to_string_pretty(document).context("Failed to serialize document")?;
    fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
