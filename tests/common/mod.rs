//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::path::Path;

use folio::domain::models::{LayoutElement, Line, RequestDocument};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Three-layout document with typical OCR damage.
pub fn sample_document() -> RequestDocument {
    RequestDocument::new(vec![
        LayoutElement::new(
            "1/1",
            vec![
                Line::with_id("1", "Tbe history of the"),
                Line::with_id("2", "printing press begins"),
            ],
        )
        .with_attribute("page", 1),
        LayoutElement::new("1/2", vec![Line::with_id("1", "in Mainz, c. l440.")]),
        LayoutElement::new("1/3", vec![Line::with_id("1", "① See Febvre, p. 12.")])
            .with_kind("footnote"),
    ])
}

/// Write `document` as a chunk file.
pub fn write_chunk(path: &Path, document: &RequestDocument) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create chunk directory");
    }
    let body = serde_json::to_string_pretty(document).expect("Failed to encode chunk");
    std::fs::write(path, body).expect("Failed to write chunk");
}

/// Read a chunk file written by the engine.
pub fn read_chunk(path: &Path) -> RequestDocument {
    let raw = std::fs::read_to_string(path).expect("Failed to read chunk");
    serde_json::from_str(&raw).expect("Failed to decode chunk")
}
