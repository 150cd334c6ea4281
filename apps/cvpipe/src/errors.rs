use std::path::PathBuf;

use thiserror::Error;

/// Orchestration-level error type. Per-document failures are recorded as
/// data in `ExtractionResult`; only errors that make the whole run
/// impossible (unreadable input directory, unwritable output location)
/// surface through this enum.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No supported resume files found in {0}")]
    NoDocuments(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
