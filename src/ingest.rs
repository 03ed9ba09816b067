//! Ingestion trigger — hand a new file to the backend for extraction.
//!
//! Preflight checks run locally before anything touches the wire; the
//! backend then stores the artifact, runs extraction, and creates the
//! `pending` document record. Ingestion never opens a correction session —
//! ingesting and correcting are decoupled steps.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::{BackendApi, BackendError};
use crate::error::WorkflowError;
use crate::models::IngestReceipt;
use crate::registry::DocumentRegistry;

/// Upload size cap.
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024; // 100MB

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A file that passed preflight and is ready to upload.
#[derive(Debug, Clone)]
pub struct IngestFile {
    pub path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
}

/// Local checks before the upload is dispatched: the path must name a
/// non-empty regular file within the size cap.
pub fn preflight(path: &Path) -> Result<IngestFile, IngestError> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(IngestError::NotAFile(path.to_path_buf()));
    }

    let size = metadata.len();
    if size == 0 {
        return Err(IngestError::EmptyFile(path.to_path_buf()));
    }
    if size > MAX_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            max_mb: MAX_FILE_SIZE / (1024 * 1024),
        });
    }

    Ok(IngestFile {
        path: path.to_path_buf(),
        filename: sanitize_filename(
            path.file_name().and_then(|n| n.to_str()).unwrap_or("document"),
        ),
        size_bytes: size,
    })
}

/// Strip path separators and NULs from a filename, cap its length, and fall
/// back to a generic name rather than sending nothing.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}

/// Upload `path` and refresh the registry so the new `pending` document
/// becomes visible.
///
/// On any failure the registry is left unchanged and no retry is attempted;
/// the caller decides whether to try again.
pub fn ingest(
    path: &Path,
    backend: &dyn BackendApi,
    registry: &mut DocumentRegistry,
) -> Result<IngestReceipt, WorkflowError> {
    let file = preflight(path)?;

    tracing::info!(
        filename = %file.filename,
        size_bytes = file.size_bytes,
        "Uploading document for extraction"
    );

    let receipt = backend
        .upload(&file.path)
        .map_err(|e| WorkflowError::IngestionFailed(IngestError::Backend(e)))?;

    tracing::info!(
        document_id = receipt.id,
        fields = receipt.extraction.len(),
        "Document ingested"
    );

    // Only after the backend acknowledged the upload.
    registry.refresh_from(backend)?;
    Ok(receipt)
}
