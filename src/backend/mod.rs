//! Backend gateway — the seam between the correction core and the service
//! that owns storage, extraction, and retraining.
//!
//! Everything network-facing goes through the [`BackendApi`] trait so the
//! state machine stays independently testable: [`HttpBackend`] is the real
//! client, [`MockBackend`] the scriptable double used in tests.

pub mod http;
pub mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

use std::path::Path;

use thiserror::Error;

use crate::models::{Document, IngestReceipt, RetrainReply, ValidationAck, ValidationEvent};

/// Transport-level errors, shared by every backend operation.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Cannot reach correction backend at {0} — is the service running?")]
    Connection(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Could not parse backend response: {0}")]
    ResponseParsing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The four backend operations the correction workflow consumes.
pub trait BackendApi {
    /// `GET /documents` — the registry's current document list, newest first.
    fn list_documents(&self) -> Result<Vec<Document>, BackendError>;

    /// `POST /upload` — multipart upload of a raw file; the backend runs
    /// extraction and creates the document record.
    fn upload(&self, path: &Path) -> Result<IngestReceipt, BackendError>;

    /// `POST /validate` — commit a corrected draft plus review metrics;
    /// the backend persists the correction and flips the document to
    /// `validated`.
    fn validate(&self, event: &ValidationEvent) -> Result<ValidationAck, BackendError>;

    /// `POST /retrain` — request a retraining cycle over the accumulated
    /// validated data.
    fn retrain(&self) -> Result<RetrainReply, BackendError>;
}

impl<T: BackendApi + ?Sized> BackendApi for std::sync::Arc<T> {
    fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        (**self).list_documents()
    }

    fn upload(&self, path: &Path) -> Result<IngestReceipt, BackendError> {
        (**self).upload(path)
    }

    fn validate(&self, event: &ValidationEvent) -> Result<ValidationAck, BackendError> {
        (**self).validate(event)
    }

    fn retrain(&self) -> Result<RetrainReply, BackendError> {
        (**self).retrain()
    }
}
