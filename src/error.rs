use thiserror::Error;

use crate::backend::BackendError;
use crate::gate::RequestKind;
use crate::ingest::IngestError;
use crate::session::SessionError;

/// The user-visible error taxonomy. Every operation degrades to "stay in the
/// current state, inform the caller" — nothing here is fatal, every failure
/// is recoverable by retry or cancellation.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Registry fetch failed; the previously cached list is still visible.
    #[error("Could not refresh the document registry: {0}")]
    RegistryUnavailable(#[source] BackendError),

    /// Upload or its preflight failed; the registry is unchanged.
    #[error("Ingestion failed: {0}")]
    IngestionFailed(#[from] IngestError),

    /// Validation commit failed; the session keeps its draft for retry.
    #[error("Submission failed, draft preserved: {0}")]
    SubmissionFailed(#[source] BackendError),

    #[error("Retraining request failed: {0}")]
    RetrainingFailed(#[source] BackendError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No document with id {0} in the registry")]
    DocumentNotFound(i64),

    /// A request of the same kind is already on the wire.
    #[error("A {0} request is already in flight")]
    RequestInFlight(RequestKind),

    #[error("Internal lock error")]
    LockPoisoned,
}
