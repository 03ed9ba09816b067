//! Client core for a human-in-the-loop correction workflow.
//!
//! Documents are pre-extracted by an external model into a field set; a
//! human reviewer inspects, corrects, and validates that data before it
//! joins the training set. This crate owns the client side of that loop:
//! the registry view, the single-active-document correction session, and
//! the commit / ingest / retrain triggers — all decoupled from any
//! rendering technology via the [`Workbench`] command surface.

pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod ingest;
pub mod models;
pub mod registry;
pub mod retrain;
pub mod session;
pub mod submission;
pub mod workbench;

pub use backend::{BackendApi, BackendError, HttpBackend, MockBackend};
pub use config::BackendConfig;
pub use error::WorkflowError;
pub use gate::{ActiveRequest, RequestGate, RequestKind};
pub use models::{
    Document, DocumentStatus, FieldMap, IngestReceipt, RetrainOutcome, RetrainReply,
    ValidationAck, ValidationEvent,
};
pub use registry::DocumentRegistry;
pub use session::{CorrectionSession, ReviewDraft, SessionError};
pub use workbench::Workbench;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the hosting process. Call once at startup.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate default
/// filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
