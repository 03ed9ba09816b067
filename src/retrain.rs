//! Retraining trigger — fire-and-forget request for a backend retraining
//! cycle over the accumulated validated data.
//!
//! Retraining is assumed costly, so the request is gated on an explicit,
//! cancelable confirmation. The prompt itself is a callback seam: whatever
//! renders the question answers `true` to proceed, and a declined prompt
//! sends nothing. Independent of the correction session — callable while
//! idle or mid-review, with no side effects on either.

use crate::backend::BackendApi;
use crate::error::WorkflowError;
use crate::models::RetrainOutcome;

/// Ask for confirmation, then request a retraining cycle.
///
/// The backend decides which validated data to use; its status message is
/// returned verbatim.
pub fn retrain(
    backend: &dyn BackendApi,
    confirm: impl FnOnce() -> bool,
) -> Result<RetrainOutcome, WorkflowError> {
    if !confirm() {
        tracing::info!("Retraining declined at confirmation prompt");
        return Ok(RetrainOutcome::Declined);
    }

    tracing::info!("Requesting retraining cycle");
    let reply = backend.retrain().map_err(|e| {
        tracing::warn!(error = %e, "Retraining request failed");
        WorkflowError::RetrainingFailed(e)
    })?;

    tracing::info!(status = %reply.status, "Retraining cycle finished");
    Ok(RetrainOutcome::Completed {
        message: reply.message,
    })
}
