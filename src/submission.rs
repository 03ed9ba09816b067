//! Submission pipeline — commit a finished review to the backend.
//!
//! Builds the validation event (final draft plus derived review time),
//! sends it, and tears the session down only once the backend has
//! acknowledged the commit. On any failure the session keeps its draft:
//! a submission failure must never discard unsaved human work.

use chrono::{DateTime, Utc};

use crate::backend::BackendApi;
use crate::error::WorkflowError;
use crate::models::{ValidationAck, ValidationEvent};
use crate::session::{CorrectionSession, ReviewDraft, SessionError};

/// Assemble the commit payload for `review` as of `now`.
pub fn build_event(review: &ReviewDraft, now: DateTime<Utc>) -> ValidationEvent {
    ValidationEvent {
        document_id: review.document_id(),
        corrected_data: review.draft().clone(),
        time_taken: review.elapsed_secs(now),
    }
}

/// Commit the session's draft.
///
/// Precondition: a review is in progress. On success the session returns to
/// `Idle`; on rejection or transport failure it is left exactly as it was,
/// so the reviewer may retry (re-sending the same values with a larger
/// `time_taken`) or cancel explicitly.
pub fn submit(
    session: &mut CorrectionSession,
    backend: &dyn BackendApi,
) -> Result<ValidationAck, WorkflowError> {
    let review = session.review().ok_or(SessionError::NoActiveReview)?;
    let event = build_event(review, Utc::now());

    tracing::info!(
        document_id = event.document_id,
        fields = event.corrected_data.len(),
        time_taken = event.time_taken,
        "Submitting validation"
    );

    let ack = backend.validate(&event).map_err(|e| {
        tracing::warn!(
            document_id = event.document_id,
            error = %e,
            "Submission failed, draft preserved"
        );
        WorkflowError::SubmissionFailed(e)
    })?;

    session.finish();
    tracing::info!(document_id = event.document_id, "Validation committed");
    Ok(ack)
}
