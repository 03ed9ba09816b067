//! Correction session — the single-active-document review state machine.
//!
//! A session is either `Idle` or `Reviewing` one document. Opening seeds the
//! draft from a copy of the document's extraction snapshot; the draft's key
//! set is frozen from that moment (values change, fields never appear or
//! disappear). Which document is under review and what has been edited live
//! in one value, so a new `open` can never mix one document's draft with
//! another's schema.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::{Document, FieldMap};

/// Longest accepted corrected value, in bytes.
const MAX_FIELD_VALUE_LEN: usize = 500;

/// Errors from session state transitions and draft edits.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Document {id} is already validated and cannot be reopened")]
    DocumentAlreadyValidated { id: i64 },

    #[error("Document {id} is still under review — cancel or commit it first")]
    ReviewInProgress { id: i64 },

    #[error("No field named '{field}' in this draft")]
    UnknownField { field: String },

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("No review in progress")]
    NoActiveReview,
}

/// The review state machine. At most one document is ever under review.
#[derive(Debug, Default, Serialize)]
pub enum CorrectionSession {
    #[default]
    Idle,
    Reviewing(ReviewDraft),
}

/// Everything belonging to one open review: the document (owned copy), the
/// working draft, and the moment the reviewer started.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDraft {
    document: Document,
    draft: FieldMap,
    started_at: DateTime<Utc>,
}

impl ReviewDraft {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_id(&self) -> i64 {
        self.document.id
    }

    pub fn draft(&self) -> &FieldMap {
        &self.draft
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Review effort in whole seconds, rounded from milliseconds and clamped
    /// to zero so clock skew can never produce a negative duration.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        let millis = (now - self.started_at).num_milliseconds();
        ((millis as f64 / 1000.0).round() as i64).max(0)
    }
}

impl CorrectionSession {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self, Self::Reviewing(_))
    }

    pub fn review(&self) -> Option<&ReviewDraft> {
        match self {
            Self::Idle => None,
            Self::Reviewing(draft) => Some(draft),
        }
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.review().map(ReviewDraft::document)
    }

    pub fn draft(&self) -> Option<&FieldMap> {
        self.review().map(ReviewDraft::draft)
    }

    /// Open `document` for correction.
    ///
    /// Valid only from `Idle`: an in-progress review is never silently
    /// replaced, the caller must `cancel` (or commit) explicitly. Validated
    /// documents are rejected at this boundary.
    pub fn open(&mut self, document: &Document) -> Result<(), SessionError> {
        self.open_at(document, Utc::now())
    }

    pub(crate) fn open_at(
        &mut self,
        document: &Document,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if let Self::Reviewing(current) = self {
            return Err(SessionError::ReviewInProgress {
                id: current.document_id(),
            });
        }
        if !document.is_correctable() {
            return Err(SessionError::DocumentAlreadyValidated { id: document.id });
        }

        let draft = document.extraction_snapshot();
        tracing::info!(
            document_id = document.id,
            filename = %document.filename,
            fields = draft.len(),
            "Review opened"
        );

        *self = Self::Reviewing(ReviewDraft {
            document: document.clone(),
            draft,
            started_at: now,
        });
        Ok(())
    }

    /// Replace the value of one existing draft field.
    ///
    /// The field set is fixed at open time; a key the snapshot did not
    /// contain is a programming error, not a supported edit. Pure value
    /// replacement — every other key is untouched.
    pub fn edit_field(&mut self, field: &str, value: &str) -> Result<(), SessionError> {
        let review = match self {
            Self::Idle => return Err(SessionError::NoActiveReview),
            Self::Reviewing(review) => review,
        };

        if !review.draft.contains_key(field) {
            return Err(SessionError::UnknownField {
                field: field.to_string(),
            });
        }
        check_field_value(field, value)?;

        tracing::debug!(document_id = review.document_id(), field, "Draft field edited");
        review.draft.insert(field.to_string(), value.to_string());
        Ok(())
    }

    /// Discard the draft and return to `Idle`. Purely local — no backend
    /// call, the document's registry status is untouched.
    ///
    /// Returns the id of the document whose review was abandoned.
    pub fn cancel(&mut self) -> Result<i64, SessionError> {
        match std::mem::take(self) {
            Self::Idle => Err(SessionError::NoActiveReview),
            Self::Reviewing(review) => {
                tracing::info!(document_id = review.document_id(), "Review cancelled");
                Ok(review.document_id())
            }
        }
    }

    /// Tear down after an acknowledged commit, yielding the finished draft.
    pub(crate) fn finish(&mut self) -> Option<ReviewDraft> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Reviewing(review) => Some(review),
        }
    }
}

/// Shape check for corrected values: bounded length, no control characters
/// other than newline. Field semantics stay the backend's concern.
fn check_field_value(field: &str, value: &str) -> Result<(), SessionError> {
    if value.len() > MAX_FIELD_VALUE_LEN {
        return Err(SessionError::InvalidFieldValue {
            field: field.to_string(),
            reason: format!("longer than {MAX_FIELD_VALUE_LEN} characters"),
        });
    }
    if value.chars().any(|c| c.is_control() && c != '\n') {
        return Err(SessionError::InvalidFieldValue {
            field: field.to_string(),
            reason: "contains control characters".to_string(),
        });
    }
    Ok(())
}
