use serde::{Deserialize, Serialize};

use super::document::FieldMap;

/// The payload committing a finished review: final draft plus review metrics.
/// Constructed once per commit attempt, sent, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationEvent {
    pub document_id: i64,
    pub corrected_data: FieldMap,
    /// Whole seconds of review effort. Never negative.
    pub time_taken: i64,
}

/// Backend acknowledgment of a validation commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationAck {
    pub status: String,
}

/// Backend acknowledgment of an upload: the new document id and the
/// extraction the ingestion pipeline produced for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub id: i64,
    #[serde(default)]
    pub extraction: FieldMap,
}

/// Backend response to a retraining request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainReply {
    #[serde(default)]
    pub status: String,
    pub message: String,
}

/// Outcome of a retraining trigger, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrainOutcome {
    /// The reviewer declined the confirmation prompt; no request was sent.
    Declined,
    /// The backend ran the cycle and reported this message.
    Completed { message: String },
}
