use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Field name → field value, as produced by the extraction service and as
/// edited by the reviewer. String-typed on both sides; the backend owns any
/// richer typing.
pub type FieldMap = BTreeMap<String, String>;

/// One ingested file and its processing status, as reported by the registry.
///
/// `id` and `filename` are immutable once assigned; `status` is only ever
/// changed backend-side as a consequence of a validation commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    /// When the backend ingested the file. Absent on older records.
    #[serde(default)]
    pub upload_date: Option<NaiveDateTime>,
    pub status: DocumentStatus,
    /// The extraction snapshot. Absent or empty if extraction failed or
    /// produced nothing.
    #[serde(default)]
    pub ai_extraction: Option<FieldMap>,
}

impl Document {
    /// True when the document can still be opened for correction.
    pub fn is_correctable(&self) -> bool {
        self.status != DocumentStatus::Validated
    }

    /// The extraction snapshot as an owned copy, empty when absent.
    pub fn extraction_snapshot(&self) -> FieldMap {
        self.ai_extraction.clone().unwrap_or_default()
    }
}

/// Registry-side document status. Transitions only `pending → validated`;
/// `in_review` is an optional backend-side marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    InReview,
    Validated,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Validated => "validated",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
