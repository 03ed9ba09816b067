use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{BackendApi, BackendError};
use crate::models::{
    Document, DocumentStatus, FieldMap, IngestReceipt, RetrainReply, ValidationAck,
    ValidationEvent,
};

/// Scriptable backend double.
///
/// Behaves like the real service: a successful validate flips the matching
/// document to `validated` and stores the corrected data; a successful upload
/// creates a new `pending` document at the head of the list. Each operation
/// can be toggled to fail with a transport error, and received payloads are
/// recorded for assertions.
pub struct MockBackend {
    documents: Mutex<Vec<Document>>,
    upload_extraction: FieldMap,
    retrain_message: String,
    fail_listing: AtomicBool,
    fail_upload: AtomicBool,
    fail_validation: AtomicBool,
    fail_retrain: AtomicBool,
    validations: Mutex<Vec<ValidationEvent>>,
    uploads: Mutex<Vec<PathBuf>>,
    retrain_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            upload_extraction: FieldMap::new(),
            retrain_message: "Model retrained".to_string(),
            fail_listing: AtomicBool::new(false),
            fail_upload: AtomicBool::new(false),
            fail_validation: AtomicBool::new(false),
            fail_retrain: AtomicBool::new(false),
            validations: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            retrain_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_documents(self, documents: Vec<Document>) -> Self {
        *self.lock(&self.documents) = documents;
        self
    }

    /// Extraction assigned to documents created by `upload`.
    pub fn with_upload_extraction(mut self, extraction: FieldMap) -> Self {
        self.upload_extraction = extraction;
        self
    }

    pub fn with_retrain_message(mut self, message: &str) -> Self {
        self.retrain_message = message.to_string();
        self
    }

    // ── Failure scripting ───────────────────────────────────

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_validation(&self, fail: bool) {
        self.fail_validation.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_retrain(&self, fail: bool) {
        self.fail_retrain.store(fail, Ordering::SeqCst);
    }

    // ── Assertion helpers ───────────────────────────────────

    /// Every validation event the backend received, in order.
    pub fn received_validations(&self) -> Vec<ValidationEvent> {
        self.lock(&self.validations).clone()
    }

    /// Every uploaded file path, in order.
    pub fn received_uploads(&self) -> Vec<PathBuf> {
        self.lock(&self.uploads).clone()
    }

    /// Current backend-side document list (what a refresh would return).
    pub fn backend_documents(&self) -> Vec<Document> {
        self.lock(&self.documents).clone()
    }

    /// How many retraining requests reached the backend.
    pub fn retrain_call_count(&self) -> usize {
        self.retrain_calls.load(Ordering::SeqCst)
    }

    fn lock<'a, T>(&self, m: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        m.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transport_failure() -> BackendError {
        BackendError::Connection("http://mock.invalid".to_string())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendApi for MockBackend {
    fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Self::transport_failure());
        }
        Ok(self.lock(&self.documents).clone())
    }

    fn upload(&self, path: &Path) -> Result<IngestReceipt, BackendError> {
        self.lock(&self.uploads).push(path.to_path_buf());

        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(Self::transport_failure());
        }

        let filename = crate::ingest::sanitize_filename(
            path.file_name().and_then(|n| n.to_str()).unwrap_or("document"),
        );

        let mut documents = self.lock(&self.documents);
        let id = documents.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        // Newest first, like the real registry.
        documents.insert(
            0,
            Document {
                id,
                filename,
                upload_date: None,
                status: DocumentStatus::Pending,
                ai_extraction: Some(self.upload_extraction.clone()),
            },
        );

        Ok(IngestReceipt {
            id,
            extraction: self.upload_extraction.clone(),
        })
    }

    fn validate(&self, event: &ValidationEvent) -> Result<ValidationAck, BackendError> {
        self.lock(&self.validations).push(event.clone());

        if self.fail_validation.load(Ordering::SeqCst) {
            return Err(Self::transport_failure());
        }

        let mut documents = self.lock(&self.documents);
        if let Some(doc) = documents.iter_mut().find(|d| d.id == event.document_id) {
            doc.status = DocumentStatus::Validated;
            doc.ai_extraction = Some(event.corrected_data.clone());
        }

        Ok(ValidationAck {
            status: "success".to_string(),
        })
    }

    fn retrain(&self) -> Result<RetrainReply, BackendError> {
        self.retrain_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_retrain.load(Ordering::SeqCst) {
            return Err(Self::transport_failure());
        }
        Ok(RetrainReply {
            status: "success".to_string(),
            message: self.retrain_message.clone(),
        })
    }
}

/// Build a `pending` document for tests.
pub fn pending_document(id: i64, filename: &str, fields: &[(&str, &str)]) -> Document {
    let extraction: FieldMap = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Document {
        id,
        filename: filename.to_string(),
        upload_date: None,
        status: DocumentStatus::Pending,
        ai_extraction: Some(extraction),
    }
}
