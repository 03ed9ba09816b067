//! Workbench — the process-wide correction workflow state.
//!
//! Owns the backend gateway, the registry view, the correction session, and
//! the in-flight request gate behind interior locks, so the command surface
//! takes `&self` and can be shared between a UI thread and a worker thread.
//! Every state mutation in the crate flows through these commands; the
//! session and registry are never reachable for mutation from outside.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::{BackendApi, HttpBackend};
use crate::config::BackendConfig;
use crate::error::WorkflowError;
use crate::gate::{ActiveRequest, RequestGate, RequestKind};
use crate::ingest;
use crate::models::{Document, FieldMap, IngestReceipt, RetrainOutcome, ValidationAck};
use crate::registry::DocumentRegistry;
use crate::retrain;
use crate::session::CorrectionSession;
use crate::submission;

pub struct Workbench {
    backend: Box<dyn BackendApi + Send + Sync>,
    registry: RwLock<DocumentRegistry>,
    session: RwLock<CorrectionSession>,
    gate: RequestGate,
}

impl Workbench {
    /// Workbench over an explicit gateway (the seam used by tests).
    pub fn new(backend: Box<dyn BackendApi + Send + Sync>) -> Self {
        Self {
            backend,
            registry: RwLock::new(DocumentRegistry::new()),
            session: RwLock::new(CorrectionSession::new()),
            gate: RequestGate::new(),
        }
    }

    /// Workbench over the HTTP backend named by the environment.
    pub fn from_env() -> Self {
        Self::new(Box::new(HttpBackend::from_env()))
    }

    pub fn with_config(config: &BackendConfig) -> Self {
        Self::new(Box::new(HttpBackend::new(config)))
    }

    /// The in-flight request gate (for status displays).
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Requests currently on the wire.
    pub fn active_requests(&self) -> Vec<ActiveRequest> {
        self.gate.active_requests()
    }

    // ── Registry commands ───────────────────────────────────

    /// Re-fetch the document list from the backend. On failure the cached
    /// list stays visible; retry at will.
    pub fn refresh(&self) -> Result<usize, WorkflowError> {
        self.write_registry()?.refresh_from(self.backend.as_ref())
    }

    /// The cached document list, newest first.
    pub fn documents(&self) -> Result<Vec<Document>, WorkflowError> {
        Ok(self.read_registry()?.documents().to_vec())
    }

    pub fn pending_count(&self) -> Result<usize, WorkflowError> {
        Ok(self.read_registry()?.pending_count())
    }

    // ── Session commands ────────────────────────────────────

    /// Open the registry document `id` for correction.
    pub fn open_document(&self, id: i64) -> Result<(), WorkflowError> {
        let document = self
            .read_registry()?
            .find(id)
            .cloned()
            .ok_or(WorkflowError::DocumentNotFound(id))?;
        self.write_session()?.open(&document)?;
        Ok(())
    }

    /// Replace one draft field value.
    pub fn edit_field(&self, field: &str, value: &str) -> Result<(), WorkflowError> {
        self.write_session()?.edit_field(field, value)?;
        Ok(())
    }

    /// Abandon the current review. Purely local.
    pub fn cancel(&self) -> Result<i64, WorkflowError> {
        Ok(self.write_session()?.cancel()?)
    }

    pub fn is_reviewing(&self) -> Result<bool, WorkflowError> {
        Ok(self.read_session()?.is_reviewing())
    }

    /// The document under review, if any.
    pub fn active_document(&self) -> Result<Option<Document>, WorkflowError> {
        Ok(self.read_session()?.active_document().cloned())
    }

    /// The working draft, if a review is open.
    pub fn draft(&self) -> Result<Option<FieldMap>, WorkflowError> {
        Ok(self.read_session()?.draft().cloned())
    }

    // ── Backend-facing commands ─────────────────────────────

    /// Commit the current review.
    ///
    /// Holds the session for the duration of the request, so edits cannot
    /// interleave with an in-flight commit; a repeated click is refused by
    /// the gate instead of producing a second submission. After the backend
    /// acknowledges, the registry is refreshed so the document shows up as
    /// validated; if that refresh fails the commit still stands (session
    /// `Idle`) and the stale registry is reported.
    pub fn commit(&self) -> Result<ValidationAck, WorkflowError> {
        let _guard = self
            .gate
            .try_begin(RequestKind::Submission)
            .ok_or(WorkflowError::RequestInFlight(RequestKind::Submission))?;

        let ack = {
            let mut session = self.write_session()?;
            submission::submit(&mut session, self.backend.as_ref())?
        };

        if let Err(e) = self.write_registry()?.refresh_from(self.backend.as_ref()) {
            tracing::warn!("Commit acknowledged but registry refresh failed");
            return Err(e);
        }
        Ok(ack)
    }

    /// Upload a new file for extraction and refresh the registry.
    pub fn ingest(&self, path: &Path) -> Result<IngestReceipt, WorkflowError> {
        let _guard = self
            .gate
            .try_begin(RequestKind::Ingestion)
            .ok_or(WorkflowError::RequestInFlight(RequestKind::Ingestion))?;

        let mut registry = self.write_registry()?;
        ingest::ingest(path, self.backend.as_ref(), &mut registry)
    }

    /// Request a retraining cycle, gated on the confirmation callback.
    pub fn retrain(&self, confirm: impl FnOnce() -> bool) -> Result<RetrainOutcome, WorkflowError> {
        let _guard = self
            .gate
            .try_begin(RequestKind::Retraining)
            .ok_or(WorkflowError::RequestInFlight(RequestKind::Retraining))?;

        retrain::retrain(self.backend.as_ref(), confirm)
    }

    // ── Lock plumbing ───────────────────────────────────────

    fn read_session(&self) -> Result<RwLockReadGuard<'_, CorrectionSession>, WorkflowError> {
        self.session.read().map_err(|_| WorkflowError::LockPoisoned)
    }

    fn write_session(&self) -> Result<RwLockWriteGuard<'_, CorrectionSession>, WorkflowError> {
        self.session.write().map_err(|_| WorkflowError::LockPoisoned)
    }

    fn read_registry(&self) -> Result<RwLockReadGuard<'_, DocumentRegistry>, WorkflowError> {
        self.registry.read().map_err(|_| WorkflowError::LockPoisoned)
    }

    fn write_registry(&self) -> Result<RwLockWriteGuard<'_, DocumentRegistry>, WorkflowError> {
        self.registry.write().map_err(|_| WorkflowError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{pending_document, MockBackend};
    use crate::models::{DocumentStatus, FieldMap};
    use crate::session::SessionError;
    use std::io::Write;
    use std::sync::Arc;

    fn workbench_with(mock: MockBackend) -> (Arc<MockBackend>, Workbench) {
        let mock = Arc::new(mock);
        let workbench = Workbench::new(Box::new(Arc::clone(&mock)));
        (mock, workbench)
    }

    #[test]
    fn full_correction_flow_commits_and_revalidates_registry() {
        let (mock, workbench) = workbench_with(
            MockBackend::new().with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])]),
        );

        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();
        workbench.edit_field("name", "John").unwrap();
        let ack = workbench.commit().unwrap();

        assert_eq!(ack.status, "success");
        assert!(!workbench.is_reviewing().unwrap());

        let sent = &mock.received_validations()[0];
        assert_eq!(sent.document_id, 1);
        assert_eq!(sent.corrected_data.get("name").unwrap(), "John");
        assert!(sent.time_taken >= 0);

        // The post-commit refresh shows the flipped status.
        let docs = workbench.documents().unwrap();
        assert_eq!(docs[0].status, DocumentStatus::Validated);
    }

    #[test]
    fn editing_a_field_outside_the_snapshot_is_rejected() {
        let (_, workbench) = workbench_with(
            MockBackend::new().with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])]),
        );
        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();

        let err = workbench.edit_field("email", "x@y.com").unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Session(SessionError::UnknownField { .. })
        ));
        assert_eq!(workbench.draft().unwrap().unwrap().get("name").unwrap(), "Jon");
    }

    #[test]
    fn failed_commit_keeps_review_open_and_retry_succeeds() {
        let (mock, workbench) = workbench_with(
            MockBackend::new().with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])]),
        );
        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();
        workbench.edit_field("name", "John").unwrap();

        mock.set_fail_validation(true);
        let err = workbench.commit().unwrap_err();
        assert!(matches!(err, WorkflowError::SubmissionFailed(_)));
        assert!(workbench.is_reviewing().unwrap());
        assert_eq!(
            workbench.draft().unwrap().unwrap().get("name").unwrap(),
            "John"
        );

        mock.set_fail_validation(false);
        workbench.commit().unwrap();
        let sent = mock.received_validations();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].corrected_data, sent[1].corrected_data);
        assert!(sent[1].time_taken >= sent[0].time_taken);
    }

    #[test]
    fn ingested_file_shows_up_as_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4 content")
            .unwrap();

        let mut extraction = FieldMap::new();
        extraction.insert("name".into(), "Ada".into());
        let (_, workbench) =
            workbench_with(MockBackend::new().with_upload_extraction(extraction));

        let receipt = workbench.ingest(&path).unwrap();
        let docs = workbench.documents().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, receipt.id);
        assert_eq!(docs[0].status, DocumentStatus::Pending);
        // Ingestion never opens a session.
        assert!(!workbench.is_reviewing().unwrap());
    }

    #[test]
    fn cancel_is_local_and_leaves_registry_untouched() {
        let (mock, workbench) = workbench_with(
            MockBackend::new().with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])]),
        );
        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();
        workbench.edit_field("name", "John").unwrap();

        assert_eq!(workbench.cancel().unwrap(), 1);
        assert!(!workbench.is_reviewing().unwrap());
        assert!(mock.received_validations().is_empty());
        assert_eq!(
            workbench.documents().unwrap()[0].status,
            DocumentStatus::Pending
        );
    }

    #[test]
    fn opening_an_unknown_id_fails() {
        let (_, workbench) = workbench_with(MockBackend::new());
        workbench.refresh().unwrap();
        let err = workbench.open_document(42).unwrap_err();
        assert!(matches!(err, WorkflowError::DocumentNotFound(42)));
    }

    #[test]
    fn opening_a_validated_document_fails() {
        let mut doc = pending_document(1, "a.pdf", &[]);
        doc.status = DocumentStatus::Validated;
        let (_, workbench) = workbench_with(MockBackend::new().with_documents(vec![doc]));
        workbench.refresh().unwrap();

        let err = workbench.open_document(1).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Session(SessionError::DocumentAlreadyValidated { id: 1 })
        ));
        assert!(!workbench.is_reviewing().unwrap());
    }

    #[test]
    fn second_open_requires_explicit_cancel() {
        let (_, workbench) = workbench_with(MockBackend::new().with_documents(vec![
            pending_document(2, "b.pdf", &[]),
            pending_document(1, "a.pdf", &[]),
        ]));
        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();

        let err = workbench.open_document(2).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Session(SessionError::ReviewInProgress { id: 1 })
        ));

        workbench.cancel().unwrap();
        workbench.open_document(2).unwrap();
        assert_eq!(workbench.active_document().unwrap().unwrap().id, 2);
    }

    #[test]
    fn duplicate_submission_is_refused_by_the_gate() {
        let (mock, workbench) = workbench_with(
            MockBackend::new().with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])]),
        );
        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();

        let _in_flight = workbench.gate().try_begin(RequestKind::Submission).unwrap();
        let err = workbench.commit().unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::RequestInFlight(RequestKind::Submission)
        ));
        assert!(mock.received_validations().is_empty());
        // The review survives the refusal.
        assert!(workbench.is_reviewing().unwrap());
    }

    #[test]
    fn commit_survives_failed_post_commit_refresh() {
        let (mock, workbench) = workbench_with(
            MockBackend::new().with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])]),
        );
        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();

        mock.set_fail_listing(true);
        let err = workbench.commit().unwrap_err();
        assert!(matches!(err, WorkflowError::RegistryUnavailable(_)));

        // The commit itself stands: backend accepted, session is idle,
        // only the local list is stale.
        assert_eq!(mock.received_validations().len(), 1);
        assert!(!workbench.is_reviewing().unwrap());
        assert_eq!(
            workbench.documents().unwrap()[0].status,
            DocumentStatus::Pending
        );

        mock.set_fail_listing(false);
        workbench.refresh().unwrap();
        assert_eq!(
            workbench.documents().unwrap()[0].status,
            DocumentStatus::Validated
        );
    }

    #[test]
    fn retrain_runs_while_reviewing_without_touching_the_session() {
        let (_, workbench) = workbench_with(
            MockBackend::new()
                .with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])])
                .with_retrain_message("done"),
        );
        workbench.refresh().unwrap();
        workbench.open_document(1).unwrap();
        workbench.edit_field("name", "John").unwrap();

        let outcome = workbench.retrain(|| true).unwrap();
        assert_eq!(
            outcome,
            RetrainOutcome::Completed {
                message: "done".into()
            }
        );
        assert!(workbench.is_reviewing().unwrap());
        assert_eq!(
            workbench.draft().unwrap().unwrap().get("name").unwrap(),
            "John"
        );
    }

    #[test]
    fn workbench_is_shareable_across_threads() {
        let (_, workbench) = workbench_with(
            MockBackend::new().with_documents(vec![pending_document(1, "a.pdf", &[("name", "Jon")])]),
        );
        let workbench = Arc::new(workbench);
        workbench.refresh().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let wb = Arc::clone(&workbench);
                std::thread::spawn(move || wb.documents().unwrap().len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
