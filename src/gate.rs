//! Request gate — duplicate-dispatch guard for backend operations.
//!
//! A repeated click must never put a second identical request on the wire
//! while the first is still in flight. The gate holds one lock per operation
//! kind; `try_begin` hands out an RAII token or refuses without blocking.
//! Distinct kinds may run at the same time.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// The backend operations guarded against duplicate dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Validation commit of a finished review
    Submission,
    /// Multipart upload of a new document
    Ingestion,
    /// Backend retraining cycle
    Retraining,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submission => write!(f, "submission"),
            Self::Ingestion => write!(f, "ingestion"),
            Self::Retraining => write!(f, "retraining"),
        }
    }
}

/// Snapshot of one in-flight request.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveRequest {
    pub kind: RequestKind,
    /// When the request was dispatched (ISO 8601).
    pub started_at: String,
}

// ═══════════════════════════════════════════════════════════
// RequestGate
// ═══════════════════════════════════════════════════════════

/// Per-operation in-flight guard.
pub struct RequestGate {
    submission: Mutex<()>,
    ingestion: Mutex<()>,
    retraining: Mutex<()>,
    active: Mutex<Vec<ActiveRequest>>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self {
            submission: Mutex::new(()),
            ingestion: Mutex::new(()),
            retraining: Mutex::new(()),
            active: Mutex::new(Vec::new()),
        }
    }

    /// Claim the lock for `kind` without blocking.
    ///
    /// Returns `None` when a request of the same kind is already in flight.
    /// The guard must be held for the whole request — dropping it releases
    /// the kind and clears its active snapshot.
    pub fn try_begin(&self, kind: RequestKind) -> Option<RequestGuard<'_>> {
        let guard = self.lock_for(kind).try_lock().ok()?;
        self.record_begin(kind);
        Some(RequestGuard {
            _guard: guard,
            gate: self,
            kind,
        })
    }

    /// Is a request of this kind currently in flight?
    pub fn is_busy(&self, kind: RequestKind) -> bool {
        self.lock_for(kind).try_lock().is_err()
    }

    /// All requests currently in flight.
    pub fn active_requests(&self) -> Vec<ActiveRequest> {
        self.active
            .lock()
            .map(|active| active.clone())
            .unwrap_or_default()
    }

    // ── Internal ────────────────────────────────────────────

    fn lock_for(&self, kind: RequestKind) -> &Mutex<()> {
        match kind {
            RequestKind::Submission => &self.submission,
            RequestKind::Ingestion => &self.ingestion,
            RequestKind::Retraining => &self.retraining,
        }
    }

    fn record_begin(&self, kind: RequestKind) {
        if let Ok(mut active) = self.active.lock() {
            active.push(ActiveRequest {
                kind,
                started_at: chrono::Utc::now().to_rfc3339(),
            });
        }
    }

    fn record_end(&self, kind: RequestKind) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(pos) = active.iter().position(|r| r.kind == kind) {
                active.remove(pos);
            }
        }
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// RequestGuard — RAII in-flight token
// ═══════════════════════════════════════════════════════════

/// RAII token for one in-flight request. Dropping it releases the kind.
pub struct RequestGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    gate: &'a RequestGate,
    kind: RequestKind,
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.gate.record_end(self.kind);
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_gate_is_idle() {
        let gate = RequestGate::new();
        assert!(!gate.is_busy(RequestKind::Submission));
        assert!(!gate.is_busy(RequestKind::Ingestion));
        assert!(gate.active_requests().is_empty());
    }

    #[test]
    fn begin_marks_kind_busy() {
        let gate = RequestGate::new();
        let guard = gate.try_begin(RequestKind::Submission).unwrap();
        assert!(gate.is_busy(RequestKind::Submission));

        let active = gate.active_requests();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, RequestKind::Submission);
        assert!(!active[0].started_at.is_empty());

        drop(guard);
        assert!(!gate.is_busy(RequestKind::Submission));
        assert!(gate.active_requests().is_empty());
    }

    #[test]
    fn second_identical_request_is_refused() {
        let gate = RequestGate::new();
        let _guard = gate.try_begin(RequestKind::Ingestion).unwrap();
        assert!(gate.try_begin(RequestKind::Ingestion).is_none());
    }

    #[test]
    fn distinct_kinds_run_concurrently() {
        let gate = RequestGate::new();
        let _submit = gate.try_begin(RequestKind::Submission).unwrap();
        let _ingest = gate.try_begin(RequestKind::Ingestion).unwrap();
        let _retrain = gate.try_begin(RequestKind::Retraining).unwrap();
        assert_eq!(gate.active_requests().len(), 3);
    }

    #[test]
    fn drop_releases_only_its_own_kind() {
        let gate = RequestGate::new();
        let submit = gate.try_begin(RequestKind::Submission).unwrap();
        let _ingest = gate.try_begin(RequestKind::Ingestion).unwrap();

        drop(submit);
        assert!(!gate.is_busy(RequestKind::Submission));
        assert!(gate.is_busy(RequestKind::Ingestion));
        assert_eq!(gate.active_requests().len(), 1);
    }

    #[test]
    fn refused_while_another_thread_holds_the_kind() {
        use std::sync::mpsc;
        use std::sync::Arc;
        use std::thread;

        let gate = Arc::new(RequestGate::new());
        let gate2 = Arc::clone(&gate);
        let (acquired_tx, acquired_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            let _guard = gate2.try_begin(RequestKind::Submission).unwrap();
            acquired_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        });

        acquired_rx.recv().unwrap();
        assert!(gate.try_begin(RequestKind::Submission).is_none());

        release_tx.send(()).unwrap();
        handle.join().unwrap();
        assert!(gate.try_begin(RequestKind::Submission).is_some());
    }

    #[test]
    fn request_kind_display() {
        assert_eq!(RequestKind::Submission.to_string(), "submission");
        assert_eq!(RequestKind::Ingestion.to_string(), "ingestion");
        assert_eq!(RequestKind::Retraining.to_string(), "retraining");
    }

    #[test]
    fn request_kind_serializes_snake_case() {
        let json = serde_json::to_string(&RequestKind::Submission).unwrap();
        assert_eq!(json, "\"submission\"");
    }
}
