//! Local view of the backend's document registry.
//!
//! Holds the last successfully fetched list, in backend order (newest
//! first). A failed refresh never partially overwrites the cache — stale
//! data stays visible and the caller may simply retry.

use crate::backend::BackendApi;
use crate::error::WorkflowError;
use crate::models::{Document, DocumentStatus};

#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the current registry state and fully replace the cached list.
    ///
    /// Safe to call at any time and idempotent with respect to local state;
    /// on failure the cached list is left untouched. Returns the new count.
    pub fn refresh_from(&mut self, backend: &dyn BackendApi) -> Result<usize, WorkflowError> {
        let documents = backend.list_documents().map_err(|e| {
            tracing::warn!(error = %e, "Registry refresh failed, keeping cached list");
            WorkflowError::RegistryUnavailable(e)
        })?;

        tracing::info!(count = documents.len(), "Registry refreshed");
        self.documents = documents;
        Ok(self.documents.len())
    }

    /// The cached list, exactly as last fetched.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn find(&self, id: i64) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Documents still awaiting validation.
    pub fn pending_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Pending)
            .count()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
