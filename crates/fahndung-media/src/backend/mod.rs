//! Boundary traits for the hosted backend.
//!
//! The state layer never talks to the network itself. Everything it needs
//! from the backend goes through these traits, so the gallery can run against
//! the hosted service, the in-memory backend, or a test double.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use fahndung_core::models::{MediaPatch, MediaRecord, RecordPage, RecordQuery, UploadFile};
use fahndung_core::AppResult;
use tokio::sync::mpsc::UnboundedSender;

pub use memory::InMemoryBackend;

/// Paged read access to media records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_page(&self, query: &RecordQuery) -> AppResult<RecordPage>;
}

/// Write access to media records.
#[async_trait]
pub trait MutationSink: Send + Sync {
    /// Apply `patch` and return the record as stored by the backend
    async fn update_record(&self, id: &str, patch: &MediaPatch) -> AppResult<MediaRecord>;

    async fn delete_records(&self, ids: &[String]) -> AppResult<()>;

    async fn move_records(&self, ids: &[String], target_directory: &str) -> AppResult<()>;
}

/// File transfer to the backend's storage.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Upload `file` into `directory`.
    ///
    /// Progress (0..=100) is reported on `progress` while the transfer runs;
    /// send errors are ignored because the receiver may already be gone.
    async fn upload(
        &self,
        file: UploadFile,
        directory: &str,
        progress: UnboundedSender<u8>,
    ) -> AppResult<MediaRecord>;
}

/// Read-only option lists for the filter UI.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    async fn directories(&self) -> AppResult<Vec<String>>;

    async fn tags(&self) -> AppResult<Vec<String>>;
}

/// The set of collaborators a [`crate::service::MediaService`] works against.
#[derive(Clone)]
pub struct MediaBackend {
    pub records: Arc<dyn RecordSource>,
    pub mutations: Arc<dyn MutationSink>,
    pub uploads: Arc<dyn UploadTransport>,
    pub vocabularies: Arc<dyn VocabularySource>,
}

impl MediaBackend {
    /// Use one implementation for every role.
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: RecordSource + MutationSink + UploadTransport + VocabularySource + 'static,
    {
        MediaBackend {
            records: backend.clone(),
            mutations: backend.clone(),
            uploads: backend.clone(),
            vocabularies: backend,
        }
    }
}

impl std::fmt::Debug for MediaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBackend").finish_non_exhaustive()
    }
}
