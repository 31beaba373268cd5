//! In-memory backend.
//!
//! Implements every boundary trait over a record list held in memory. Used
//! for offline work on a JSON export and as the test double for the service;
//! individual operations can be made to fail on demand.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use fahndung_core::models::{MediaPatch, MediaRecord, RecordPage, RecordQuery, UploadFile};
use fahndung_core::{AppError, AppResult};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use super::{MutationSink, RecordSource, UploadTransport, VocabularySource};
use crate::filter::filter_all;

/// Backend operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Update,
    Delete,
    Move,
    Upload,
    Vocabulary,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    records: Mutex<Vec<MediaRecord>>,
    failures: Mutex<HashMap<Operation, String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<MediaRecord>) -> Self {
        InMemoryBackend {
            records: Mutex::new(records),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Load a JSON array of records, e.g. an export of the media table.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let records: Vec<MediaRecord> = serde_json::from_str(&raw)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            count = records.len(),
            "Loaded records from JSON export"
        );
        Ok(Self::with_records(records))
    }

    /// Make every call of `operation` fail with `message` until [`Self::recover`].
    pub fn fail(&self, operation: Operation, message: impl Into<String>) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(operation, message.into());
        }
    }

    pub fn recover(&self, operation: Operation) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.remove(&operation);
        }
    }

    /// Current backend-side copy of the records.
    pub fn records(&self) -> AppResult<Vec<MediaRecord>> {
        Ok(self.lock_records()?.clone())
    }

    fn lock_records(&self) -> AppResult<MutexGuard<'_, Vec<MediaRecord>>> {
        self.records
            .lock()
            .map_err(|_| AppError::Internal("In-memory record lock poisoned".to_string()))
    }

    fn check(&self, operation: Operation) -> AppResult<()> {
        let failures = self
            .failures
            .lock()
            .map_err(|_| AppError::Internal("In-memory failure lock poisoned".to_string()))?;
        match failures.get(&operation) {
            Some(message) => Err(match operation {
                Operation::Fetch | Operation::Vocabulary => AppError::Backend(message.clone()),
                Operation::Update | Operation::Delete | Operation::Move => {
                    AppError::Mutation(message.clone())
                }
                Operation::Upload => AppError::Upload(message.clone()),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordSource for InMemoryBackend {
    async fn fetch_page(&self, query: &RecordQuery) -> AppResult<RecordPage> {
        self.check(Operation::Fetch)?;
        let records = self.lock_records()?;
        let matching = filter_all(&records, &query.filters);
        let total = matching.len() as u64;
        let items: Vec<MediaRecord> = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        let has_more = u64::from(query.offset) + (items.len() as u64) < total;
        Ok(RecordPage {
            items,
            has_more,
            total,
        })
    }
}

#[async_trait]
impl MutationSink for InMemoryBackend {
    async fn update_record(&self, id: &str, patch: &MediaPatch) -> AppResult<MediaRecord> {
        self.check(Operation::Update)?;
        let mut records = self.lock_records()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))?;
        *record = patch.apply_to(record);
        Ok(record.clone())
    }

    async fn delete_records(&self, ids: &[String]) -> AppResult<()> {
        self.check(Operation::Delete)?;
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.lock_records()?
            .retain(|r| !doomed.contains(r.id.as_str()));
        Ok(())
    }

    async fn move_records(&self, ids: &[String], target_directory: &str) -> AppResult<()> {
        self.check(Operation::Move)?;
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        for record in self
            .lock_records()?
            .iter_mut()
            .filter(|r| targets.contains(r.id.as_str()))
        {
            record.directory = target_directory.to_string();
            record.file_path = format!("{}/{}", target_directory, record.original_name);
        }
        Ok(())
    }
}

#[async_trait]
impl UploadTransport for InMemoryBackend {
    async fn upload(
        &self,
        file: UploadFile,
        directory: &str,
        progress: UnboundedSender<u8>,
    ) -> AppResult<MediaRecord> {
        for step in [0u8, 25, 50, 75] {
            let _ = progress.send(step);
            tokio::task::yield_now().await;
        }
        self.check(Operation::Upload)?;

        let mut record = MediaRecord::new(
            Uuid::new_v4().to_string(),
            file.file_name.clone(),
            file.content_type.clone(),
            directory,
        );
        record.file_size = file.size() as i64;
        self.lock_records()?.insert(0, record.clone());
        let _ = progress.send(100);
        Ok(record)
    }
}

#[async_trait]
impl VocabularySource for InMemoryBackend {
    async fn directories(&self) -> AppResult<Vec<String>> {
        self.check(Operation::Vocabulary)?;
        let records = self.lock_records()?;
        let dirs: BTreeSet<String> = records.iter().map(|r| r.directory.clone()).collect();
        Ok(dirs.into_iter().collect())
    }

    async fn tags(&self) -> AppResult<Vec<String>> {
        self.check(Operation::Vocabulary)?;
        let records = self.lock_records()?;
        let tags: BTreeSet<String> = records.iter().flat_map(|r| r.tags.clone()).collect();
        Ok(tags.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fahndung_core::models::{FilterCriteria, MediaType};

    fn backend() -> InMemoryBackend {
        let mut a = MediaRecord::new("a", "a.jpg", "image/jpeg", "allgemein");
        a.tags = vec!["x".to_string()];
        let b = MediaRecord::new("b", "b.mp4", "video/mp4", "fahndungen");
        let c = MediaRecord::new("c", "c.jpg", "image/jpeg", "allgemein");
        InMemoryBackend::with_records(vec![a, b, c])
    }

    #[tokio::test]
    async fn test_fetch_page_filters_and_pages() {
        let backend = backend();
        let query = RecordQuery {
            filters: FilterCriteria {
                media_type: Some(MediaType::Image),
                ..Default::default()
            },
            limit: 1,
            offset: 0,
        };
        let page = backend.fetch_page(&query).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.has_more);
        assert_eq!(page.items[0].id, "a");

        let next = backend
            .fetch_page(&RecordQuery { offset: 1, ..query })
            .await
            .unwrap();
        assert_eq!(next.items[0].id, "c");
        assert!(!next.has_more);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let backend = backend();
        backend.fail(Operation::Update, "locked");
        let err = backend
            .update_record("a", &MediaPatch::visibility(false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Mutation(_)));

        backend.recover(Operation::Update);
        let updated = backend
            .update_record("a", &MediaPatch::visibility(false))
            .await
            .unwrap();
        assert!(!updated.is_public);
    }

    #[tokio::test]
    async fn test_update_unknown_record_is_not_found() {
        let err = backend()
            .update_record("zz", &MediaPatch::visibility(false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_move_and_delete() {
        let backend = backend();
        backend
            .move_records(&["a".to_string()], "beweismittel")
            .await
            .unwrap();
        backend.delete_records(&["b".to_string()]).await.unwrap();

        let records = backend.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].directory, "beweismittel");
        assert_eq!(records[0].file_path, "beweismittel/a.jpg");
    }

    #[tokio::test]
    async fn test_upload_reports_progress() {
        let backend = InMemoryBackend::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let file = UploadFile::new("scan.pdf", "application/pdf", vec![1, 2, 3]);
        let record = backend.upload(file, "dokumente", tx).await.unwrap();
        assert_eq!(record.media_type, MediaType::Document);
        assert_eq!(record.file_size, 3);

        let mut seen = Vec::new();
        while let Ok(p) = rx.try_recv() {
            seen.push(p);
        }
        assert_eq!(seen, vec![0, 25, 50, 75, 100]);
    }

    #[tokio::test]
    async fn test_vocabularies_are_sorted_and_distinct() {
        let backend = backend();
        assert_eq!(
            backend.directories().await.unwrap(),
            vec!["allgemein".to_string(), "fahndungen".to_string()]
        );
        assert_eq!(backend.tags().await.unwrap(), vec!["x".to_string()]);
    }
}
