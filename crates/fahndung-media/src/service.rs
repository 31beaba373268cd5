//! Gallery service: drives backend I/O and folds the results into a
//! [`MediaStore`].
//!
//! Every mutation follows the same discipline: apply an optimistic intent,
//! call the backend, then commit on success or roll back on failure. Errors
//! are returned to the caller after the store has been brought back into a
//! consistent state.

use fahndung_core::models::{
    FilterCriteria, FilterUpdate, MediaPatch, MediaRecord, RecordQuery, UploadFile,
};
use fahndung_core::validation::{validate_patch, validate_upload};
use fahndung_core::{AppError, AppResult, Config, ErrorMetadata};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::backend::{MediaBackend, UploadTransport};
use crate::store::MediaStore;

/// Outcome of one file in a batch upload.
#[derive(Debug)]
pub struct UploadOutcome {
    pub task_id: Uuid,
    pub file_name: String,
    pub result: AppResult<MediaRecord>,
}

#[derive(Debug)]
pub struct MediaService {
    store: MediaStore,
    backend: MediaBackend,
}

impl MediaService {
    pub fn new(config: Config, backend: MediaBackend) -> Self {
        MediaService {
            store: MediaStore::new(config),
            backend,
        }
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    /// Direct access for pure UI state (selection, local filters).
    pub fn store_mut(&mut self) -> &mut MediaStore {
        &mut self.store
    }

    pub fn into_store(self) -> MediaStore {
        self.store
    }

    // -- loading -----------------------------------------------------------

    /// Fetch the first page for the current filters, replacing loaded records.
    pub async fn load_first_page(&mut self) -> AppResult<()> {
        self.load_page(0, 0, false).await
    }

    /// Fetch the page after the last one loaded and append it. Does nothing
    /// when the source reported no further pages.
    ///
    /// The page starts at the consumed offset rather than `page * limit`, so
    /// records deleted or uploaded since the last fetch neither get skipped
    /// nor fetched twice.
    pub async fn load_next_page(&mut self) -> AppResult<()> {
        let pagination = self.store.pagination();
        if !pagination.has_more {
            return Ok(());
        }
        self.load_page(pagination.page + 1, pagination.offset, true)
            .await
    }

    async fn load_page(&mut self, page: u32, offset: u32, append: bool) -> AppResult<()> {
        let query = RecordQuery {
            filters: self.store.filters().clone(),
            limit: self.store.config().page_size,
            offset,
        };

        self.store.begin_loading();
        let result = self.backend.records.fetch_page(&query).await;
        self.store.finish_loading();

        match result {
            Ok(fetched) => {
                let next_offset = offset.saturating_add(fetched.items.len() as u32);
                tracing::debug!(
                    page = page,
                    offset = offset,
                    items = fetched.items.len(),
                    total = fetched.total,
                    has_more = fetched.has_more,
                    "Fetched record page"
                );
                self.store.set_records(fetched.items, append);
                self.store
                    .set_pagination(page, fetched.has_more, fetched.total);
                self.store.set_next_offset(next_offset);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, page = page, "Failed to fetch record page");
                Err(e)
            }
        }
    }

    /// Merge a filter change and reload from the first page.
    pub async fn apply_filters(&mut self, update: FilterUpdate) -> AppResult<()> {
        self.store.set_filters(update);
        self.load_first_page().await
    }

    pub async fn replace_filters(&mut self, criteria: FilterCriteria) -> AppResult<()> {
        self.store.replace_filters(criteria);
        self.load_first_page().await
    }

    /// Load directory and tag vocabularies. Failures are logged and leave the
    /// store on its configured fallback.
    pub async fn refresh_vocabularies(&mut self) {
        match self.backend.vocabularies.directories().await {
            Ok(directories) => self.store.set_directories(directories),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load directories, using defaults");
            }
        }
        match self.backend.vocabularies.tags().await {
            Ok(tags) => self.store.set_tags(tags),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load tags");
            }
        }
    }

    // -- mutations ---------------------------------------------------------

    /// Edit record metadata optimistically.
    pub async fn update_record(&mut self, id: &str, patch: MediaPatch) -> AppResult<MediaRecord> {
        validate_patch(&patch, self.store.config())?;
        if self.store.apply_patch(id, patch.clone()).is_none() {
            return Err(AppError::NotFound(format!("Record {} is not loaded", id)));
        }

        match self.backend.mutations.update_record(id, &patch).await {
            Ok(confirmed) => {
                self.store.upsert_record(confirmed.clone());
                self.store.commit_patch(id);
                tracing::info!(record_id = %id, "Record updated");
                Ok(confirmed)
            }
            Err(e) => {
                self.store.rollback_patch(id);
                tracing::warn!(record_id = %id, error = %e, "Record update failed, rolled back");
                Err(e)
            }
        }
    }

    /// Delete records. The store is only touched once the backend confirmed.
    pub async fn delete_records(&mut self, ids: &[String]) -> AppResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.backend.mutations.delete_records(ids).await.map_err(|e| {
            tracing::warn!(count = ids.len(), error = %e, "Delete failed");
            e
        })?;

        let removed = self.store.remove_records(ids);
        tracing::info!(requested = ids.len(), removed = removed, "Records deleted");
        Ok(removed)
    }

    /// Delete everything currently selected.
    pub async fn delete_selected(&mut self) -> AppResult<usize> {
        let ids = self.store.selection().selected_ids().to_vec();
        self.delete_records(&ids).await
    }

    /// Move records to another directory optimistically.
    pub async fn move_records(&mut self, ids: &[String], target_directory: &str) -> AppResult<()> {
        let patch = MediaPatch::directory(target_directory);
        validate_patch(&patch, self.store.config())?;

        let mut applied = Vec::with_capacity(ids.len());
        for id in ids {
            if self.store.apply_patch(id, patch.clone()).is_some() {
                applied.push(id.clone());
            }
        }

        match self
            .backend
            .mutations
            .move_records(ids, target_directory)
            .await
        {
            Ok(()) => {
                self.store.move_records(&applied, target_directory);
                for id in &applied {
                    self.store.commit_patch(id);
                }
                tracing::info!(
                    count = applied.len(),
                    directory = %target_directory,
                    "Records moved"
                );
                Ok(())
            }
            Err(e) => {
                for id in &applied {
                    self.store.rollback_patch(id);
                }
                tracing::warn!(
                    count = applied.len(),
                    directory = %target_directory,
                    error = %e,
                    "Move failed, rolled back"
                );
                Err(e)
            }
        }
    }

    // -- uploads -----------------------------------------------------------

    /// Upload one file, tracking its progress in the store.
    pub async fn upload(&mut self, file: UploadFile, directory: &str) -> UploadOutcome {
        let task_id = self.store.create_upload(&file.file_name, directory);
        let file_name = file.file_name.clone();

        if let Err(e) = validate_upload(&file, directory, self.store.config()) {
            self.store.fail_upload(task_id, e.client_message());
            return UploadOutcome {
                task_id,
                file_name,
                result: Err(e),
            };
        }

        self.store.set_uploading(true);
        self.store.start_upload(task_id);
        let result = self.transfer(task_id, file, directory).await;
        self.finish_upload(task_id, &file_name, &result);
        self.store.set_uploading(self.store.uploads().has_active());

        UploadOutcome {
            task_id,
            file_name,
            result,
        }
    }

    /// Upload a batch with at most `max_concurrent_uploads` transfers in
    /// flight. Every file gets its own task; queued tasks stay pending until
    /// their transfer reports progress. A failure does not stop the batch.
    /// Outcomes are returned in input order.
    pub async fn upload_all(&mut self, files: Vec<UploadFile>, directory: &str) -> Vec<UploadOutcome> {
        let limit = self.store.config().max_concurrent_uploads.max(1);
        let mut slots: Vec<Option<UploadOutcome>> = Vec::with_capacity(files.len());
        let mut accepted = Vec::new();

        for (index, file) in files.into_iter().enumerate() {
            let task_id = self.store.create_upload(&file.file_name, directory);
            match validate_upload(&file, directory, self.store.config()) {
                Ok(()) => {
                    slots.push(None);
                    accepted.push((index, task_id, file));
                }
                Err(e) => {
                    self.store.fail_upload(task_id, e.client_message());
                    slots.push(Some(UploadOutcome {
                        task_id,
                        file_name: file.file_name,
                        result: Err(e),
                    }));
                }
            }
        }

        if !accepted.is_empty() {
            tracing::debug!(
                files = accepted.len(),
                concurrency = limit,
                "Starting batch upload"
            );
            self.store.set_uploading(true);

            let (events_tx, mut events_rx) = mpsc::unbounded_channel::<(Uuid, u8)>();
            let transport = self.backend.uploads.clone();
            let target = directory.to_string();

            let transfers = stream::iter(accepted)
                .map(|(index, task_id, file)| {
                    let transport = transport.clone();
                    let events = events_tx.clone();
                    let directory = target.clone();
                    async move {
                        let file_name = file.file_name.clone();
                        let result =
                            relay_transfer(transport, task_id, file, directory, events).await;
                        (index, task_id, file_name, result)
                    }
                })
                .buffer_unordered(limit);
            tokio::pin!(transfers);

            loop {
                tokio::select! {
                    biased;
                    Some((task_id, percent)) = events_rx.recv() => {
                        self.store.update_upload_progress(task_id, i32::from(percent));
                    }
                    finished = transfers.next() => {
                        let Some((index, task_id, file_name, result)) = finished else {
                            break;
                        };
                        while let Ok((id, percent)) = events_rx.try_recv() {
                            self.store.update_upload_progress(id, i32::from(percent));
                        }
                        self.finish_upload(task_id, &file_name, &result);
                        slots[index] = Some(UploadOutcome {
                            task_id,
                            file_name,
                            result,
                        });
                    }
                }
            }

            self.store.set_uploading(self.store.uploads().has_active());
        }

        slots.into_iter().flatten().collect()
    }

    fn finish_upload(&mut self, task_id: Uuid, file_name: &str, result: &AppResult<MediaRecord>) {
        match result {
            Ok(record) => {
                self.store.complete_upload(task_id, record.clone());
                tracing::info!(record_id = %record.id, file_name = %file_name, "Upload finished");
            }
            Err(e) => {
                self.store.fail_upload(task_id, e.client_message());
                tracing::warn!(file_name = %file_name, error = %e, "Upload failed");
            }
        }
    }

    /// Run the transport while folding its progress events into the tracker.
    async fn transfer(
        &mut self,
        task_id: Uuid,
        file: UploadFile,
        directory: &str,
    ) -> AppResult<MediaRecord> {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let transport = self.backend.uploads.clone();
        let transfer = transport.upload(file, directory, tx);
        tokio::pin!(transfer);

        let result = loop {
            tokio::select! {
                biased;
                Some(percent) = rx.recv() => {
                    self.store.update_upload_progress(task_id, i32::from(percent));
                }
                result = &mut transfer => break result,
            }
        };

        // events sent right before the transport returned
        while let Ok(percent) = rx.try_recv() {
            self.store.update_upload_progress(task_id, i32::from(percent));
        }

        result
    }
}

/// Run one transfer, tagging its progress events with the task id.
async fn relay_transfer(
    transport: Arc<dyn UploadTransport>,
    task_id: Uuid,
    file: UploadFile,
    directory: String,
    events: mpsc::UnboundedSender<(Uuid, u8)>,
) -> AppResult<MediaRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
    let transfer = transport.upload(file, &directory, tx);
    tokio::pin!(transfer);

    let result = loop {
        tokio::select! {
            biased;
            Some(percent) = rx.recv() => {
                let _ = events.send((task_id, percent));
            }
            result = &mut transfer => break result,
        }
    };
    while let Ok(percent) = rx.try_recv() {
        let _ = events.send((task_id, percent));
    }
    result
}
