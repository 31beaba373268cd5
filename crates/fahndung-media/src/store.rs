//! Media state container.
//!
//! [`MediaStore`] owns the authoritative record list and everything derived
//! from it for one gallery session. It performs no I/O and never fails:
//! operations naming unknown ids are no-ops. Results of backend calls are
//! folded in by the caller (see [`crate::service::MediaService`]).

use std::collections::HashSet;

use fahndung_core::models::{
    FilterCriteria, FilterUpdate, MediaPatch, MediaRecord, Pagination, SelectionMode,
    UploadTask,
};
use fahndung_core::Config;
use serde::Serialize;
use uuid::Uuid;

use crate::filter::{filter_all, matches};
use crate::optimistic::{OptimisticOverlay, Resolved};
use crate::selection::SelectionTracker;
use crate::upload::UploadTracker;

/// Record-list fetch cycle: `Idle -> Loading -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
}

/// Immutable view of the store for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub revision: u64,
    pub visible_items: Vec<MediaRecord>,
    pub total_loaded: usize,
    pub filters: FilterCriteria,
    pub pagination: Pagination,
    pub load_state: LoadState,
    pub uploading: bool,
    pub selection_mode: SelectionMode,
    pub selected_ids: Vec<String>,
    pub pending_patches: usize,
    pub uploads: Vec<UploadTask>,
    pub overall_upload_progress: f64,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    config: Config,
    records: Vec<MediaRecord>,
    filters: FilterCriteria,
    pagination: Pagination,
    load_state: LoadState,
    uploading: bool,
    selection: SelectionTracker,
    overlay: OptimisticOverlay,
    uploads: UploadTracker,
    directories: Option<Vec<String>>,
    tags: Vec<String>,
    revision: u64,
}

impl MediaStore {
    pub fn new(config: Config) -> Self {
        MediaStore {
            config,
            records: Vec::new(),
            filters: FilterCriteria::default(),
            pagination: Pagination::default(),
            load_state: LoadState::Idle,
            uploading: false,
            selection: SelectionTracker::default(),
            overlay: OptimisticOverlay::new(),
            uploads: UploadTracker::new(),
            directories: None,
            tags: Vec::new(),
            revision: 0,
        }
    }

    /// Return to the freshly constructed state, keeping the configuration.
    /// The revision keeps counting so observers still see a change.
    pub fn reset(&mut self) {
        let revision = self.revision;
        *self = MediaStore::new(self.config.clone());
        self.revision = revision;
        self.touch();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // -- records ---------------------------------------------------------

    /// Replace the record list, or with `append` add only records whose id is
    /// not loaded yet, keeping existing order.
    pub fn set_records(&mut self, records: Vec<MediaRecord>, append: bool) {
        if append {
            let mut known: HashSet<String> = self.records.iter().map(|r| r.id.clone()).collect();
            let before = self.records.len();
            self.records.extend(
                records
                    .into_iter()
                    .filter(|record| known.insert(record.id.clone())),
            );
            tracing::debug!(
                appended = self.records.len() - before,
                total = self.records.len(),
                "Appended records"
            );
        } else {
            self.records = records;
            self.prune_dangling();
        }
        self.touch();
    }

    /// Drop pending intents whose record is no longer loaded. The selection
    /// is left alone: it survives filter changes and is only pruned by
    /// confirmed deletes.
    fn prune_dangling(&mut self) {
        let live: HashSet<&str> = self.records.iter().map(|r| r.id.as_str()).collect();
        let dropped = self.overlay.retain(|id| live.contains(id));
        if dropped > 0 {
            tracing::debug!(
                dropped_intents = dropped,
                "Pruned intents for records no longer loaded"
            );
        }
    }

    /// Insert a confirmed record, replacing the loaded copy in place when the
    /// id is already present.
    pub fn upsert_record(&mut self, record: MediaRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        self.touch();
    }

    /// Remove records after a confirmed delete, together with any selection
    /// entry or pending intent that references them.
    pub fn remove_records(&mut self, ids: &[String]) -> usize {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.records.len();
        let mut consumed = 0u32;
        let filters = &self.filters;
        self.records.retain(|r| {
            let keep = !doomed.contains(r.id.as_str());
            if !keep && matches(r, filters) {
                consumed += 1;
            }
            keep
        });
        let removed = before - self.records.len();
        self.pagination.offset = self.pagination.offset.saturating_sub(consumed);

        self.selection.retain(|id| !doomed.contains(id));
        self.overlay.retain(|id| !doomed.contains(id));

        if removed > 0 {
            self.pagination.total = self.pagination.total.saturating_sub(removed as u64);
        }
        self.touch();
        removed
    }

    /// Apply a confirmed directory move to the authoritative records.
    pub fn move_records(&mut self, ids: &[String], directory: &str) -> usize {
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut moved = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| targets.contains(r.id.as_str()))
        {
            record.directory = directory.to_string();
            record.file_path = format!("{}/{}", directory, record.original_name);
            moved += 1;
        }
        self.touch();
        moved
    }

    /// Authoritative records, without pending patches.
    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// A single record as the user sees it (pending patch applied).
    pub fn record(&self, id: &str) -> Option<MediaRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .map(|r| self.overlay.project_one(r))
    }

    /// Records after optimistic patches and the current filters, in load order.
    pub fn visible_items(&self) -> Vec<MediaRecord> {
        filter_all(&self.overlay.project(&self.records), &self.filters)
    }

    // -- filters & pagination ----------------------------------------------

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    /// Merge a filter change and return to the first page.
    pub fn set_filters(&mut self, update: FilterUpdate) {
        self.filters.merge(update);
        self.reset_pagination();
        self.touch();
    }

    pub fn replace_filters(&mut self, criteria: FilterCriteria) {
        self.filters = criteria;
        self.reset_pagination();
        self.touch();
    }

    pub fn reset_filters(&mut self) {
        self.replace_filters(FilterCriteria::default());
    }

    fn reset_pagination(&mut self) {
        self.pagination = Pagination::default();
    }

    /// Record the result of a page fetch. The consumed offset is kept; see
    /// [`Self::set_next_offset`].
    pub fn set_pagination(&mut self, page: u32, has_more: bool, total: u64) {
        self.pagination.page = page;
        self.pagination.has_more = has_more;
        self.pagination.total = total;
        self.touch();
    }

    /// Where the next page starts in the source's filtered ordering.
    pub fn set_next_offset(&mut self, offset: u32) {
        self.pagination.offset = offset;
        self.touch();
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    // -- loading flags -----------------------------------------------------

    pub fn begin_loading(&mut self) {
        self.load_state = LoadState::Loading;
        self.touch();
    }

    pub fn finish_loading(&mut self) {
        self.load_state = LoadState::Idle;
        self.touch();
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn set_uploading(&mut self, uploading: bool) {
        self.uploading = uploading;
        self.touch();
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    // -- selection ---------------------------------------------------------

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection.set_mode(mode);
        self.touch();
    }

    /// Toggle selection of a loaded record; ids that are not loaded are ignored.
    pub fn toggle_selection(&mut self, id: &str) {
        if !self.contains(id) {
            return;
        }
        self.selection.toggle(id);
        self.touch();
    }

    /// Add every currently visible record to the selection (multi mode only).
    pub fn select_all_visible(&mut self) {
        let visible: Vec<String> = self.visible_items().into_iter().map(|r| r.id).collect();
        self.selection.select_all(visible);
        self.touch();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.touch();
    }

    pub fn can_select_more(&self) -> bool {
        self.selection.can_select_more(self.visible_items().len())
    }

    /// Selected records as the user sees them, in selection order.
    pub fn selected_records(&self) -> Vec<MediaRecord> {
        self.selection
            .selected_ids()
            .iter()
            .filter_map(|id| self.record(id))
            .collect()
    }

    // -- optimistic overlay ------------------------------------------------

    pub fn overlay(&self) -> &OptimisticOverlay {
        &self.overlay
    }

    /// Show `patch` on record `id` before the backend confirms it. Returns the
    /// intent sequence number, or `None` when the record is not loaded.
    pub fn apply_patch(&mut self, id: &str, patch: MediaPatch) -> Option<u64> {
        if !self.contains(id) {
            return None;
        }
        let seq = self.overlay.apply(id, patch);
        self.touch();
        Some(seq)
    }

    pub fn commit_patch(&mut self, id: &str) -> Option<Resolved> {
        let resolved = self.overlay.commit(id);
        if resolved.is_some() {
            self.touch();
        }
        resolved
    }

    pub fn rollback_patch(&mut self, id: &str) -> Option<Resolved> {
        let resolved = self.overlay.rollback(id);
        if let Some(ref r) = resolved {
            tracing::debug!(record_id = %id, seq = r.intent.seq, "Rolled back optimistic patch");
            self.touch();
        }
        resolved
    }

    // -- uploads -----------------------------------------------------------

    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    pub fn create_upload(&mut self, file_name: &str, directory: &str) -> Uuid {
        let id = self.uploads.create(file_name, directory);
        self.touch();
        id
    }

    pub fn start_upload(&mut self, task_id: Uuid) {
        self.uploads.start(task_id);
        self.touch();
    }

    pub fn update_upload_progress(&mut self, task_id: Uuid, percent: i32) {
        self.uploads.update_progress(task_id, percent);
        self.touch();
    }

    /// Finish an upload and show the new record first in the gallery.
    pub fn complete_upload(&mut self, task_id: Uuid, record: MediaRecord) {
        if !self.contains(&record.id) {
            if matches(&record, &self.filters) {
                self.pagination.offset = self.pagination.offset.saturating_add(1);
            }
            self.records.insert(0, record.clone());
            self.pagination.total += 1;
        }
        self.uploads.complete(task_id, record);
        self.touch();
    }

    pub fn fail_upload(&mut self, task_id: Uuid, message: impl Into<String>) {
        self.uploads.fail(task_id, message);
        self.touch();
    }

    pub fn remove_upload(&mut self, task_id: Uuid) -> Option<UploadTask> {
        let removed = self.uploads.remove(task_id);
        self.touch();
        removed
    }

    pub fn clear_finished_uploads(&mut self) -> usize {
        let cleared = self.uploads.clear_finished();
        self.touch();
        cleared
    }

    // -- vocabularies ------------------------------------------------------

    /// Known directories, or the configured fallback when none were loaded.
    pub fn directories(&self) -> &[String] {
        match self.directories {
            Some(ref dirs) if !dirs.is_empty() => dirs,
            _ => &self.config.default_directories,
        }
    }

    pub fn set_directories(&mut self, directories: Vec<String>) {
        self.directories = Some(directories);
        self.touch();
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
        self.touch();
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            revision: self.revision,
            visible_items: self.visible_items(),
            total_loaded: self.records.len(),
            filters: self.filters.clone(),
            pagination: self.pagination,
            load_state: self.load_state,
            uploading: self.uploading,
            selection_mode: self.selection.mode(),
            selected_ids: self.selection.selected_ids().to_vec(),
            pending_patches: self.overlay.len(),
            uploads: self.uploads.tasks().to_vec(),
            overall_upload_progress: self.uploads.overall_progress(),
        }
    }
}

impl Default for MediaStore {
    fn default() -> Self {
        MediaStore::new(Config::default())
    }
}
