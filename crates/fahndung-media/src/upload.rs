//! Upload progress tracker.
//!
//! Per-file state machine `pending -> uploading -> success | error`. Updates
//! aimed at unknown or finished tasks are ignored.

use fahndung_core::models::{MediaRecord, UploadStatus, UploadTask};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadTracker {
    /// Tasks in creation order
    tasks: Vec<UploadTask>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file and return its task id.
    pub fn create(&mut self, file_name: &str, directory: &str) -> Uuid {
        let task = UploadTask::new(file_name, directory);
        let id = task.id;
        self.tasks.push(task);
        id
    }

    /// Mark a pending task as in flight.
    pub fn start(&mut self, id: Uuid) {
        if let Some(task) = self.task_mut(id) {
            if task.status == UploadStatus::Pending {
                task.status = UploadStatus::Uploading;
            }
        }
    }

    /// Report transfer progress. The value is clamped to 0..=100 and never
    /// moves progress backwards. A pending task starts uploading on its first
    /// progress report.
    pub fn update_progress(&mut self, id: Uuid, percent: i32) {
        let Some(task) = self.task_mut(id) else {
            return;
        };
        if task.status.is_terminal() {
            return;
        }
        task.status = UploadStatus::Uploading;
        let clamped = percent.clamp(0, 100) as u8;
        task.progress = task.progress.max(clamped);
    }

    pub fn complete(&mut self, id: Uuid, record: MediaRecord) {
        if let Some(task) = self.task_mut(id) {
            if task.status.is_terminal() {
                return;
            }
            task.status = UploadStatus::Success;
            task.progress = 100;
            task.error = None;
            task.record = Some(record);
        }
    }

    /// Mark a task failed; progress stays where it stopped.
    pub fn fail(&mut self, id: Uuid, message: impl Into<String>) {
        if let Some(task) = self.task_mut(id) {
            if task.status.is_terminal() {
                return;
            }
            task.status = UploadStatus::Error;
            task.error = Some(message.into());
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<UploadTask> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    /// Drop every finished task, e.g. after a batch has been acknowledged.
    pub fn clear_finished(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.status.is_terminal());
        before - self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Mean progress over all tracked tasks; 0 when there are none.
    pub fn overall_progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.tasks.iter().map(|t| u32::from(t.progress)).sum();
        f64::from(sum) / self.tasks.len() as f64
    }

    /// Tasks that are pending or uploading.
    pub fn active_tasks(&self) -> Vec<&UploadTask> {
        self.tasks.iter().filter(|t| t.status.is_active()).collect()
    }

    pub fn has_active(&self) -> bool {
        self.tasks.iter().any(|t| t.status.is_active())
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&UploadTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: Uuid) -> Option<&mut UploadTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}
