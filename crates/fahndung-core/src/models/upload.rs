use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::MediaRecord;

/// Upload task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    /// `Success` and `Error` are final; progress no longer moves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Success | UploadStatus::Error)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, UploadStatus::Pending | UploadStatus::Uploading)
    }
}

/// Progress of one queued file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTask {
    pub id: Uuid,
    pub file_name: String,
    pub directory: String,
    /// Percent complete, 0..=100
    pub progress: u8,
    pub status: UploadStatus,
    pub error: Option<String>,
    pub record: Option<MediaRecord>,
}

impl UploadTask {
    pub fn new(file_name: impl Into<String>, directory: impl Into<String>) -> Self {
        UploadTask {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            directory: directory.into(),
            progress: 0,
            status: UploadStatus::Pending,
            error: None,
            record: None,
        }
    }
}

/// A file handed to the upload transport.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        UploadFile {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(UploadStatus::Success.is_terminal());
        assert!(UploadStatus::Error.is_terminal());
        assert!(!UploadStatus::Uploading.is_terminal());
        assert!(UploadStatus::Pending.is_active());
        assert!(!UploadStatus::Error.is_active());
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = UploadTask::new("cat.jpg", "allgemein");
        assert_eq!(task.status, UploadStatus::Pending);
        assert_eq!(task.progress, 0);
        assert!(task.error.is_none());
    }
}
