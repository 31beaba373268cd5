pub mod fixtures;

use std::sync::Arc;

use fahndung_core::models::MediaRecord;
use fahndung_core::Config;
use fahndung_media::{InMemoryBackend, MediaBackend, MediaService};

/// Service wired to an in-memory backend the test can still reach into.
pub struct TestGallery {
    pub service: MediaService,
    pub backend: Arc<InMemoryBackend>,
}

pub fn setup_gallery(records: Vec<MediaRecord>) -> TestGallery {
    setup_gallery_with_config(records, test_config())
}

pub fn setup_gallery_with_config(records: Vec<MediaRecord>, config: Config) -> TestGallery {
    let backend = Arc::new(InMemoryBackend::with_records(records));
    let service = MediaService::new(config, MediaBackend::from_shared(backend.clone()));
    TestGallery { service, backend }
}

/// Defaults with a small page so paging is easy to exercise.
pub fn test_config() -> Config {
    Config {
        page_size: 2,
        max_upload_size_bytes: 1024,
        ..Config::default()
    }
}
