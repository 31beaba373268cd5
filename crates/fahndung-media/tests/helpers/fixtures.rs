use fahndung_core::models::{MediaRecord, UploadFile};

pub fn image(id: &str, name: &str) -> MediaRecord {
    MediaRecord::new(id, name, "image/jpeg", "allgemein")
}

pub fn video(id: &str, name: &str) -> MediaRecord {
    MediaRecord::new(id, name, "video/mp4", "fahndungen")
}

pub fn tagged(mut record: MediaRecord, tags: &[&str]) -> MediaRecord {
    record.tags = tags.iter().map(|t| t.to_string()).collect();
    record
}

/// The cat/dog pair used across scenarios.
pub fn animals() -> Vec<MediaRecord> {
    vec![
        tagged(image("1", "cat.jpg"), &["animal"]),
        tagged(video("2", "dog.mp4"), &["animal"]),
    ]
}

/// `count` images with ids `r0`, `r1`, ...
pub fn numbered(count: usize) -> Vec<MediaRecord> {
    (0..count)
        .map(|i| image(&format!("r{}", i), &format!("photo_{}.jpg", i)))
        .collect()
}

pub fn jpeg(name: &str, size: usize) -> UploadFile {
    UploadFile::new(name, "image/jpeg", vec![0xFF; size])
}

pub fn ids(records: &[MediaRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}
