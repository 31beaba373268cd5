use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fahndung_core::models::{parse_timestamp, MediaRecord};
use serde::Serialize;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Guess a content type from the file extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Parse a `--from` / `--to` bound. A bare date covers the whole day: the
/// lower bound starts at midnight, the upper bound ends at the last
/// millisecond.
pub fn parse_date_bound(raw: &str, end_of_day: bool) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_milli_opt(23, 59, 59, 999)
        } else {
            date.and_hms_opt(0, 0, 0)
        }
        .context("Invalid time of day")?;
        return Ok(Utc.from_utc_datetime(&time));
    }
    parse_timestamp(raw).with_context(|| format!("Invalid date '{}'", raw))
}

/// Write records back as a JSON export.
pub fn save_export(path: &Path, records: &[MediaRecord]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records).context("Serialize records")?;
    std::fs::write(path, json).with_context(|| format!("Write {}", path.display()))?;
    tracing::info!(path = %path.display(), count = records.len(), "Saved export");
    Ok(())
}

#[derive(Debug, Default, Serialize)]
pub struct MediaStats {
    pub total_count: usize,
    pub total_size_bytes: i64,
    pub public_count: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_directory: BTreeMap<String, usize>,
}

impl MediaStats {
    pub fn from_records(records: &[MediaRecord]) -> Self {
        let mut stats = MediaStats {
            total_count: records.len(),
            ..Default::default()
        };
        for record in records {
            stats.total_size_bytes += record.file_size;
            if record.is_public {
                stats.public_count += 1;
            }
            *stats
                .by_type
                .entry(record.media_type.to_string())
                .or_insert(0) += 1;
            *stats
                .by_directory
                .entry(record.directory.clone())
                .or_insert(0) += 1;
        }
        stats
    }

    pub fn total_size_mb(&self) -> f64 {
        (self.total_size_bytes as f64) / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use fahndung_media::InMemoryBackend;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hi", 1), "...");
    }

    #[test]
    fn truncate_string_multibyte() {
        assert_eq!(truncate_string("Überwachungsbild.jpg", 8), "Überw...");
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for_path(Path::new("a/B.JPG")), "image/jpeg");
        assert_eq!(content_type_for_path(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(
            content_type_for_path(Path::new("noext")),
            "application/octet-stream"
        );
    }

    #[test]
    fn date_bounds_cover_whole_day() {
        let from = parse_date_bound("2024-03-01", false).unwrap();
        let to = parse_date_bound("2024-03-01", true).unwrap();
        assert_eq!(from.hour(), 0);
        assert_eq!(to.hour(), 23);
        assert_eq!(to.minute(), 59);
        assert!(to > from);

        let exact = parse_date_bound("2024-03-01T12:30:00Z", true).unwrap();
        assert_eq!(exact.hour(), 12);

        assert!(parse_date_bound("yesterday", false).is_err());
    }

    #[test]
    fn stats_group_by_type_and_directory() {
        let mut a = MediaRecord::new("a", "a.jpg", "image/jpeg", "allgemein");
        a.file_size = 100;
        let mut b = MediaRecord::new("b", "b.mp4", "video/mp4", "fahndungen");
        b.file_size = 50;
        b.is_public = false;
        let c = MediaRecord::new("c", "c.jpg", "image/jpeg", "fahndungen");

        let stats = MediaStats::from_records(&[a, b, c]);
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.total_size_bytes, 150);
        assert_eq!(stats.public_count, 2);
        assert_eq!(stats.by_type.get("image"), Some(&2));
        assert_eq!(stats.by_directory.get("fahndungen"), Some(&2));
    }

    #[test]
    fn saved_export_loads_into_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media.json");
        let records = vec![
            MediaRecord::new("a", "a.jpg", "image/jpeg", "allgemein"),
            MediaRecord::new("b", "b.pdf", "application/pdf", "dokumente"),
        ];

        save_export(&path, &records).unwrap();
        let backend = InMemoryBackend::from_json_file(&path).unwrap();
        assert_eq!(backend.records().unwrap(), records);
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
