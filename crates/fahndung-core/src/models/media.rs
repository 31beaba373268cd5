use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Coarse media classification, derived once from the MIME type at upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Document,
}

impl MediaType {
    /// Classify a MIME type. Anything that is neither `image/*` nor `video/*`
    /// is treated as a document.
    pub fn from_mime_type(mime_type: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaType::Image
        } else if mime.starts_with("video/") {
            MediaType::Video
        } else {
            MediaType::Document
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
            MediaType::Document => write!(f, "document"),
        }
    }
}

impl FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "document" => Ok(MediaType::Document),
            _ => Err(anyhow::anyhow!("Invalid media type: {}", s)),
        }
    }
}

/// One uploaded asset as delivered by the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    pub media_type: MediaType,
    pub directory: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    /// Raw timestamp text; parsed on demand so a malformed value never
    /// prevents the record from loading.
    pub uploaded_at: String,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

fn default_is_public() -> bool {
    true
}

impl MediaRecord {
    /// Build a record for a freshly confirmed upload. The media type is
    /// classified here and nowhere else.
    pub fn new(
        id: impl Into<String>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        directory: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let original_name = original_name.into();
        let mime_type = mime_type.into();
        let directory = directory.into();
        MediaRecord {
            file_path: format!("{}/{}", directory, original_name),
            media_type: MediaType::from_mime_type(&mime_type),
            id,
            original_name,
            file_size: 0,
            mime_type,
            width: None,
            height: None,
            directory,
            tags: Vec::new(),
            description: None,
            is_public: true,
            uploaded_at: Utc::now().to_rfc3339(),
            uploaded_by: None,
            metadata: None,
        }
    }

    /// Parsed upload timestamp, or `None` when the stored text is not a
    /// recognised timestamp.
    pub fn uploaded_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.uploaded_at)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Parse the timestamp shapes the backend is known to emit.
///
/// Accepts RFC 3339, the Postgres text form (`2024-05-01 10:00:00.123+00`),
/// a naive ISO datetime (assumed UTC), and a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Partial record fields that have not been confirmed by the backend yet.
///
/// `id` and `media_type` are deliberately absent: neither may change after
/// creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>, // Some(None) clears the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
}

impl MediaPatch {
    pub fn tags(tags: Vec<String>) -> Self {
        MediaPatch {
            tags: Some(tags),
            ..Default::default()
        }
    }

    pub fn directory(directory: impl Into<String>) -> Self {
        MediaPatch {
            directory: Some(directory.into()),
            ..Default::default()
        }
    }

    pub fn description(description: Option<String>) -> Self {
        MediaPatch {
            description: Some(description),
            ..Default::default()
        }
    }

    pub fn visibility(is_public: bool) -> Self {
        MediaPatch {
            is_public: Some(is_public),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.original_name.is_none()
            && self.directory.is_none()
            && self.tags.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.metadata.is_none()
    }

    /// Return `record` with every field set in this patch overriding it.
    pub fn apply_to(&self, record: &MediaRecord) -> MediaRecord {
        let mut patched = record.clone();
        if let Some(ref name) = self.original_name {
            patched.original_name = name.clone();
        }
        if let Some(ref directory) = self.directory {
            patched.directory = directory.clone();
        }
        if let Some(ref tags) = self.tags {
            patched.tags = tags.clone();
        }
        if let Some(ref description) = self.description {
            patched.description = description.clone();
        }
        if let Some(is_public) = self.is_public {
            patched.is_public = is_public;
        }
        if let Some(ref metadata) = self.metadata {
            patched.metadata = Some(metadata.clone());
        }
        patched
    }

    /// Fold a later patch into this one; fields set in `other` win.
    pub fn merge(&mut self, other: MediaPatch) {
        if other.original_name.is_some() {
            self.original_name = other.original_name;
        }
        if other.directory.is_some() {
            self.directory = other.directory;
        }
        if other.tags.is_some() {
            self.tags = other.tags;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
        if other.is_public.is_some() {
            self.is_public = other.is_public;
        }
        if other.metadata.is_some() {
            self.metadata = other.metadata;
        }
    }
}
