use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::MediaType;

/// The user's current search and filter intent over the gallery.
///
/// The default value matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Free text, matched case-insensitively against name, description and tags
    pub search: String,
    pub media_type: Option<MediaType>,
    pub directory: Option<String>,
    /// A record matches when it carries at least one of these tags
    pub tags: Vec<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl FilterCriteria {
    /// True when no criterion is active.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.media_type.is_none()
            && self.directory.as_deref().map_or(true, str::is_empty)
            && self.tags.is_empty()
            && !self.has_date_range()
    }

    pub fn has_date_range(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    /// Shallow-merge an update into these criteria.
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(search) = update.search {
            self.search = search;
        }
        if let Some(media_type) = update.media_type {
            self.media_type = media_type;
        }
        if let Some(directory) = update.directory {
            self.directory = directory;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(date_from) = update.date_from {
            self.date_from = date_from;
        }
        if let Some(date_to) = update.date_to {
            self.date_to = date_to;
        }
    }
}

/// A field-by-field change to [`FilterCriteria`].
///
/// `None` leaves a field alone. For optional criteria, `Some(None)` clears the
/// field and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub media_type: Option<Option<MediaType>>,
    pub directory: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub date_from: Option<Option<DateTime<Utc>>>,
    pub date_to: Option<Option<DateTime<Utc>>>,
}

impl FilterUpdate {
    pub fn search(search: impl Into<String>) -> Self {
        FilterUpdate {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn media_type(media_type: Option<MediaType>) -> Self {
        FilterUpdate {
            media_type: Some(media_type),
            ..Default::default()
        }
    }

    pub fn directory(directory: Option<String>) -> Self {
        FilterUpdate {
            directory: Some(directory),
            ..Default::default()
        }
    }

    pub fn tags(tags: Vec<String>) -> Self {
        FilterUpdate {
            tags: Some(tags),
            ..Default::default()
        }
    }

    pub fn date_range(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        FilterUpdate {
            date_from: Some(from),
            date_to: Some(to),
            ..Default::default()
        }
    }

    /// Builder-style helper to clear the media type alongside other changes.
    pub fn clear_media_type(mut self) -> Self {
        self.media_type = Some(None);
        self
    }
}
