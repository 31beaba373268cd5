use serde::{Deserialize, Serialize};

use super::filter::FilterCriteria;
use super::media::MediaRecord;

/// Paged query sent to the record source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub filters: FilterCriteria,
    pub limit: u32,
    pub offset: u32,
}

/// One page of records as returned by the record source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    pub items: Vec<MediaRecord>,
    pub has_more: bool,
    pub total: u64,
}

/// Pagination bookkeeping held by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Zero-based index of the last page loaded
    pub page: u32,
    /// Source records consumed under the current filters; the next page
    /// starts here. Confirmed deletes and uploads shift it.
    #[serde(default)]
    pub offset: u32,
    pub has_more: bool,
    pub total: u64,
}
