//! Optimistic-update overlay.
//!
//! Each pending edit is an [`Intent`] keyed by record id. Callers `apply` an
//! intent before issuing the real mutation and resolve it exactly once with
//! `commit` or `rollback` afterwards. Resolution consumes the intent, so a
//! second resolution for the same edit finds nothing and is a no-op.

use std::collections::HashMap;

use fahndung_core::models::{MediaPatch, MediaRecord};
use serde::Serialize;

/// A local edit awaiting backend confirmation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    pub record_id: String,
    /// Monotonic sequence number, bumped whenever the intent changes
    pub seq: u64,
    pub patch: MediaPatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Committed,
    RolledBack,
}

/// The terminal transition of an intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub intent: Intent,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimisticOverlay {
    pending: HashMap<String, Intent>,
    next_seq: u64,
}

impl OptimisticOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `patch` for `id`. If an intent is already pending for `id` the
    /// new fields are merged over it. Returns the intent's sequence number.
    pub fn apply(&mut self, id: &str, patch: MediaPatch) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.pending
            .entry(id.to_string())
            .and_modify(|intent| {
                intent.patch.merge(patch.clone());
                intent.seq = seq;
            })
            .or_insert_with(|| Intent {
                record_id: id.to_string(),
                seq,
                patch,
            });
        seq
    }

    /// Drop the intent for `id` after the authoritative record was updated.
    pub fn commit(&mut self, id: &str) -> Option<Resolved> {
        self.resolve(id, Outcome::Committed)
    }

    /// Drop the intent for `id` because its mutation failed; the record
    /// reverts to its last authoritative state.
    pub fn rollback(&mut self, id: &str) -> Option<Resolved> {
        self.resolve(id, Outcome::RolledBack)
    }

    fn resolve(&mut self, id: &str, outcome: Outcome) -> Option<Resolved> {
        self.pending
            .remove(id)
            .map(|intent| Resolved { intent, outcome })
    }

    /// Remove intents whose record is gone. Returns how many were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.pending.len();
        self.pending.retain(|id, _| keep(id));
        before - self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending(&self, id: &str) -> Option<&Intent> {
        self.pending.get(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The record as the user should see it: the pending patch wins over the
    /// authoritative fields.
    pub fn project_one(&self, record: &MediaRecord) -> MediaRecord {
        match self.pending.get(&record.id) {
            Some(intent) => intent.patch.apply_to(record),
            None => record.clone(),
        }
    }

    /// Project every record, preserving order.
    pub fn project(&self, records: &[MediaRecord]) -> Vec<MediaRecord> {
        records.iter().map(|r| self.project_one(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fahndung_core::models::MediaType;

    fn record(id: &str, tags: &[&str]) -> MediaRecord {
        let mut rec = MediaRecord::new(id, "a.jpg", "image/jpeg", "allgemein");
        rec.tags = tags.iter().map(|t| t.to_string()).collect();
        rec
    }

    #[test]
    fn test_patch_wins_until_rollback() {
        let mut overlay = OptimisticOverlay::new();
        let records = vec![record("1", &["a"])];

        overlay.apply("1", MediaPatch::tags(vec!["b".to_string()]));
        assert_eq!(overlay.project(&records)[0].tags, vec!["b".to_string()]);

        let resolved = overlay.rollback("1").expect("intent was pending");
        assert_eq!(resolved.outcome, Outcome::RolledBack);
        assert_eq!(overlay.project(&records)[0].tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_resolution_happens_once() {
        let mut overlay = OptimisticOverlay::new();
        overlay.apply("1", MediaPatch::visibility(false));
        assert!(overlay.commit("1").is_some());
        assert!(overlay.commit("1").is_none());
        assert!(overlay.rollback("1").is_none());
        assert!(overlay.rollback("unknown").is_none());
    }

    #[test]
    fn test_second_apply_merges() {
        let mut overlay = OptimisticOverlay::new();
        let first = overlay.apply("1", MediaPatch::tags(vec!["b".to_string()]));
        let second = overlay.apply("1", MediaPatch::directory("beweismittel"));
        assert!(second > first);

        let projected = overlay.project_one(&record("1", &["a"]));
        assert_eq!(projected.tags, vec!["b".to_string()]);
        assert_eq!(projected.directory, "beweismittel");
        assert_eq!(projected.media_type, MediaType::Image);
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_unpatched_records_pass_through() {
        let mut overlay = OptimisticOverlay::new();
        overlay.apply("2", MediaPatch::visibility(false));
        let records = vec![record("1", &["a"]), record("2", &[])];
        let projected = overlay.project(&records);
        assert_eq!(projected[0], records[0]);
        assert!(!projected[1].is_public);
    }

    #[test]
    fn test_retain_prunes() {
        let mut overlay = OptimisticOverlay::new();
        overlay.apply("1", MediaPatch::visibility(false));
        overlay.apply("2", MediaPatch::visibility(false));
        assert_eq!(overlay.retain(|id| id == "2"), 1);
        assert!(!overlay.is_pending("1"));
        assert!(overlay.pending("2").is_some());
    }
}
