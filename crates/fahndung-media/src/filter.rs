//! Filter predicate engine.
//!
//! Pure functions deciding whether a record matches the current
//! [`FilterCriteria`]. Every active criterion must match (AND); filtering never
//! reorders its input.

use fahndung_core::models::{FilterCriteria, MediaRecord};

/// Returns `true` if `record` satisfies every active criterion.
pub fn matches(record: &MediaRecord, criteria: &FilterCriteria) -> bool {
    matches_search(record, &criteria.search)
        && criteria
            .media_type
            .map_or(true, |media_type| record.media_type == media_type)
        && matches_directory(record, criteria.directory.as_deref())
        && matches_tags(record, &criteria.tags)
        && matches_date_range(record, criteria)
}

/// Keep the records matching `criteria`, in their original order.
pub fn filter_all(records: &[MediaRecord], criteria: &FilterCriteria) -> Vec<MediaRecord> {
    if criteria.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| matches(record, criteria))
        .cloned()
        .collect()
}

/// Case-insensitive substring match against name, description, or any tag.
fn matches_search(record: &MediaRecord, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    record.original_name.to_lowercase().contains(&needle)
        || record
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

fn matches_directory(record: &MediaRecord, directory: Option<&str>) -> bool {
    match directory {
        Some(dir) if !dir.is_empty() => record.directory == dir,
        _ => true,
    }
}

/// OR semantics: one shared tag is enough.
fn matches_tags(record: &MediaRecord, tags: &[String]) -> bool {
    tags.is_empty() || tags.iter().any(|tag| record.has_tag(tag))
}

/// Inclusive bounds. A record whose timestamp cannot be parsed fails only when
/// a bound is actually set.
fn matches_date_range(record: &MediaRecord, criteria: &FilterCriteria) -> bool {
    if !criteria.has_date_range() {
        return true;
    }

    let Some(uploaded_at) = record.uploaded_at_utc() else {
        return false;
    };

    if let Some(from) = criteria.date_from {
        if uploaded_at < from {
            return false;
        }
    }

    if let Some(to) = criteria.date_to {
        if uploaded_at > to {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fahndung_core::models::MediaType;

    fn record(id: &str, name: &str, media_type: MediaType, tags: &[&str]) -> MediaRecord {
        MediaRecord {
            id: id.to_string(),
            original_name: name.to_string(),
            file_path: format!("allgemein/{}", name),
            file_size: 100,
            mime_type: "application/octet-stream".to_string(),
            width: None,
            height: None,
            media_type,
            directory: "allgemein".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: None,
            is_public: true,
            uploaded_at: "2024-05-10T08:00:00Z".to_string(),
            uploaded_by: None,
            metadata: None,
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let records = vec![
            record("1", "cat.jpg", MediaType::Image, &[]),
            record("2", "dog.mp4", MediaType::Video, &["animal"]),
        ];
        assert_eq!(filter_all(&records, &FilterCriteria::default()), records);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_description_tags() {
        let mut rec = record("1", "Phantombild.PNG", MediaType::Image, &["Zeugenaussage"]);
        rec.description = Some("Aufnahme vom Hauptbahnhof".to_string());

        for search in ["phantom", "HAUPTBAHNHOF", "zeugen", "  png  "] {
            let criteria = FilterCriteria {
                search: search.to_string(),
                ..Default::default()
            };
            assert!(matches(&rec, &criteria), "search {:?} should match", search);
        }

        let criteria = FilterCriteria {
            search: "flughafen".to_string(),
            ..Default::default()
        };
        assert!(!matches(&rec, &criteria));
    }

    #[test]
    fn test_type_and_directory_are_exact() {
        let mut rec = record("1", "scan.pdf", MediaType::Document, &[]);
        rec.directory = "dokumente".to_string();

        let by_type = FilterCriteria {
            media_type: Some(MediaType::Document),
            ..Default::default()
        };
        assert!(matches(&rec, &by_type));

        let wrong_type = FilterCriteria {
            media_type: Some(MediaType::Image),
            ..Default::default()
        };
        assert!(!matches(&rec, &wrong_type));

        let partial_dir = FilterCriteria {
            directory: Some("dok".to_string()),
            ..Default::default()
        };
        assert!(!matches(&rec, &partial_dir));

        let empty_dir = FilterCriteria {
            directory: Some(String::new()),
            ..Default::default()
        };
        assert!(matches(&rec, &empty_dir));
    }

    #[test]
    fn test_tags_use_or_semantics() {
        let rec = record("1", "a.jpg", MediaType::Image, &["tatort", "nacht"]);
        let any_of = FilterCriteria {
            tags: vec!["tag".to_string(), "nacht".to_string()],
            ..Default::default()
        };
        assert!(matches(&rec, &any_of));

        let none_of = FilterCriteria {
            tags: vec!["tag".to_string()],
            ..Default::default()
        };
        assert!(!matches(&rec, &none_of));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let rec = record("1", "a.jpg", MediaType::Image, &[]);
        let exact = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();

        let criteria = FilterCriteria {
            date_from: Some(exact),
            date_to: Some(exact),
            ..Default::default()
        };
        assert!(matches(&rec, &criteria));

        let later = FilterCriteria {
            date_from: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(!matches(&rec, &later));

        let earlier = FilterCriteria {
            date_to: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(!matches(&rec, &earlier));
    }

    #[test]
    fn test_malformed_timestamp_only_fails_active_date_range() {
        let mut rec = record("1", "a.jpg", MediaType::Image, &[]);
        rec.uploaded_at = "not a date".to_string();

        assert!(matches(&rec, &FilterCriteria::default()));
        assert!(matches(
            &rec,
            &FilterCriteria {
                search: "a.jpg".to_string(),
                ..Default::default()
            }
        ));

        let ranged = FilterCriteria {
            date_from: Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(!matches(&rec, &ranged));
    }

    #[test]
    fn test_filter_all_is_stable_and_idempotent() {
        let records = vec![
            record("3", "c.jpg", MediaType::Image, &["x"]),
            record("1", "a.mp4", MediaType::Video, &["x"]),
            record("2", "b.jpg", MediaType::Image, &["y"]),
            record("4", "d.jpg", MediaType::Image, &["x"]),
        ];
        let criteria = FilterCriteria {
            media_type: Some(MediaType::Image),
            tags: vec!["x".to_string()],
            ..Default::default()
        };

        let once = filter_all(&records, &criteria);
        let ids: Vec<&str> = once.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);
        assert_eq!(filter_all(&once, &criteria), once);
    }
}
