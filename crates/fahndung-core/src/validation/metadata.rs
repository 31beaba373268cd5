//! Record metadata validation
//!
//! The free-form `metadata` map on a record is user-editable, so keys are
//! restricted to a safe pattern, values are length-limited once serialized,
//! and keys owned by the case wizard cannot be overwritten from the gallery.

use regex::Regex;

use crate::error::{AppError, AppResult};

/// Maximum length for metadata key names
pub const MAX_METADATA_KEY_LENGTH: usize = 64;

/// Maximum length for metadata values when JSON serialized
pub const MAX_METADATA_VALUE_LENGTH: usize = 512;

/// Maximum number of keys in a record's metadata map
pub const MAX_METADATA_KEYS: usize = 50;

/// Prefixes written by the case wizard and the upload pipeline
const RESERVED_PREFIXES: &[&str] = &["_system_", "_internal_", "fahndung_", "upload_"];

/// Validate a metadata key name.
///
/// Must match `^[a-zA-Z0-9_\-\.:]+$`, be at most 64 characters, and not start
/// with a reserved prefix.
pub fn validate_metadata_key(key: &str) -> AppResult<()> {
    if key.is_empty() {
        return Err(AppError::InvalidMetadataKey(
            "Metadata key cannot be empty".to_string(),
        ));
    }

    if key.len() > MAX_METADATA_KEY_LENGTH {
        return Err(AppError::InvalidMetadataKey(format!(
            "Metadata key '{}' exceeds maximum length of {} characters",
            key, MAX_METADATA_KEY_LENGTH
        )));
    }

    let pattern = Regex::new(r"^[a-zA-Z0-9_\-\.:]+$").map_err(|e| {
        AppError::Internal(format!("Failed to compile metadata key pattern: {}", e))
    })?;

    if !pattern.is_match(key) {
        return Err(AppError::InvalidMetadataKey(format!(
            "Metadata key '{}' contains invalid characters",
            key
        )));
    }

    if is_reserved_key(key) {
        return Err(AppError::InvalidMetadataKey(format!(
            "Metadata key '{}' uses a reserved prefix",
            key
        )));
    }

    Ok(())
}

/// Check if a key starts with a reserved prefix
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

pub fn validate_metadata_value(value: &serde_json::Value) -> AppResult<()> {
    let serialized = serde_json::to_string(value)?;

    if serialized.len() > MAX_METADATA_VALUE_LENGTH {
        return Err(AppError::InvalidMetadataValue(format!(
            "Metadata value exceeds maximum length of {} characters when serialized",
            MAX_METADATA_VALUE_LENGTH
        )));
    }

    Ok(())
}

/// Validate a whole metadata object: it must be a JSON object, within the key
/// limit, and every key/value pair must pass.
pub fn validate_metadata(metadata: &serde_json::Value) -> AppResult<()> {
    let obj = metadata.as_object().ok_or_else(|| {
        AppError::InvalidMetadataValue("Metadata must be a JSON object".to_string())
    })?;

    if obj.len() > MAX_METADATA_KEYS {
        return Err(AppError::MetadataKeyLimitExceeded(format!(
            "Metadata contains {} keys, but maximum allowed is {}",
            obj.len(),
            MAX_METADATA_KEYS
        )));
    }

    for (key, value) in obj.iter() {
        validate_metadata_key(key)?;
        validate_metadata_value(value)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_metadata_key_valid() {
        assert!(validate_metadata_key("aktenzeichen").is_ok());
        assert!(validate_metadata_key("case-id").is_ok());
        assert!(validate_metadata_key("geo.lat").is_ok());
        assert!(validate_metadata_key("source:camera").is_ok());
        assert!(validate_metadata_key("A1").is_ok());
    }

    #[test]
    fn test_validate_metadata_key_invalid() {
        assert!(validate_metadata_key("").is_err());
        assert!(validate_metadata_key("case id").is_err());
        assert!(validate_metadata_key("case/id").is_err());
        assert!(validate_metadata_key(&"a".repeat(MAX_METADATA_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved_key("fahndung_status"));
        assert!(is_reserved_key("upload_session"));
        assert!(!is_reserved_key("status"));
        assert!(matches!(
            validate_metadata_key("_system_flags"),
            Err(AppError::InvalidMetadataKey(_))
        ));
    }

    #[test]
    fn test_validate_metadata_value_too_long() {
        let value = serde_json::json!("a".repeat(MAX_METADATA_VALUE_LENGTH + 1));
        assert!(matches!(
            validate_metadata_value(&value),
            Err(AppError::InvalidMetadataValue(_))
        ));
        assert!(validate_metadata_value(&serde_json::json!({ "nested": [1, 2] })).is_ok());
    }

    #[test]
    fn test_validate_metadata_object() {
        assert!(validate_metadata(&serde_json::json!({ "camera": "A3", "lat": 52.5 })).is_ok());
        assert!(validate_metadata(&serde_json::json!(["not", "an", "object"])).is_err());

        let mut obj = serde_json::Map::new();
        for i in 0..=MAX_METADATA_KEYS {
            obj.insert(format!("key_{}", i), serde_json::json!(i));
        }
        assert!(matches!(
            validate_metadata(&serde_json::Value::Object(obj)),
            Err(AppError::MetadataKeyLimitExceeded(_))
        ));
    }
}
