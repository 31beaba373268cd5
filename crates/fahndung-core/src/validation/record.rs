//! Validation of record edits and upload requests before they reach the
//! backend.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{MediaPatch, UploadFile};

use super::metadata::validate_metadata;

/// Maximum length of a single tag
pub const MAX_TAG_LENGTH: usize = 64;

/// Maximum length of a record description
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

pub fn validate_tags(tags: &[String], max_tags: usize) -> AppResult<()> {
    if tags.len() > max_tags {
        return Err(AppError::InvalidTag(format!(
            "A record can carry at most {} tags",
            max_tags
        )));
    }

    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidTag("Tag must not be empty".to_string()));
        }
        if trimmed.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::InvalidTag(format!(
                "Tag '{}' exceeds maximum length of {} characters",
                trimmed, MAX_TAG_LENGTH
            )));
        }
    }

    Ok(())
}

pub fn validate_patch(patch: &MediaPatch, config: &Config) -> AppResult<()> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("Patch contains no changes".to_string()));
    }

    if let Some(ref name) = patch.original_name {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("Name must not be empty".to_string()));
        }
    }

    if let Some(ref directory) = patch.directory {
        if directory.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Directory must not be empty".to_string(),
            ));
        }
    }

    if let Some(ref tags) = patch.tags {
        validate_tags(tags, config.max_tags_per_record)?;
    }

    if let Some(Some(ref description)) = patch.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Description exceeds maximum length of {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
    }

    if let Some(ref metadata) = patch.metadata {
        validate_metadata(metadata)?;
    }

    Ok(())
}

pub fn validate_upload(file: &UploadFile, directory: &str, config: &Config) -> AppResult<()> {
    if file.file_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "File name must not be empty".to_string(),
        ));
    }

    if directory.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Target directory must not be empty".to_string(),
        ));
    }

    if file.size() == 0 {
        return Err(AppError::InvalidInput(format!(
            "File '{}' is empty",
            file.file_name
        )));
    }

    if file.size() > config.max_upload_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File '{}' is {} bytes, limit is {} bytes",
            file.file_name,
            file.size(),
            config.max_upload_size_bytes
        )));
    }

    if !config.is_content_type_allowed(&file.content_type) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Content type '{}' is not allowed",
            file.content_type
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tags() {
        let config = Config::default();
        let ok = vec!["zeuge".to_string(), "tatort".to_string()];
        assert!(validate_tags(&ok, config.max_tags_per_record).is_ok());

        assert!(validate_tags(&["  ".to_string()], 20).is_err());
        assert!(validate_tags(&["x".repeat(MAX_TAG_LENGTH + 1)], 20).is_err());

        let too_many: Vec<String> = (0..3).map(|i| i.to_string()).collect();
        assert!(matches!(
            validate_tags(&too_many, 2),
            Err(AppError::InvalidTag(_))
        ));
    }

    #[test]
    fn test_validate_patch() {
        let config = Config::default();
        assert!(validate_patch(&MediaPatch::tags(vec!["a".to_string()]), &config).is_ok());
        assert!(validate_patch(&MediaPatch::description(None), &config).is_ok());
        assert!(matches!(
            validate_patch(&MediaPatch::default(), &config),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_patch(&MediaPatch::directory(" "), &config).is_err());

        let bad_metadata = MediaPatch {
            metadata: Some(serde_json::json!({ "bad key": 1 })),
            ..Default::default()
        };
        assert!(matches!(
            validate_patch(&bad_metadata, &config),
            Err(AppError::InvalidMetadataKey(_))
        ));
    }

    #[test]
    fn test_validate_upload() {
        let config = Config::default();
        let file = UploadFile::new("cat.jpg", "image/jpeg", vec![1, 2, 3]);
        assert!(validate_upload(&file, "allgemein", &config).is_ok());

        let empty = UploadFile::new("cat.jpg", "image/jpeg", Vec::new());
        assert!(validate_upload(&empty, "allgemein", &config).is_err());

        let exe = UploadFile::new("tool.exe", "application/x-msdownload", vec![0]);
        assert!(matches!(
            validate_upload(&exe, "allgemein", &config),
            Err(AppError::UnsupportedMediaType(_))
        ));

        let small = Config {
            max_upload_size_bytes: 2,
            ..Config::default()
        };
        assert!(matches!(
            validate_upload(&file, "allgemein", &small),
            Err(AppError::PayloadTooLarge(_))
        ));

        assert!(validate_upload(&file, "", &config).is_err());
    }
}
