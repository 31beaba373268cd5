//! Configuration module
//!
//! Gallery settings loaded from the environment (a `.env` file is honoured),
//! with defaults that match the hosted backend's limits.

use std::env;

const PAGE_SIZE: u32 = 24;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const MAX_TAGS_PER_RECORD: usize = 20;
const MAX_CONCURRENT_UPLOADS: usize = 3;
const MAX_PAGE_SIZE: u32 = 200;

const DEFAULT_DIRECTORIES: &str = "allgemein,fahndungen,vermisste,beweismittel,dokumente";
const DEFAULT_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp,\
video/mp4,video/webm,video/quicktime,\
application/pdf,application/msword,\
application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Gallery configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub environment: String,
    /// Records requested per page from the record source
    pub page_size: u32,
    pub max_upload_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    /// Directory vocabulary used when the backend cannot provide one
    pub default_directories: Vec<String>,
    pub max_tags_per_record: usize,
    /// Upper bound on parallel uploads for callers that batch
    pub max_concurrent_uploads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config::from_vars(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Config::from_vars(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build a config from an arbitrary variable lookup. Unset or unparseable
    /// values fall back to their defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_upload_size_mb = lookup("FAHNDUNG_MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Config {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            page_size: lookup("FAHNDUNG_PAGE_SIZE")
                .unwrap_or_else(|| PAGE_SIZE.to_string())
                .trim()
                .parse()
                .unwrap_or(PAGE_SIZE),
            max_upload_size_bytes: max_upload_size_mb.saturating_mul(1024 * 1024),
            allowed_content_types: split_list(
                &lookup("FAHNDUNG_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPES.to_string()),
                true,
            ),
            default_directories: split_list(
                &lookup("FAHNDUNG_DEFAULT_DIRECTORIES")
                    .unwrap_or_else(|| DEFAULT_DIRECTORIES.to_string()),
                false,
            ),
            max_tags_per_record: lookup("FAHNDUNG_MAX_TAGS")
                .unwrap_or_else(|| MAX_TAGS_PER_RECORD.to_string())
                .trim()
                .parse()
                .unwrap_or(MAX_TAGS_PER_RECORD),
            max_concurrent_uploads: lookup("FAHNDUNG_MAX_CONCURRENT_UPLOADS")
                .unwrap_or_else(|| MAX_CONCURRENT_UPLOADS.to_string())
                .trim()
                .parse()
                .unwrap_or(MAX_CONCURRENT_UPLOADS),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(anyhow::anyhow!(
                "FAHNDUNG_PAGE_SIZE must be between 1 and {}",
                MAX_PAGE_SIZE
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "FAHNDUNG_MAX_UPLOAD_SIZE_MB must be greater than 0"
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "FAHNDUNG_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.default_directories.is_empty() {
            return Err(anyhow::anyhow!(
                "FAHNDUNG_DEFAULT_DIRECTORIES must list at least one directory"
            ));
        }

        if self.max_concurrent_uploads == 0 {
            return Err(anyhow::anyhow!(
                "FAHNDUNG_MAX_CONCURRENT_UPLOADS must be greater than 0"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let content_type = content_type.trim().to_lowercase();
        self.allowed_content_types.iter().any(|t| *t == content_type)
    }
}

fn split_list(raw: &str, lowercase: bool) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if lowercase {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        })
        .collect()
}
