//! Validation modules

pub mod metadata;
pub mod record;

pub use metadata::{
    is_reserved_key, validate_metadata, validate_metadata_key, validate_metadata_value,
    MAX_METADATA_KEYS, MAX_METADATA_KEY_LENGTH, MAX_METADATA_VALUE_LENGTH,
};
pub use record::{
    validate_patch, validate_tags, validate_upload, MAX_DESCRIPTION_LENGTH, MAX_TAG_LENGTH,
};
