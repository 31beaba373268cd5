//! Error types module
//!
//! All failures the gallery state layer reports to its caller are unified
//! under [`AppError`]. The state containers themselves never fail; errors
//! originate from validation and from the external record source, mutation
//! sink, and upload transport.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like rejected mutations
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Describes how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "MUTATION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Mutation rejected: {0}")]
    Mutation(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid metadata key: {0}")]
    InvalidMetadataKey(String),

    #[error("Invalid metadata value: {0}")]
    InvalidMetadataValue(String),

    #[error("Metadata key limit exceeded: {0}")]
    MetadataKeyLimitExceeded(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),
}

/// Result type for gallery operations
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the entered values and try again"),
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Reload the gallery; the record may have been deleted"),
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce the file size and upload again"),
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload an image, video or document in a supported format"),
            LogLevel::Debug,
        ),
        AppError::Mutation(_) => (
            "MUTATION_FAILED",
            true,
            Some("Retry the change after a short delay"),
            LogLevel::Warn,
        ),
        AppError::Upload(_) => (
            "UPLOAD_FAILED",
            true,
            Some("Retry the upload"),
            LogLevel::Warn,
        ),
        AppError::Backend(_) => (
            "BACKEND_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::InvalidMetadataKey(_) => (
            "INVALID_METADATA_KEY",
            false,
            Some("Use only letters, digits, underscore, hyphen, dot or colon"),
            LogLevel::Debug,
        ),
        AppError::InvalidMetadataValue(_) => (
            "INVALID_METADATA_VALUE",
            false,
            Some("Shorten the metadata value"),
            LogLevel::Debug,
        ),
        AppError::MetadataKeyLimitExceeded(_) => (
            "METADATA_KEY_LIMIT_EXCEEDED",
            false,
            Some("Remove unused metadata keys"),
            LogLevel::Debug,
        ),
        AppError::InvalidTag(_) => (
            "INVALID_TAG",
            false,
            Some("Use shorter, non-empty tags"),
            LogLevel::Debug,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Backend(_) => "The server could not be reached".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "An internal error occurred".to_string()
            }
            AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::UnsupportedMediaType(msg)
            | AppError::Mutation(msg)
            | AppError::Upload(msg)
            | AppError::InvalidMetadataKey(msg)
            | AppError::InvalidMetadataValue(msg)
            | AppError::MetadataKeyLimitExceeded(msg)
            | AppError::InvalidTag(msg) => msg.clone(),
        }
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}
