//! Fahndung Core Library
//!
//! Domain models, error types, configuration, and validation shared by the
//! gallery state layer and its tooling.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult, ErrorMetadata, LogLevel};
