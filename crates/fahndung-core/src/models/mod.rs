//! Data models for the media gallery
//!
//! Each sub-module covers one piece of gallery state; everything is
//! re-exported here for convenient imports.

mod filter;
mod media;
mod page;
mod selection;
mod upload;

pub use filter::*;
pub use media::{parse_timestamp, MediaPatch, MediaRecord, MediaType};
pub use page::*;
pub use selection::*;
pub use upload::*;
