//! Fahndung Media
//!
//! Client-side state for the media gallery: filtering, selection, optimistic
//! edits and upload tracking, plus the service that drives backend calls
//! through them.

pub mod backend;
pub mod filter;
pub mod optimistic;
pub mod selection;
pub mod service;
pub mod store;
pub mod upload;

pub use backend::{
    InMemoryBackend, MediaBackend, MutationSink, RecordSource, UploadTransport, VocabularySource,
};
pub use filter::{filter_all, matches};
pub use optimistic::{Intent, OptimisticOverlay, Outcome, Resolved};
pub use selection::SelectionTracker;
pub use service::{MediaService, UploadOutcome};
pub use store::{LoadState, MediaStore, StoreSnapshot};
pub use upload::UploadTracker;
