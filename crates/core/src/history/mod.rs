//! Persisted search history, used to enforce the re-search cooldown.

mod store;

pub use store::SearchHistory;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from persisting the history store. Load failures are not
/// errors (a broken store means an empty history); losing freshly
/// recorded entries on save is.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to encode search history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {}: {}", .path.display(), .source)]
    Io { path: PathBuf, source: io::Error },
}
