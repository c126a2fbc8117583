//! Error taxonomy for the session layer.
//!
//! Gates never fail; they ignore what they do not understand. Everything
//! here comes from the progression store or its storage backend and is
//! returned to the caller, never retried internally.

use fractal_logic::catalog::ChapterId;
use thiserror::Error;

/// Failures of a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend switched off, out of quota, or otherwise refusing access.
    #[error("storage is unavailable")]
    Unavailable,
    #[error("io error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures surfaced by the progression store and chapter visits.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The save points at a chapter the catalog does not have. Offer a new game.
    #[error("current chapter {0} is not in the catalog")]
    InvalidState(ChapterId),
    /// A write did not reach storage; in-memory progress is unchanged.
    #[error("save could not be persisted: {0}")]
    StorageUnavailable(#[from] StorageError),
    #[error("chapter {0} is not in the catalog")]
    UnknownChapter(ChapterId),
    #[error("visit is for chapter {visit} but the player is on chapter {current}")]
    ChapterMismatch {
        visit: ChapterId,
        current: ChapterId,
    },
    #[error("chapter {0} was already committed by this visit")]
    AlreadyCommitted(ChapterId),
    #[error("could not encode save record: {0}")]
    Encode(#[from] serde_json::Error),
}
