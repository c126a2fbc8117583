//! Session layer for Fractal Quest.
//!
//! Wraps the pure logic in `fractal-logic` with persistence: a
//! [`Progression`] owns the save and writes it through a [`SaveStore`],
//! and a [`ChapterVisit`] drives one gate scene up to a committed
//! completion.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`storage`] | `SaveStore` trait, in-memory and file-backed stores |
//! | [`progression`] | Load-or-init, completion, navigation, new game |
//! | [`visit`] | Gate scene lifecycle and post-completion routing |
//! | [`error`] | `StorageError` and `ProgressError` |

pub mod error;
pub mod progression;
pub mod storage;
pub mod visit;

pub use error::{ProgressError, StorageError};
pub use progression::{LoadOutcome, Progression};
pub use storage::{FileStore, MemoryStore, SaveStore};
pub use visit::{ChapterVisit, Route, VisitOutcome, VisitState};
