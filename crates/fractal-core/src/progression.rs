//! Progression store: the single owner of the player's save.
//!
//! Holds the in-memory [`SaveGame`], the chapter catalog and the rules, and
//! writes through to a [`SaveStore`] on every transition. Writes happen
//! before the in-memory swap, so a failed write leaves both storage and
//! memory at the previous state and the caller can simply try again.
//!
//! When the stored save could not be read, the session runs in memory only:
//! nothing is written until the player completes a chapter or starts a new
//! game, so a save that may still exist is never replaced by the fallback.

use fractal_logic::catalog::{Catalog, Chapter, ChapterId};
use fractal_logic::rules::{validate_rules, ProgressionRules};
use fractal_logic::save::{SaveGame, SaveRecord};

use crate::error::ProgressError;
use crate::storage::SaveStore;

/// How the store came up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored save was read and decoded.
    Restored,
    /// Nothing was stored; a fresh game was created and written.
    Initialized,
    /// Storage could not be read or written. Progress lives in memory only.
    StorageUnavailable(String),
    /// Stored bytes did not decode. They are left untouched until the next write.
    Unreadable(String),
}

impl LoadOutcome {
    /// True when the player should be told progress may not survive.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            LoadOutcome::StorageUnavailable(_) | LoadOutcome::Unreadable(_)
        )
    }
}

pub struct Progression<S: SaveStore> {
    store: S,
    catalog: Catalog,
    rules: ProgressionRules,
    save: SaveGame,
    outcome: LoadOutcome,
    /// Set while the stored save is unknown; suppresses implicit writes.
    in_memory_only: bool,
}

impl<S: SaveStore> Progression<S> {
    /// Read the save under `rules.storage_key`, or start a new game.
    ///
    /// Never fails: unreadable or unavailable storage degrades to an
    /// in-memory default, reported through [`Progression::load_outcome`].
    pub fn load_or_init(store: S, catalog: Catalog, rules: ProgressionRules) -> Self {
        for problem in validate_rules(&rules, &catalog) {
            log::warn!("Progression rules: {}", problem);
        }

        let mut progression = Self {
            store,
            catalog,
            rules,
            save: SaveGame::new(),
            outcome: LoadOutcome::Initialized,
            in_memory_only: false,
        };

        let key = progression.rules.storage_key.clone();
        progression.outcome = match progression.store.get(&key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<SaveRecord>(&bytes) {
                Ok(record) => {
                    let mut save = SaveGame::from_record(record, &progression.rules);
                    let dropped = save.retain_known(&progression.catalog);
                    if !dropped.is_empty() {
                        log::warn!("Dropped unknown completed chapters {:?}", dropped);
                    }
                    progression.save = save;
                    log::info!(
                        "Restored save: chapter {}, {} completed, {} xp",
                        progression.save.current_chapter_id(),
                        progression.save.completed().len(),
                        progression.save.xp()
                    );
                    LoadOutcome::Restored
                }
                Err(e) => {
                    log::warn!("Save under '{}' is unreadable, starting fresh: {}", key, e);
                    progression.in_memory_only = true;
                    LoadOutcome::Unreadable(e.to_string())
                }
            },
            Ok(None) => match progression.persist(&SaveGame::new()) {
                Ok(()) => {
                    log::info!("No save under '{}', created a new game", key);
                    LoadOutcome::Initialized
                }
                Err(e) => {
                    log::warn!("Could not write initial save: {}", e);
                    LoadOutcome::StorageUnavailable(e.to_string())
                }
            },
            Err(e) => {
                log::warn!("Storage unavailable, progress will not be saved: {}", e);
                progression.in_memory_only = true;
                LoadOutcome::StorageUnavailable(e.to_string())
            }
        };

        progression
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    pub fn save(&self) -> &SaveGame {
        &self.save
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &ProgressionRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// True until the player's first committed completion or new game when
    /// the stored save could not be read.
    pub fn is_in_memory_only(&self) -> bool {
        self.in_memory_only
    }

    pub fn current_chapter_id(&self) -> ChapterId {
        self.save.current_chapter_id()
    }

    /// The chapter the player is on.
    pub fn current_chapter(&self) -> Result<&Chapter, ProgressError> {
        let id = self.save.current_chapter_id();
        self.catalog
            .lookup(id)
            .ok_or(ProgressError::InvalidState(id))
    }

    pub fn xp(&self) -> u32 {
        self.save.xp()
    }

    pub fn level(&self) -> u32 {
        self.save.level()
    }

    pub fn commissioned(&self) -> bool {
        self.save.commissioned()
    }

    pub fn sealed(&self) -> bool {
        self.save.sealed()
    }

    pub fn is_completed(&self, id: ChapterId) -> bool {
        self.save.is_completed(id)
    }

    pub fn is_accessible(&self, id: ChapterId) -> bool {
        self.catalog.contains(id) && self.save.is_accessible(id)
    }

    /// Record completion of the current chapter and persist it.
    ///
    /// On any error the in-memory save is unchanged.
    pub fn complete_current_chapter(&mut self) -> Result<&SaveGame, ProgressError> {
        let chapter_id = self.current_chapter()?.id;
        let next = self
            .save
            .advance(&self.rules, self.catalog.final_chapter());
        self.persist(&next)?;
        self.in_memory_only = false;

        if next.commissioned() && !self.save.commissioned() {
            log::info!("Commissioned at chapter {}", chapter_id);
        }
        if next.sealed() && !self.save.sealed() {
            log::info!("Sealed at chapter {}", chapter_id);
        }
        if next.level() > self.save.level() {
            log::info!("Level up: {} -> {}", self.save.level(), next.level());
        }
        log::info!(
            "Completed chapter {} ({} xp), now on chapter {}",
            chapter_id,
            next.xp(),
            next.current_chapter_id()
        );

        self.save = next;
        Ok(&self.save)
    }

    /// Jump to any known chapter. Accessibility is the caller's call.
    ///
    /// A pure cursor move: it always succeeds in memory and the write is
    /// best effort. A failed write is picked up by the next flush.
    pub fn go_to_chapter(&mut self, id: ChapterId) -> Result<&SaveGame, ProgressError> {
        if !self.catalog.contains(id) {
            return Err(ProgressError::UnknownChapter(id));
        }
        self.save = self.save.moved_to(id);
        log::debug!("Moved to chapter {}", id);
        if !self.in_memory_only {
            let save = self.save.clone();
            if let Err(e) = self.persist(&save) {
                log::warn!("Chapter {} not saved yet: {}", id, e);
            }
        }
        Ok(&self.save)
    }

    /// Overwrite the save with a fresh game.
    pub fn start_new_game(&mut self) -> Result<&SaveGame, ProgressError> {
        let fresh = SaveGame::new();
        self.persist(&fresh)?;
        log::info!("Started a new game");
        self.save = fresh;
        self.outcome = LoadOutcome::Initialized;
        self.in_memory_only = false;
        Ok(&self.save)
    }

    /// Write the current in-memory save again.
    ///
    /// Does nothing while the session is in memory only.
    pub fn flush(&mut self) -> Result<(), ProgressError> {
        if self.in_memory_only {
            log::debug!("Skipping flush: stored save was never read");
            return Ok(());
        }
        let save = self.save.clone();
        self.persist(&save)
    }

    /// Flush and hand the store back.
    pub fn close(mut self) -> Result<S, ProgressError> {
        self.flush()?;
        log::debug!("Progression closed at chapter {}", self.save.current_chapter_id());
        Ok(self.store)
    }

    /// Hand the store back without writing.
    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self, save: &SaveGame) -> Result<(), ProgressError> {
        let bytes = serde_json::to_vec(&save.to_record())?;
        self.store.set(&self.rules.storage_key, &bytes)?;
        Ok(())
    }
}
