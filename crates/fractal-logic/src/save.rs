//! SaveGame model and the pure chapter-completion transition.
//!
//! [`SaveGame`] is the in-memory player record. Its fields are private so
//! the only ways to change it are the transitions below, which keep the
//! invariants: `completed` only grows, `xp` never drops, milestone flags
//! never revert and `level` is always recomputed from `xp`.
//!
//! [`SaveRecord`] is the persisted layout. It mirrors the browser save
//! exactly (camelCase keys) so existing saves load unchanged.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ChapterId, MilestoneBadge, MILESTONE_BADGES};
use crate::rules::{next_chapter_id, ProgressionRules};

/// Player progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveGame {
    current_chapter_id: ChapterId,
    completed: BTreeSet<ChapterId>,
    xp: u32,
    level: u32,
    commissioned: bool,
    sealed: bool,
}

impl SaveGame {
    /// Fresh game: chapter 1, nothing completed, no XP.
    pub fn new() -> Self {
        Self {
            current_chapter_id: 1,
            completed: BTreeSet::new(),
            xp: 0,
            level: 1,
            commissioned: false,
            sealed: false,
        }
    }

    pub fn current_chapter_id(&self) -> ChapterId {
        self.current_chapter_id
    }

    pub fn completed(&self) -> &BTreeSet<ChapterId> {
        &self.completed
    }

    pub fn is_completed(&self, id: ChapterId) -> bool {
        self.completed.contains(&id)
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn commissioned(&self) -> bool {
        self.commissioned
    }

    pub fn sealed(&self) -> bool {
        self.sealed
    }

    /// Milestone badges whose chapter is completed.
    pub fn earned_badges(&self) -> Vec<&'static MilestoneBadge> {
        MILESTONE_BADGES
            .iter()
            .filter(|b| self.completed.contains(&b.chapter))
            .collect()
    }

    /// First milestone badge not yet earned, `None` once all are held.
    pub fn next_badge(&self) -> Option<&'static MilestoneBadge> {
        MILESTONE_BADGES
            .iter()
            .find(|b| !self.completed.contains(&b.chapter))
    }

    /// Chapter 1 is always open; chapter N opens once N-1 is completed.
    pub fn is_accessible(&self, id: ChapterId) -> bool {
        id == 1 || (id > 1 && self.completed.contains(&(id - 1)))
    }

    /// Result of completing the current chapter. Does not touch `self`.
    pub fn advance(&self, rules: &ProgressionRules, final_chapter: ChapterId) -> Self {
        let id = self.current_chapter_id;
        let mut completed = self.completed.clone();
        completed.insert(id);

        let xp = self.xp.saturating_add(rules.xp_per_chapter);

        Self {
            current_chapter_id: next_chapter_id(id, final_chapter),
            completed,
            xp,
            level: rules.level_for_xp(xp),
            commissioned: self.commissioned || id == rules.commission_chapter,
            sealed: self.sealed || id == rules.seal_chapter,
        }
    }

    /// Same record with the cursor moved. XP and completions are untouched.
    pub fn moved_to(&self, id: ChapterId) -> Self {
        Self {
            current_chapter_id: id,
            ..self.clone()
        }
    }

    /// Drop completed ids the catalog does not know. Returns what was dropped.
    pub fn retain_known(&mut self, catalog: &Catalog) -> Vec<ChapterId> {
        let unknown: Vec<ChapterId> = self
            .completed
            .iter()
            .copied()
            .filter(|id| !catalog.contains(*id))
            .collect();
        for id in &unknown {
            self.completed.remove(id);
        }
        unknown
    }

    /// Rebuild from a persisted record; the stored level is ignored.
    pub fn from_record(record: SaveRecord, rules: &ProgressionRules) -> Self {
        Self {
            current_chapter_id: record.current_chapter_id,
            completed: record.completed.into_iter().collect(),
            xp: record.xp,
            level: rules.level_for_xp(record.xp),
            commissioned: record.commissioned.unwrap_or(false),
            sealed: record.sealed.unwrap_or(false),
        }
    }

    pub fn to_record(&self) -> SaveRecord {
        SaveRecord {
            current_chapter_id: self.current_chapter_id,
            completed: self.completed.iter().copied().collect(),
            xp: self.xp,
            level: self.level,
            commissioned: Some(self.commissioned),
            sealed: Some(self.sealed),
        }
    }
}

impl Default for SaveGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted save layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub current_chapter_id: ChapterId,
    #[serde(default)]
    pub completed: Vec<ChapterId>,
    pub xp: u32,
    /// Written for readers that expect it; never trusted on load.
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub commissioned: Option<bool>,
    #[serde(default)]
    pub sealed: Option<bool>,
}
