//! Progression rules: XP rewards, level curve, milestones, terminal clamp.
//!
//! The defaults reproduce the shipped game: 50 XP per chapter, a level
//! every 100 XP, commissioning at chapter 25 and the seal at chapter 27.
//! Rules are plain data so a harness or a mod can load them from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, ChapterId};

/// Storage key of the single save record.
pub const DEFAULT_STORAGE_KEY: &str = "fractal-rpg.save.v1";

/// Tunable progression parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    /// XP granted on every completion, repeats included.
    pub xp_per_chapter: u32,
    /// XP needed per level step.
    pub xp_per_level: u32,
    /// Completing this chapter sets the `commissioned` flag.
    pub commission_chapter: ChapterId,
    /// Completing this chapter sets the `sealed` flag.
    pub seal_chapter: ChapterId,
    pub storage_key: String,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            xp_per_chapter: 50,
            xp_per_level: 100,
            commission_chapter: 25,
            seal_chapter: 27,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl ProgressionRules {
    /// `1 + floor(xp / xp_per_level)`.
    pub fn level_for_xp(&self, xp: u32) -> u32 {
        level_for_xp(xp, self.xp_per_level)
    }
}

/// Level for an XP total. A zero step is treated as a single level.
pub fn level_for_xp(xp: u32, xp_per_level: u32) -> u32 {
    match xp_per_level {
        0 => 1,
        step => 1 + xp / step,
    }
}

/// Next chapter after `id`, clamped at `final_chapter`.
pub fn next_chapter_id(id: ChapterId, final_chapter: ChapterId) -> ChapterId {
    if id < final_chapter {
        id + 1
    } else {
        final_chapter
    }
}

/// Rules validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// Level step of zero would make every player level 1 forever.
    #[error("xp_per_level must be positive")]
    ZeroLevelStep,
    /// Milestone points at a chapter outside the catalog.
    #[error("milestone chapter {0} not in catalog")]
    MilestoneOutOfRange(ChapterId),
    #[error("storage key is empty")]
    EmptyStorageKey,
}

/// Validate rules against a catalog, returning all errors found.
pub fn validate_rules(rules: &ProgressionRules, catalog: &Catalog) -> Vec<RulesError> {
    let mut errors = Vec::new();

    if rules.xp_per_level == 0 {
        errors.push(RulesError::ZeroLevelStep);
    }
    for id in [rules.commission_chapter, rules.seal_chapter] {
        if !catalog.contains(id) {
            errors.push(RulesError::MilestoneOutOfRange(id));
        }
    }
    if rules.storage_key.trim().is_empty() {
        errors.push(RulesError::EmptyStorageKey);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_curve() {
        let rules = ProgressionRules::default();
        assert_eq!(rules.level_for_xp(0), 1);
        assert_eq!(rules.level_for_xp(99), 1);
        assert_eq!(rules.level_for_xp(100), 2);
        assert_eq!(rules.level_for_xp(549), 6);
        assert_eq!(rules.level_for_xp(550), 6);
        assert_eq!(level_for_xp(500, 0), 1);
    }

    #[test]
    fn test_level_monotonic() {
        let mut last = 0;
        for xp in (0..5_000).step_by(7) {
            let level = level_for_xp(xp, 100);
            assert!(level >= last);
            assert_eq!(level, 1 + xp / 100);
            last = level;
        }
    }

    #[test]
    fn test_terminal_clamp() {
        for k in 1..27 {
            assert_eq!(next_chapter_id(k, 27), k + 1);
        }
        assert_eq!(next_chapter_id(27, 27), 27);
    }

    #[test]
    fn test_default_rules_valid() {
        let errors = validate_rules(&ProgressionRules::default(), &Catalog::builtin());
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_invalid_rules_report_everything() {
        let rules = ProgressionRules {
            xp_per_level: 0,
            commission_chapter: 40,
            storage_key: "  ".into(),
            ..ProgressionRules::default()
        };
        let errors = validate_rules(&rules, &Catalog::builtin());
        assert_eq!(
            errors,
            vec![
                RulesError::ZeroLevelStep,
                RulesError::MilestoneOutOfRange(40),
                RulesError::EmptyStorageKey,
            ]
        );
    }

    #[test]
    fn test_rules_from_partial_json() {
        let rules: ProgressionRules = serde_json::from_str(r#"{"xp_per_chapter": 75}"#).unwrap();
        assert_eq!(rules.xp_per_chapter, 75);
        assert_eq!(rules.xp_per_level, 100);
        assert_eq!(rules.storage_key, DEFAULT_STORAGE_KEY);
    }
}
