//! One pass through a chapter's gate scene.
//!
//! A [`ChapterVisit`] builds the gate for the player's current chapter,
//! forwards interactions, and on `finish` asks the gate for its verdict.
//! Only a passed verdict reaches the progression store, and only once per
//! visit.

use fractal_logic::catalog::ChapterId;
use fractal_logic::gates::{Gate, GateEvent, GateOptions, GateReward, GateStatus};
use fractal_logic::rules::next_chapter_id;
use fractal_logic::save::SaveGame;
use fractal_logic::selector::gate_for_chapter;

use crate::error::ProgressError;
use crate::progression::Progression;
use crate::storage::SaveStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    InProgress,
    /// Gate passed but the completion has not been persisted yet.
    Passed,
    Committed,
}

/// Where the scene goes after a committed completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Chapter(ChapterId),
    /// The final chapter was cleared.
    Epilogue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisitOutcome {
    /// Gate not cleared yet; keep playing or retry.
    NotYet(GateStatus),
    Advanced {
        reward: Option<GateReward>,
        save: SaveGame,
        route: Route,
    },
}

pub struct ChapterVisit {
    chapter_id: ChapterId,
    final_chapter: ChapterId,
    options: GateOptions,
    gate: Box<dyn Gate>,
    state: VisitState,
}

impl ChapterVisit {
    /// Open the gate scene for the player's current chapter.
    pub fn enter<S: SaveStore>(progression: &Progression<S>) -> Result<Self, ProgressError> {
        let chapter = progression.current_chapter()?;
        log::debug!(
            "Entering chapter {} ({}) with {} gate",
            chapter.id,
            chapter.title,
            chapter.archetype()
        );
        Ok(Self {
            chapter_id: chapter.id,
            final_chapter: progression.catalog().final_chapter(),
            options: GateOptions {
                badge: Some(chapter.badge_name()),
            },
            gate: gate_for_chapter(chapter),
            state: VisitState::InProgress,
        })
    }

    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    pub fn state(&self) -> VisitState {
        self.state
    }

    pub fn gate(&self) -> &dyn Gate {
        self.gate.as_ref()
    }

    pub fn title(&self) -> &'static str {
        self.gate.title()
    }

    pub fn describe(&self) -> &'static str {
        self.gate.describe()
    }

    /// Forward a player action. Ignored once the completion is committed.
    pub fn interact(&mut self, event: &GateEvent) {
        if self.state == VisitState::Committed {
            return;
        }
        self.gate.interact(event);
    }

    pub fn status(&self) -> GateStatus {
        self.gate.status()
    }

    /// Restart the gate from its first phase.
    pub fn retry(&mut self) {
        if self.state == VisitState::Committed {
            return;
        }
        self.gate.start(&self.options);
        self.state = VisitState::InProgress;
    }

    /// Ask the gate for its verdict and, if passed, record the completion.
    ///
    /// A storage failure leaves the visit in [`VisitState::Passed`] so the
    /// same call can be repeated without replaying the gate.
    pub fn finish<S: SaveStore>(
        &mut self,
        progression: &mut Progression<S>,
    ) -> Result<VisitOutcome, ProgressError> {
        if self.state == VisitState::Committed {
            return Err(ProgressError::AlreadyCommitted(self.chapter_id));
        }
        let current = progression.current_chapter_id();
        if current != self.chapter_id {
            return Err(ProgressError::ChapterMismatch {
                visit: self.chapter_id,
                current,
            });
        }

        let verdict = self.gate.complete();
        if !verdict.success {
            return Ok(VisitOutcome::NotYet(self.gate.status()));
        }
        self.state = VisitState::Passed;

        let save = progression.complete_current_chapter()?.clone();
        self.state = VisitState::Committed;

        let route = if self.chapter_id >= self.final_chapter {
            Route::Epilogue
        } else {
            Route::Chapter(next_chapter_id(self.chapter_id, self.final_chapter))
        };
        Ok(VisitOutcome::Advanced {
            reward: verdict.payload,
            save,
            route,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use fractal_logic::catalog::Catalog;
    use fractal_logic::gates::solution;
    use fractal_logic::rules::ProgressionRules;

    fn fresh() -> Progression<MemoryStore> {
        Progression::load_or_init(
            MemoryStore::new(),
            Catalog::builtin(),
            ProgressionRules::default(),
        )
    }

    fn play(visit: &mut ChapterVisit) {
        for event in solution(visit.gate().kind()) {
            visit.interact(&event);
        }
    }

    #[test]
    fn test_unfinished_gate_does_not_advance() {
        let mut p = fresh();
        let mut visit = ChapterVisit::enter(&p).unwrap();
        let outcome = visit.finish(&mut p).unwrap();
        assert!(matches!(outcome, VisitOutcome::NotYet(_)));
        assert_eq!(p.current_chapter_id(), 1);
        assert_eq!(p.xp(), 0);
        assert_eq!(visit.state(), VisitState::InProgress);
    }

    #[test]
    fn test_cleared_gate_advances_once() {
        let mut p = fresh();
        let mut visit = ChapterVisit::enter(&p).unwrap();
        play(&mut visit);
        match visit.finish(&mut p).unwrap() {
            VisitOutcome::Advanced { reward, save, route } => {
                assert_eq!(reward, Some(GateReward::Badge("Glory Revelation".into())));
                assert_eq!(save.current_chapter_id(), 2);
                assert_eq!(route, Route::Chapter(2));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(
            visit.finish(&mut p),
            Err(ProgressError::AlreadyCommitted(1))
        ));
        assert_eq!(p.xp(), 50);
    }

    #[test]
    fn test_storage_failure_can_be_retried() {
        let mut p = fresh();
        let mut visit = ChapterVisit::enter(&p).unwrap();
        play(&mut visit);

        p.store_mut().set_available(false);
        assert!(matches!(
            visit.finish(&mut p),
            Err(ProgressError::StorageUnavailable(_))
        ));
        assert_eq!(visit.state(), VisitState::Passed);
        assert_eq!(p.xp(), 0);

        p.store_mut().set_available(true);
        assert!(matches!(
            visit.finish(&mut p).unwrap(),
            VisitOutcome::Advanced { .. }
        ));
        assert_eq!(p.xp(), 50);
        assert_eq!(p.current_chapter_id(), 2);
    }

    #[test]
    fn test_stale_visit_is_rejected() {
        let mut p = fresh();
        let mut visit = ChapterVisit::enter(&p).unwrap();
        play(&mut visit);
        p.go_to_chapter(3).unwrap();
        assert!(matches!(
            visit.finish(&mut p),
            Err(ProgressError::ChapterMismatch { visit: 1, current: 3 })
        ));
        assert_eq!(p.xp(), 0);
    }

    #[test]
    fn test_retry_restarts_gate() {
        let mut p = fresh();
        p.go_to_chapter(27).unwrap();
        let mut visit = ChapterVisit::enter(&p).unwrap();
        visit.interact(&GateEvent::with_data("open_gate", "east-1"));
        assert!(visit.status().progress > 0.0);
        visit.retry();
        assert!(visit.status().progress.abs() < f32::EPSILON);
        assert_eq!(visit.state(), VisitState::InProgress);
    }

    #[test]
    fn test_final_chapter_routes_to_epilogue() {
        let mut p = fresh();
        p.go_to_chapter(27).unwrap();
        let mut visit = ChapterVisit::enter(&p).unwrap();
        play(&mut visit);
        match visit.finish(&mut p).unwrap() {
            VisitOutcome::Advanced { reward, save, route } => {
                assert!(matches!(reward, Some(GateReward::Seal(_))));
                assert_eq!(save.current_chapter_id(), 27);
                assert!(save.sealed());
                assert_eq!(route, Route::Epilogue);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
