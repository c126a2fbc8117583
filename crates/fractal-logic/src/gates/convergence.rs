//! Twelve-gate convergence: fill every collection, then seal the city.
//!
//! Three named collections are filled in order: the directional gates,
//! the tribes aligned to them, and the foundation stones. Each phase only
//! accepts members of its own collection and moves on once that collection
//! is complete. The last step is an explicit `seal`.

use super::{Gate, GateDetail, GateEvent, GateKind, GateOptions, GateResult, GateReward, GateStatus};

pub const GATES: [&str; 12] = [
    "east-1", "east-2", "east-3", "north-1", "north-2", "north-3", "south-1", "south-2",
    "south-3", "west-1", "west-2", "west-3",
];

pub const TRIBES: [&str; 12] = [
    "reuben", "simeon", "levi", "judah", "issachar", "zebulun", "joseph", "benjamin", "dan",
    "naphtali", "gad", "asher",
];

pub const FOUNDATIONS: [&str; 12] = [
    "jasper",
    "sapphire",
    "chalcedony",
    "emerald",
    "sardonyx",
    "sardius",
    "chrysolite",
    "beryl",
    "topaz",
    "chrysoprase",
    "jacinth",
    "amethyst",
];

pub const DEFAULT_SEAL: &str = "New Jerusalem Seal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergencePhase {
    Gates,
    Tribes,
    Foundations,
    Seal,
    Sealed,
}

impl ConvergencePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gates => "gates",
            Self::Tribes => "tribes",
            Self::Foundations => "foundations",
            Self::Seal => "seal",
            Self::Sealed => "sealed",
        }
    }
}

/// A fixed set of names and which of them have been placed.
#[derive(Debug, Clone)]
struct Collection {
    names: &'static [&'static str],
    placed: Vec<bool>,
}

impl Collection {
    fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            placed: vec![false; names.len()],
        }
    }

    fn clear(&mut self) {
        self.placed.iter_mut().for_each(|p| *p = false);
    }

    /// Returns true if the member was newly placed.
    fn place(&mut self, event: &GateEvent) -> bool {
        match event.target_in(self.names) {
            Some(i) if !self.placed[i] => {
                self.placed[i] = true;
                true
            }
            _ => false,
        }
    }

    fn count(&self) -> usize {
        self.placed.iter().filter(|p| **p).count()
    }

    fn is_full(&self) -> bool {
        self.placed.iter().all(|p| *p)
    }
}

/// Multi-category convergence gate.
#[derive(Debug, Clone)]
pub struct ConvergenceGate {
    phase: ConvergencePhase,
    gates: Collection,
    tribes: Collection,
    foundations: Collection,
    sealed: bool,
    seal_name: String,
}

impl ConvergenceGate {
    pub fn new() -> Self {
        Self {
            phase: ConvergencePhase::Gates,
            gates: Collection::new(&GATES),
            tribes: Collection::new(&TRIBES),
            foundations: Collection::new(&FOUNDATIONS),
            sealed: false,
            seal_name: DEFAULT_SEAL.to_string(),
        }
    }

    pub fn phase(&self) -> ConvergencePhase {
        self.phase
    }

    fn auto_advance(&mut self) {
        loop {
            let next = match self.phase {
                ConvergencePhase::Gates if self.gates.is_full() => ConvergencePhase::Tribes,
                ConvergencePhase::Tribes if self.tribes.is_full() => ConvergencePhase::Foundations,
                ConvergencePhase::Foundations if self.foundations.is_full() => {
                    ConvergencePhase::Seal
                }
                _ => break,
            };
            log::debug!("convergence gate advanced to {}", next.as_str());
            self.phase = next;
        }
    }
}

impl Default for ConvergenceGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate for ConvergenceGate {
    fn kind(&self) -> GateKind {
        GateKind::TwelveGateConvergence
    }

    fn title(&self) -> &'static str {
        "Twelve-Gate Convergence"
    }

    fn describe(&self) -> &'static str {
        match self.phase {
            ConvergencePhase::Gates => "Open the twelve gates, three on every side.",
            ConvergencePhase::Tribes => "Align a tribe to each gate.",
            ConvergencePhase::Foundations => "Lay the twelve foundation stones.",
            ConvergencePhase::Seal => "Set the seal on the city.",
            ConvergencePhase::Sealed => "The city stands complete.",
        }
    }

    fn start(&mut self, options: &GateOptions) {
        self.phase = ConvergencePhase::Gates;
        self.gates.clear();
        self.tribes.clear();
        self.foundations.clear();
        self.sealed = false;
        self.seal_name = options.badge_or(DEFAULT_SEAL);
    }

    fn interact(&mut self, event: &GateEvent) {
        let placed = match (self.phase, event.kind.as_str()) {
            (ConvergencePhase::Gates, "open_gate") => self.gates.place(event),
            (ConvergencePhase::Tribes, "align_tribe") => self.tribes.place(event),
            (ConvergencePhase::Foundations, "lay_foundation") => self.foundations.place(event),
            (ConvergencePhase::Seal, "seal") => {
                self.sealed = true;
                self.phase = ConvergencePhase::Sealed;
                false
            }
            _ => false,
        };
        if placed {
            self.auto_advance();
        }
    }

    fn status(&self) -> GateStatus {
        let progress = super::weighted_progress(&[
            (self.gates.count(), GATES.len()),
            (self.tribes.count(), TRIBES.len()),
            (self.foundations.count(), FOUNDATIONS.len()),
            (usize::from(self.sealed), 1),
        ]);
        GateStatus {
            phase: self.phase.as_str().to_string(),
            progress,
            detail: GateDetail::Convergence {
                gates_opened: self.gates.count(),
                tribes_aligned: self.tribes.count(),
                foundations_laid: self.foundations.count(),
                per_collection: GATES.len(),
                sealed: self.sealed,
            },
        }
    }

    fn complete(&self) -> GateResult {
        let filled =
            self.gates.is_full() && self.tribes.is_full() && self.foundations.is_full();
        if filled && self.sealed {
            GateResult::passed(GateReward::Seal(self.seal_name.clone()))
        } else {
            GateResult::not_yet()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_all(g: &mut ConvergenceGate, kind: &str, names: &[&str]) {
        for n in names {
            g.interact(&GateEvent::with_data(kind, *n));
        }
    }

    #[test]
    fn test_full_run_seals() {
        let mut g = ConvergenceGate::new();
        g.start(&GateOptions::default());
        place_all(&mut g, "open_gate", &GATES);
        assert_eq!(g.phase(), ConvergencePhase::Tribes);
        place_all(&mut g, "align_tribe", &TRIBES);
        assert_eq!(g.phase(), ConvergencePhase::Foundations);
        place_all(&mut g, "lay_foundation", &FOUNDATIONS);
        assert_eq!(g.phase(), ConvergencePhase::Seal);
        assert!(!g.complete().success);
        g.interact(&GateEvent::new("seal"));
        let result = g.complete();
        assert!(result.success);
        assert!(matches!(result.payload, Some(GateReward::Seal(_))));
        assert!((g.status().progress - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_seal_requires_seal_phase() {
        let mut g = ConvergenceGate::new();
        g.interact(&GateEvent::new("seal"));
        place_all(&mut g, "open_gate", &GATES);
        g.interact(&GateEvent::new("seal"));
        assert_eq!(g.phase(), ConvergencePhase::Tribes);
        assert!(!g.complete().success);
    }

    #[test]
    fn test_duplicates_and_foreign_members_ignored() {
        let mut g = ConvergenceGate::new();
        g.interact(&GateEvent::with_data("open_gate", "east-1"));
        g.interact(&GateEvent::with_data("open_gate", "east-1"));
        g.interact(&GateEvent::with_data("open_gate", "reuben"));
        g.interact(&GateEvent::with_data("align_tribe", "reuben"));
        match g.status().detail {
            GateDetail::Convergence {
                gates_opened,
                tribes_aligned,
                ..
            } => {
                assert_eq!(gates_opened, 1);
                assert_eq!(tribes_aligned, 0);
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn test_members_by_index() {
        let mut g = ConvergenceGate::new();
        for i in 0..GATES.len() {
            g.interact(&GateEvent::with_data("open_gate", i as u64));
        }
        assert_eq!(g.phase(), ConvergencePhase::Tribes);
    }

    #[test]
    fn test_progress_weights() {
        let mut g = ConvergenceGate::new();
        place_all(&mut g, "open_gate", &GATES);
        let expected = 12.0 / 37.0;
        assert!((g.status().progress - expected).abs() < 1e-6);
    }

    #[test]
    fn test_restart_without_badge_restores_default_seal() {
        let mut g = ConvergenceGate::new();
        g.start(&GateOptions {
            badge: Some("Name Synthesis".into()),
        });
        place_all(&mut g, "open_gate", &GATES);
        g.start(&GateOptions::default());
        assert_eq!(g.phase(), ConvergencePhase::Gates);
        place_all(&mut g, "open_gate", &GATES);
        place_all(&mut g, "align_tribe", &TRIBES);
        place_all(&mut g, "lay_foundation", &FOUNDATIONS);
        g.interact(&GateEvent::new("seal"));
        assert_eq!(
            g.complete().payload,
            Some(GateReward::Seal(DEFAULT_SEAL.into()))
        );
    }

    #[test]
    fn test_restart_with_badge_uses_it() {
        let mut g = ConvergenceGate::new();
        g.start(&GateOptions {
            badge: Some("Name Synthesis".into()),
        });
        for event in crate::gates::solution(GateKind::TwelveGateConvergence) {
            g.interact(&event);
        }
        assert_eq!(
            g.complete().payload,
            Some(GateReward::Seal("Name Synthesis".into()))
        );
    }
}
