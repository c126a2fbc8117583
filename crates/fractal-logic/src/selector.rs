//! Gate selector: archetype tag to gate constructor.
//!
//! Selection is total: every [`GateKind`] maps to exactly one constructor
//! and unknown tags were already folded into [`GateKind::Practice`] when
//! they were parsed.

use crate::catalog::Chapter;
use crate::gates::{
    CallResponseGate, ConvergenceGate, Gate, GateKind, GateOptions, MirrorGate, NetworkGate,
    PracticeGate,
};

/// Builds a fresh gate in its initial phase.
pub type GateConstructor = fn() -> Box<dyn Gate>;

fn mirror() -> Box<dyn Gate> {
    Box::new(MirrorGate::new())
}

fn call_response() -> Box<dyn Gate> {
    Box::new(CallResponseGate::new())
}

fn network() -> Box<dyn Gate> {
    Box::new(NetworkGate::new())
}

fn convergence() -> Box<dyn Gate> {
    Box::new(ConvergenceGate::new())
}

fn practice() -> Box<dyn Gate> {
    Box::new(PracticeGate::new())
}

pub fn selector_for(kind: GateKind) -> GateConstructor {
    match kind {
        GateKind::IdentityMirror => mirror,
        GateKind::ShofarConvergence => call_response,
        GateKind::NetworkMultiplication => network,
        GateKind::TwelveGateConvergence => convergence,
        GateKind::Practice => practice,
    }
}

/// Constructor for a raw tag, falling back to the practice gate.
pub fn selector_for_tag(tag: &str) -> GateConstructor {
    selector_for(GateKind::from_tag(tag))
}

/// Build and start the gate guarding `chapter`, carrying its badge.
pub fn gate_for_chapter(chapter: &Chapter) -> Box<dyn Gate> {
    let mut gate = selector_for(chapter.archetype())();
    gate.start(&GateOptions {
        badge: Some(chapter.badge_name()),
    });
    gate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_every_kind_builds_matching_gate() {
        for kind in GateKind::ALL {
            let gate = selector_for(kind)();
            assert_eq!(gate.kind(), kind);
        }
    }

    #[test]
    fn test_unknown_tag_falls_back_to_practice() {
        let gate = selector_for_tag("Kaleidoscope")();
        assert_eq!(gate.kind(), GateKind::Practice);
        assert!(gate.complete().success);
        assert_eq!(selector_for_tag("")().kind(), GateKind::Practice);
    }

    #[test]
    fn test_constructors_start_fresh() {
        for kind in GateKind::ALL {
            let status = selector_for(kind)().status();
            assert!(status.progress.abs() < f32::EPSILON, "{:?}", kind);
        }
    }

    #[test]
    fn test_chapter_gate_carries_badge() {
        let catalog = Catalog::builtin();
        let chapter = catalog.lookup(3).unwrap();
        let gate = gate_for_chapter(chapter);
        assert_eq!(gate.kind(), GateKind::Practice);
        assert_eq!(gate.complete().payload.unwrap().name(), "Presence Embodiment");
    }
}
