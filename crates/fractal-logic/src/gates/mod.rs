//! Gate engine: one small state machine per puzzle archetype.
//!
//! Every gate exposes the same capability surface through the [`Gate`]
//! trait: a phase-dependent prompt, an idempotent reset, a permissive
//! event sink, a UI status snapshot and a non-mutating verdict.
//!
//! Events are loosely typed on purpose. The presentation layer fires
//! whatever the player pressed; a gate that does not recognise the event
//! type, or receives it in the wrong phase, ignores it.
//!
//! ```
//! use fractal_logic::gates::{Gate, GateEvent, MirrorGate};
//!
//! let mut gate = MirrorGate::new();
//! gate.start(&Default::default());
//! for _ in 0..3 {
//!     gate.interact(&GateEvent::new("flip"));
//! }
//! assert!(gate.complete().success);
//! ```

pub mod call_response;
pub mod convergence;
pub mod mirror;
pub mod network;
pub mod practice;

pub use call_response::CallResponseGate;
pub use convergence::ConvergenceGate;
pub use mirror::MirrorGate;
pub use network::NetworkGate;
pub use practice::PracticeGate;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// ARCHETYPES
// ============================================================================

/// Puzzle archetype tag selecting which gate guards a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GateKind {
    /// Linear flip counter.
    IdentityMirror,
    /// Ordered call → respond → send sequence.
    ShofarConvergence,
    /// Parallel per-node progression plus a global activation.
    NetworkMultiplication,
    /// Several named collections plus a final seal.
    TwelveGateConvergence,
    /// Lightweight practice step that always passes.
    Practice,
}

impl GateKind {
    /// All archetypes, placeholder last.
    pub const ALL: [GateKind; 5] = [
        GateKind::IdentityMirror,
        GateKind::ShofarConvergence,
        GateKind::NetworkMultiplication,
        GateKind::TwelveGateConvergence,
        GateKind::Practice,
    ];

    /// Stable tag used in content tables and saves.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::IdentityMirror => "IdentityMirror",
            Self::ShofarConvergence => "ShofarConvergence",
            Self::NetworkMultiplication => "NetworkMultiplication",
            Self::TwelveGateConvergence => "TwelveGateConvergence",
            Self::Practice => "Practice",
        }
    }

    /// Parse a tag. Unknown tags fall back to [`GateKind::Practice`].
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.tag() == tag)
            .unwrap_or(Self::Practice)
    }

    /// Derive the archetype from a chapter's geometry icon.
    pub fn from_geometry(icon: &str) -> Self {
        if icon.contains("Square") {
            Self::IdentityMirror
        } else if icon.contains("Nested Fib") {
            Self::ShofarConvergence
        } else if icon.contains("Fractal Network") {
            Self::NetworkMultiplication
        } else if icon.contains("New Jerusalem") || icon.contains("Final Commission") {
            Self::TwelveGateConvergence
        } else {
            Self::Practice
        }
    }
}

impl From<String> for GateKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<GateKind> for String {
    fn from(kind: GateKind) -> Self {
        kind.tag().to_string()
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// EVENTS, STATUS, RESULTS
// ============================================================================

/// A single player action fired at a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl GateEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: None,
        }
    }

    pub fn with_data(kind: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            data: Some(data.into()),
        }
    }

    /// Resolve the event's target against a list of names.
    ///
    /// Accepts either the name itself or its zero-based index.
    pub fn target_in(&self, names: &[&str]) -> Option<usize> {
        match self.data.as_ref()? {
            Value::String(s) => names.iter().position(|n| n == s),
            Value::Number(n) => n
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .filter(|&i| i < names.len()),
            _ => None,
        }
    }
}

/// Options accepted by [`Gate::start`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateOptions {
    /// Badge to award on success instead of the gate's own.
    pub badge: Option<String>,
}

impl GateOptions {
    /// The requested badge, or `default` when none was given.
    pub fn badge_or(&self, default: &str) -> String {
        self.badge.clone().unwrap_or_else(|| default.to_string())
    }
}

/// Variant-specific progress detail for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum GateDetail {
    Mirror {
        flips: u32,
        required: u32,
    },
    Sequence {
        observed: usize,
        /// Next event type the gate is waiting for.
        expected: Option<String>,
    },
    Network {
        nodes: Vec<NodeStatus>,
        activated: bool,
    },
    Convergence {
        gates_opened: usize,
        tribes_aligned: usize,
        foundations_laid: usize,
        per_collection: usize,
        sealed: bool,
    },
    Practice {
        practiced: bool,
    },
}

/// One network node's visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub name: String,
    pub stage: String,
}

/// Snapshot returned by [`Gate::status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateStatus {
    pub phase: String,
    /// Normalised completion fraction in `0.0..=1.0`. Display only.
    pub progress: f32,
    pub detail: GateDetail,
}

/// Reward carried by a successful verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum GateReward {
    Badge(String),
    Commission(String),
    Seal(String),
}

impl GateReward {
    pub fn name(&self) -> &str {
        match self {
            Self::Badge(n) | Self::Commission(n) | Self::Seal(n) => n,
        }
    }
}

/// Verdict returned by [`Gate::complete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub success: bool,
    pub payload: Option<GateReward>,
}

impl GateResult {
    pub fn passed(reward: GateReward) -> Self {
        Self {
            success: true,
            payload: Some(reward),
        }
    }

    pub fn not_yet() -> Self {
        Self {
            success: false,
            payload: None,
        }
    }
}

// ============================================================================
// CAPABILITY
// ============================================================================

/// Uniform contract shared by every gate variant.
pub trait Gate {
    fn kind(&self) -> GateKind;

    /// Display title for the gate.
    fn title(&self) -> &'static str;

    /// Prompt for the current phase.
    fn describe(&self) -> &'static str;

    /// Reset to the initial phase with zeroed progress. Safe to call again
    /// for a retry.
    fn start(&mut self, options: &GateOptions);

    /// Apply one player action. Unknown or out-of-phase events are ignored.
    fn interact(&mut self, event: &GateEvent);

    fn status(&self) -> GateStatus;

    /// Re-verify every sub-goal. Never mutates the gate.
    fn complete(&self) -> GateResult;
}

/// Shortest event script that clears a freshly started gate of `kind`.
///
/// Used by headless play-throughs and tests.
pub fn solution(kind: GateKind) -> Vec<GateEvent> {
    fn each(kind: &str, names: &[&str]) -> Vec<GateEvent> {
        names.iter().map(|n| GateEvent::with_data(kind, *n)).collect()
    }

    match kind {
        GateKind::IdentityMirror => (0..mirror::DEFAULT_FLIPS)
            .map(|_| GateEvent::new("flip"))
            .collect(),
        GateKind::ShofarConvergence => call_response::DEFAULT_SEQUENCE
            .iter()
            .map(|k| GateEvent::new(*k))
            .collect(),
        GateKind::NetworkMultiplication => {
            let mut script = each("connect", &network::NODES);
            script.extend(each("multiply", &network::NODES));
            script.extend(each("replicate", &network::NODES));
            script.push(GateEvent::new("activate"));
            script
        }
        GateKind::TwelveGateConvergence => {
            let mut script = each("open_gate", &convergence::GATES);
            script.extend(each("align_tribe", &convergence::TRIBES));
            script.extend(each("lay_foundation", &convergence::FOUNDATIONS));
            script.push(GateEvent::new("seal"));
            script
        }
        GateKind::Practice => vec![GateEvent::new("practice_complete")],
    }
}

/// Weighted completion fraction over `(done, total)` sub-goals.
pub(crate) fn weighted_progress(parts: &[(usize, usize)]) -> f32 {
    let total: usize = parts.iter().map(|(_, t)| t).sum();
    if total == 0 {
        return 1.0;
    }
    let done: usize = parts.iter().map(|(d, t)| (*d).min(*t)).sum();
    done as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_roundtrip() {
        for kind in GateKind::ALL {
            assert_eq!(GateKind::from_tag(kind.tag()), kind);
        }
        assert_eq!(GateKind::from_tag("Labyrinth"), GateKind::Practice);
    }

    #[test]
    fn test_from_geometry() {
        assert_eq!(GateKind::from_geometry("Square"), GateKind::IdentityMirror);
        assert_eq!(
            GateKind::from_geometry("Nested Fib Circles"),
            GateKind::ShofarConvergence
        );
        assert_eq!(
            GateKind::from_geometry("Fractal Network"),
            GateKind::NetworkMultiplication
        );
        assert_eq!(
            GateKind::from_geometry("Final Commission"),
            GateKind::TwelveGateConvergence
        );
        assert_eq!(GateKind::from_geometry("Octahedron"), GateKind::Practice);
    }

    #[test]
    fn test_kind_serde_unknown_tag() {
        let kind: GateKind = serde_json::from_value(json!("SomethingNew")).unwrap();
        assert_eq!(kind, GateKind::Practice);
        let out = serde_json::to_value(GateKind::NetworkMultiplication).unwrap();
        assert_eq!(out, json!("NetworkMultiplication"));
    }

    #[test]
    fn test_event_target_by_name_or_index() {
        let names = ["alpha", "beta"];
        assert_eq!(GateEvent::with_data("x", "beta").target_in(&names), Some(1));
        assert_eq!(GateEvent::with_data("x", 0).target_in(&names), Some(0));
        assert_eq!(GateEvent::with_data("x", 7).target_in(&names), None);
        assert_eq!(GateEvent::with_data("x", true).target_in(&names), None);
        assert_eq!(GateEvent::new("x").target_in(&names), None);
    }

    #[test]
    fn test_event_target_huge_index_never_wraps() {
        let names = ["alpha", "beta"];
        let wrapped = (1u64 << 32) + 1;
        assert_eq!(GateEvent::with_data("x", wrapped).target_in(&names), None);
        assert_eq!(GateEvent::with_data("x", u64::MAX).target_in(&names), None);
        assert_eq!(GateEvent::with_data("x", -1).target_in(&names), None);
    }

    #[test]
    fn test_badge_or_default() {
        assert_eq!(GateOptions::default().badge_or("Practice"), "Practice");
        let options = GateOptions {
            badge: Some("Glory Revelation".into()),
        };
        assert_eq!(options.badge_or("Practice"), "Glory Revelation");
    }

    #[test]
    fn test_event_json_shape() {
        let e: GateEvent = serde_json::from_value(json!({"type": "connect", "data": "judea"})).unwrap();
        assert_eq!(e.kind, "connect");
        assert_eq!(e.data, Some(json!("judea")));
        let bare: GateEvent = serde_json::from_value(json!({"type": "seal"})).unwrap();
        assert!(bare.data.is_none());
    }

    #[test]
    fn test_solutions_clear_every_gate() {
        for kind in GateKind::ALL {
            let mut gate = crate::selector::selector_for(kind)();
            gate.start(&GateOptions::default());
            for event in solution(kind) {
                gate.interact(&event);
            }
            assert!(gate.complete().success, "{:?}", kind);
            assert!((gate.status().progress - 1.0).abs() < 1e-6, "{:?}", kind);
        }
    }

    #[test]
    fn test_weighted_progress() {
        assert_eq!(weighted_progress(&[]), 1.0);
        assert!((weighted_progress(&[(1, 2), (0, 2)]) - 0.25).abs() < f32::EPSILON);
        assert!((weighted_progress(&[(5, 2)]) - 1.0).abs() < f32::EPSILON);
    }
}
