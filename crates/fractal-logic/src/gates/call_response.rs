//! Shofar convergence: an ordered call → respond → send sequence.
//!
//! The gate holds a cursor into the required sequence. Only an event that
//! matches the step under the cursor advances it; anything else, including
//! a correct step fired early, is dropped without resetting.

use super::{Gate, GateDetail, GateEvent, GateKind, GateOptions, GateResult, GateReward, GateStatus};

/// Default required order.
pub const DEFAULT_SEQUENCE: [&str; 3] = ["call", "respond", "send"];

pub const DEFAULT_COMMISSION: &str = "Shofar Commission";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShofarPhase {
    Listen,
    Respond,
    Send,
    Resounding,
}

impl ShofarPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listen => "listen",
            Self::Respond => "respond",
            Self::Send => "send",
            Self::Resounding => "resounding",
        }
    }
}

/// Sequential call/response gate.
#[derive(Debug, Clone)]
pub struct CallResponseGate {
    sequence: Vec<String>,
    cursor: usize,
    commission: String,
}

impl CallResponseGate {
    pub fn new() -> Self {
        Self::with_sequence(DEFAULT_SEQUENCE)
    }

    pub fn with_sequence<I, S>(sequence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sequence: sequence.into_iter().map(Into::into).collect(),
            cursor: 0,
            commission: DEFAULT_COMMISSION.to_string(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Phase follows the cursor: each step of the sequence is its own prompt.
    pub fn phase(&self) -> ShofarPhase {
        if self.cursor >= self.sequence.len() {
            return ShofarPhase::Resounding;
        }
        match self.cursor {
            0 => ShofarPhase::Listen,
            c if c + 1 == self.sequence.len() => ShofarPhase::Send,
            _ => ShofarPhase::Respond,
        }
    }
}

impl Default for CallResponseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate for CallResponseGate {
    fn kind(&self) -> GateKind {
        GateKind::ShofarConvergence
    }

    fn title(&self) -> &'static str {
        "Shofar Convergence"
    }

    fn describe(&self) -> &'static str {
        match self.phase() {
            ShofarPhase::Listen => "Sound the call, then listen for the answer.",
            ShofarPhase::Respond => "Answer the call.",
            ShofarPhase::Send => "Send the sound out to the nations.",
            ShofarPhase::Resounding => "Call, response and sending are joined.",
        }
    }

    fn start(&mut self, options: &GateOptions) {
        self.cursor = 0;
        self.commission = options.badge_or(DEFAULT_COMMISSION);
    }

    fn interact(&mut self, event: &GateEvent) {
        if self.sequence.get(self.cursor) == Some(&event.kind) {
            self.cursor += 1;
            log::debug!("shofar step {} of {}", self.cursor, self.sequence.len());
        }
    }

    fn status(&self) -> GateStatus {
        GateStatus {
            phase: self.phase().as_str().to_string(),
            progress: super::weighted_progress(&[(self.cursor, self.sequence.len())]),
            detail: GateDetail::Sequence {
                observed: self.cursor,
                expected: self.sequence.get(self.cursor).cloned(),
            },
        }
    }

    fn complete(&self) -> GateResult {
        if self.cursor == self.sequence.len() {
            GateResult::passed(GateReward::Commission(self.commission.clone()))
        } else {
            GateResult::not_yet()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire(g: &mut CallResponseGate, kinds: &[&str]) {
        for k in kinds {
            g.interact(&GateEvent::new(*k));
        }
    }

    #[test]
    fn test_out_of_order_does_not_advance() {
        let mut g = CallResponseGate::new();
        g.start(&GateOptions::default());
        fire(&mut g, &["respond"]);
        assert_eq!(g.cursor(), 0);
        assert_eq!(g.phase(), ShofarPhase::Listen);
    }

    #[test]
    fn test_in_order_completes() {
        let mut g = CallResponseGate::new();
        g.start(&GateOptions::default());
        fire(&mut g, &["call", "respond", "send"]);
        let result = g.complete();
        assert!(result.success);
        assert!(matches!(result.payload, Some(GateReward::Commission(_))));
        let status = g.status();
        assert!((status.progress - 1.0).abs() < f32::EPSILON);
        assert_eq!(status.phase, "resounding");
    }

    #[test]
    fn test_wrong_step_is_not_a_reset() {
        let mut g = CallResponseGate::new();
        fire(&mut g, &["call", "send", "call", "respond"]);
        assert_eq!(g.cursor(), 2);
        assert_eq!(g.phase(), ShofarPhase::Send);
        fire(&mut g, &["send"]);
        assert!(g.complete().success);
    }

    #[test]
    fn test_extra_events_after_done_ignored() {
        let mut g = CallResponseGate::new();
        fire(&mut g, &["call", "respond", "send", "call", "send"]);
        assert_eq!(g.cursor(), 3);
    }

    #[test]
    fn test_phase_prompts_follow_cursor() {
        let mut g = CallResponseGate::new();
        let first = g.describe();
        fire(&mut g, &["call"]);
        assert_eq!(g.phase(), ShofarPhase::Respond);
        assert_ne!(g.describe(), first);
        assert_eq!(
            g.status().detail,
            GateDetail::Sequence {
                observed: 1,
                expected: Some("respond".into())
            }
        );
    }

    #[test]
    fn test_custom_sequence() {
        let mut g = CallResponseGate::with_sequence(["tekiah", "shevarim", "teruah", "tekiah"]);
        fire(&mut g, &["tekiah", "shevarim", "teruah"]);
        assert!(!g.complete().success);
        assert!((g.status().progress - 0.75).abs() < f32::EPSILON);
        fire(&mut g, &["tekiah"]);
        assert!(g.complete().success);
    }
}
