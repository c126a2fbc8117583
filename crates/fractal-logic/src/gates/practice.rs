//! Practice placeholder used by chapters without a dedicated puzzle.

use super::{Gate, GateDetail, GateEvent, GateKind, GateOptions, GateResult, GateReward, GateStatus};

pub const DEFAULT_BADGE: &str = "Practice";

/// Always-succeeds gate. The practice event only feeds the progress bar.
#[derive(Debug, Clone)]
pub struct PracticeGate {
    practiced: bool,
    badge: String,
}

impl PracticeGate {
    pub fn new() -> Self {
        Self {
            practiced: false,
            badge: DEFAULT_BADGE.to_string(),
        }
    }
}

impl Default for PracticeGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate for PracticeGate {
    fn kind(&self) -> GateKind {
        GateKind::Practice
    }

    fn title(&self) -> &'static str {
        "Practice"
    }

    fn describe(&self) -> &'static str {
        "Practice gate. Press to complete."
    }

    fn start(&mut self, options: &GateOptions) {
        self.practiced = false;
        self.badge = options.badge_or(DEFAULT_BADGE);
    }

    fn interact(&mut self, event: &GateEvent) {
        if event.kind == "practice_complete" {
            self.practiced = true;
        }
    }

    fn status(&self) -> GateStatus {
        GateStatus {
            phase: "practice".to_string(),
            progress: if self.practiced { 1.0 } else { 0.0 },
            detail: GateDetail::Practice {
                practiced: self.practiced,
            },
        }
    }

    fn complete(&self) -> GateResult {
        GateResult::passed(GateReward::Badge(self.badge.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_succeeds() {
        let mut g = PracticeGate::new();
        g.start(&GateOptions::default());
        assert!(g.complete().success);
        g.interact(&GateEvent::new("anything"));
        assert!(g.complete().success);
    }

    #[test]
    fn test_practice_event_fills_progress() {
        let mut g = PracticeGate::new();
        assert!(g.status().progress.abs() < f32::EPSILON);
        g.interact(&GateEvent::new("practice_complete"));
        assert!((g.status().progress - 1.0).abs() < f32::EPSILON);
        g.start(&GateOptions::default());
        assert!(g.status().progress.abs() < f32::EPSILON);
    }
}
