//! Identity mirror: flip a fixed number of tiles.

use super::{Gate, GateDetail, GateEvent, GateKind, GateOptions, GateResult, GateReward, GateStatus};

/// Tiles that must be flipped.
pub const DEFAULT_FLIPS: u32 = 3;

pub const DEFAULT_BADGE: &str = "Identity Mirror";

/// Single-phase linear counter gate.
#[derive(Debug, Clone)]
pub struct MirrorGate {
    flips: u32,
    required: u32,
    badge: String,
}

impl MirrorGate {
    pub fn new() -> Self {
        Self {
            flips: 0,
            required: DEFAULT_FLIPS,
            badge: DEFAULT_BADGE.to_string(),
        }
    }

    pub fn flips(&self) -> u32 {
        self.flips
    }
}

impl Default for MirrorGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate for MirrorGate {
    fn kind(&self) -> GateKind {
        GateKind::IdentityMirror
    }

    fn title(&self) -> &'static str {
        "Identity Mirror"
    }

    fn describe(&self) -> &'static str {
        "Flip three tiles to reveal the core pattern."
    }

    fn start(&mut self, options: &GateOptions) {
        self.flips = 0;
        self.badge = options.badge_or(DEFAULT_BADGE);
    }

    fn interact(&mut self, event: &GateEvent) {
        if event.kind == "flip" {
            self.flips = (self.flips + 1).min(self.required);
        }
    }

    fn status(&self) -> GateStatus {
        GateStatus {
            phase: "flip".to_string(),
            progress: self.flips as f32 / self.required as f32,
            detail: GateDetail::Mirror {
                flips: self.flips,
                required: self.required,
            },
        }
    }

    fn complete(&self) -> GateResult {
        if self.flips == self.required {
            GateResult::passed(GateReward::Badge(self.badge.clone()))
        } else {
            GateResult::not_yet()
        }
    }
}
