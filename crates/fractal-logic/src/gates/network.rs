//! Network multiplication: replicate the flame across a fixed set of nodes.
//!
//! Each node climbs `Dormant → Connected → Multiplied → Replicated` on its
//! own. The gate phase only moves forward once every node has reached the
//! stage the current phase asks for, and the terminal phase additionally
//! needs one global `activate` event.
//!
//! | Phase       | Accepted event          | Advances when               |
//! |-------------|-------------------------|-----------------------------|
//! | `connect`   | `connect` + node        | all nodes connected         |
//! | `multiply`  | `multiply` + node       | all nodes multiplied        |
//! | `replicate` | `replicate` + node      | all nodes replicated        |
//! | `global`    | `activate`              | activation fired            |
//! | `activated` | none                    | terminal                    |

use super::{
    Gate, GateDetail, GateEvent, GateKind, GateOptions, GateResult, GateReward, GateStatus,
    NodeStatus,
};

/// Witness nodes, from the city outward.
pub const NODES: [&str; 4] = ["jerusalem", "judea", "samaria", "nations"];

pub const DEFAULT_BADGE: &str = "Apostolic Network";

/// Per-node stage, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeStage {
    Dormant = 0,
    Connected = 1,
    Multiplied = 2,
    Replicated = 3,
}

impl NodeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dormant => "dormant",
            Self::Connected => "connected",
            Self::Multiplied => "multiplied",
            Self::Replicated => "replicated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkPhase {
    Connect,
    Multiply,
    Replicate,
    Global,
    Activated,
}

impl NetworkPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Multiply => "multiply",
            Self::Replicate => "replicate",
            Self::Global => "global",
            Self::Activated => "activated",
        }
    }

    /// Event type and the stage it lifts a node into, for node phases.
    fn node_step(&self) -> Option<(&'static str, NodeStage)> {
        match self {
            Self::Connect => Some(("connect", NodeStage::Connected)),
            Self::Multiply => Some(("multiply", NodeStage::Multiplied)),
            Self::Replicate => Some(("replicate", NodeStage::Replicated)),
            Self::Global | Self::Activated => None,
        }
    }

    fn next(&self) -> Self {
        match self {
            Self::Connect => Self::Multiply,
            Self::Multiply => Self::Replicate,
            Self::Replicate => Self::Global,
            Self::Global | Self::Activated => Self::Activated,
        }
    }
}

/// Parallel multi-node gate.
#[derive(Debug, Clone)]
pub struct NetworkGate {
    phase: NetworkPhase,
    stages: [NodeStage; NODES.len()],
    activated: bool,
    badge: String,
}

impl NetworkGate {
    pub fn new() -> Self {
        Self {
            phase: NetworkPhase::Connect,
            stages: [NodeStage::Dormant; NODES.len()],
            activated: false,
            badge: DEFAULT_BADGE.to_string(),
        }
    }

    pub fn phase(&self) -> NetworkPhase {
        self.phase
    }

    pub fn stage(&self, node: usize) -> Option<NodeStage> {
        self.stages.get(node).copied()
    }

    fn all_at_least(&self, stage: NodeStage) -> bool {
        self.stages.iter().all(|s| *s >= stage)
    }

    fn auto_advance(&mut self) {
        while let Some((_, target)) = self.phase.node_step() {
            if !self.all_at_least(target) {
                break;
            }
            self.phase = self.phase.next();
            log::debug!("network gate advanced to {}", self.phase.as_str());
        }
    }
}

impl Default for NetworkGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate for NetworkGate {
    fn kind(&self) -> GateKind {
        GateKind::NetworkMultiplication
    }

    fn title(&self) -> &'static str {
        "Network Multiplication"
    }

    fn describe(&self) -> &'static str {
        match self.phase {
            NetworkPhase::Connect => "Link every node to the centre.",
            NetworkPhase::Multiply => "Multiply each connected node.",
            NetworkPhase::Replicate => "Let each node replicate itself.",
            NetworkPhase::Global => "Send the flame to the nations.",
            NetworkPhase::Activated => "The network burns on its own.",
        }
    }

    fn start(&mut self, options: &GateOptions) {
        self.phase = NetworkPhase::Connect;
        self.stages = [NodeStage::Dormant; NODES.len()];
        self.activated = false;
        self.badge = options.badge_or(DEFAULT_BADGE);
    }

    fn interact(&mut self, event: &GateEvent) {
        if self.phase == NetworkPhase::Global {
            if event.kind == "activate" {
                self.activated = true;
                self.phase = NetworkPhase::Activated;
            }
            return;
        }
        let Some((kind, target)) = self.phase.node_step() else {
            return;
        };
        if event.kind != kind {
            return;
        }
        let Some(node) = event.target_in(&NODES) else {
            return;
        };
        // Each node moves exactly one stage per accepted event.
        if self.stages[node] as u8 + 1 == target as u8 {
            self.stages[node] = target;
            self.auto_advance();
        }
    }

    fn status(&self) -> GateStatus {
        let node_steps: usize = self.stages.iter().map(|s| *s as usize).sum();
        let progress = super::weighted_progress(&[
            (node_steps, NODES.len() * NodeStage::Replicated as usize),
            (usize::from(self.activated), 1),
        ]);
        GateStatus {
            phase: self.phase.as_str().to_string(),
            progress,
            detail: GateDetail::Network {
                nodes: NODES
                    .iter()
                    .zip(self.stages.iter())
                    .map(|(name, stage)| NodeStatus {
                        name: name.to_string(),
                        stage: stage.as_str().to_string(),
                    })
                    .collect(),
                activated: self.activated,
            },
        }
    }

    fn complete(&self) -> GateResult {
        if self.all_at_least(NodeStage::Replicated) && self.activated {
            GateResult::passed(GateReward::Badge(self.badge.clone()))
        } else {
            GateResult::not_yet()
        }
    }
}
