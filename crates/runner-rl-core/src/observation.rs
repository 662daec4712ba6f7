//! Observation, step result and event types

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::action::Action;
use crate::reward::RewardComponents;

/// Fixed-length feature vector handed to the policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation(Vec<f64>);

impl Observation {
    pub fn new(features: Vec<f64>) -> Self {
        Self(features)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for Observation {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Result of one training tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Episode the tick belonged to (0-based)
    pub episode: u64,

    /// Tick count of the episode after this tick
    pub tick: u64,

    /// Observation the action was chosen from
    pub observation: Observation,

    /// Action applied after clamping
    pub action: Action,

    /// Scalar reward signal
    pub reward: f64,

    /// Decomposed reward for analysis
    #[serde(default)]
    pub reward_components: RewardComponents,

    /// Score after this tick
    pub score: u64,

    /// Episode terminated on this tick
    pub done: bool,

    /// Why episode ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,

    /// Notable events this tick
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminationReason {
    /// The runner touched an obstacle
    Collision { obstacle_x: f64 },
}

/// Game event that occurred during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Jumped { tick: u64, energy_left: u32 },
    /// Jump requested while airborne or out of energy
    JumpRefused { tick: u64 },
    Landed { tick: u64 },
    EnergyRegenerated { tick: u64, energy: u32 },
    ObstacleSpawned { tick: u64, x: f64 },
    ObstaclePassed { tick: u64, count: u32 },
    Collision { tick: u64, obstacle_x: f64 },
}
