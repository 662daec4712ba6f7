//! The agent-controlled runner entity

use serde::{Deserialize, Serialize};

use crate::config::RunnerConfig;

/// Runner controlled by the policy
///
/// Screen coordinates: `y` grows downward, so the ground clamp keeps
/// `y <= ground_level` and a jump makes `vy` negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Fixed horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Vertical velocity in units per tick
    pub vy: f64,
    /// Remaining jump resources
    pub energy: u32,
    /// Upper bound for `energy`
    pub max_energy: u32,
}

impl Agent {
    /// Agent standing on the ground with a full jump budget
    pub fn spawn(config: &RunnerConfig) -> Self {
        Self {
            x: config.world.agent_x,
            y: config.world.ground_level(),
            vy: 0.0,
            energy: config.physics.max_energy,
            max_energy: config.physics.max_energy,
        }
    }

    /// Grounded means no vertical motion; the physics step zeroes `vy` on landing.
    pub fn is_grounded(&self) -> bool {
        self.vy == 0.0
    }

    pub fn has_energy(&self) -> bool {
        self.energy > 0
    }

    /// Share of the jump budget left, in [0, 1]
    pub fn energy_fraction(&self) -> f64 {
        if self.max_energy == 0 {
            return 0.0;
        }
        f64::from(self.energy) / f64::from(self.max_energy)
    }
}
