//! Projection of episode state into the policy's observation vector
//!
//! Layout, for `K` obstacle slots:
//!
//! | index | feature |
//! |---|---|
//! | `0..K` | x of the i-th obstacle in spawn order / visible width, capped at 1.0 |
//! | `K` | vertical velocity / \|jump impulse\|, clamped to [-1, 1] |
//! | `K + 1` | remaining energy / max energy |
//!
//! Empty slots read 1.0, the same as an obstacle at the right edge, so a
//! missing obstacle never looks closer than a real one.

use crate::config::RunnerConfig;
use crate::episode::EpisodeState;
use crate::observation::Observation;

/// Value of an obstacle slot with no obstacle in it
pub const FAR_SENTINEL: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct ObservationEncoder {
    slots: usize,
    visible_width: f64,
    velocity_scale: f64,
}

impl ObservationEncoder {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            slots: config.observation.obstacle_slots,
            visible_width: config.world.visible_width,
            velocity_scale: config.physics.jump_impulse.abs(),
        }
    }

    pub fn obstacle_slots(&self) -> usize {
        self.slots
    }

    /// Length of every vector [`encode`](Self::encode) returns
    pub fn observation_size(&self) -> usize {
        self.slots + 2
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = (0..self.slots).map(|i| format!("obstacle_{i}_x")).collect();
        names.push("vertical_velocity".into());
        names.push("energy_fraction".into());
        names
    }

    pub fn encode(&self, state: &EpisodeState) -> Observation {
        let mut features = Vec::with_capacity(self.observation_size());

        let obstacles = &state.world.obstacles;
        features.extend(
            obstacles
                .iter()
                .take(self.slots)
                .map(|o| (o.x / self.visible_width).clamp(-1.0, FAR_SENTINEL)),
        );
        features.resize(self.slots, FAR_SENTINEL);

        features.push((state.agent.vy / self.velocity_scale).clamp(-1.0, 1.0));
        features.push(state.agent.energy_fraction());

        Observation::new(features)
    }
}
