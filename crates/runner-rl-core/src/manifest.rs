//! Environment manifest types

use serde::{Deserialize, Serialize};

use crate::action::ActionSpace;
use crate::config::RunnerConfig;
use crate::encoder::ObservationEncoder;
use crate::reward::{RewardComponentDef, RewardFunction, RunnerReward};

/// Manifest describing the environment a policy is trained against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameManifest {
    /// Environment name
    pub name: String,
    /// Environment version
    pub version: String,
    /// Length of every observation vector
    pub observation_size: usize,
    /// Feature names in observation order
    pub observation_features: Vec<String>,
    /// Action space
    pub action_space: ActionSpace,
    /// Available reward components
    #[serde(default)]
    pub reward_components: Vec<RewardComponentDef>,
    /// Frames per second of the tick driver, 0 when unpaced
    pub tick_rate: u32,
    /// Deterministic given the seed
    pub deterministic: bool,
    /// Seed of the world generator
    pub seed: u64,
}

impl GameManifest {
    pub fn from_config(config: &RunnerConfig) -> Self {
        let encoder = ObservationEncoder::new(config);
        let reward = RunnerReward::new(config.reward.clone());
        Self {
            name: "runner".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            observation_size: encoder.observation_size(),
            observation_features: encoder.feature_names(),
            action_space: ActionSpace::runner(),
            reward_components: reward.components(),
            tick_rate: config.training.fps,
            deterministic: true,
            seed: config.seed,
        }
    }
}
