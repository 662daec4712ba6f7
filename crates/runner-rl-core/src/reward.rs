//! Reward types and the runner reward function

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::Action;
use crate::config::RewardConfig;
use crate::episode::EpisodeState;

/// Scalar reward with optional decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    /// Total scalar reward
    pub value: f64,
    /// Decomposed components for analysis
    #[serde(default)]
    pub components: RewardComponents,
}

impl Reward {
    fn single(component: &str, value: f64) -> Self {
        let mut components = RewardComponents::new();
        components.insert(component.to_string(), value);
        Self { value, components }
    }
}

/// Decomposed reward components
pub type RewardComponents = BTreeMap<String, f64>;

pub const PASS_COMPONENT: &str = "pass";
pub const TERMINAL_COMPONENT: &str = "terminal";
pub const WASTE_COMPONENT: &str = "waste";

/// Definition of a reward component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardComponentDef {
    /// Component name
    pub name: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expected range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

/// One tick's worth of input to a reward function
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    /// Score before the tick
    pub prev_score: u64,
    /// State after the tick
    pub state: &'a EpisodeState,
    /// Agent held at least one resource before the tick
    pub had_energy_before: bool,
    /// Action requested for the tick
    pub action: Action,
}

/// Trait for computing rewards from a state transition
pub trait RewardFunction: Send + Sync {
    /// Compute reward for one tick
    fn compute(&self, transition: &Transition<'_>) -> Reward;

    /// List available reward components
    fn components(&self) -> Vec<RewardComponentDef>;
}

/// Sparse pass reward with terminal and resource-waste overrides.
///
/// Exactly one term applies per tick, checked in this order:
/// terminal, waste, pass. The pass term is `sign(score delta) * pass_reward`,
/// so a tick that clears two obstacles earns the same as one that clears one.
#[derive(Debug, Clone)]
pub struct RunnerReward {
    config: RewardConfig,
}

impl RunnerReward {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn compute_reward(
        &self,
        prev_score: u64,
        state: &EpisodeState,
        had_energy_before: bool,
        action: Action,
    ) -> Reward {
        if state.is_terminated() {
            return Reward::single(TERMINAL_COMPONENT, self.config.terminal_penalty);
        }

        let wasted = action == Action::Jump && had_energy_before && state.agent.energy == 0;
        if wasted {
            return Reward::single(WASTE_COMPONENT, self.config.waste_penalty);
        }

        let sign = match state.score.cmp(&prev_score) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => -1.0,
        };
        Reward::single(PASS_COMPONENT, sign * self.config.pass_reward)
    }
}

impl RewardFunction for RunnerReward {
    fn compute(&self, transition: &Transition<'_>) -> Reward {
        self.compute_reward(
            transition.prev_score,
            transition.state,
            transition.had_energy_before,
            transition.action,
        )
    }

    fn components(&self) -> Vec<RewardComponentDef> {
        vec![
            RewardComponentDef {
                name: PASS_COMPONENT.into(),
                description: Some("Score went up this tick".into()),
                range: Some([0.0, self.config.pass_reward]),
            },
            RewardComponentDef {
                name: TERMINAL_COMPONENT.into(),
                description: Some("Collision ended the episode".into()),
                range: Some([self.config.terminal_penalty, self.config.terminal_penalty]),
            },
            RewardComponentDef {
                name: WASTE_COMPONENT.into(),
                description: Some("Jump spent the last resource".into()),
                range: Some([self.config.waste_penalty, self.config.waste_penalty]),
            },
        ]
    }
}
