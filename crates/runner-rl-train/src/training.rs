//! Tick driver: observe, act, simulate, reward, reset

use runner_rl_core::{
    Action, EpisodeController, GameManifest, Observation, ObservationEncoder, RenderSnapshot,
    Result, RewardFunction, RunnerConfig, RunnerReward, StepResult, Transition,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::history::RewardHistory;
use crate::policy::Policy;
use crate::store::PolicyStore;

/// Totals for one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// 0-based episode index
    pub episode: u64,
    pub ticks: u64,
    pub score: u64,
    pub total_reward: f64,
    /// `total_reward / ticks`
    pub average_reward: f64,
}

/// Single owner of the simulation, the policy and the reward history
pub struct TrainingLoop {
    controller: EpisodeController,
    encoder: ObservationEncoder,
    reward_fn: Box<dyn RewardFunction>,
    policy: Box<dyn Policy>,
    history: RewardHistory,
    episode: u64,
    episode_reward: f64,
    total_ticks: u64,
    best_score: u64,
    last_summary: Option<EpisodeSummary>,
}

impl TrainingLoop {
    pub fn new(config: RunnerConfig, policy: Box<dyn Policy>) -> Self {
        let encoder = ObservationEncoder::new(&config);
        let reward_fn = Box::new(RunnerReward::new(config.reward.clone()));
        let history = RewardHistory::new(config.training.history_capacity);
        Self {
            controller: EpisodeController::new(config),
            encoder,
            reward_fn,
            policy,
            history,
            episode: 0,
            episode_reward: 0.0,
            total_ticks: 0,
            best_score: 0,
            last_summary: None,
        }
    }

    /// Replace the reward function
    pub fn with_reward_function(mut self, reward_fn: Box<dyn RewardFunction>) -> Self {
        self.reward_fn = reward_fn;
        self
    }

    pub fn manifest(&self) -> GameManifest {
        GameManifest::from_config(self.controller.config())
    }

    pub fn controller(&self) -> &EpisodeController {
        &self.controller
    }

    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    pub fn history(&self) -> &RewardHistory {
        &self.history
    }

    /// Index of the episode currently running
    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn last_summary(&self) -> Option<&EpisodeSummary> {
        self.last_summary.as_ref()
    }

    /// Observation of the current state
    pub fn observe(&self) -> Observation {
        self.encoder.encode(self.controller.state())
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.controller.snapshot()
    }

    /// Run one tick. A tick that terminates the episode also resets it, so
    /// the next call starts a fresh episode.
    pub fn tick(&mut self) -> StepResult {
        if self.controller.is_terminated() {
            self.controller.reset();
        }

        let observation = self.encoder.encode(self.controller.state());
        let index = self.policy.act(&observation);
        if index >= Action::COUNT {
            warn!(index, policy = self.policy.name(), "policy returned invalid action, clamping");
        }
        let action = Action::from_index(index);

        let prev_score = self.controller.state().score;
        let had_energy_before = self.controller.state().agent.has_energy();

        let outcome = self.controller.step(action);
        let reward = self.reward_fn.compute(&Transition {
            prev_score,
            state: self.controller.state(),
            had_energy_before,
            action,
        });
        self.policy.learn(reward.value);

        self.episode_reward += reward.value;
        self.total_ticks += 1;
        debug!(
            episode = self.episode,
            tick = outcome.tick,
            action = action.name(),
            reward = reward.value,
            "tick"
        );

        let result = StepResult {
            episode: self.episode,
            tick: outcome.tick,
            observation,
            action,
            reward: reward.value,
            reward_components: reward.components,
            score: outcome.score,
            done: outcome.done,
            termination_reason: outcome.termination_reason,
            events: outcome.events,
        };

        if outcome.done {
            self.finish_episode(outcome.tick, outcome.score);
        }
        result
    }

    fn finish_episode(&mut self, ticks: u64, score: u64) {
        self.policy.end_episode();

        let average_reward = self.episode_reward / ticks.max(1) as f64;
        self.history.push(average_reward);
        self.best_score = self.best_score.max(score);

        let summary = EpisodeSummary {
            episode: self.episode,
            ticks,
            score,
            total_reward: self.episode_reward,
            average_reward,
        };
        info!(
            episode = summary.episode,
            ticks,
            score,
            best_score = self.best_score,
            total_reward = summary.total_reward,
            average_reward,
            "episode finished"
        );
        self.last_summary = Some(summary);

        self.episode += 1;
        self.episode_reward = 0.0;
        self.controller.reset();
    }

    /// Run `ticks` ticks; returns the episodes that finished meanwhile
    pub fn run_ticks(&mut self, ticks: u64) -> Vec<EpisodeSummary> {
        let mut finished = Vec::new();
        for _ in 0..ticks {
            if self.tick().done {
                finished.extend(self.last_summary.clone());
            }
        }
        finished
    }

    /// Run until `episodes` more episodes have finished
    pub fn run_episodes(&mut self, episodes: u64) -> Vec<EpisodeSummary> {
        let mut finished = Vec::with_capacity(episodes as usize);
        while (finished.len() as u64) < episodes {
            if self.tick().done {
                finished.extend(self.last_summary.clone());
            }
        }
        finished
    }

    /// Persist the policy's parameters under `key`
    pub async fn save_policy(&self, store: &dyn PolicyStore, key: &str) -> Result<()> {
        let blob = self.policy.serialize()?;
        store.store(key, &blob).await?;
        info!(key, bytes = blob.len(), policy = self.policy.name(), "policy saved");
        Ok(())
    }

    /// Restore the policy from `key`.
    ///
    /// Missing or corrupt blobs are not fatal: the policy keeps its untrained
    /// parameters and `false` is returned.
    pub async fn load_policy(&mut self, store: &dyn PolicyStore, key: &str) -> bool {
        let blob = match store.retrieve(key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!(key, "no saved policy, starting untrained");
                return false;
            }
            Err(e) => {
                warn!(key, error = %e, "policy store read failed, starting untrained");
                return false;
            }
        };

        match self.policy.deserialize(&blob) {
            Ok(()) => {
                info!(key, bytes = blob.len(), policy = self.policy.name(), "policy loaded");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "saved policy unreadable, starting untrained");
                false
            }
        }
    }
}
