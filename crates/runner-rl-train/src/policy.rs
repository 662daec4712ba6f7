//! Policy trait and bundled implementations
//!
//! The training loop only sees the [`Policy`] trait. Any learner that maps an
//! observation to an action index and accepts one scalar reward per tick can be
//! plugged in without touching the simulation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use runner_rl_core::{Action, QLearningConfig, Result, RunnerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Decision-making component trained against the runner.
///
/// Calls are synchronous and happen inside a tick: `act` once, then `learn`
/// once with the reward of the transition that action produced.
pub trait Policy: Send {
    /// Short identifier used in logs and store keys
    fn name(&self) -> &str;

    /// Number of actions `act` may return
    fn action_count(&self) -> usize {
        Action::COUNT
    }

    /// Choose an action index for `observation`
    fn act(&mut self, observation: &[f64]) -> usize;

    /// Credit `reward` to the transition produced by the most recent `act`
    fn learn(&mut self, reward: f64);

    /// The last credited transition was terminal
    fn end_episode(&mut self) {}

    /// Learned parameters as an opaque blob
    fn serialize(&self) -> Result<Vec<u8>>;

    /// Restore parameters from [`serialize`](Self::serialize) output.
    ///
    /// On error the policy is left unchanged.
    fn deserialize(&mut self, blob: &[u8]) -> Result<()>;
}

/// Uniformly random jumps; a baseline with nothing to learn
pub struct RandomPolicy {
    rng: ChaCha8Rng,
    jump_probability: f64,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self::with_jump_probability(seed, 0.5)
    }

    pub fn with_jump_probability(seed: u64, jump_probability: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            jump_probability: jump_probability.clamp(0.0, 1.0),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, _observation: &[f64]) -> usize {
        if self.rng.random_bool(self.jump_probability) {
            Action::Jump.index()
        } else {
            Action::Noop.index()
        }
    }

    fn learn(&mut self, _reward: f64) {}

    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn deserialize(&mut self, _blob: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Always returns the same index, which need not be valid
pub struct FixedPolicy {
    index: usize,
}

impl FixedPolicy {
    pub fn new(action: Action) -> Self {
        Self {
            index: action.index(),
        }
    }

    /// Policy returning a raw index, e.g. one outside the action set
    pub fn raw(index: usize) -> Self {
        Self { index }
    }
}

impl Policy for FixedPolicy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn act(&mut self, _observation: &[f64]) -> usize {
        self.index
    }

    fn learn(&mut self, _reward: f64) {}

    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn deserialize(&mut self, _blob: &[u8]) -> Result<()> {
        Ok(())
    }
}

pub type QValues = [f64; Action::COUNT];

/// Persisted parameters of a [`QTablePolicy`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QTableSnapshot {
    bins: usize,
    epsilon: f64,
    episodes: u64,
    table: BTreeMap<String, QValues>,
}

/// Tabular epsilon-greedy Q-learning over a bucketed observation.
///
/// The update for a transition is applied lazily: `learn` stores the reward,
/// and the next `act` (or `end_episode`, with no bootstrap) folds it into the
/// table once the successor state is known.
pub struct QTablePolicy {
    config: QLearningConfig,
    rng: ChaCha8Rng,
    epsilon: f64,
    episodes: u64,
    table: BTreeMap<String, QValues>,
    pending: Option<(String, usize)>,
    pending_reward: Option<f64>,
}

impl QTablePolicy {
    pub fn new(config: QLearningConfig, seed: u64) -> Self {
        Self {
            epsilon: config.epsilon,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            episodes: 0,
            table: BTreeMap::new(),
            pending: None,
            pending_reward: None,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    /// Number of visited states
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    pub fn q_values(&self, observation: &[f64]) -> QValues {
        self.table
            .get(&self.state_key(observation))
            .copied()
            .unwrap_or_default()
    }

    /// Features are expected in [-1, 1]; each maps to one of `bins` buckets.
    fn state_key(&self, observation: &[f64]) -> String {
        let bins = self.config.bins;
        observation
            .iter()
            .map(|v| {
                let unit = ((v + 1.0) / 2.0).clamp(0.0, 1.0);
                ((unit * bins as f64) as usize).min(bins - 1).to_string()
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn greedy(values: &QValues) -> usize {
        let mut best = 0;
        for (i, v) in values.iter().enumerate() {
            if *v > values[best] {
                best = i;
            }
        }
        best
    }

    fn update(&mut self, key: String, action: usize, reward: f64, bootstrap: f64) {
        let alpha = self.config.learning_rate;
        let target = reward + self.config.discount * bootstrap;
        let q = self.table.entry(key).or_default();
        q[action] += alpha * (target - q[action]);
    }
}

impl Policy for QTablePolicy {
    fn name(&self) -> &str {
        "qtable"
    }

    fn act(&mut self, observation: &[f64]) -> usize {
        let key = self.state_key(observation);
        let values = self.table.get(&key).copied().unwrap_or_default();

        if let (Some((prev_key, prev_action)), Some(reward)) =
            (self.pending.take(), self.pending_reward.take())
        {
            let next_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            self.update(prev_key, prev_action, reward, next_max);
        }

        let action = if self.rng.random::<f64>() < self.epsilon {
            self.rng.random_range(0..Action::COUNT)
        } else {
            Self::greedy(&values)
        };
        self.pending = Some((key, action));
        action
    }

    fn learn(&mut self, reward: f64) {
        self.pending_reward = Some(reward);
    }

    fn end_episode(&mut self) {
        if let (Some((key, action)), Some(reward)) = (self.pending.take(), self.pending_reward.take())
        {
            self.update(key, action, reward, 0.0);
        }
        self.episodes += 1;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        debug!(
            episodes = self.episodes,
            epsilon = self.epsilon,
            states = self.table.len(),
            "q-table episode end"
        );
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        let snapshot = QTableSnapshot {
            bins: self.config.bins,
            epsilon: self.epsilon,
            episodes: self.episodes,
            table: self.table.clone(),
        };
        Ok(serde_json::to_vec(&snapshot)?)
    }

    fn deserialize(&mut self, blob: &[u8]) -> Result<()> {
        let snapshot: QTableSnapshot = serde_json::from_slice(blob)?;
        if snapshot.bins != self.config.bins {
            return Err(RunnerError::Policy(format!(
                "q-table was built with {} bins, configured for {}",
                snapshot.bins, self.config.bins
            )));
        }
        if !(0.0..=1.0).contains(&snapshot.epsilon) {
            return Err(RunnerError::Policy(format!(
                "epsilon {} out of range",
                snapshot.epsilon
            )));
        }
        self.epsilon = snapshot.epsilon;
        self.episodes = snapshot.episodes;
        self.table = snapshot.table;
        self.pending = None;
        self.pending_reward = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greedy_config() -> QLearningConfig {
        QLearningConfig {
            epsilon: 0.0,
            epsilon_min: 0.0,
            learning_rate: 0.5,
            discount: 0.9,
            ..QLearningConfig::default()
        }
    }

    #[test]
    fn test_fixed_policy_returns_raw_index() {
        let mut policy = FixedPolicy::raw(7);
        assert_eq!(policy.act(&[0.0]), 7);
        assert_eq!(FixedPolicy::new(Action::Jump).act(&[]), 1);
    }

    #[test]
    fn test_random_policy_is_seeded() {
        let mut a = RandomPolicy::new(3);
        let mut b = RandomPolicy::new(3);
        let xs: Vec<usize> = (0..50).map(|_| a.act(&[])).collect();
        let ys: Vec<usize> = (0..50).map(|_| b.act(&[])).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&i| i < Action::COUNT));
        assert!(xs.contains(&0) && xs.contains(&1));
    }

    #[test]
    fn test_terminal_update_without_bootstrap() {
        let mut policy = QTablePolicy::new(greedy_config(), 0);
        let obs = [0.5, 1.0, 0.0];
        assert_eq!(policy.act(&obs), 0);
        policy.learn(-100.0);
        policy.end_episode();
        assert_eq!(policy.q_values(&obs), [-50.0, 0.0]);
        assert_eq!(policy.episodes(), 1);

        // The penalised action is now avoided
        assert_eq!(policy.act(&obs), 1);
    }

    #[test]
    fn test_update_bootstraps_on_next_act() {
        let mut policy = QTablePolicy::new(greedy_config(), 0);
        let s0 = [0.5, 0.0];
        let s1 = [-0.9, 0.0];
        policy.act(&s0);
        policy.learn(1.0);
        policy.act(&s1);
        // 0 + 0.5 * (1.0 + 0.9 * 0.0 - 0)
        assert_eq!(policy.q_values(&s0), [0.5, 0.0]);
        assert_eq!(policy.table_len(), 1);
    }

    #[test]
    fn test_epsilon_decays_to_floor() {
        let config = QLearningConfig {
            epsilon: 0.5,
            epsilon_min: 0.1,
            epsilon_decay: 0.5,
            ..QLearningConfig::default()
        };
        let mut policy = QTablePolicy::new(config, 0);
        for _ in 0..10 {
            policy.end_episode();
        }
        assert_eq!(policy.epsilon(), 0.1);
    }

    #[test]
    fn test_blob_restores_table() {
        let mut trained = QTablePolicy::new(greedy_config(), 0);
        let obs = [0.2, 0.0, 1.0];
        trained.act(&obs);
        trained.learn(-10.0);
        trained.end_episode();
        let blob = trained.serialize().unwrap();

        let mut fresh = QTablePolicy::new(greedy_config(), 1);
        fresh.deserialize(&blob).unwrap();
        assert_eq!(fresh.q_values(&obs), trained.q_values(&obs));
        assert_eq!(fresh.episodes(), 1);
    }

    #[test]
    fn test_corrupt_blob_leaves_policy_unchanged() {
        let mut policy = QTablePolicy::new(greedy_config(), 0);
        let err = policy.deserialize(b"{not json").unwrap_err();
        assert!(matches!(err, RunnerError::Serialization(_)));
        assert_eq!(policy.table_len(), 0);

        let mut other = QTablePolicy::new(
            QLearningConfig {
                bins: 4,
                ..greedy_config()
            },
            0,
        );
        let blob = other.serialize().unwrap();
        other.act(&[0.0]);
        assert!(matches!(policy.deserialize(&blob), Err(RunnerError::Policy(_))));
    }
}
