//! Simulation and training configuration
//!
//! Every section defaults to the constants of the reference runner game, so an
//! empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, RunnerError};

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Seed for procedural generation
    pub seed: u64,
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub spawn: SpawnConfig,
    pub collision: CollisionConfig,
    pub observation: ObservationConfig,
    pub reward: RewardConfig,
    pub training: TrainingConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldConfig::default(),
            physics: PhysicsConfig::default(),
            spawn: SpawnConfig::default(),
            collision: CollisionConfig::default(),
            observation: ObservationConfig::default(),
            reward: RewardConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

/// Playfield geometry and scrolling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Visible width in world units
    pub visible_width: f64,
    /// Visible height in world units
    pub visible_height: f64,
    /// Distance from the bottom edge to the ground line
    pub ground_margin: f64,
    /// Fixed horizontal position of the agent
    pub agent_x: f64,
    /// Horizontal position of the obstacle every episode starts with
    pub initial_obstacle_x: f64,
    /// Scroll speed at episode start (units per tick)
    pub initial_speed: f64,
    /// Scroll speed added every tick
    pub speed_increment: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            visible_width: 800.0,
            visible_height: 600.0,
            ground_margin: 50.0,
            agent_x: 50.0,
            initial_obstacle_x: 500.0,
            initial_speed: 3.0,
            speed_increment: 0.001,
        }
    }
}

impl WorldConfig {
    /// Ground level in screen coordinates (y grows downward)
    pub fn ground_level(&self) -> f64 {
        self.visible_height - self.ground_margin
    }
}

/// Vertical motion and the jump budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f64,
    /// Fixed per-tick timestep
    pub dt: f64,
    /// Vertical velocity set by a jump (negative is up)
    pub jump_impulse: f64,
    /// Maximum jump resources
    pub max_energy: u32,
    /// Ticks between regenerating one resource
    pub energy_regen_interval: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 100.0,
            dt: 0.1,
            jump_impulse: -10.0,
            max_energy: 3,
            energy_regen_interval: 60,
        }
    }
}

/// Obstacle and decoration cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Ticks between obstacle spawns
    pub obstacle_interval: u64,
    /// Obstacles left of this x are removed and scored
    pub obstacle_despawn_x: f64,
    /// Ticks between decoration spawns
    pub decoration_interval: u64,
    /// Random horizontal offset range for new decorations
    pub decoration_jitter: f64,
    /// Decorations left of this x are removed
    pub decoration_despawn_x: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            obstacle_interval: 100,
            obstacle_despawn_x: -10.0,
            decoration_interval: 200,
            decoration_jitter: 200.0,
            decoration_despawn_x: -100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Distance below which agent and obstacle collide
    pub threshold: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { threshold: 10.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    /// Number of obstacle slots in the observation vector
    pub obstacle_slots: usize,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self { obstacle_slots: 3 }
    }
}

/// Reward constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward for a tick in which the score went up
    pub pass_reward: f64,
    /// Reward for the tick that ends the episode
    pub terminal_penalty: f64,
    /// Reward for a jump that spends the last resource
    pub waste_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            pass_reward: 1.0,
            terminal_penalty: -100.0,
            waste_penalty: -10.0,
        }
    }
}

/// Training loop and bundled learner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Episodes kept in the reward history ring
    pub history_capacity: usize,
    /// Frames per second for the tick driver, 0 runs unpaced
    pub fps: u32,
    /// Save the policy every N episodes, 0 disables periodic saves
    pub save_every_episodes: u64,
    pub q_learning: QLearningConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            fps: 0,
            save_every_episodes: 50,
            q_learning: QLearningConfig::default(),
        }
    }
}

/// Tabular Q-learning hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub learning_rate: f64,
    pub discount: f64,
    pub epsilon: f64,
    pub epsilon_min: f64,
    /// Multiplied into epsilon at the end of every episode
    pub epsilon_decay: f64,
    /// Buckets per observation feature
    pub bins: usize,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.95,
            epsilon: 0.2,
            epsilon_min: 0.01,
            epsilon_decay: 0.99,
            bins: 12,
        }
    }
}

impl RunnerConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunnerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RunnerError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if !(w.visible_width > 0.0) || !(w.visible_height > 0.0) {
            return Err(RunnerError::Config("visible area must be positive".into()));
        }
        if !(w.ground_margin >= 0.0 && w.ground_margin < w.visible_height) {
            return Err(RunnerError::Config(format!(
                "ground_margin {} must lie within visible_height {}",
                w.ground_margin, w.visible_height
            )));
        }
        if w.initial_speed < 0.0 || w.speed_increment < 0.0 {
            return Err(RunnerError::Config("scroll speed must not be negative".into()));
        }

        let p = &self.physics;
        if !(p.dt > 0.0) {
            return Err(RunnerError::Config("dt must be positive".into()));
        }
        if p.gravity < 0.0 {
            return Err(RunnerError::Config("gravity must not be negative".into()));
        }
        if !(p.jump_impulse < 0.0) {
            return Err(RunnerError::Config("jump_impulse must be negative (upward)".into()));
        }
        if p.max_energy == 0 {
            return Err(RunnerError::Config("max_energy must be at least 1".into()));
        }
        if p.energy_regen_interval == 0 {
            return Err(RunnerError::Config("energy_regen_interval must be at least 1".into()));
        }

        let s = &self.spawn;
        if s.obstacle_interval == 0 || s.decoration_interval == 0 {
            return Err(RunnerError::Config("spawn intervals must be at least 1".into()));
        }
        if s.decoration_jitter < 0.0 {
            return Err(RunnerError::Config("decoration_jitter must not be negative".into()));
        }

        if !(self.collision.threshold > 0.0) {
            return Err(RunnerError::Config("collision threshold must be positive".into()));
        }
        if self.observation.obstacle_slots == 0 {
            return Err(RunnerError::Config("obstacle_slots must be at least 1".into()));
        }

        let r = &self.reward;
        if !(r.pass_reward > 0.0) {
            return Err(RunnerError::Config("pass_reward must be positive".into()));
        }
        if !(r.terminal_penalty < 0.0) || !(r.waste_penalty < 0.0) {
            return Err(RunnerError::Config("penalties must be negative".into()));
        }

        let t = &self.training;
        if t.history_capacity == 0 {
            return Err(RunnerError::Config("history_capacity must be at least 1".into()));
        }
        let q = &t.q_learning;
        if q.bins < 2 {
            return Err(RunnerError::Config("q_learning.bins must be at least 2".into()));
        }
        if !(0.0..=1.0).contains(&q.learning_rate)
            || !(0.0..=1.0).contains(&q.discount)
            || !(0.0..=1.0).contains(&q.epsilon)
            || !(0.0..=1.0).contains(&q.epsilon_min)
            || !(0.0..=1.0).contains(&q.epsilon_decay)
        {
            return Err(RunnerError::Config("q_learning rates must lie in [0, 1]".into()));
        }
        Ok(())
    }
}
