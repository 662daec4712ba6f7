//! # runner-rl-core
//!
//! Deterministic side-scrolling runner simulation for reinforcement learning.
//!
//! This crate provides the pieces a training loop drives once per tick:
//! - Configuration with the reference game's constants as defaults
//! - Physics, world generation and collision for the runner
//! - The episode state machine (reset / step / terminate)
//! - Observation encoding and the reward function

pub mod action;
pub mod agent;
pub mod collision;
pub mod config;
pub mod encoder;
pub mod episode;
pub mod error;
pub mod manifest;
pub mod observation;
pub mod physics;
pub mod reward;
pub mod world;

pub use action::{Action, ActionSpace};
pub use agent::Agent;
pub use collision::CollisionDetector;
pub use config::{QLearningConfig, RunnerConfig};
pub use encoder::ObservationEncoder;
pub use episode::{EpisodeController, EpisodePhase, EpisodeState, RenderSnapshot, StepOutcome};
pub use error::{Result, RunnerError};
pub use manifest::GameManifest;
pub use observation::{GameEvent, Observation, StepResult, TerminationReason};
pub use physics::PhysicsModel;
pub use reward::{Reward, RewardComponents, RewardFunction, RunnerReward, Transition};
pub use world::{Decoration, Obstacle, World, WorldGenerator};
