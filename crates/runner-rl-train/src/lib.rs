//! # runner-rl-train
//!
//! Training harness for the runner simulation.
//!
//! This crate provides:
//! - `Policy` trait for plugging in learners, plus random, fixed and
//!   tabular Q-learning policies
//! - `PolicyStore` trait for persisting learned parameters, with memory and
//!   file backends
//! - `TrainingLoop`, the single owner of an episode that drives one tick per frame
//! - `RewardHistory`, a ring of past-episode average rewards for reporting

pub mod history;
pub mod policy;
pub mod store;
pub mod training;

pub use history::RewardHistory;
pub use policy::{FixedPolicy, Policy, QTablePolicy, RandomPolicy};
pub use store::{FileStore, MemoryStore, PolicyStore};
pub use training::{EpisodeSummary, TrainingLoop};
