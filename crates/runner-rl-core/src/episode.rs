//! Episode state machine: reset, step, terminate

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::agent::Agent;
use crate::collision::CollisionDetector;
use crate::config::RunnerConfig;
use crate::error::Result;
use crate::observation::{GameEvent, TerminationReason};
use crate::physics::PhysicsModel;
use crate::world::{Decoration, Obstacle, World, WorldGenerator};

/// Lifecycle phase of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodePhase {
    Running,
    Terminated,
}

/// All mutable simulation state of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeState {
    pub agent: Agent,
    pub world: World,
    /// Ticks simulated so far
    pub tick: u64,
    /// Obstacles passed
    pub score: u64,
    pub phase: EpisodePhase,
}

impl EpisodeState {
    /// Canonical start-of-episode state
    pub fn initial(config: &RunnerConfig) -> Self {
        Self {
            agent: Agent::spawn(config),
            world: World::initial(config),
            tick: 0,
            score: 0,
            phase: EpisodePhase::Running,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == EpisodePhase::Terminated
    }

    /// SHA-256 of the serialized state, for determinism checks
    pub fn state_hash(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&json)))
    }
}

/// Read-only view handed to external renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub score: u64,
    pub terminated: bool,
    pub ground_level: f64,
    pub agent: Agent,
    pub obstacles: Vec<Obstacle>,
    pub decorations: Vec<Decoration>,
}

/// What a call to [`EpisodeController::step`] did
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub tick: u64,
    pub score: u64,
    /// Episode is terminated after this step
    pub done: bool,
    pub termination_reason: Option<TerminationReason>,
    pub events: Vec<GameEvent>,
}

/// Owns the episode state and runs one tick at a time
pub struct EpisodeController {
    config: RunnerConfig,
    physics: PhysicsModel,
    generator: WorldGenerator,
    collision: CollisionDetector,
    state: EpisodeState,
    last_termination: Option<TerminationReason>,
}

impl EpisodeController {
    pub fn new(config: RunnerConfig) -> Self {
        let physics = PhysicsModel::new(&config);
        let generator = WorldGenerator::new(&config);
        let collision =
            CollisionDetector::new(config.collision.threshold, config.world.ground_level());
        let state = EpisodeState::initial(&config);
        Self {
            config,
            physics,
            generator,
            collision,
            state,
            last_termination: None,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    pub fn phase(&self) -> EpisodePhase {
        self.state.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// Discard the current episode and start a fresh one.
    ///
    /// The random stream continues, so consecutive episodes differ.
    pub fn reset(&mut self) -> &EpisodeState {
        self.state = EpisodeState::initial(&self.config);
        self.last_termination = None;
        debug!("episode reset");
        &self.state
    }

    /// Reset and restart the random stream from `seed`
    pub fn reset_with_seed(&mut self, seed: u64) -> &EpisodeState {
        self.generator.reseed(seed);
        self.reset()
    }

    /// Run one tick: action, physics, world, collision, tick counter.
    ///
    /// Stepping a terminated episode changes nothing and reports `done` again.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        if self.state.is_terminated() {
            warn!(tick = self.state.tick, "step on terminated episode, call reset");
            return StepOutcome {
                tick: self.state.tick,
                score: self.state.score,
                done: true,
                termination_reason: self.last_termination,
                events: Vec::new(),
            };
        }

        let tick = self.state.tick + 1;
        let mut events = Vec::new();
        let state = &mut self.state;

        if action == Action::Jump {
            if self.physics.try_jump(&mut state.agent) {
                events.push(GameEvent::Jumped {
                    tick,
                    energy_left: state.agent.energy,
                });
            } else {
                events.push(GameEvent::JumpRefused { tick });
            }
        }

        if self.physics.advance(&mut state.agent) {
            events.push(GameEvent::Landed { tick });
        }
        if self.physics.regenerate(&mut state.agent, tick) {
            events.push(GameEvent::EnergyRegenerated {
                tick,
                energy: state.agent.energy,
            });
        }

        let world_tick = self.generator.advance(&mut state.world, tick);
        if world_tick.passed > 0 {
            state.score += u64::from(world_tick.passed);
            events.push(GameEvent::ObstaclePassed {
                tick,
                count: world_tick.passed,
            });
        }
        if let Some(x) = world_tick.spawned_obstacle {
            events.push(GameEvent::ObstacleSpawned { tick, x });
        }

        let mut termination_reason = None;
        if let Some(index) = self.collision.first_hit(&state.agent, &state.world.obstacles) {
            let obstacle_x = state.world.obstacles[index].x;
            state.phase = EpisodePhase::Terminated;
            termination_reason = Some(TerminationReason::Collision { obstacle_x });
            events.push(GameEvent::Collision { tick, obstacle_x });
            info!(tick, score = state.score, obstacle_x, "episode terminated by collision");
        }
        self.last_termination = termination_reason;

        state.tick = tick;

        StepOutcome {
            tick,
            score: state.score,
            done: state.is_terminated(),
            termination_reason,
            events,
        }
    }

    /// Copy of everything a renderer needs for the current tick
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            tick: self.state.tick,
            score: self.state.score,
            terminated: self.state.is_terminated(),
            ground_level: self.physics.ground_level(),
            agent: self.state.agent.clone(),
            obstacles: self.state.world.obstacles.clone(),
            decorations: self.state.world.decorations.clone(),
        }
    }

    pub fn state_hash(&self) -> Result<String> {
        self.state.state_hash()
    }
}
