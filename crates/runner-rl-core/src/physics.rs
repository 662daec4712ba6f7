//! Vertical motion of the runner
//!
//! Discrete-time model with a fixed timestep: each tick adds `g * dt² / 2` to
//! the velocity and then moves by the velocity. It is not an integrator of the
//! continuous equations and must not be fed wall-clock deltas.

use crate::agent::Agent;
use crate::config::RunnerConfig;

/// Advance `agent` by one tick and clamp it to `ground_level`.
///
/// Returns `true` when the agent landed this tick.
pub fn advance(agent: &mut Agent, gravity: f64, dt: f64, ground_level: f64) -> bool {
    let airborne = !agent.is_grounded();
    agent.vy += gravity * dt * dt / 2.0;
    agent.y += agent.vy;

    if agent.y > ground_level {
        agent.y = ground_level;
        agent.vy = 0.0;
        return airborne;
    }
    false
}

/// Gravity, jump impulse and jump-resource regeneration
#[derive(Debug, Clone)]
pub struct PhysicsModel {
    gravity: f64,
    dt: f64,
    jump_impulse: f64,
    ground_level: f64,
    regen_interval: u64,
}

impl PhysicsModel {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            gravity: config.physics.gravity,
            dt: config.physics.dt,
            jump_impulse: config.physics.jump_impulse,
            ground_level: config.world.ground_level(),
            regen_interval: config.physics.energy_regen_interval,
        }
    }

    pub fn ground_level(&self) -> f64 {
        self.ground_level
    }

    pub fn jump_impulse(&self) -> f64 {
        self.jump_impulse
    }

    /// Start a jump if the agent is grounded and holds a resource.
    ///
    /// Returns whether the jump happened.
    pub fn try_jump(&self, agent: &mut Agent) -> bool {
        if !agent.is_grounded() || !agent.has_energy() {
            return false;
        }
        agent.vy = self.jump_impulse;
        agent.energy -= 1;
        true
    }

    /// One tick of gravity plus the ground clamp
    pub fn advance(&self, agent: &mut Agent) -> bool {
        advance(agent, self.gravity, self.dt, self.ground_level)
    }

    /// Give back one resource on every `regen_interval`-th tick, capped at the maximum.
    ///
    /// Returns whether the count went up.
    pub fn regenerate(&self, agent: &mut Agent, tick: u64) -> bool {
        if tick == 0 || tick % self.regen_interval != 0 || agent.energy >= agent.max_energy {
            return false;
        }
        agent.energy += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PhysicsModel, Agent) {
        let config = RunnerConfig::default();
        (PhysicsModel::new(&config), Agent::spawn(&config))
    }

    #[test]
    fn test_grounded_agent_stays_grounded() {
        let (physics, mut agent) = setup();
        for _ in 0..10 {
            physics.advance(&mut agent);
            assert_eq!(agent.y, physics.ground_level());
            assert_eq!(agent.vy, 0.0);
        }
    }

    #[test]
    fn test_gravity_step_size() {
        let mut agent = Agent::spawn(&RunnerConfig::default());
        agent.y = 100.0;
        agent.vy = -10.0;
        advance(&mut agent, 100.0, 0.1, 550.0);
        assert!((agent.vy - -9.5).abs() < 1e-9);
        assert!((agent.y - 90.5).abs() < 1e-9);
    }

    #[test]
    fn test_jump_arc_never_goes_below_ground() {
        let (physics, mut agent) = setup();
        assert!(physics.try_jump(&mut agent));
        let mut landed = false;
        for _ in 0..100 {
            if physics.advance(&mut agent) {
                landed = true;
            }
            assert!(agent.y <= physics.ground_level());
        }
        assert!(landed);
        assert!(agent.is_grounded());
    }

    #[test]
    fn test_jump_consumes_energy_and_requires_ground() {
        let (physics, mut agent) = setup();
        let start = agent.energy;
        assert!(physics.try_jump(&mut agent));
        assert_eq!(agent.energy, start - 1);
        assert_eq!(agent.vy, physics.jump_impulse());

        physics.advance(&mut agent);
        assert!(!physics.try_jump(&mut agent), "no double jump mid-air");
        assert_eq!(agent.energy, start - 1);
    }

    #[test]
    fn test_jump_refused_without_energy() {
        let (physics, mut agent) = setup();
        agent.energy = 0;
        assert!(!physics.try_jump(&mut agent));
        assert_eq!(agent.vy, 0.0);
        assert_eq!(agent.energy, 0);
    }

    #[test]
    fn test_regeneration_on_interval_and_capped() {
        let (physics, mut agent) = setup();
        agent.energy = agent.max_energy - 1;
        assert!(!physics.regenerate(&mut agent, 59));
        assert!(physics.regenerate(&mut agent, 60));
        assert_eq!(agent.energy, agent.max_energy);
        assert!(!physics.regenerate(&mut agent, 120));
        assert_eq!(agent.energy, agent.max_energy);
    }
}
