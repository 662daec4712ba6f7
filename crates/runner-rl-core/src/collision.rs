//! Proximity-based collision between the runner and ground obstacles

use crate::agent::Agent;
use crate::world::Obstacle;

/// Point-distance collision test against obstacles sitting on the ground line
#[derive(Debug, Clone, Copy)]
pub struct CollisionDetector {
    threshold: f64,
    ground_level: f64,
}

impl CollisionDetector {
    pub fn new(threshold: f64, ground_level: f64) -> Self {
        Self {
            threshold,
            ground_level,
        }
    }

    /// Index of the first obstacle, in spawn order, closer than the threshold
    pub fn first_hit(&self, agent: &Agent, obstacles: &[Obstacle]) -> Option<usize> {
        obstacles.iter().position(|obstacle| {
            let dist = (agent.x - obstacle.x).hypot(agent.y - self.ground_level);
            dist < self.threshold
        })
    }

    pub fn check(&self, agent: &Agent, obstacles: &[Obstacle]) -> bool {
        self.first_hit(agent, obstacles).is_some()
    }
}
