//! Scrolling world: obstacles, decorations and procedural spawning

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::RunnerConfig;

/// Ground obstacle the agent must jump over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f64,
}

/// Cosmetic background entity; never collides, never observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub x: f64,
    pub y: f64,
}

/// Everything on the scroll axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Active obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    pub decorations: Vec<Decoration>,
    /// Current scroll speed in units per tick
    pub speed: f64,
}

impl World {
    /// World every episode starts from: one obstacle, no decorations
    pub fn initial(config: &RunnerConfig) -> Self {
        Self {
            obstacles: vec![Obstacle {
                x: config.world.initial_obstacle_x,
            }],
            decorations: Vec::new(),
            speed: config.world.initial_speed,
        }
    }
}

/// What happened on the scroll axis during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldTick {
    /// Obstacles that scrolled past the despawn line
    pub passed: u32,
    /// Position of the obstacle spawned this tick
    pub spawned_obstacle: Option<f64>,
    pub spawned_decoration: bool,
    pub despawned_decorations: usize,
}

/// Deterministic-cadence spawner driven by a seedable RNG
#[derive(Debug, Clone)]
pub struct WorldGenerator {
    rng: ChaCha8Rng,
    visible_width: f64,
    visible_height: f64,
    speed_increment: f64,
    obstacle_interval: u64,
    obstacle_despawn_x: f64,
    decoration_interval: u64,
    decoration_jitter: f64,
    decoration_despawn_x: f64,
}

impl WorldGenerator {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            visible_width: config.world.visible_width,
            visible_height: config.world.visible_height,
            speed_increment: config.world.speed_increment,
            obstacle_interval: config.spawn.obstacle_interval,
            obstacle_despawn_x: config.spawn.obstacle_despawn_x,
            decoration_interval: config.spawn.decoration_interval,
            decoration_jitter: config.spawn.decoration_jitter,
            decoration_despawn_x: config.spawn.decoration_despawn_x,
        }
    }

    /// Restart the random stream
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Scroll, recycle and spawn for tick number `tick` (1-based).
    ///
    /// Uses the speed held by `world` for this tick and raises it afterwards.
    pub fn advance(&mut self, world: &mut World, tick: u64) -> WorldTick {
        let mut report = WorldTick::default();
        let speed = world.speed;

        for obstacle in &mut world.obstacles {
            obstacle.x -= speed;
        }
        for decoration in &mut world.decorations {
            decoration.x -= speed / 2.0;
        }

        let before = world.obstacles.len();
        let despawn_x = self.obstacle_despawn_x;
        world.obstacles.retain(|o| o.x >= despawn_x);
        report.passed = (before - world.obstacles.len()) as u32;

        let before = world.decorations.len();
        let despawn_x = self.decoration_despawn_x;
        world.decorations.retain(|d| d.x >= despawn_x);
        report.despawned_decorations = before - world.decorations.len();

        if tick % self.obstacle_interval == 0 {
            let x = self.visible_width + self.rng.random_range(0.0..self.visible_width);
            world.obstacles.push(Obstacle { x });
            report.spawned_obstacle = Some(x);
            trace!(tick, x, "obstacle spawned");
        }

        if tick % self.decoration_interval == 0 {
            let jitter = if self.decoration_jitter > 0.0 {
                self.rng.random_range(0.0..self.decoration_jitter)
            } else {
                0.0
            };
            let y = self.rng.random_range(0.0..self.visible_height);
            world.decorations.push(Decoration {
                x: self.visible_width + jitter,
                y,
            });
            report.spawned_decoration = true;
        }

        world.speed += self.speed_increment;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (RunnerConfig, WorldGenerator, World) {
        let config = RunnerConfig::default();
        let generator = WorldGenerator::new(&config);
        let world = World::initial(&config);
        (config, generator, world)
    }

    #[test]
    fn test_scroll_and_speed_increase() {
        let (config, mut generator, mut world) = setup();
        generator.advance(&mut world, 1);
        assert_eq!(world.obstacles[0].x, config.world.initial_obstacle_x - 3.0);
        assert!((world.speed - 3.001).abs() < 1e-12);

        generator.advance(&mut world, 2);
        assert!((world.obstacles[0].x - (500.0 - 3.0 - 3.001)).abs() < 1e-9);
    }

    #[test]
    fn test_spawn_cadence_is_fixed() {
        let (config, mut generator, mut world) = setup();
        for tick in 1..100 {
            let report = generator.advance(&mut world, tick);
            assert!(report.spawned_obstacle.is_none(), "tick {tick}");
        }
        let report = generator.advance(&mut world, 100);
        let x = report.spawned_obstacle.expect("spawn on interval");
        let width = config.world.visible_width;
        assert!(x >= width && x < 2.0 * width);
        assert_eq!(world.obstacles.last().unwrap().x, x);
    }

    #[test]
    fn test_despawn_preserves_order_and_counts() {
        let (_, mut generator, mut world) = setup();
        world.obstacles = vec![
            Obstacle { x: -8.0 },
            Obstacle { x: 200.0 },
            Obstacle { x: -9.5 },
            Obstacle { x: 400.0 },
        ];
        let report = generator.advance(&mut world, 1);
        assert_eq!(report.passed, 2);
        assert_eq!(world.obstacles, vec![Obstacle { x: 197.0 }, Obstacle { x: 397.0 }]);
    }

    #[test]
    fn test_decorations_scroll_at_half_speed_and_despawn() {
        let (_, mut generator, mut world) = setup();
        world.decorations = vec![Decoration { x: 300.0, y: 40.0 }, Decoration { x: -99.0, y: 10.0 }];
        let report = generator.advance(&mut world, 1);
        assert_eq!(report.despawned_decorations, 1);
        assert_eq!(world.decorations, vec![Decoration { x: 298.5, y: 40.0 }]);
    }

    #[test]
    fn test_decoration_spawned_off_screen() {
        let (config, mut generator, mut world) = setup();
        let report = generator.advance(&mut world, config.spawn.decoration_interval);
        assert!(report.spawned_decoration);
        let cloud = world.decorations.last().unwrap();
        assert!(cloud.x >= config.world.visible_width);
        assert!(cloud.y >= 0.0 && cloud.y < config.world.visible_height);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let config = RunnerConfig::default();
        let mut a = WorldGenerator::new(&config);
        let mut b = WorldGenerator::new(&config);
        let mut wa = World::initial(&config);
        let mut wb = World::initial(&config);
        for tick in 1..=1000 {
            a.advance(&mut wa, tick);
            b.advance(&mut wb, tick);
        }
        assert_eq!(wa, wb);
    }
}
