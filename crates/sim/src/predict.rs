use glam::DVec2;
use serde::{Deserialize, Serialize};
use tankbot_shared::*;

use crate::body::{bounds_overlap, corners_of, edges_cross, edges_of};
use crate::geometry::Segment;

/// A (left, right) track power pair, each in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tracks {
    pub left: f64,
    pub right: f64,
}

impl Tracks {
    pub const HOLD: Tracks = Tracks::new(0.0, 0.0);

    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

/// Static surroundings a simulated tank can run into: the world border plus
/// snapshot copies of obstacles and other tanks.
#[derive(Debug, Clone)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    pub colliders: Vec<OrientedBody>,
}

impl Arena {
    /// Everything in `world` the tank `subject` could collide with.
    pub fn around(world: &World, subject: u64) -> Self {
        let colliders = world
            .obstacles
            .iter()
            .map(|o| OrientedBody::of(o))
            .chain(
                std::iter::once(&world.me)
                    .chain(world.tanks.iter())
                    .filter(|t| t.id != subject)
                    .map(|t| OrientedBody::of(t)),
            )
            .collect();
        Self {
            width: world.width,
            height: world.height,
            colliders,
        }
    }

    pub fn open(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            colliders: Vec::new(),
        }
    }

    fn border(&self) -> [Segment; 4] {
        let tl = DVec2::ZERO;
        let tr = DVec2::new(self.width, 0.0);
        let br = DVec2::new(self.width, self.height);
        let bl = DVec2::new(0.0, self.height);
        [
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
            Segment::new(bl, tl),
        ]
    }

    /// Whether `body` leaves the world or overlaps any collider.
    pub fn collides(&self, body: &dyn Body, parallel_epsilon: f64) -> bool {
        let outside = corners_of(body)
            .iter()
            .any(|c| c.x < 0.0 || c.y < 0.0 || c.x > self.width || c.y > self.height);
        if outside {
            return true;
        }

        let border = self.border();
        let on_border = edges_of(body)
            .iter()
            .any(|e| border.iter().any(|b| e.intersects(b, parallel_epsilon)));
        if on_border {
            return true;
        }

        self.colliders
            .iter()
            .filter(|c| bounds_overlap(body, *c))
            .any(|c| edges_cross(body, c, parallel_epsilon))
    }
}

pub fn shell_decay(kind: ShellKind, physics: &PhysicsConfig) -> f64 {
    match kind {
        ShellKind::Regular => physics.regular_shell_decay,
        ShellKind::Premium => physics.premium_shell_decay,
    }
}

/// Free flight for `ticks` ticks: move, then bleed speed.
pub fn step_shell(shell: &Shell, ticks: u32, physics: &PhysicsConfig) -> Shell {
    let decay = shell_decay(shell.kind, physics);
    let mut position = shell.position;
    let mut velocity = shell.velocity;
    for _ in 0..ticks {
        position += velocity;
        velocity *= decay;
    }
    Shell {
        position,
        velocity,
        ..shell.clone()
    }
}

/// Where a shell would be after `ticks` ticks of free flight, without cloning it.
pub fn shell_reach(shell: &Shell, ticks: u32, physics: &PhysicsConfig) -> DVec2 {
    let decay = shell_decay(shell.kind, physics);
    if (1.0 - decay).abs() < 1e-12 {
        return shell.position + shell.velocity * ticks as f64;
    }
    let travel = (1.0 - decay.powi(ticks as i32)) / (1.0 - decay);
    shell.position + shell.velocity * travel
}

/// Crew damage slows both driving and turret traverse: 0.5 at no crew, 1.0 at full.
pub fn life_factor(tank: &Tank) -> f64 {
    0.5 * (1.0 + tank.life_fraction())
}

/// Track powers after reverse attenuation and crew scaling.
pub fn effective_tracks(tank: &Tank, tracks: Tracks, physics: &PhysicsConfig) -> Tracks {
    let attenuate = |p: f64| {
        let p = p.clamp(-1.0, 1.0);
        if p < 0.0 {
            p * physics.reverse_power_factor
        } else {
            p
        }
    };
    let life = life_factor(tank);
    Tracks::new(attenuate(tracks.left) * life, attenuate(tracks.right) * life)
}

/// Advance a tank `ticks` ticks under constant track power, ignoring collisions.
pub fn advance_tank(tank: &Tank, tracks: Tracks, ticks: u32, physics: &PhysicsConfig) -> Tank {
    let power = effective_tracks(tank, tracks, physics);
    let thrust = physics.track_acceleration * (power.left + power.right);
    let torque = physics.angular_acceleration * (power.left - power.right);

    let mut position = tank.position;
    let mut velocity = tank.velocity;
    let mut heading = tank.heading;
    let mut angular_velocity = tank.angular_velocity;
    for _ in 0..ticks {
        position += velocity;
        velocity += DVec2::from_angle(heading) * thrust;
        heading += angular_velocity;
        angular_velocity += torque;
    }

    Tank {
        position,
        velocity,
        heading,
        angular_velocity,
        ..tank.clone()
    }
}

/// Advance a tank and roll its pose back if it ends up in the border or a collider.
///
/// A stalled tank keeps the velocity it built up; only position and heading revert.
/// Contact already present in the starting pose does not count, so a tank
/// wedged against something can still drive clear of it.
pub fn step_tank(tank: &Tank, tracks: Tracks, ticks: u32, arena: &Arena, physics: &PhysicsConfig) -> Tank {
    let next = advance_tank(tank, tracks, ticks, physics);
    if arena.collides(&next, physics.parallel_epsilon) && !arena.collides(tank, physics.parallel_epsilon) {
        Tank {
            position: tank.position,
            heading: tank.heading,
            ..next
        }
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn physics() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    #[test]
    fn test_shell_moves_then_decays() {
        let shell = Shell::new(1, ShellKind::Regular, DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0));
        let next = step_shell(&shell, 1, &physics());
        assert_eq!(next.position, DVec2::new(10.0, 0.0));
        assert!((next.velocity.x - 9.95).abs() < 1e-12);
        assert_eq!(next.heading, shell.heading);

        let premium = Shell { kind: ShellKind::Premium, ..shell.clone() };
        let next = step_shell(&premium, 2, &physics());
        assert!((next.position.x - 19.9).abs() < 1e-9);
        assert!((next.velocity.x - 9.801).abs() < 1e-9);
    }

    #[test]
    fn test_shell_reach_matches_stepping() {
        let shell = Shell::new(1, ShellKind::Regular, DVec2::new(5.0, 5.0), DVec2::new(3.0, -14.0));
        let stepped = step_shell(&shell, 40, &physics()).position;
        let reach = shell_reach(&shell, 40, &physics());
        assert!((stepped - reach).length() < 1e-6);
    }

    #[test]
    fn test_life_factor_bounds() {
        let mut tank = Tank::medium(1, DVec2::ZERO, 0.0);
        assert!((life_factor(&tank) - 1.0).abs() < 1e-12);
        tank.crew_health = 0.0;
        assert!((life_factor(&tank) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reverse_is_weaker() {
        let tank = Tank::medium(1, DVec2::ZERO, 0.0);
        let power = effective_tracks(&tank, Tracks::new(-1.0, 1.0), &physics());
        assert!((power.left + 0.75).abs() < 1e-12);
        assert!((power.right - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_idle_tank_stays_put() {
        let arena = Arena::open(1280.0, 800.0);
        let tank = Tank::medium(1, DVec2::new(300.0, 300.0), 0.7);
        let mut state = tank.clone();
        for _ in 0..50 {
            state = step_tank(&state, Tracks::HOLD, 3, &arena, &physics());
        }
        assert_eq!(state.position, tank.position);
        assert_eq!(state.heading, tank.heading);
    }

    #[test]
    fn test_forward_power_accelerates_along_heading() {
        let tank = Tank::medium(1, DVec2::new(300.0, 300.0), PI / 2.0);
        let next = advance_tank(&tank, Tracks::new(1.0, 1.0), 3, &physics());
        // Position lags velocity by one tick: 0 + 0.2 + 0.4
        assert!((next.position.y - 300.6).abs() < 1e-9);
        assert!((next.position.x - 300.0).abs() < 1e-9);
        assert!((next.velocity.length() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_left_over_right_turns_positive() {
        let tank = Tank::medium(1, DVec2::new(300.0, 300.0), 0.0);
        let next = advance_tank(&tank, Tracks::new(1.0, -1.0), 10, &physics());
        assert!(next.angular_velocity > 0.0);
        assert!(next.heading > 0.0);
    }

    #[test]
    fn test_boundary_rollback_keeps_velocity() {
        let arena = Arena::open(1280.0, 800.0);
        // Front edge 1 unit from the right border, already moving into it.
        let tank = Tank {
            velocity: DVec2::new(3.0, 0.0),
            ..Tank::medium(1, DVec2::new(1280.0 - 46.0, 400.0), 0.0)
        };
        let next = step_tank(&tank, Tracks::new(1.0, 1.0), 1, &arena, &physics());
        assert_eq!(next.position, tank.position);
        assert_eq!(next.heading, tank.heading);
        assert!((next.velocity.x - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_obstacle_rollback() {
        let mut world = World::new(1280.0, 800.0, Tank::medium(0, DVec2::new(400.0, 400.0), 0.0));
        world.obstacles.push(Obstacle {
            id: 7,
            position: DVec2::new(470.0, 400.0),
            width: 40.0,
            height: 200.0,
            heading: 0.0,
        });
        let arena = Arena::around(&world, 0);
        let me = Tank {
            velocity: DVec2::new(10.0, 0.0),
            ..world.me.clone()
        };
        let next = step_tank(&me, Tracks::HOLD, 1, &arena, &physics());
        assert_eq!(next.position, me.position);

        let away = Tank {
            velocity: DVec2::new(-10.0, 0.0),
            ..world.me.clone()
        };
        let next = step_tank(&away, Tracks::HOLD, 1, &arena, &physics());
        assert_eq!(next.position, DVec2::new(390.0, 400.0));
    }

    #[test]
    fn test_wedged_tank_can_back_out() {
        let mut world = World::new(1280.0, 800.0, Tank::medium(0, DVec2::new(400.0, 400.0), 0.0));
        // Front edge at x = 445 sits 2 units inside the obstacle.
        world.obstacles.push(Obstacle {
            id: 7,
            position: DVec2::new(463.0, 400.0),
            width: 40.0,
            height: 200.0,
            heading: 0.0,
        });
        let arena = Arena::around(&world, 0);
        assert!(arena.collides(&world.me, physics().parallel_epsilon));

        let next = step_tank(&world.me, Tracks::new(-1.0, -1.0), 5, &arena, &physics());
        assert!(next.position.x < world.me.position.x);
        assert_eq!(next.heading, world.me.heading);
    }

    #[test]
    fn test_arena_excludes_subject() {
        let mut world = World::new(1280.0, 800.0, Tank::medium(0, DVec2::new(400.0, 400.0), 0.0));
        world.tanks.push(Tank::medium(1, DVec2::new(800.0, 400.0), 0.0));
        assert_eq!(Arena::around(&world, 0).colliders.len(), 1);
        assert_eq!(Arena::around(&world, 1).colliders.len(), 1);
        assert_eq!(Arena::around(&world, 99).colliders.len(), 2);
    }
}
