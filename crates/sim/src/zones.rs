use glam::DVec2;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tankbot_shared::*;

use crate::assess::{normalized_power, TeamPower};
use crate::damage::Exposure;
use crate::geometry::angle_between;
use crate::sight::is_blocked_static;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub center: DVec2,
    pub radius: f64,
}

/// Zone centers on a square lattice inside the border margin, spaced one
/// zone diameter apart, minus those overlapping an obstacle.
pub fn grid(world: &World, tactics: &TacticsConfig) -> Vec<Zone> {
    let radius = tactics.zone_radius;
    let spacing = 2.0 * radius;
    let margin = tactics.border_margin;
    let mut zones = Vec::new();

    let mut y = margin;
    while y <= world.height - margin {
        let mut x = margin;
        while x <= world.width - margin {
            let center = DVec2::new(x, y);
            let clear = world
                .obstacles
                .iter()
                .all(|o| o.distance_to(center) > o.bounding_radius() + radius);
            if clear {
                zones.push(Zone { center, radius });
            }
            x += spacing;
        }
        y += spacing;
    }
    zones
}

/// Grid zones within reach of the controlled tank.
pub fn candidate_zones(world: &World, tactics: &TacticsConfig) -> Vec<Zone> {
    let me = world.me.position;
    grid(world, tactics)
        .into_iter()
        .filter(|z| z.center.distance(me) <= tactics.zone_locality)
        .collect()
}

/// Angular spread between `a` and `b` as seen from `at`.
pub fn fork_angle(at: DVec2, a: DVec2, b: DVec2) -> f64 {
    angle_between(a - at, b - at)
}

/// Scores zones for the controlled tank against one world snapshot.
pub struct Valuator<'a> {
    world: &'a World,
    config: &'a EngineConfig,
    exposure: Exposure,
    power: TeamPower,
}

impl<'a> Valuator<'a> {
    pub fn new(world: &'a World, config: &'a EngineConfig) -> Self {
        Self {
            world,
            config,
            exposure: Exposure::for_world(world, &config.tactics),
            power: TeamPower::of(world),
        }
    }

    pub fn team_power(&self) -> TeamPower {
        self.power
    }

    /// Best damage prospect from `zone` over all enemies.
    pub fn offensive_value(&self, zone: &Zone) -> f64 {
        let tactics = &self.config.tactics;
        let physics = &self.config.physics;
        self.world
            .enemies()
            .map(|enemy| {
                let mut value = self.exposure.hit_probability(zone.center, enemy.position) * normalized_power(enemy);

                // An enemy engaged from two directions has to pick one.
                let fork = self
                    .world
                    .teammates()
                    .map(|mate| fork_angle(enemy.position, zone.center, mate.position))
                    .fold(0.0, f64::max);
                value *= 1.0 + tactics.crossfire_bonus * fork / PI;

                let lane = enemy.position - zone.center;
                if lane.length() > physics.length_floor {
                    let velocity = lane.normalize() * physics.shell_average_speed;
                    let shell = Shell::new(0, ShellKind::Regular, zone.center, velocity);
                    if is_blocked_static(self.world, &shell, enemy.position, physics) {
                        value *= tactics.blocked_engagement_factor;
                    }
                }
                value
            })
            .fold(0.0, f64::max)
    }

    fn incoming(&self, at: DVec2) -> f64 {
        self.world
            .enemies()
            .map(|e| self.exposure.hit_probability(e.position, at) * normalized_power(e))
            .sum()
    }

    /// Worst incoming fire on our side if we stood in `zone`.
    pub fn defensive_exposure(&self, zone: &Zone) -> f64 {
        self.world
            .teammates()
            .map(|mate| self.incoming(mate.position))
            .fold(self.incoming(zone.center), f64::max)
    }

    /// Penalty for crowding a teammate or drifting out of support range.
    pub fn spacing_term(&self, zone: &Zone) -> f64 {
        let t = &self.config.tactics;
        let penalty: f64 = self
            .world
            .teammates()
            .map(|mate| {
                let d = zone.center.distance(mate.position);
                if d < t.spacing_min {
                    (t.spacing_min - d) / t.spacing_min
                } else if d > t.spacing_max {
                    ((d - t.spacing_max) / t.spacing_max).min(1.0)
                } else {
                    0.0
                }
            })
            .sum();
        -t.spacing_weight * penalty
    }

    /// Penalty for sitting close to enemies, worse when they come from different sides.
    pub fn crossfire_penalty(&self, zone: &Zone) -> f64 {
        let t = &self.config.tactics;
        let enemies: Vec<&Tank> = self.world.enemies().collect();
        let penalty: f64 = enemies
            .iter()
            .map(|enemy| {
                let d = zone.center.distance(enemy.position);
                if d >= t.crossfire_distance {
                    return 0.0;
                }
                let closeness = (t.crossfire_distance - d) / t.crossfire_distance;
                let fork = enemies
                    .iter()
                    .filter(|other| other.id != enemy.id)
                    .map(|other| fork_angle(zone.center, enemy.position, other.position))
                    .fold(0.0, f64::max);
                closeness * (1.0 + fork / PI)
            })
            .sum();
        -t.crossfire_weight * penalty
    }

    pub fn value(&self, zone: &Zone) -> f64 {
        self.crossfire_penalty(zone) + self.spacing_term(zone) + self.power.own * self.offensive_value(zone)
            - self.power.enemy * self.defensive_exposure(zone)
    }
}

/// Highest-valued nearby zone. `None` with no enemies or no open zone in reach.
pub fn best_zone(world: &World, config: &EngineConfig) -> Option<(Zone, f64)> {
    if world.enemies().next().is_none() {
        return None;
    }
    let valuator = Valuator::new(world, config);
    let mut best: Option<(Zone, f64)> = None;
    for zone in candidate_zones(world, &config.tactics) {
        let value = valuator.value(&zone);
        trace!("zone ({:.0}, {:.0}): {:.4}", zone.center.x, zone.center.y, value);
        if best.map_or(true, |(_, v)| value > v) {
            best = Some((zone, value));
        }
    }
    if let Some((zone, value)) = best {
        debug!("goal zone ({:.0}, {:.0}) valued {:.4}", zone.center.x, zone.center.y, value);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn lone_world() -> World {
        World::new(1280.0, 800.0, Tank::medium(0, DVec2::new(400.0, 400.0), 0.0))
    }

    fn zone_at(x: f64, y: f64) -> Zone {
        Zone {
            center: DVec2::new(x, y),
            radius: 40.0,
        }
    }

    #[test]
    fn test_grid_respects_margin_and_spacing() {
        let world = lone_world();
        let zones = grid(&world, &config().tactics);
        assert!(!zones.is_empty());
        for z in &zones {
            assert!(z.center.x >= 60.0 && z.center.x <= 1220.0);
            assert!(z.center.y >= 60.0 && z.center.y <= 740.0);
        }
        assert_eq!(zones[0].center, DVec2::new(60.0, 60.0));
        assert_eq!(zones[1].center, DVec2::new(140.0, 60.0));
    }

    #[test]
    fn test_grid_skips_obstacles() {
        let mut world = lone_world();
        let before = grid(&world, &config().tactics).len();
        world.obstacles.push(Obstacle {
            id: 1,
            position: DVec2::new(620.0, 380.0),
            width: 100.0,
            height: 100.0,
            heading: 0.0,
        });
        let zones = grid(&world, &config().tactics);
        assert!(zones.len() < before);
        assert!(zones.iter().all(|z| z.center.distance(DVec2::new(620.0, 380.0)) > 70.7 + 40.0));
    }

    #[test]
    fn test_candidates_are_local() {
        let world = lone_world();
        let zones = candidate_zones(&world, &config().tactics);
        assert!(!zones.is_empty());
        assert!(zones.iter().all(|z| z.center.distance(world.me.position) <= 320.0));
    }

    #[test]
    fn test_zone_at_me_alone_is_finite() {
        let world = lone_world();
        let config = config();
        let value = Valuator::new(&world, &config).value(&zone_at(400.0, 400.0));
        assert!(value.is_finite());
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_exposure_grows_toward_lone_enemy() {
        let mut world = lone_world();
        world.tanks.push(Tank::medium(1, DVec2::new(1000.0, 400.0), 0.0));
        let config = config();
        let valuator = Valuator::new(&world, &config);
        let mut prev = 0.0;
        for x in (100..=960).step_by(20) {
            let e = valuator.defensive_exposure(&zone_at(x as f64, 400.0));
            assert!(e >= prev, "exposure dropped at x = {}", x);
            prev = e;
        }
    }

    #[test]
    fn test_exposure_covers_teammates() {
        let mut world = lone_world();
        world.tanks.push(Tank::medium(1, DVec2::new(1000.0, 400.0), 0.0));
        let config = config();
        let far_zone = zone_at(100.0, 100.0);
        let alone = Valuator::new(&world, &config).defensive_exposure(&far_zone);

        world.tanks.push(Tank {
            teammate: true,
            ..Tank::medium(2, DVec2::new(950.0, 400.0), 0.0)
        });
        let guarded = Valuator::new(&world, &config).defensive_exposure(&far_zone);
        assert!(guarded > alone);
    }

    #[test]
    fn test_blocked_engagement_is_discounted() {
        let mut world = lone_world();
        world.tanks.push(Tank::medium(1, DVec2::new(800.0, 400.0), 0.0));
        let config = config();
        let open = Valuator::new(&world, &config).offensive_value(&zone_at(400.0, 400.0));

        world.obstacles.push(Obstacle {
            id: 3,
            position: DVec2::new(600.0, 400.0),
            width: 40.0,
            height: 200.0,
            heading: 0.0,
        });
        let blocked = Valuator::new(&world, &config).offensive_value(&zone_at(400.0, 400.0));
        assert!((blocked - open * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_spacing_band() {
        let mut world = lone_world();
        world.tanks.push(Tank {
            teammate: true,
            ..Tank::medium(1, DVec2::new(400.0, 400.0), 0.0)
        });
        let config = config();
        let valuator = Valuator::new(&world, &config);
        assert!(valuator.spacing_term(&zone_at(420.0, 400.0)) < 0.0);
        assert_eq!(valuator.spacing_term(&zone_at(700.0, 400.0)), 0.0);
        assert!(valuator.spacing_term(&zone_at(1000.0, 400.0)) < 0.0);
        assert!(valuator.spacing_term(&zone_at(1200.0, 400.0)) >= -0.5);
    }

    #[test]
    fn test_crossfire_worse_when_flanked() {
        let config = config();
        let mut same_side = lone_world();
        same_side.tanks.push(Tank::medium(1, DVec2::new(600.0, 400.0), 0.0));
        same_side.tanks.push(Tank::medium(2, DVec2::new(600.0, 450.0), 0.0));

        let mut flanked = lone_world();
        flanked.tanks.push(Tank::medium(1, DVec2::new(600.0, 400.0), 0.0));
        flanked.tanks.push(Tank::medium(2, DVec2::new(200.0, 400.0), 0.0));

        let zone = zone_at(400.0, 400.0);
        let a = Valuator::new(&same_side, &config).crossfire_penalty(&zone);
        let b = Valuator::new(&flanked, &config).crossfire_penalty(&zone);
        assert!(a < 0.0);
        assert!(b < a);
    }

    #[test]
    fn test_best_zone_needs_enemies() {
        let world = lone_world();
        assert!(best_zone(&world, &config()).is_none());

        let mut world = lone_world();
        world.tanks.push(Tank::medium(1, DVec2::new(1000.0, 400.0), 0.0));
        let (zone, value) = best_zone(&world, &config()).unwrap();
        assert!(value.is_finite());
        assert!(zone.center.distance(world.me.position) <= 320.0);
    }
}
