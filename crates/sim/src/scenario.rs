use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::f64::consts::PI;
use tankbot_shared::*;

const SPAWN_MARGIN: f64 = 70.0;
const PLACEMENT_TRIES: usize = 50;

/// A fresh tank at (100, 100) facing +x, with one regular shell at (100, 400)
/// flying straight at it.
pub fn duel_world() -> World {
    let mut world = World::new(
        DEFAULT_WORLD_WIDTH,
        DEFAULT_WORLD_HEIGHT,
        Tank::medium(0, DVec2::new(100.0, 100.0), 0.0),
    );
    world.shells.push(Shell::new(
        100,
        ShellKind::Regular,
        DVec2::new(100.0, 400.0),
        DVec2::new(0.0, -SHELL_AVERAGE_SPEED),
    ));
    world
}

struct Placer {
    rng: Pcg64,
    width: f64,
    height: f64,
    taken: Vec<(DVec2, f64)>,
}

impl Placer {
    /// A free spot for a body of the given bounding radius, if one turns up quickly.
    fn spot(&mut self, radius: f64) -> Option<DVec2> {
        for _ in 0..PLACEMENT_TRIES {
            let p = DVec2::new(
                self.rng.gen_range(SPAWN_MARGIN..self.width - SPAWN_MARGIN),
                self.rng.gen_range(SPAWN_MARGIN..self.height - SPAWN_MARGIN),
            );
            if self.taken.iter().all(|(q, r)| p.distance(*q) > r + radius) {
                self.taken.push((p, radius));
                return Some(p);
            }
        }
        None
    }

    fn heading(&mut self) -> f64 {
        self.rng.gen_range(-PI..PI)
    }

    fn tank(&mut self, id: u64, teammate: bool) -> Option<Tank> {
        let radius = DVec2::new(TANK_WIDTH, TANK_HEIGHT).length() / 2.0;
        let position = self.spot(radius)?;
        let heading = self.heading();
        let mut tank = Tank::medium(id, position, heading);
        tank.teammate = teammate;
        tank.turret_relative_angle = self.rng.gen_range(-0.5..0.5);
        tank.crew_health = self.rng.gen_range(20.0..=TANK_CREW_HEALTH);
        tank.hull_durability = self.rng.gen_range(40.0..=TANK_HULL_DURABILITY);
        tank.premium_shell_count = self.rng.gen_range(0..=PREMIUM_RESERVE_MAX);
        tank.remaining_reloading_time = self.rng.gen_range(0..=TANK_RELOAD_TICKS);
        Some(tank)
    }
}

/// A seeded skirmish: us plus two teammates against three enemies, a few
/// obstacles and bonuses, and shells in flight from the enemies' muzzles.
pub fn random_world(seed: u64) -> World {
    let mut placer = Placer {
        rng: Pcg64::seed_from_u64(seed),
        width: DEFAULT_WORLD_WIDTH,
        height: DEFAULT_WORLD_HEIGHT,
        taken: Vec::new(),
    };

    let me = placer
        .tank(0, true)
        .unwrap_or_else(|| Tank::medium(0, DVec2::new(SPAWN_MARGIN, SPAWN_MARGIN), 0.0));
    let mut world = World::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT, me);
    world.tick = placer.rng.gen_range(0..2000);

    for id in 1..=4 {
        let width = placer.rng.gen_range(40.0..160.0);
        let height = placer.rng.gen_range(40.0..160.0);
        let radius = DVec2::new(width, height).length() / 2.0;
        if let Some(position) = placer.spot(radius) {
            let heading = placer.heading();
            world.obstacles.push(Obstacle {
                id: 100 + id,
                position,
                width,
                height,
                heading,
            });
        }
    }

    for id in 1..=5u64 {
        if let Some(tank) = placer.tank(id, id <= 2) {
            world.tanks.push(tank);
        }
    }

    let kinds = [BonusKind::Medikit, BonusKind::RepairKit, BonusKind::AmmoCrate];
    for id in 1..=3u64 {
        let kind = kinds[placer.rng.gen_range(0..kinds.len())];
        if let Some(position) = placer.spot(BONUS_SIZE) {
            world.bonuses.push(Bonus::new(200 + id, kind, position));
        }
    }

    let shooters: Vec<Tank> = world.enemies().cloned().collect();
    for (i, shooter) in shooters.iter().enumerate() {
        let travelled = placer.rng.gen_range(0.0..300.0);
        let dir = DVec2::from_angle(shooter.turret_heading());
        let position = shooter.position + dir * (TANK_WIDTH / 2.0 + SHELL_WIDTH + travelled);
        if !world.contains(position) {
            continue;
        }
        let kind = if placer.rng.gen_bool(0.3) {
            ShellKind::Premium
        } else {
            ShellKind::Regular
        };
        world
            .shells
            .push(Shell::new(300 + i as u64, kind, position, dir * SHELL_AVERAGE_SPEED));
    }
    world
}
