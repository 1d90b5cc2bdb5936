use tankbot_shared::*;

use crate::predict::life_factor;

// Turret traverse never drops below this, so aim times stay finite.
const MIN_TRAVERSE_SPEED: f64 = 1e-4;

/// Relative combat strength. A fresh tank with a full premium reserve rates 2.0.
pub fn tank_power(tank: &Tank) -> f64 {
    let life = tank.life_fraction();
    let hull = tank.hull_fraction();
    let premium = tank.premium_shell_count.min(PREMIUM_RESERVE_MAX) as f64 / PREMIUM_RESERVE_MAX as f64;
    life.min(hull) * 0.5 * (1.0 + life) * (1.0 + premium)
}

/// `tank_power` scaled into [0, 1].
pub fn normalized_power(tank: &Tank) -> f64 {
    tank_power(tank) / 2.0
}

/// Shares of total power held by our side (me and teammates) and by the enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamPower {
    pub own: f64,
    pub enemy: f64,
}

impl TeamPower {
    pub fn of(world: &World) -> Self {
        let own: f64 = std::iter::once(&world.me)
            .filter(|t| t.is_alive())
            .chain(world.teammates())
            .map(tank_power)
            .sum();
        let enemy: f64 = world.enemies().map(tank_power).sum();
        let total = own + enemy;
        if total <= 0.0 {
            return Self { own: 0.5, enemy: 0.5 };
        }
        Self {
            own: own / total,
            enemy: enemy / total,
        }
    }
}

/// Turret traverse in radians per tick; a shaken crew turns it slower.
pub fn turret_speed(tank: &Tank) -> f64 {
    (TURRET_BASE_SPEED_DEG * 2.0 * life_factor(tank)).to_radians()
}

/// Ticks until a shell fired by `shooter` could land on `target`: aim or
/// reload (whichever is longer), flight, plus one tick to fire.
pub fn time_before_hit(shooter: &Tank, target: &Tank, physics: &PhysicsConfig) -> f64 {
    let angle = shooter.turret_angle_to(target.position);
    let distance = shooter.position.distance(target.position);

    let base = turret_speed(shooter);
    // Hull rotation toward the target helps the turret, away from it hinders.
    let traverse = if angle * shooter.angular_velocity > 0.0 {
        base + shooter.angular_velocity.abs()
    } else {
        base - shooter.angular_velocity.abs()
    };
    let traverse = traverse.max(MIN_TRAVERSE_SPEED);

    let aim = (angle.abs() / traverse).max(shooter.remaining_reloading_time as f64);
    let flight = distance / physics.shell_average_speed;
    flight + aim + 1.0
}

/// Inside this distance premium rounds are worth firing.
pub fn premium_range(world: &World) -> f64 {
    world.diagonal() / 2.0
}

fn expected_score(damage: f64, enemy: &Tank) -> f64 {
    let kills = enemy.crew_health <= damage || enemy.hull_durability <= damage;
    let bonus = if kills { KILL_BONUS } else { 0.0 };
    damage.min(enemy.crew_health) + damage.min(enemy.hull_durability) + bonus
}

/// Score a regular round is expected to earn, fading to 1 with range past `premium_range`.
pub fn regular_score(me: &Tank, enemy: &Tank, world: &World, physics: &PhysicsConfig) -> f64 {
    let full = expected_score(physics.regular_shell_damage, enemy);
    let distance = me.position.distance(enemy.position);
    let short = premium_range(world);
    let max = world.diagonal();
    if distance <= short {
        return full;
    }
    if distance >= max {
        return 1.0;
    }
    let odds = 1.0 - (distance - short) / (max - short);
    (odds * full).max(1.0)
}

pub fn premium_score(enemy: &Tank, physics: &PhysicsConfig) -> f64 {
    expected_score(physics.premium_shell_damage, enemy)
}

pub fn possible_score(me: &Tank, enemy: &Tank, world: &World, physics: &PhysicsConfig) -> f64 {
    let close = me.position.distance(enemy.position) < premium_range(world);
    if close && me.premium_shell_count > 0 {
        premium_score(enemy, physics)
    } else {
        regular_score(me, enemy, world, physics)
    }
}
