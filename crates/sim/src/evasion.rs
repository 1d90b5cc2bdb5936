use glam::DVec2;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use tankbot_shared::*;

use crate::assess::time_before_hit;
use crate::body::contains_point;
use crate::damage::{damage_upper_bound, hitbox, impact_damage_along};
use crate::geometry::unit_or_floor;
use crate::predict::{shell_decay, shell_reach, step_shell, step_tank, Arena, Tracks};
use crate::sight::{is_blocked_full, is_goal_blocked_by};

/// Candidate drive inputs, in tie-break order.
pub const MANEUVERS: [Tracks; 9] = [
    Tracks::new(1.0, 1.0),
    Tracks::new(-1.0, -1.0),
    Tracks::new(1.0, -1.0),
    Tracks::new(-1.0, 1.0),
    Tracks::new(1.0, 0.5),
    Tracks::new(0.5, 1.0),
    Tracks::new(-1.0, -0.5),
    Tracks::new(-0.5, -1.0),
    Tracks::HOLD,
];

/// Result of racing one shell against one maneuver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub damage: f64,
    /// Simulated tick of the hit, if the shell connects.
    pub impact_tick: Option<u32>,
}

impl Prediction {
    const MISS: Prediction = Prediction {
        damage: 0.0,
        impact_tick: None,
    };
}

/// Total predicted damage for one maneuver against every tracked shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub tracks: Tracks,
    pub damage: f64,
    /// Earliest hit among the shells that connect.
    pub impact_tick: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Evasion {
    pub best: Outcome,
    pub candidates: Vec<Outcome>,
}

/// Whether the shell, left alone, would run into `world.me` with nothing in between.
pub fn is_dangerous(world: &World, shell: &Shell, config: &EngineConfig) -> bool {
    let physics = &config.physics;
    if shell.speed() < config.tactics.min_shell_speed {
        return false;
    }
    let far = shell_reach(shell, config.tactics.danger_lookahead_ticks, physics);
    if !is_goal_blocked_by(shell, far, &hitbox(&world.me, physics), physics) {
        return false;
    }
    !is_blocked_full(world, shell, world.me.position, physics)
}

pub fn dangerous_shells<'a>(world: &'a World, config: &'a EngineConfig) -> impl Iterator<Item = &'a Shell> + 'a {
    world.shells.iter().filter(move |s| is_dangerous(world, s, config))
}

/// Distance the shell can still cover before drag stops it.
fn remaining_travel(shell: &Shell, physics: &PhysicsConfig) -> f64 {
    let decay = shell_decay(shell.kind, physics);
    if decay >= 1.0 {
        return f64::INFINITY;
    }
    shell.speed() / (1.0 - decay)
}

fn clearance(tank: &Tank, shell: &Shell, physics: &PhysicsConfig) -> f64 {
    tank.position.distance(shell.position) - tank.bounding_radius() * physics.hitbox_inflation - shell.bounding_radius()
}

/// Ticks to advance at once: half the time the gap needs to close, capped by `max_batch_ticks`.
fn batch_ticks(tank: &Tank, shell: &Shell, config: &EngineConfig) -> u32 {
    let closing = 2.0 * (shell.speed() + tank.velocity.length());
    if closing <= 0.0 {
        return 1;
    }
    let gap = clearance(tank, shell, &config.physics).max(0.0);
    ((gap / closing).floor() as u32).clamp(1, config.tactics.max_batch_ticks)
}

/// Step `me` under `tracks` and the shell in free flight until the shell
/// hits, passes, or can no longer do meaningful damage.
pub fn simulate(me: &Tank, shell: &Shell, tracks: Tracks, arena: &Arena, config: &EngineConfig) -> Prediction {
    let physics = &config.physics;
    let tactics = &config.tactics;
    if shell.speed() < tactics.min_shell_speed {
        return Prediction::MISS;
    }

    if contains_point(&hitbox(me, physics), shell.position) {
        return Prediction {
            damage: impact_damage_along(shell, shell.position + shell.velocity, me, physics),
            impact_tick: Some(0),
        };
    }

    let mut tank = me.clone();
    let mut shell = shell.clone();
    let mut distance = tank.position.distance(shell.position);
    let mut elapsed = 0u32;

    while elapsed < tactics.max_lookahead_ticks {
        let reachable = remaining_travel(&shell, physics) >= clearance(&tank, &shell, physics);
        if !reachable || damage_upper_bound(&shell, &tank, physics) < tactics.negligible_damage {
            return Prediction::MISS;
        }

        let ticks = batch_ticks(&tank, &shell, config).min(tactics.max_lookahead_ticks - elapsed);
        let next_tank = step_tank(&tank, tracks, ticks, arena, physics);
        let next_shell = step_shell(&shell, ticks, physics);
        elapsed += ticks;

        let body = hitbox(&next_tank, physics);
        let touched = is_goal_blocked_by(&shell, next_shell.position, &body, physics)
            || contains_point(&body, next_shell.position);
        if touched {
            // The padded sightlines can touch a tick before the centre line
            // enters, so score the line on through the hitbox.
            let through = next_shell.position
                + unit_or_floor(shell.velocity, physics.length_floor) * 2.0 * body.bounding_radius();
            return Prediction {
                damage: impact_damage_along(&shell, through, &next_tank, physics),
                impact_tick: Some(elapsed),
            };
        }

        let next_distance = next_tank.position.distance(next_shell.position);
        if next_distance >= distance {
            return Prediction::MISS;
        }
        tank = next_tank;
        shell = next_shell;
        distance = next_distance;
    }
    Prediction::MISS
}

/// Sum of predicted damage from every shell under one maneuver.
pub fn evaluate(me: &Tank, shells: &[Shell], tracks: Tracks, arena: &Arena, config: &EngineConfig) -> Outcome {
    let mut damage = 0.0;
    let mut impact_tick: Option<u32> = None;
    for shell in shells {
        let p = simulate(me, shell, tracks, arena, config);
        damage += p.damage;
        impact_tick = match (impact_tick, p.impact_tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
    Outcome {
        tracks,
        damage,
        impact_tick,
    }
}

/// Pick the maneuver minimizing total damage from `shells`. `None` when there is nothing to dodge.
pub fn evade_from(world: &World, shells: &[Shell], config: &EngineConfig) -> Option<Evasion> {
    if shells.is_empty() {
        return None;
    }
    let arena = Arena::around(world, world.me.id);
    let candidates: Vec<Outcome> = MANEUVERS
        .iter()
        .map(|&tracks| {
            let outcome = evaluate(&world.me, shells, tracks, &arena, config);
            trace!(
                "maneuver ({:.1}, {:.1}): damage {:.3}, impact {:?}",
                tracks.left,
                tracks.right,
                outcome.damage,
                outcome.impact_tick
            );
            outcome
        })
        .collect();

    let mut best = candidates[0];
    for c in &candidates[1..] {
        if c.damage < best.damage {
            best = *c;
        }
    }
    debug!(
        "evading {} shell(s) with ({:.1}, {:.1}), predicted damage {:.3}",
        shells.len(),
        best.tracks.left,
        best.tracks.right,
        best.damage
    );
    Some(Evasion { best, candidates })
}

/// Dodge every shell currently in flight toward us.
pub fn evade(world: &World, config: &EngineConfig) -> Option<Evasion> {
    let shells: Vec<Shell> = dangerous_shells(world, config).cloned().collect();
    evade_from(world, &shells, config)
}

/// A shell the one enemy about to fire at us would plausibly send, if exactly
/// one enemy is lined up on us and would rather shoot us than a teammate.
pub fn anticipated_shell(world: &World, config: &EngineConfig) -> Option<Shell> {
    let physics = &config.physics;
    let tactics = &config.tactics;
    let me = &world.me;

    let mut shooters = world.enemies().filter(|enemy| {
        let mine = time_before_hit(enemy, me, physics);
        mine <= tactics.anticipation_ticks
            && world
                .teammates()
                .all(|mate| time_before_hit(enemy, mate, physics) >= mine)
    });
    let enemy = shooters.next()?;
    if shooters.next().is_some() {
        return None;
    }

    let to_me = me.position - enemy.position;
    let clamp = tactics.anticipation_turret_clamp_deg.to_radians();
    let error = enemy.turret_angle_to(me.position).clamp(-clamp, clamp);
    let direction = DVec2::from_angle(to_me.y.atan2(to_me.x) - error);
    let shell = Shell::new(0, ShellKind::Regular, enemy.position, direction * physics.shell_average_speed);

    if is_blocked_full(world, &shell, me.position, physics) {
        return None;
    }
    debug!("anticipating a shot from tank {}", enemy.id);
    Some(shell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn world_with_shell(me: DVec2, shell_at: DVec2, velocity: DVec2) -> World {
        let mut world = World::new(1280.0, 800.0, Tank::medium(0, me, 0.0));
        world.shells.push(Shell::new(10, ShellKind::Regular, shell_at, velocity));
        world
    }

    #[test]
    fn test_head_on_shell_is_dangerous() {
        let world = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(400.0, 700.0), DVec2::new(0.0, -14.7));
        assert!(is_dangerous(&world, &world.shells[0], &config()));
    }

    #[test]
    fn test_wide_or_receding_shell_is_not_dangerous() {
        let wide = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(600.0, 700.0), DVec2::new(0.0, -14.7));
        assert!(!is_dangerous(&wide, &wide.shells[0], &config()));

        let receding = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(400.0, 700.0), DVec2::new(0.0, 14.7));
        assert!(!is_dangerous(&receding, &receding.shells[0], &config()));

        let spent = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(400.0, 700.0), DVec2::new(0.0, -0.5));
        assert!(!is_dangerous(&spent, &spent.shells[0], &config()));
    }

    #[test]
    fn test_shell_behind_wall_is_not_dangerous() {
        let mut world = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(400.0, 700.0), DVec2::new(0.0, -14.7));
        world.obstacles.push(Obstacle {
            id: 5,
            position: DVec2::new(400.0, 560.0),
            width: 200.0,
            height: 40.0,
            heading: 0.0,
        });
        assert!(!is_dangerous(&world, &world.shells[0], &config()));
    }

    #[test]
    fn test_standing_still_takes_the_hit() {
        let world = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(400.0, 700.0), DVec2::new(0.0, -14.7));
        let arena = Arena::around(&world, 0);
        let p = simulate(&world.me, &world.shells[0], Tracks::HOLD, &arena, &config());
        assert!((p.damage - REGULAR_SHELL_DAMAGE).abs() < 1e-9);
        assert!(p.impact_tick.is_some());
    }

    #[test]
    fn test_head_on_hit_at_every_tick_phase() {
        let me = Tank::medium(0, DVec2::new(400.0, 400.0), 0.0);
        let arena = Arena::open(1280.0, 800.0);
        let config = config();
        for step in 0..30 {
            let y = 700.0 + 14.7 * step as f64 / 30.0;
            for x in [400.0, 430.0] {
                let shell = Shell::new(10, ShellKind::Regular, DVec2::new(x, y), DVec2::new(0.0, -14.7));
                let p = simulate(&me, &shell, Tracks::HOLD, &arena, &config);
                assert!(p.damage > 0.0, "missed from ({}, {})", x, y);
                assert!(p.impact_tick.is_some(), "no impact from ({}, {})", x, y);
                if x == 400.0 {
                    assert!((p.damage - REGULAR_SHELL_DAMAGE).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_shell_inside_margin_hits_at_once() {
        let me = Tank::medium(0, DVec2::new(400.0, 400.0), 0.0);
        let shell = Shell::new(10, ShellKind::Regular, DVec2::new(400.0, 432.5), DVec2::new(0.0, -14.7));
        let p = simulate(&me, &shell, Tracks::new(1.0, 1.0), &Arena::open(1280.0, 800.0), &config());
        assert_eq!(p.impact_tick, Some(0));
        assert!((p.damage - REGULAR_SHELL_DAMAGE).abs() < 1e-9);
    }

    #[test]
    fn test_batching_matches_single_steps() {
        let batched = config();
        let mut single = config();
        single.tactics.max_batch_ticks = 1;
        let me = Tank::medium(0, DVec2::new(400.0, 400.0), 0.0);
        let arena = Arena::open(1280.0, 800.0);

        let mut hits = 0;
        for x in [340.0, 370.0, 400.0, 425.0, 445.0, 470.0] {
            for y in [600.0, 651.3, 700.0, 758.8] {
                for dx in [-3.0, 0.0, 2.0] {
                    let shell = Shell::new(10, ShellKind::Regular, DVec2::new(x, y), DVec2::new(dx, -14.7));
                    for &tracks in MANEUVERS.iter() {
                        let a = simulate(&me, &shell, tracks, &arena, &batched);
                        let b = simulate(&me, &shell, tracks, &arena, &single);
                        assert_eq!(a.impact_tick, b.impact_tick, "({}, {}) dx {} {:?}", x, y, dx, tracks);
                        assert!((a.damage - b.damage).abs() < 1e-9, "({}, {}) dx {} {:?}", x, y, dx, tracks);
                        if a.impact_tick.is_some() {
                            hits += 1;
                        }
                    }
                }
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_reversing_clears_a_corner_shot() {
        let world = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(440.0, 700.0), DVec2::new(0.0, -14.7));
        let arena = Arena::around(&world, 0);
        let hold = simulate(&world.me, &world.shells[0], Tracks::HOLD, &arena, &config());
        let back = simulate(&world.me, &world.shells[0], Tracks::new(-1.0, -1.0), &arena, &config());
        assert!(hold.damage > 0.0);
        assert_eq!(back.damage, 0.0);
        assert_eq!(back.impact_tick, None);

        let evasion = evade(&world, &config()).unwrap();
        assert!(evasion.best.damage < hold.damage);
        assert_eq!(evasion.candidates.len(), MANEUVERS.len());
    }

    #[test]
    fn test_ties_go_to_first_listed() {
        // A shell that can never connect leaves every maneuver at zero.
        let world = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(900.0, 700.0), DVec2::new(0.0, 14.7));
        let evasion = evade_from(&world, &world.shells, &config()).unwrap();
        assert_eq!(evasion.best.tracks, MANEUVERS[0]);
        assert!(evasion.candidates.iter().all(|c| c.damage == 0.0));
    }

    #[test]
    fn test_nothing_to_dodge() {
        let world = World::new(1280.0, 800.0, Tank::medium(0, DVec2::new(400.0, 400.0), 0.0));
        assert!(evade(&world, &config()).is_none());
    }

    #[test]
    fn test_lookahead_cap_bounds_simulation() {
        let mut config = config();
        config.tactics.max_lookahead_ticks = 3;
        let world = world_with_shell(DVec2::new(400.0, 400.0), DVec2::new(400.0, 780.0), DVec2::new(0.0, -14.7));
        let arena = Arena::around(&world, 0);
        let p = simulate(&world.me, &world.shells[0], Tracks::HOLD, &arena, &config);
        assert_eq!(p, Prediction::MISS);
    }

    #[test]
    fn test_anticipates_lone_aimed_enemy() {
        let mut world = World::new(1280.0, 800.0, Tank::medium(0, DVec2::new(200.0, 400.0), 0.0));
        // Enemy to the right, hull and turret pointing at us.
        world.tanks.push(Tank::medium(1, DVec2::new(600.0, 400.0), std::f64::consts::PI));
        let shell = anticipated_shell(&world, &config()).unwrap();
        assert_eq!(shell.position, DVec2::new(600.0, 400.0));
        assert!((shell.velocity.normalize() - DVec2::new(-1.0, 0.0)).length() < 1e-9);

        // A second enemy lined up as well makes the shot ambiguous.
        world.tanks.push(Tank::medium(2, DVec2::new(200.0, 100.0), std::f64::consts::FRAC_PI_2));
        assert!(anticipated_shell(&world, &config()).is_none());
    }

    #[test]
    fn test_no_anticipation_when_enemy_prefers_teammate() {
        let mut world = World::new(1280.0, 800.0, Tank::medium(0, DVec2::new(900.0, 650.0), 0.0));
        world.tanks.push(Tank::medium(1, DVec2::new(600.0, 400.0), 0.0));
        assert!(anticipated_shell(&world, &config()).is_some());

        // A teammate straight down the enemy's barrel is the likelier target.
        world.tanks.push(Tank {
            teammate: true,
            ..Tank::medium(2, DVec2::new(800.0, 400.0), 0.0)
        });
        assert!(anticipated_shell(&world, &config()).is_none());
    }
}
