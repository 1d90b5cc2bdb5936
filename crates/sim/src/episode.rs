use glam::DVec2;
use log::debug;
use serde::{Deserialize, Serialize};
use tankbot_shared::*;

use crate::assess::turret_speed;
use crate::damage::impact_along;
use crate::policy::Policy;
use crate::predict::{step_shell, step_tank, Arena, Tracks};
use crate::sight::is_goal_blocked_by;

/// Controlled tank's state after one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u32,
    pub position: DVec2,
    pub heading: f64,
    pub crew_health: f64,
    pub hull_durability: f64,
    #[serde(rename = "move")]
    pub mv: Move,
    pub shells_in_flight: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub hits_taken: u32,
    pub damage_taken: f64,
    pub shots_fired: u32,
    pub hits_dealt: u32,
    pub damage_dealt: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub policy: String,
    pub ticks: u32,
    pub frames: Vec<Frame>,
    pub stats: EpisodeStats,
    pub final_world: World,
}

fn apply_hit(tank: &mut Tank, damage: f64) {
    tank.crew_health = (tank.crew_health - damage).max(0.0);
    tank.hull_durability = (tank.hull_durability - damage).max(0.0);
}

fn fire(me: &mut Tank, kind: FireType, next_id: u64, physics: &PhysicsConfig) -> Option<Shell> {
    if kind == FireType::None || me.remaining_reloading_time > 0 {
        return None;
    }
    let premium = kind == FireType::PremiumPreferred && me.premium_shell_count > 0;
    let shell_kind = if premium {
        me.premium_shell_count -= 1;
        ShellKind::Premium
    } else {
        ShellKind::Regular
    };
    me.remaining_reloading_time = me.reloading_time;

    let dir = DVec2::from_angle(me.turret_heading());
    let muzzle = me.position + dir * (me.width.max(me.height) / 2.0 + physics.shell_width);
    Some(Shell::new(next_id, shell_kind, muzzle, dir * physics.shell_average_speed))
}

/// Where a shell ends up after one tick.
enum Flight {
    Hit { tank: usize, damage: f64 },
    Absorbed,
    Flying(Shell),
}

/// Tank index 0 is `me`, then `world.tanks` in order.
fn fly(shell: &Shell, tanks: &[&Tank], world: &World, config: &EngineConfig) -> Flight {
    let physics = &config.physics;
    let next = step_shell(shell, 1, physics);

    // Nearest tank whose inflated hitbox the flight enters; the entry edge sets the damage.
    let struck = tanks
        .iter()
        .enumerate()
        .filter_map(|(i, t)| impact_along(shell, next.position, t, physics).map(|hit| (i, *t, hit.damage)))
        .min_by(|a, b| {
            a.1.distance_to(shell.position)
                .total_cmp(&b.1.distance_to(shell.position))
        });
    if let Some((i, tank, damage)) = struck {
        // Wrecks soak up shells without scoring.
        if !tank.is_alive() {
            return Flight::Absorbed;
        }
        return Flight::Hit { tank: i, damage };
    }

    let stopped = world
        .obstacles
        .iter()
        .any(|o| is_goal_blocked_by(shell, next.position, o, physics));
    if stopped || !world.contains(next.position) || next.speed() < config.tactics.min_shell_speed {
        return Flight::Absorbed;
    }
    Flight::Flying(next)
}

/// Advance a snapshot tick by tick with `policy` driving `world.me`.
///
/// Other tanks coast with their tracks idle and never fire. Shells fly in
/// free flight and deal `impact_damage` to whatever live tank they enter first.
pub fn run_episode(world: &World, policy: &mut dyn Policy, config: &EngineConfig, ticks: u32) -> EpisodeReport {
    let physics = &config.physics;
    let mut state = world.clone();
    let mut frames = Vec::with_capacity(ticks as usize);
    let mut stats = EpisodeStats::default();
    let mut next_shell_id = state.shells.iter().map(|s| s.id).max().map_or(1, |id| id + 1);

    for _ in 0..ticks {
        if !state.me.is_alive() {
            break;
        }
        let mv = policy.act(&state);

        let arena = Arena::around(&state, state.me.id);
        let mut me = step_tank(
            &state.me,
            Tracks::new(mv.left_track_power, mv.right_track_power),
            1,
            &arena,
            physics,
        );
        me.turret_relative_angle =
            normalize_angle(me.turret_relative_angle + mv.turret_turn.clamp(-1.0, 1.0) * turret_speed(&state.me));
        me.remaining_reloading_time = me.remaining_reloading_time.saturating_sub(1);

        let others: Vec<Tank> = state
            .tanks
            .iter()
            .map(|t| {
                if !t.is_alive() {
                    return t.clone();
                }
                let mut next = step_tank(t, Tracks::HOLD, 1, &Arena::around(&state, t.id), physics);
                next.remaining_reloading_time = next.remaining_reloading_time.saturating_sub(1);
                next
            })
            .collect();

        if let Some(shell) = fire(&mut me, mv.fire, next_shell_id, physics) {
            next_shell_id += 1;
            stats.shots_fired += 1;
            state.shells.push(shell);
        }

        state.me = me;
        state.tanks = others;

        let mut flying = Vec::with_capacity(state.shells.len());
        let mut hits: Vec<(usize, f64)> = Vec::new();
        {
            let tanks: Vec<&Tank> = std::iter::once(&state.me).chain(state.tanks.iter()).collect();
            for shell in &state.shells {
                match fly(shell, &tanks, &state, config) {
                    Flight::Hit { tank, damage } => hits.push((tank, damage)),
                    Flight::Absorbed => {}
                    Flight::Flying(next) => flying.push(next),
                }
            }
        }
        for (i, damage) in hits {
            if i == 0 {
                stats.hits_taken += 1;
                stats.damage_taken += damage;
                apply_hit(&mut state.me, damage);
            } else {
                stats.hits_dealt += 1;
                stats.damage_dealt += damage;
                apply_hit(&mut state.tanks[i - 1], damage);
            }
        }
        state.shells = flying;
        state.tick += 1;

        frames.push(Frame {
            tick: state.tick,
            position: state.me.position,
            heading: state.me.heading,
            crew_health: state.me.crew_health,
            hull_durability: state.me.hull_durability,
            mv,
            shells_in_flight: state.shells.len(),
        });
    }

    debug!(
        "{} ran {} ticks: took {:.1} damage, dealt {:.1}",
        policy.name(),
        frames.len(),
        stats.damage_taken,
        stats.damage_dealt
    );
    EpisodeReport {
        policy: policy.name().to_string(),
        ticks: frames.len() as u32,
        frames,
        stats,
        final_world: state,
    }
}
