use glam::DVec2;
use log::debug;
use serde::{Deserialize, Serialize};
use tankbot_shared::*;

use crate::assess::{possible_score, premium_range, time_before_hit};
use crate::sight::is_blocked_full;

/// Enemy with the best expected score per tick of waiting; ties go to the earliest listed.
pub fn select_target<'a>(world: &'a World, physics: &PhysicsConfig) -> Option<&'a Tank> {
    let me = &world.me;
    let mut best: Option<(&Tank, f64)> = None;
    for enemy in world.enemies() {
        let rate = possible_score(me, enemy, world, physics) / time_before_hit(me, enemy, physics);
        if best.map_or(true, |(_, top)| rate > top) {
            best = Some((enemy, rate));
        }
    }
    best.map(|(t, _)| t)
}

/// Turret command and fire decision against one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aim {
    pub target: u64,
    /// Where the target should be when the shell arrives.
    pub lead_point: DVec2,
    pub turret_turn: f64,
    pub fire: FireType,
}

/// Half-lead the target by the shell's flight time.
pub fn lead_point(me: &Tank, target: &Tank, physics: &PhysicsConfig) -> DVec2 {
    let flight = me.position.distance(target.position) / physics.shell_average_speed;
    target.position + target.velocity * flight / 2.0
}

pub fn aim_at(world: &World, target: &Tank, physics: &PhysicsConfig) -> Aim {
    let me = &world.me;
    let distance = me.position.distance(target.position);
    let lead = lead_point(me, target, physics);
    let error = me.turret_angle_to(lead);

    let turret_turn = if error.abs() < TURRET_DEAD_BAND_DEG.to_radians() {
        0.0
    } else {
        error.signum()
    };

    let muzzle = Shell::new(
        0,
        ShellKind::Regular,
        me.position,
        DVec2::from_angle(me.turret_heading()) * physics.shell_average_speed,
    );
    let on_target = error.abs() <= AIM_TARGET_SIZE.atan2(distance);
    let fire = if !on_target || is_blocked_full(world, &muzzle, target.position, physics) {
        FireType::None
    } else if distance > premium_range(world) {
        FireType::Regular
    } else {
        FireType::PremiumPreferred
    };
    if fire != FireType::None {
        debug!("firing {:?} at tank {} from {:.0}", fire, target.id, distance);
    }

    Aim {
        target: target.id,
        lead_point: lead,
        turret_turn,
        fire,
    }
}
