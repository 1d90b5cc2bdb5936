use glam::DVec2;
use std::f64::consts::{FRAC_PI_2, PI};
use tankbot_shared::*;

// A kit is wasted when its own gauge is this far ahead of the other.
const KIT_SLACK: f64 = 0.4;

pub fn is_useful(me: &Tank, bonus: &Bonus) -> bool {
    let life = me.life_fraction();
    let hull = me.hull_fraction();
    match bonus.kind {
        BonusKind::AmmoCrate => true,
        BonusKind::Medikit => life < hull + KIT_SLACK,
        BonusKind::RepairKit => hull < life + KIT_SLACK,
    }
}

/// Desirability on a rough 1..=12 scale.
pub fn value(me: &Tank, bonus: &Bonus) -> f64 {
    match bonus.kind {
        BonusKind::AmmoCrate => (9.0 - me.premium_shell_count as f64).max(1.0),
        BonusKind::Medikit => 10.0 * (1.0 - me.life_fraction()) + 2.0,
        BonusKind::RepairKit => 10.0 * (1.0 - me.hull_fraction()) + 1.0,
    }
}

/// Rough ticks to get there: turn to face it (either end of the hull), then drive.
pub fn time_to_reach(me: &Tank, at: DVec2) -> f64 {
    let mut angle = me.angle_to(at).abs();
    if angle > FRAC_PI_2 {
        angle = PI - angle;
    }
    angle * 1.5 + me.position.distance(at) / TANK_AVERAGE_SPEED
}

pub fn rating(me: &Tank, bonus: &Bonus) -> f64 {
    value(me, bonus) / time_to_reach(me, bonus.position).max(0.01)
}

/// Highest-rated useful bonus; ties go to the earliest listed.
pub fn best_bonus<'a>(world: &'a World) -> Option<&'a Bonus> {
    let me = &world.me;
    let mut best: Option<(&Bonus, f64)> = None;
    for bonus in world.bonuses.iter().filter(|b| is_useful(me, b)) {
        let r = rating(me, bonus);
        if best.map_or(true, |(_, top)| r > top) {
            best = Some((bonus, r));
        }
    }
    best.map(|(b, _)| b)
}

/// Where to drive when there is nothing to fight over.
pub fn fallback_goal(world: &World) -> DVec2 {
    best_bonus(world).map_or_else(|| world.center(), |b| b.position)
}
