use glam::DVec2;
use tankbot_shared::*;

use crate::body::edges_of;
use crate::geometry::{nearest_point_on_ray, perp, unit_or_floor, Segment};

/// Which occluders take part in a blocking scan.
///
/// `Static` covers terrain and wrecks. `Full` adds live teammates and bonuses,
/// which intercept shells too. The static set is always a prefix of the full one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occlusion {
    Static,
    Full,
}

/// Occluders of the given tier, in a stable order: obstacles, wrecks, teammates, bonuses.
pub fn blockers(world: &World, occlusion: Occlusion) -> impl Iterator<Item = &dyn Body> + '_ {
    let full = occlusion == Occlusion::Full;
    world
        .obstacles
        .iter()
        .map(|o| o as &dyn Body)
        .chain(world.wrecks().map(|t| t as &dyn Body))
        .chain(world.teammates().filter(move |_| full).map(|t| t as &dyn Body))
        .chain(world.bonuses.iter().filter(move |_| full).map(|b| b as &dyn Body))
}

/// The main sightline from the shell toward `goal` plus two parallel lines
/// offset by the shell's padded half-height.
pub fn sightlines(shell: &Shell, goal: DVec2, physics: &PhysicsConfig) -> [Segment; 3] {
    let aim = nearest_point_on_ray(
        shell.position,
        shell.position + shell.velocity,
        goal,
        physics.length_floor,
    );
    let v = unit_or_floor(aim - shell.position, physics.length_floor);
    let offset = perp(v) * (physics.sightline_margin * shell.height / 2.0);

    let main = Segment::new(shell.position, aim);
    [main, main.translated(offset), main.translated(-offset)]
}

/// Whether `blocker` intercepts the shell's path toward `goal`.
pub fn is_goal_blocked_by(shell: &Shell, goal: DVec2, blocker: &dyn Body, physics: &PhysicsConfig) -> bool {
    let lines = sightlines(shell, goal, physics);
    edges_of(blocker).iter().any(|edge| {
        lines
            .iter()
            .any(|line| edge.intersects(line, physics.parallel_epsilon))
    })
}

/// Whether any candidate intercepts the shell's path before it reaches `goal`.
///
/// Candidates sitting on the shell or on the goal are skipped: a body never
/// blocks a path that starts or ends on itself.
pub fn is_path_blocked<'a>(
    shell: &Shell,
    goal: DVec2,
    candidates: impl IntoIterator<Item = &'a dyn Body>,
    physics: &PhysicsConfig,
) -> bool {
    candidates
        .into_iter()
        .filter(|b| {
            b.distance_to(shell.position) > physics.contact_epsilon
                && b.distance_to(goal) > physics.contact_epsilon
        })
        .any(|b| is_goal_blocked_by(shell, goal, b, physics))
}

/// Blocking test against terrain and wrecks only.
pub fn is_blocked_static(world: &World, shell: &Shell, goal: DVec2, physics: &PhysicsConfig) -> bool {
    is_path_blocked(shell, goal, blockers(world, Occlusion::Static), physics)
}

/// Blocking test against every occluder, dynamic ones included.
pub fn is_blocked_full(world: &World, shell: &Shell, goal: DVec2, physics: &PhysicsConfig) -> bool {
    is_path_blocked(shell, goal, blockers(world, Occlusion::Full), physics)
}
