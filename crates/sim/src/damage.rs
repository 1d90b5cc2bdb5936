use glam::DVec2;
use std::f64::consts::{FRAC_PI_2, PI};
use tankbot_shared::*;

use crate::body::{contains_point, edges_of, outward_normal};
use crate::geometry::{angle_between, unit_or_floor, Segment};

/// Distance-based hit probability used for valuation.
///
/// Decays from 1.0 to `floor` over `[0, short_range]`, then linearly to 0 at `max_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    pub short_range: f64,
    pub max_range: f64,
    pub floor: f64,
}

impl Exposure {
    pub fn new(diagonal: f64, tactics: &TacticsConfig) -> Self {
        Self {
            short_range: diagonal * tactics.short_range_fraction,
            max_range: diagonal * tactics.max_range_fraction,
            floor: tactics.short_range_floor,
        }
    }

    pub fn for_world(world: &World, tactics: &TacticsConfig) -> Self {
        Self::new(world.diagonal(), tactics)
    }

    pub fn hit_probability(&self, from: DVec2, to: DVec2) -> f64 {
        self.at_distance(from.distance(to))
    }

    pub fn at_distance(&self, d: f64) -> f64 {
        if !(0.0..=self.max_range).contains(&d) {
            0.0
        } else if d <= self.short_range {
            1.0 - (1.0 - self.floor) * d / self.short_range
        } else {
            self.floor * (self.max_range - d) / (self.max_range - self.short_range)
        }
    }
}

/// Damage scale for a hit `angle` radians off the struck edge's normal.
pub fn angle_coefficient(kind: ShellKind, angle: f64, physics: &PhysicsConfig) -> f64 {
    let angle = angle.clamp(0.0, FRAC_PI_2);
    match kind {
        ShellKind::Regular => {
            if angle >= physics.regular_ricochet_angle {
                0.0
            } else {
                physics.regular_shell_damage * (1.0 - angle / physics.regular_ricochet_angle)
            }
        }
        ShellKind::Premium => physics.premium_shell_damage * (1.0 - angle / PI),
    }
}

/// Hits near an edge's endpoints do slightly less damage.
pub fn distance_coefficient(distance_factor: f64, physics: &PhysicsConfig) -> f64 {
    1.0 - physics.corner_falloff * distance_factor.clamp(0.0, 1.0)
}

/// Where and how a shell's flight segment strikes a tank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub edge: usize,
    pub point: DVec2,
    /// 0 for a perpendicular hit, PI/2 for a grazing one.
    pub angle: f64,
    /// 0 at the struck edge's midpoint, 1 at its endpoints.
    pub distance_factor: f64,
    pub damage: f64,
}

/// The tank's footprint scaled by `hitbox_inflation`; every hit test runs against it.
pub fn hitbox(tank: &Tank, physics: &PhysicsConfig) -> OrientedBody {
    OrientedBody::of(tank).scaled(physics.hitbox_inflation)
}

/// Impact of the flight `shell.position -> flight_end` against the tank's inflated hitbox.
///
/// Among the crossed edges the one nearest the shell wins; ties go to the
/// earlier edge in winding order. A shell already inside the hitbox is traced
/// back along its heading so the edge it came through still counts.
pub fn impact_along(shell: &Shell, flight_end: DVec2, tank: &Tank, physics: &PhysicsConfig) -> Option<Impact> {
    let body = hitbox(tank, physics);
    let start = if contains_point(&body, shell.position) {
        let back = unit_or_floor(shell.velocity, physics.length_floor) * 2.0 * body.bounding_radius();
        shell.position - back
    } else {
        shell.position
    };
    let flight = Segment::new(start, flight_end);
    let edges = edges_of(&body);

    let mut nearest: Option<(usize, f64, DVec2)> = None;
    for (i, edge) in edges.iter().enumerate() {
        if let Some((t, point)) = flight.intersection(edge, physics.parallel_epsilon) {
            if nearest.map_or(true, |(_, best, _)| t < best) {
                nearest = Some((i, t, point));
            }
        }
    }
    let (edge, _, point) = nearest?;
    let struck = edges[edge];

    let deviation = angle_between(shell.velocity, struck.direction());
    let folded = if deviation > FRAC_PI_2 { PI - deviation } else { deviation };
    let angle = FRAC_PI_2 - folded;

    let half = struck.length() / 2.0;
    let distance_factor = if half > 0.0 {
        (point.distance(struck.midpoint()) / half).min(1.0)
    } else {
        0.0
    };

    let damage = angle_coefficient(shell.kind, angle, physics) * distance_coefficient(distance_factor, physics);
    Some(Impact {
        edge,
        point,
        angle,
        distance_factor,
        damage,
    })
}

/// Damage from the shell's next tick of flight; 0 if it misses the hitbox.
pub fn impact_damage(shell: &Shell, tank: &Tank, physics: &PhysicsConfig) -> f64 {
    impact_damage_along(shell, shell.position + shell.velocity, tank, physics)
}

pub fn impact_damage_along(shell: &Shell, flight_end: DVec2, tank: &Tank, physics: &PhysicsConfig) -> f64 {
    impact_along(shell, flight_end, tank, physics).map_or(0.0, |i| i.damage)
}

/// Best damage the shell could still do given its heading relative to the
/// faces it is approaching. Faces it is behind or moving away from count for nothing,
/// unless the shell is already inside the hitbox.
pub fn damage_upper_bound(shell: &Shell, tank: &Tank, physics: &PhysicsConfig) -> f64 {
    let body = hitbox(tank, physics);
    if contains_point(&body, shell.position) {
        return angle_coefficient(shell.kind, 0.0, physics);
    }
    edges_of(&body)
        .iter()
        .filter_map(|edge| {
            let n = outward_normal(&body, edge);
            let approaching = n.dot(shell.velocity) < 0.0;
            let outside = n.dot(shell.position - edge.midpoint()) > 0.0;
            if approaching && outside {
                Some(angle_coefficient(shell.kind, angle_between(-shell.velocity, n), physics))
            } else {
                None
            }
        })
        .fold(0.0, f64::max)
}
