use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Rectangular footprint capability shared by every entity that can block,
/// collide with, or be hit by a shell.
///
/// `size().x` is the extent along the heading, `size().y` the extent across it.
pub trait Body {
    fn position(&self) -> DVec2;
    fn size(&self) -> DVec2;
    fn heading(&self) -> f64;

    fn half_extents(&self) -> DVec2 {
        self.size() * 0.5
    }

    /// Radius of the circle circumscribing the footprint.
    fn bounding_radius(&self) -> f64 {
        self.half_extents().length()
    }

    fn distance_to(&self, point: DVec2) -> f64 {
        self.position().distance(point)
    }
}

/// Normalize angle to [-PI, PI].
pub fn normalize_angle(mut a: f64) -> f64 {
    use std::f64::consts::PI;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// A bare oriented rectangle, used for hypothetical bodies such as inflated hitboxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBody {
    pub position: DVec2,
    pub size: DVec2,
    pub heading: f64,
}

impl OrientedBody {
    pub fn of(body: &dyn Body) -> Self {
        Self {
            position: body.position(),
            size: body.size(),
            heading: body.heading(),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            size: self.size * factor,
            ..*self
        }
    }
}

impl Body for OrientedBody {
    fn position(&self) -> DVec2 {
        self.position
    }
    fn size(&self) -> DVec2 {
        self.size
    }
    fn heading(&self) -> f64 {
        self.heading
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: u64,
    pub position: DVec2,
    pub velocity: DVec2,
    pub heading: f64,
    pub angular_velocity: f64,
    pub width: f64,
    pub height: f64,
    pub turret_relative_angle: f64,
    pub crew_health: f64,
    pub crew_max_health: f64,
    pub hull_durability: f64,
    pub hull_max_durability: f64,
    pub reloading_time: u32,
    pub remaining_reloading_time: u32,
    pub premium_shell_count: u32,
    pub teammate: bool,
}

impl Tank {
    /// A full-health medium tank at rest, turret aligned with the hull.
    pub fn medium(id: u64, position: DVec2, heading: f64) -> Self {
        Self {
            id,
            position,
            velocity: DVec2::ZERO,
            heading,
            angular_velocity: 0.0,
            width: TANK_WIDTH,
            height: TANK_HEIGHT,
            turret_relative_angle: 0.0,
            crew_health: TANK_CREW_HEALTH,
            crew_max_health: TANK_CREW_HEALTH,
            hull_durability: TANK_HULL_DURABILITY,
            hull_max_durability: TANK_HULL_DURABILITY,
            reloading_time: TANK_RELOAD_TICKS,
            remaining_reloading_time: 0,
            premium_shell_count: 3,
            teammate: false,
        }
    }

    pub fn forward(&self) -> DVec2 {
        DVec2::from_angle(self.heading)
    }

    pub fn turret_heading(&self) -> f64 {
        self.heading + self.turret_relative_angle
    }

    pub fn is_alive(&self) -> bool {
        self.crew_health > 0.0 && self.hull_durability > 0.0
    }

    pub fn life_fraction(&self) -> f64 {
        if self.crew_max_health <= 0.0 {
            return 0.0;
        }
        (self.crew_health / self.crew_max_health).clamp(0.0, 1.0)
    }

    pub fn hull_fraction(&self) -> f64 {
        if self.hull_max_durability <= 0.0 {
            return 0.0;
        }
        (self.hull_durability / self.hull_max_durability).clamp(0.0, 1.0)
    }

    /// Signed angle from the hull heading to `point`, in [-PI, PI].
    pub fn angle_to(&self, point: DVec2) -> f64 {
        let d = point - self.position;
        normalize_angle(d.y.atan2(d.x) - self.heading)
    }

    /// Signed angle from the turret heading to `point`, in [-PI, PI].
    pub fn turret_angle_to(&self, point: DVec2) -> f64 {
        let d = point - self.position;
        normalize_angle(d.y.atan2(d.x) - self.turret_heading())
    }
}

impl Body for Tank {
    fn position(&self) -> DVec2 {
        self.position
    }
    fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
    fn heading(&self) -> f64 {
        self.heading
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellKind {
    Regular,
    Premium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub id: u64,
    pub kind: ShellKind,
    pub position: DVec2,
    pub velocity: DVec2,
    pub heading: f64,
    pub width: f64,
    pub height: f64,
}

impl Shell {
    /// A shell whose heading follows its velocity.
    pub fn new(id: u64, kind: ShellKind, position: DVec2, velocity: DVec2) -> Self {
        Self {
            id,
            kind,
            position,
            velocity,
            heading: velocity.y.atan2(velocity.x),
            width: SHELL_WIDTH,
            height: SHELL_HEIGHT,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

impl Body for Shell {
    fn position(&self) -> DVec2 {
        self.position
    }
    fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
    fn heading(&self) -> f64 {
        self.heading
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    Medikit,
    RepairKit,
    AmmoCrate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    pub id: u64,
    pub kind: BonusKind,
    pub position: DVec2,
    pub width: f64,
    pub height: f64,
}

impl Bonus {
    pub fn new(id: u64, kind: BonusKind, position: DVec2) -> Self {
        Self {
            id,
            kind,
            position,
            width: BONUS_SIZE,
            height: BONUS_SIZE,
        }
    }
}

impl Body for Bonus {
    fn position(&self) -> DVec2 {
        self.position
    }
    fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
    fn heading(&self) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub position: DVec2,
    pub width: f64,
    pub height: f64,
    pub heading: f64,
}

impl Body for Obstacle {
    fn position(&self) -> DVec2 {
        self.position
    }
    fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
    fn heading(&self) -> f64 {
        self.heading
    }
}

/// One tick's snapshot, as handed over by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub tick: u32,
    pub width: f64,
    pub height: f64,
    pub me: Tank,
    /// Every tank except `me`.
    #[serde(default)]
    pub tanks: Vec<Tank>,
    #[serde(default)]
    pub shells: Vec<Shell>,
    #[serde(default)]
    pub bonuses: Vec<Bonus>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl World {
    pub fn new(width: f64, height: f64, me: Tank) -> Self {
        Self {
            tick: 0,
            width,
            height,
            me,
            tanks: Vec::new(),
            shells: Vec::new(),
            bonuses: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width, self.height) * 0.5
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= 0.0 && point.x < self.width && point.y >= 0.0 && point.y < self.height
    }

    /// Live tanks on the other side.
    pub fn enemies(&self) -> impl Iterator<Item = &Tank> + '_ {
        self.tanks.iter().filter(|t| t.is_alive() && !t.teammate)
    }

    /// Live tanks on our side, excluding `me`.
    pub fn teammates(&self) -> impl Iterator<Item = &Tank> + '_ {
        self.tanks.iter().filter(|t| t.is_alive() && t.teammate)
    }

    /// Disabled tanks of either side.
    pub fn wrecks(&self) -> impl Iterator<Item = &Tank> + '_ {
        self.tanks.iter().filter(|t| !t.is_alive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireType {
    None,
    Regular,
    PremiumPreferred,
}

/// Commands for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub left_track_power: f64,
    pub right_track_power: f64,
    pub turret_turn: f64,
    pub fire: FireType,
}

impl Move {
    pub fn none() -> Self {
        Self {
            left_track_power: 0.0,
            right_track_power: 0.0,
            turret_turn: 0.0,
            fire: FireType::None,
        }
    }

    pub fn with_tracks(self, left: f64, right: f64) -> Self {
        Self {
            left_track_power: left.clamp(-1.0, 1.0),
            right_track_power: right.clamp(-1.0, 1.0),
            ..self
        }
    }
}

impl Default for Move {
    fn default() -> Self {
        Self::none()
    }
}
