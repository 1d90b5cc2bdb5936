use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must lie in (0, 1], got {value}")]
    DecayOutOfRange { field: &'static str, value: f64 },
    #[error("max_batch_ticks must be at least 1")]
    ZeroBatch,
    #[error("spacing band is inverted: min {min} > max {max}")]
    InvertedSpacing { min: f64, max: f64 },
    #[error("hit probability ranges out of order: short {short} must be below max {max}")]
    RangeOrder { short: f64, max: f64 },
}

/// Kinematic and ballistic constants. Everything the predictor and the
/// damage model read comes from here, so tests can override any of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub regular_shell_decay: f64,
    pub premium_shell_decay: f64,
    pub reverse_power_factor: f64,
    pub track_acceleration: f64,
    pub angular_acceleration: f64,
    pub parallel_epsilon: f64,
    pub contact_epsilon: f64,
    pub length_floor: f64,
    /// Offset sightlines sit this many shell half-heights off the main line.
    pub sightline_margin: f64,
    pub shell_width: f64,
    pub shell_height: f64,
    pub shell_average_speed: f64,
    pub hitbox_inflation: f64,
    pub regular_shell_damage: f64,
    pub premium_shell_damage: f64,
    pub regular_ricochet_angle: f64,
    pub corner_falloff: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            regular_shell_decay: REGULAR_SHELL_DECAY,
            premium_shell_decay: PREMIUM_SHELL_DECAY,
            reverse_power_factor: REVERSE_POWER_FACTOR,
            track_acceleration: TRACK_ACCELERATION,
            angular_acceleration: ANGULAR_ACCELERATION,
            parallel_epsilon: PARALLEL_EPSILON,
            contact_epsilon: CONTACT_EPSILON,
            length_floor: LENGTH_FLOOR,
            sightline_margin: 1.5,
            shell_width: SHELL_WIDTH,
            shell_height: SHELL_HEIGHT,
            shell_average_speed: SHELL_AVERAGE_SPEED,
            hitbox_inflation: 1.1,
            regular_shell_damage: REGULAR_SHELL_DAMAGE,
            premium_shell_damage: PREMIUM_SHELL_DAMAGE,
            regular_ricochet_angle: REGULAR_RICOCHET_ANGLE,
            corner_falloff: 0.2,
        }
    }
}

/// Tuning for the evasion optimizer and the zone valuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    /// Hard cap on simulated ticks per candidate maneuver.
    pub max_lookahead_ticks: u32,
    pub max_batch_ticks: u32,
    /// Below this bound on remaining damage a simulation stops early.
    pub negligible_damage: f64,
    /// How far a shell's path is fanned out when deciding whether it is dangerous.
    pub danger_lookahead_ticks: u32,
    pub min_shell_speed: f64,

    pub zone_radius: f64,
    pub border_margin: f64,
    pub zone_locality: f64,

    /// Fractions of the world diagonal.
    pub short_range_fraction: f64,
    pub max_range_fraction: f64,
    pub short_range_floor: f64,

    pub blocked_engagement_factor: f64,
    pub crossfire_bonus: f64,
    pub spacing_min: f64,
    pub spacing_max: f64,
    pub spacing_weight: f64,
    pub crossfire_distance: f64,
    pub crossfire_weight: f64,

    /// An enemy is expected to shoot at us within this many ticks before we dodge in advance.
    pub anticipation_ticks: f64,
    pub anticipation_turret_clamp_deg: f64,
    /// Half-angle of the cone in which steering drives straight instead of pivoting.
    pub steering_cone: f64,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            max_lookahead_ticks: 300,
            max_batch_ticks: 5,
            negligible_damage: 0.5,
            danger_lookahead_ticks: 1000,
            min_shell_speed: 1.0,
            zone_radius: 40.0,
            border_margin: 60.0,
            zone_locality: 320.0,
            short_range_fraction: 0.5,
            max_range_fraction: 1.0,
            short_range_floor: 0.8,
            blocked_engagement_factor: 0.25,
            crossfire_bonus: 0.5,
            spacing_min: 120.0,
            spacing_max: 450.0,
            spacing_weight: 0.5,
            crossfire_distance: 300.0,
            crossfire_weight: 1.0,
            anticipation_ticks: 100.0,
            anticipation_turret_clamp_deg: 10.0,
            steering_cone: std::f64::consts::FRAC_PI_6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub tactics: TacticsConfig,
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn decay(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::DecayOutOfRange { field, value })
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        decay("regular_shell_decay", p.regular_shell_decay)?;
        decay("premium_shell_decay", p.premium_shell_decay)?;
        decay("reverse_power_factor", p.reverse_power_factor)?;
        positive("shell_width", p.shell_width)?;
        positive("shell_height", p.shell_height)?;
        positive("shell_average_speed", p.shell_average_speed)?;
        positive("hitbox_inflation", p.hitbox_inflation)?;
        positive("parallel_epsilon", p.parallel_epsilon)?;
        positive("length_floor", p.length_floor)?;
        positive("regular_ricochet_angle", p.regular_ricochet_angle)?;

        let t = &self.tactics;
        if t.max_batch_ticks == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        positive("zone_radius", t.zone_radius)?;
        positive("zone_locality", t.zone_locality)?;
        if t.spacing_min > t.spacing_max {
            return Err(ConfigError::InvertedSpacing {
                min: t.spacing_min,
                max: t.spacing_max,
            });
        }
        positive("short_range_fraction", t.short_range_fraction)?;
        if t.short_range_fraction >= t.max_range_fraction {
            return Err(ConfigError::RangeOrder {
                short: t.short_range_fraction,
                max: t.max_range_fraction,
            });
        }
        Ok(())
    }
}
