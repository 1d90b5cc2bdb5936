// World
pub const DEFAULT_WORLD_WIDTH: f64 = 1280.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 800.0;

// Tank footprint (width runs along the hull heading)
pub const TANK_WIDTH: f64 = 90.0;
pub const TANK_HEIGHT: f64 = 60.0;
pub const TANK_CREW_HEALTH: f64 = 100.0;
pub const TANK_HULL_DURABILITY: f64 = 200.0;
pub const TANK_RELOAD_TICKS: u32 = 60;
pub const TANK_AVERAGE_SPEED: f64 = 1.5; // units/tick, used for travel-time estimates

// Shells
pub const SHELL_WIDTH: f64 = 22.5;
pub const SHELL_HEIGHT: f64 = 7.5;
pub const SHELL_AVERAGE_SPEED: f64 = 14.7; // units/tick at the muzzle
pub const REGULAR_SHELL_DECAY: f64 = 0.995;
pub const PREMIUM_SHELL_DECAY: f64 = 0.99;
pub const REGULAR_SHELL_DAMAGE: f64 = 20.0;
pub const PREMIUM_SHELL_DAMAGE: f64 = 35.0;
pub const REGULAR_RICOCHET_ANGLE: f64 = std::f64::consts::FRAC_PI_3;
pub const KILL_BONUS: f64 = 25.0;

// Tracks
pub const TRACK_ACCELERATION: f64 = 0.1;
pub const ANGULAR_ACCELERATION: f64 = 0.000627876445651 / 1.5;
pub const REVERSE_POWER_FACTOR: f64 = 0.75;

// Turret
pub const TURRET_BASE_SPEED_DEG: f64 = 0.5; // deg/tick at full crew health, halved at zero
pub const TURRET_DEAD_BAND_DEG: f64 = 1.0;
pub const AIM_TARGET_SIZE: f64 = 15.0;

// Bonuses
pub const BONUS_SIZE: f64 = 30.0;
pub const PREMIUM_RESERVE_MAX: u32 = 5;

// Numeric guards
pub const PARALLEL_EPSILON: f64 = 1e-3;
pub const CONTACT_EPSILON: f64 = 0.01;
pub const LENGTH_FLOOR: f64 = 1e-4;
