use glam::DVec2;
use log::debug;
use serde::{Deserialize, Serialize};
use tankbot_shared::*;

use crate::bonus::fallback_goal;
use crate::evasion::{anticipated_shell, evade, evade_from, Outcome};
use crate::predict::Tracks;
use crate::steering::steer_to;
use crate::targeting::{aim_at, select_target, Aim};
use crate::zones::best_zone;

pub trait Policy: Send {
    fn name(&self) -> &str;
    fn act(&mut self, world: &World) -> Move;
}

/// Leaves every control at rest. The baseline evasion is measured against.
pub struct HoldPolicy;

impl Policy for HoldPolicy {
    fn name(&self) -> &str {
        "hold"
    }

    fn act(&mut self, _world: &World) -> Move {
        Move::none()
    }
}

/// Which tier produced the drive command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drive {
    Idle,
    /// Dodging shells already in flight.
    Evade,
    /// Dodging the shot an enemy is about to take.
    Anticipate,
    Zone,
    Fallback,
}

/// One tick's decision with the reasoning behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "move")]
    pub mv: Move,
    pub drive: Drive,
    pub aim: Option<Aim>,
    pub evasion: Option<Outcome>,
    pub goal: Option<DVec2>,
}

fn with_tracks(mv: Move, tracks: Tracks) -> Move {
    mv.with_tracks(tracks.left, tracks.right)
}

/// Aim at the best target, then drive by the first tier that has something to say:
/// live shells, an anticipated shot, the best zone, and finally bonuses or the map centre.
pub fn decide(world: &World, config: &EngineConfig) -> Decision {
    let me = &world.me;
    if !me.is_alive() {
        return Decision {
            mv: Move::none(),
            drive: Drive::Idle,
            aim: None,
            evasion: None,
            goal: None,
        };
    }

    let aim = select_target(world, &config.physics).map(|t| aim_at(world, t, &config.physics));
    let mut mv = Move::none();
    if let Some(a) = &aim {
        mv.turret_turn = a.turret_turn;
        mv.fire = a.fire;
    }

    if let Some(evasion) = evade(world, config) {
        return Decision {
            mv: with_tracks(mv, evasion.best.tracks),
            drive: Drive::Evade,
            aim,
            evasion: Some(evasion.best),
            goal: None,
        };
    }

    if let Some(shell) = anticipated_shell(world, config) {
        if let Some(evasion) = evade_from(world, &[shell], config) {
            return Decision {
                mv: with_tracks(mv, evasion.best.tracks),
                drive: Drive::Anticipate,
                aim,
                evasion: Some(evasion.best),
                goal: None,
            };
        }
    }

    let cone = config.tactics.steering_cone;
    let (drive, goal) = match best_zone(world, config) {
        Some((zone, _)) => (Drive::Zone, zone.center),
        None => (Drive::Fallback, fallback_goal(world)),
    };
    debug!("tick {}: {:?} toward ({:.0}, {:.0})", world.tick, drive, goal.x, goal.y);
    Decision {
        mv: with_tracks(mv, steer_to(me, goal, cone)),
        drive,
        aim,
        evasion: None,
        goal: Some(goal),
    }
}

/// Full decision stack: aiming, evasion, positioning.
pub struct TacticalPolicy {
    config: EngineConfig,
}

impl TacticalPolicy {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl Default for TacticalPolicy {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Policy for TacticalPolicy {
    fn name(&self) -> &str {
        "tactical"
    }

    fn act(&mut self, world: &World) -> Move {
        decide(world, &self.config).mv
    }
}
