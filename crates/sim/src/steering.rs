use glam::DVec2;
use std::f64::consts::{FRAC_PI_2, PI};
use tankbot_shared::Tank;

use crate::predict::Tracks;

/// Track powers that bring `me` toward `goal`.
///
/// Inside `cone` of the nose or the tail the tank drives straight (forward or
/// in reverse); otherwise it pivots toward whichever end is closer.
pub fn steer_to(me: &Tank, goal: DVec2, cone: f64) -> Tracks {
    let angle = me.angle_to(goal);
    if angle.abs() < cone {
        Tracks::new(1.0, 1.0)
    } else if angle.abs() > PI - cone {
        Tracks::new(-1.0, -1.0)
    } else if angle > 0.0 && angle <= FRAC_PI_2 {
        Tracks::new(1.0, -1.0)
    } else if angle < 0.0 && angle >= -FRAC_PI_2 {
        Tracks::new(-1.0, 1.0)
    } else if angle > FRAC_PI_2 {
        Tracks::new(-1.0, 1.0)
    } else {
        Tracks::new(1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::advance_tank;
    use std::f64::consts::FRAC_PI_6;
    use tankbot_shared::PhysicsConfig;

    fn me() -> Tank {
        Tank::medium(0, DVec2::new(400.0, 400.0), 0.0)
    }

    #[test]
    fn test_straight_ahead_and_behind() {
        assert_eq!(steer_to(&me(), DVec2::new(600.0, 420.0), FRAC_PI_6), Tracks::new(1.0, 1.0));
        assert_eq!(steer_to(&me(), DVec2::new(200.0, 380.0), FRAC_PI_6), Tracks::new(-1.0, -1.0));
    }

    #[test]
    fn test_pivots_toward_goal() {
        let physics = PhysicsConfig::default();
        for goal in [
            DVec2::new(450.0, 600.0),
            DVec2::new(450.0, 200.0),
            DVec2::new(350.0, 600.0),
            DVec2::new(350.0, 200.0),
        ] {
            let tank = me();
            let before = tank.angle_to(goal).abs();
            let before = before.min(PI - before);
            let tracks = steer_to(&tank, goal, FRAC_PI_6);
            assert_eq!(tracks.left, -tracks.right);
            let turned = advance_tank(&tank, tracks, 20, &physics);
            let after = turned.angle_to(goal).abs();
            let after = after.min(PI - after);
            assert!(after < before, "goal {:?}: {} -> {}", goal, before, after);
        }
    }
}
