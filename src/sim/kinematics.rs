//! Constant-acceleration (SUVAT) kinematics
//!
//! Position is evaluated analytically from the start of the current flight
//! segment, so no error accumulates between ticks.

use glam::Vec2;

/// Position and velocity at some time into a flight segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Screen-space position (y down)
    pub pos: Vec2,
    /// Velocity (y up)
    pub vel: Vec2,
}

impl Motion {
    /// Overall speed, for display only
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Evaluate a flight segment at elapsed time `t`
///
/// `origin` is the screen-space segment start, `initial_vel` the velocity at
/// that start (y up) and `acceleration` the signed vertical acceleration
/// (negative pulls down).
///
/// At `t == 0` the origin and initial velocity are returned unchanged: a
/// segment that was just started by a bounce must not move before time
/// advances.
pub fn advance(origin: Vec2, initial_vel: Vec2, acceleration: f32, t: f32) -> Motion {
    if t == 0.0 {
        return Motion {
            pos: origin,
            vel: initial_vel,
        };
    }

    let sx = initial_vel.x * t;
    let sy = initial_vel.y * t + 0.5 * acceleration * t * t;

    Motion {
        // Up displacement subtracts in screen space
        pos: Vec2::new(origin.x + sx, origin.y - sy),
        vel: Vec2::new(initial_vel.x, initial_vel.y + acceleration * t),
    }
}
