//! Bounce Sim - a projectile-motion bounce mini-game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, bounces, game state)
//! - `settings`: Round configuration (restitution, ball size, gravity)
//! - `error`: Error taxonomy for configuration and launch failures

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulated time added per tick
    pub const SIM_DT: f32 = 0.05;
    /// Target tick rate of the frame loop
    pub const TICK_RATE_HZ: u32 = 400;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 1440.0;
    pub const ARENA_HEIGHT: f32 = 800.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const RESTITUTION: f32 = 0.7;
    pub const GRAVITY: f32 = 9.81;

    /// Aim drag distance is divided by this to get launch velocity
    pub const LAUNCH_DRAG_SCALE: f32 = 5.0;

    /// Round defaults
    pub const LAUNCHES_PER_ROUND: u32 = 10;
    pub const POINTS_PER_ROUND: usize = 10;
    pub const STATIC_OBSTACLES: usize = 2;
    pub const MOVING_OBSTACLES: usize = 1;

    /// Collectible points keep this far from the arena edges
    pub const POINT_MARGIN: f32 = 10.0;

    /// Obstacle geometry
    pub const OBSTACLE_WIDTH: f32 = 50.0;
    /// Lowest allowed obstacle top, measured up from the floor
    pub const OBSTACLE_MIN_HEIGHT: f32 = 50.0;

    /// Resting ball sits this far above the floor contact
    pub const REST_NUDGE: f32 = 1.0;

    /// Hard cap on ticks in one flight (a flight with no vertical motion
    /// and no gravity never reaches its bounce budget)
    pub const MAX_FLIGHT_TICKS: u32 = 200_000;
    /// A ball in contact on this many consecutive ticks is wedged and rests
    pub const WEDGED_CONTACT_TICKS: u32 = 32;
}

/// Launch angle in degrees, [0, 360), counter-clockwise from +x with y up.
///
/// `from` and `to` are screen-space points (y grows downward).
#[inline]
pub fn launch_angle_degrees(from: Vec2, to: Vec2) -> f32 {
    let dx = to.x - from.x;
    let dy = from.y - to.y; // Negate Y (screen coords are flipped)
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let degrees = dy.atan2(dx).to_degrees();
    let wrapped = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
