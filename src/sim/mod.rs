//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod bounce;
pub mod collision;
pub mod kinematics;
pub mod obstacle;
pub mod state;
pub mod tick;
pub mod trail;

pub use bounce::{rebound_velocity, resolve};
pub use collision::{
    Arena, BounceAxis, Contact, ContactKind, Contacts, ObstacleSide, detect, detect_obstacle,
    detect_walls, point_in_reach,
};
pub use kinematics::{Motion, advance};
pub use obstacle::{Obstacle, ObstacleMotion, Rect, place_obstacle};
pub use state::{
    GameEvent, GamePhase, GameState, LaunchOutcome, Particle, Point, Snapshot, launch_velocity,
    max_bounces,
};
pub use tick::{TickInput, tick};
pub use trail::{TRAIL_CAPACITY, Trail};
