//! Round settings
//!
//! Collected by the menu before a round starts and applied only at round
//! start. A running round keeps its own copy.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// Slider range for the coefficient of restitution
pub const RESTITUTION_RANGE: RangeInclusive<f32> = 0.0..=0.9;
/// Slider range for the ball radius
pub const BALL_RADIUS_RANGE: RangeInclusive<f32> = 10.0..=50.0;
/// Slider range for the gravity magnitude
pub const GRAVITY_RANGE: RangeInclusive<f32> = 0.0..=50.0;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Physics ===
    /// Fraction of velocity kept after each bounce, in [0, 1)
    pub restitution: f32,
    /// Ball radius in pixels
    pub ball_radius: f32,
    /// Downward acceleration magnitude
    pub gravity: f32,

    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Generate obstacles for the round
    pub obstacles_enabled: bool,
    pub static_obstacles: usize,
    pub moving_obstacles: usize,

    // === Round ===
    pub launches_per_round: u32,
    pub points_per_round: usize,

    // === Display ===
    /// Ball trail (trail is recorded either way)
    pub show_trail: bool,
    /// Velocity component arrows
    pub show_velocity: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            restitution: RESTITUTION,
            ball_radius: BALL_RADIUS,
            gravity: GRAVITY,

            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            obstacles_enabled: true,
            static_obstacles: STATIC_OBSTACLES,
            moving_obstacles: MOVING_OBSTACLES,

            launches_per_round: LAUNCHES_PER_ROUND,
            points_per_round: POINTS_PER_ROUND,

            show_trail: true,
            show_velocity: false,
        }
    }
}

impl Settings {
    /// Check the hard invariants a round relies on
    pub fn validate(&self) -> SimResult<()> {
        if !(0.0..1.0).contains(&self.restitution) {
            return Err(SimError::InvalidConfiguration {
                name: "restitution",
                value: self.restitution,
                valid_range: "[0.0, 1.0)",
            });
        }
        if !self.ball_radius.is_finite() || self.ball_radius <= 0.0 {
            return Err(SimError::InvalidConfiguration {
                name: "ball_radius",
                value: self.ball_radius,
                valid_range: "(0.0, inf)",
            });
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(SimError::InvalidConfiguration {
                name: "gravity",
                value: self.gravity,
                valid_range: "[0.0, inf)",
            });
        }
        // Ball must fit with room to spare on both axes
        let min_side = 4.0 * self.ball_radius;
        if !self.arena_width.is_finite() || self.arena_width <= min_side {
            return Err(SimError::InvalidConfiguration {
                name: "arena_width",
                value: self.arena_width,
                valid_range: "(4 * ball_radius, inf)",
            });
        }
        if !self.arena_height.is_finite() || self.arena_height <= min_side {
            return Err(SimError::InvalidConfiguration {
                name: "arena_height",
                value: self.arena_height,
                valid_range: "(4 * ball_radius, inf)",
            });
        }
        Ok(())
    }

    /// Snap physics values into the menu slider ranges
    pub fn clamped_to_ui(mut self) -> Self {
        self.restitution = self
            .restitution
            .clamp(*RESTITUTION_RANGE.start(), *RESTITUTION_RANGE.end());
        self.ball_radius = self
            .ball_radius
            .clamp(*BALL_RADIUS_RANGE.start(), *BALL_RADIUS_RANGE.end());
        self.gravity = self
            .gravity
            .clamp(*GRAVITY_RANGE.start(), *GRAVITY_RANGE.end());
        self
    }

    /// Parse and validate settings from JSON. Missing keys use defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }
}
