//! Rectangular obstacles
//!
//! Every obstacle is a wall segment of fixed width whose top edge sits at a
//! random height and which extends down to the arena floor. Moving obstacles
//! slide back and forth horizontally around their starting x.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Arena;
use crate::consts::*;

/// Rejection sampling gives up after this many tries
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 64;

/// Axis-aligned rectangle in screen space (y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// True if a circle overlaps the rectangle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = Vec2::new(
            center.x.clamp(self.left(), self.right()),
            center.y.clamp(self.top(), self.bottom()),
        );
        center.distance_squared(closest) < radius * radius
    }
}

/// How an obstacle moves over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleMotion {
    Static,
    /// Triangle-wave horizontal motion around `initial_x`
    Moving {
        initial_x: f32,
        /// Pixels per simulated second
        speed: f32,
        /// Maximum displacement from `initial_x` in either direction
        range: f32,
        /// +1.0 or -1.0
        direction: f32,
    },
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub motion: ObstacleMotion,
}

impl Obstacle {
    /// A static wall segment with its top at `top`, reaching the arena floor
    pub fn fixed(x: f32, top: f32, arena: &Arena) -> Self {
        Self {
            rect: Rect::new(x, top, OBSTACLE_WIDTH, arena.height - top),
            motion: ObstacleMotion::Static,
        }
    }

    pub fn moving(x: f32, top: f32, arena: &Arena, speed: f32, range: f32) -> Self {
        Self {
            rect: Rect::new(x, top, OBSTACLE_WIDTH, arena.height - top),
            motion: ObstacleMotion::Moving {
                initial_x: x,
                speed,
                range,
                direction: 1.0,
            },
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.motion, ObstacleMotion::Moving { .. })
    }

    /// Advance the obstacle by dt (no-op when static)
    pub fn update(&mut self, dt: f32) {
        if let ObstacleMotion::Moving {
            initial_x,
            speed,
            range,
            direction,
        } = &mut self.motion
        {
            self.rect.x += *speed * *direction * dt;

            let offset = self.rect.x - *initial_x;
            if offset >= *range {
                *direction = -1.0;
            } else if offset <= -*range {
                *direction = 1.0;
            }
        }
    }

    /// Every area the obstacle can ever cover
    pub fn sweep_rect(&self) -> Rect {
        match self.motion {
            ObstacleMotion::Static => self.rect,
            ObstacleMotion::Moving {
                initial_x,
                speed,
                range,
                ..
            } => {
                // One second of travel covers the overshoot past the turn point
                let reach = range + speed;
                Rect::new(
                    initial_x - reach,
                    self.rect.y,
                    self.rect.width + 2.0 * reach,
                    self.rect.height,
                )
            }
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo { lo } else { rng.random_range(lo..=hi) }
}

/// Place an obstacle that can never overlap the ball's spawn circle
///
/// `radius` is the ball radius. Obstacles also keep a gap to the side walls
/// wide enough for the ball to pass. Returns `None` if no placement was found
/// within [`MAX_PLACEMENT_ATTEMPTS`].
pub fn place_obstacle<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    spawn: Vec2,
    radius: f32,
    moving: bool,
) -> Option<Obstacle> {
    let clearance = radius * 2.0;
    let wall_gap = radius * 3.0;
    let max_top = (arena.height - OBSTACLE_MIN_HEIGHT).max(0.0);

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let top = sample(rng, 0.0, max_top);

        let obstacle = if moving {
            let speed = rng.random_range(1..=5) as f32 * 2.0;
            let free = arena.width - OBSTACLE_WIDTH - 2.0 * wall_gap;
            let max_range = (free / 2.0 - speed).min(400.0);
            if max_range <= 0.0 {
                return None;
            }
            let range = sample(rng, 100.0_f32.min(max_range), max_range);
            let lo = wall_gap + range + speed;
            let hi = arena.width - OBSTACLE_WIDTH - wall_gap - range - speed;
            Obstacle::moving(sample(rng, lo, hi), top, arena, speed, range)
        } else {
            let hi = arena.width - OBSTACLE_WIDTH - wall_gap;
            if hi < wall_gap {
                return None;
            }
            Obstacle::fixed(sample(rng, wall_gap, hi), top, arena)
        };

        if !obstacle.sweep_rect().overlaps_circle(spawn, clearance) {
            return Some(obstacle);
        }
    }

    None
}
