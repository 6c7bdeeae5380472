//! Collision detection against the arena walls and obstacles
//!
//! Detection works on the ball's current position and velocity and reports at
//! most one contact per bounce axis. A ball wedged in a corner produces both a
//! horizontal and a vertical contact in the same tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::{Obstacle, Rect};

/// Overlap below this depth is treated as touching, not penetrating
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Arena bounds, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Which velocity component a bounce reverses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BounceAxis {
    /// Side walls and obstacles: x reverses
    Horizontal,
    /// Floor and ceiling: y reverses
    Vertical,
}

/// Obstacle face the ball was pushed back out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    LeftWall,
    RightWall,
    TopWall,
    BottomWall,
    Obstacle { index: usize, side: ObstacleSide },
}

impl ContactKind {
    pub fn axis(&self) -> BounceAxis {
        match self {
            ContactKind::TopWall | ContactKind::BottomWall => BounceAxis::Vertical,
            ContactKind::LeftWall | ContactKind::RightWall | ContactKind::Obstacle { .. } => {
                BounceAxis::Horizontal
            }
        }
    }
}

/// A detected contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub kind: ContactKind,
    /// Screen coordinate of the touched surface on the bounce axis
    pub boundary: f32,
    /// Screen-space direction (+1 or -1) pointing from the surface into free space
    pub outward: f32,
}

/// Contacts found in one tick, at most one per axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contacts {
    pub horizontal: Option<Contact>,
    pub vertical: Option<Contact>,
}

impl Contacts {
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }

    /// Horizontal first, then vertical
    pub fn iter(&self) -> impl Iterator<Item = Contact> {
        self.horizontal.into_iter().chain(self.vertical)
    }
}

/// Check the ball against the four arena walls
///
/// `vel` is in physics space (y up). A wall only counts while the ball is
/// moving into it, so a ball clamped onto a wall does not bounce again.
pub fn detect_walls(pos: Vec2, vel: Vec2, radius: f32, arena: &Arena) -> Contacts {
    let horizontal = if pos.x <= radius && vel.x < 0.0 {
        Some(Contact {
            kind: ContactKind::LeftWall,
            boundary: 0.0,
            outward: 1.0,
        })
    } else if pos.x >= arena.width - radius && vel.x > 0.0 {
        Some(Contact {
            kind: ContactKind::RightWall,
            boundary: arena.width,
            outward: -1.0,
        })
    } else {
        None
    };

    // Screen y grows downward, so moving up means vel.y > 0
    let vertical = if pos.y <= radius && vel.y > 0.0 {
        Some(Contact {
            kind: ContactKind::TopWall,
            boundary: 0.0,
            outward: 1.0,
        })
    } else if pos.y >= arena.height - radius && vel.y < 0.0 {
        Some(Contact {
            kind: ContactKind::BottomWall,
            boundary: arena.height,
            outward: -1.0,
        })
    } else {
        None
    };

    Contacts {
        horizontal,
        vertical,
    }
}

/// Check the ball against one wall-segment obstacle
///
/// Contact when the ball's horizontal extent overlaps the obstacle and its
/// center is below the obstacle top. Landing on top is resolved as a side hit.
pub fn detect_obstacle(pos: Vec2, vel: Vec2, radius: f32, index: usize, rect: &Rect) -> Option<Contact> {
    let overlaps = pos.x + radius > rect.left() + CONTACT_EPSILON
        && pos.x - radius < rect.right() - CONTACT_EPSILON;
    if !overlaps || pos.y <= rect.top() {
        return None;
    }

    let side = if pos.x < rect.left() {
        ObstacleSide::Left
    } else if pos.x > rect.right() {
        ObstacleSide::Right
    } else if vel.x > 0.0 {
        ObstacleSide::Left
    } else if vel.x < 0.0 {
        ObstacleSide::Right
    } else if pos.x < rect.center_x() {
        ObstacleSide::Left
    } else {
        ObstacleSide::Right
    };

    // Ball already leaving through this face
    let approaching = match side {
        ObstacleSide::Left => vel.x >= 0.0,
        ObstacleSide::Right => vel.x <= 0.0,
    };
    if !approaching {
        return None;
    }

    let (boundary, outward) = match side {
        ObstacleSide::Left => (rect.left(), -1.0),
        ObstacleSide::Right => (rect.right(), 1.0),
    };

    Some(Contact {
        kind: ContactKind::Obstacle { index, side },
        boundary,
        outward,
    })
}

/// Full per-tick detection: walls, then obstacles in order
pub fn detect(pos: Vec2, vel: Vec2, radius: f32, arena: &Arena, obstacles: &[Obstacle]) -> Contacts {
    let mut contacts = detect_walls(pos, vel, radius, arena);

    if contacts.horizontal.is_none() {
        contacts.horizontal = obstacles
            .iter()
            .enumerate()
            .find_map(|(i, o)| detect_obstacle(pos, vel, radius, i, &o.rect));
    }

    contacts
}

/// Axis-aligned proximity test between a ball and a collectible point
#[inline]
pub fn point_in_reach(point: Vec2, ball_pos: Vec2, radius: f32) -> bool {
    (point.x - ball_pos.x).abs() <= radius && (point.y - ball_pos.y).abs() <= radius
}
