//! Bounded position history for trail rendering

use std::collections::VecDeque;

use glam::Vec2;

/// Maximum number of trail points to store
pub const TRAIL_CAPACITY: usize = 1000;

/// Ring buffer of recent ball positions, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: VecDeque<Vec2>,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

impl Trail {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }

    /// Record a position, evicting the oldest once full
    pub fn push(&mut self, pos: Vec2) {
        if self.points.len() == TRAIL_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Vec2> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
