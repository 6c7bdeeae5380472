//! Game state and core simulation types
//!
//! `GameState` is the single context object for a round. The frame loop owns
//! it and passes it to [`super::tick`] once per tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Arena, ContactKind, point_in_reach};
use super::obstacle::{MAX_PLACEMENT_ATTEMPTS, Obstacle, Rect, place_obstacle};
use super::trail::Trail;
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::launch_angle_degrees;
use crate::settings::Settings;

/// Current phase of a launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball at rest, waiting for a launch
    Idle,
    /// Ball flying and bouncing
    InFlight,
}

/// The projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Screen-space position (y down)
    pub pos: Vec2,
    pub radius: f32,
    /// Where the current flight segment started
    pub segment_origin: Vec2,
    /// Velocity at the start of the current segment (y up)
    pub initial_vel: Vec2,
    /// Current velocity (y up)
    pub vel: Vec2,
    /// Simulated time since the segment started
    pub elapsed: f32,
    /// Downward acceleration magnitude
    pub gravity: f32,
    /// Coefficient of restitution
    pub restitution: f32,
    pub trail: Trail,
}

impl Particle {
    pub fn new(pos: Vec2, settings: &Settings) -> Self {
        Self {
            pos,
            radius: settings.ball_radius,
            segment_origin: pos,
            initial_vel: Vec2::ZERO,
            vel: Vec2::ZERO,
            elapsed: 0.0,
            gravity: settings.gravity,
            restitution: settings.restitution,
            trail: Trail::new(),
        }
    }

    /// Start a new flight segment at `origin` using the current initial velocity
    pub fn begin_segment(&mut self, origin: Vec2) {
        self.segment_origin = origin;
        self.pos = origin;
        self.vel = self.initial_vel;
        self.elapsed = 0.0;
    }

    /// Stop dead at `pos`
    pub fn rest_at(&mut self, pos: Vec2) {
        self.initial_vel = Vec2::ZERO;
        self.begin_segment(pos);
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A collectible target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub pos: Vec2,
    pub collected: bool,
}

impl Point {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            collected: false,
        }
    }

    /// Mark collected if the ball reaches it. True only on the first hit.
    pub fn collect(&mut self, ball_pos: Vec2, radius: f32) -> bool {
        if self.collected || !point_in_reach(self.pos, ball_pos, radius) {
            return false;
        }
        self.collected = true;
        true
    }
}

/// Things that happened during a tick, for the UI layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Launched {
        initial_vel: Vec2,
        max_bounces: u32,
        /// Horizontal aim: bounce budget fell back to one
        degenerate: bool,
    },
    Bounced(ContactKind),
    PointCollected { pos: Vec2 },
    CameToRest { pos: Vec2 },
    RoundReset { round: u32 },
}

/// Result of a launch request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaunchOutcome {
    Flight {
        initial_vel: Vec2,
        max_bounces: u32,
        degenerate: bool,
    },
    /// Launch budget was already spent; the round was reset instead
    RoundOver,
}

/// Read-only view of the state for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub particle_pos: Vec2,
    pub particle_radius: f32,
    /// Velocity components (y up)
    pub velocity: Vec2,
    pub speed: f32,
    /// Oldest first
    pub trail: Vec<Vec2>,
    pub obstacles: Vec<Rect>,
    pub points: Vec<Vec2>,
    pub score: u64,
    pub launches_remaining: i32,
    pub display_bounces: u32,
    pub launch_angle: f32,
    pub show_trail: bool,
    pub show_velocity: bool,
}

/// Number of floor/ceiling contacts a launch gets before the ball rests
///
/// `log_e(1 / |uy|)` rounded up, at least one. With no restitution or no
/// vertical launch speed the logarithm is undefined and the budget is one.
pub fn max_bounces(initial_vy: f32, restitution: f32) -> u32 {
    if restitution <= 0.0 || initial_vy == 0.0 {
        return 1;
    }
    let budget = (1.0 / initial_vy.abs()).log(restitution);
    if !budget.is_finite() {
        return 1;
    }
    budget.ceil().max(1.0) as u32
}

/// Launch velocity for an aim target, both in screen space
///
/// Returned velocity is y up.
pub fn launch_velocity(from: Vec2, aim: Vec2) -> Vec2 {
    Vec2::new(
        (aim.x - from.x) / LAUNCH_DRAG_SCALE,
        (from.y - aim.y) / LAUNCH_DRAG_SCALE,
    )
}

/// Per-round RNG seed
fn round_seed(seed: u64, round: u32) -> u64 {
    (round as u64).wrapping_mul(2654435761).wrapping_add(seed)
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Settings for the current round
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Rounds started so far, including the current one
    pub round: u32,
    rng: Pcg32,
    pub arena: Arena,
    pub particle: Particle,
    pub obstacles: Vec<Obstacle>,
    pub points: Vec<Point>,
    pub phase: GamePhase,
    /// Floor/ceiling contacts this flight (ends the flight)
    pub vertical_bounces: u32,
    /// All contacts this flight (display only)
    pub display_bounces: u32,
    pub max_bounces: u32,
    pub launches_remaining: i32,
    pub score: u64,
    /// Last known aim target (screen space)
    pub aim: Vec2,
    /// Degrees; follows the aim while idle, frozen in flight
    pub launch_angle: f32,
    /// Ticks spent in the current flight
    pub flight_ticks: u32,
    /// Consecutive ticks with at least one contact
    pub contact_streak: u32,
    /// Last floor/ceiling contact this flight was the ceiling
    pub ceiling_contact: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game with validated settings
    pub fn new(seed: u64, settings: Settings) -> SimResult<Self> {
        settings.validate()?;

        let arena = Arena::new(settings.arena_width, settings.arena_height);
        let spawn = arena.center();
        let mut state = Self {
            particle: Particle::new(spawn, &settings),
            settings,
            seed,
            round: 0,
            rng: Pcg32::seed_from_u64(round_seed(seed, 0)),
            arena,
            obstacles: Vec::new(),
            points: Vec::new(),
            phase: GamePhase::Idle,
            vertical_bounces: 0,
            display_bounces: 0,
            max_bounces: 0,
            launches_remaining: 0,
            score: 0,
            aim: spawn,
            launch_angle: 0.0,
            flight_ticks: 0,
            contact_streak: 0,
            ceiling_contact: false,
            time_ticks: 0,
            events: Vec::new(),
        };

        state.start_round();
        Ok(state)
    }

    /// Replace the settings and start a fresh round with them
    pub fn apply_settings(&mut self, settings: Settings) -> SimResult<()> {
        settings.validate()?;
        self.settings = settings;
        self.reset();
        Ok(())
    }

    /// Full reset: new layout, points, budgets and score
    ///
    /// Safe in any phase; in-flight state is discarded.
    pub fn reset(&mut self) {
        if self.phase == GamePhase::InFlight {
            log::info!("Reset during flight, discarding flight state");
        }
        self.round = self.round.wrapping_add(1);
        self.start_round();
        // Events from the discarded round are stale
        self.events.clear();
        self.events.push(GameEvent::RoundReset { round: self.round });
    }

    fn start_round(&mut self) {
        self.rng = Pcg32::seed_from_u64(round_seed(self.seed, self.round));
        self.arena = Arena::new(self.settings.arena_width, self.settings.arena_height);

        let spawn = self.arena.center();
        self.particle = Particle::new(spawn, &self.settings);
        self.phase = GamePhase::Idle;
        self.vertical_bounces = 0;
        self.display_bounces = 0;
        self.max_bounces = 0;
        self.launches_remaining = self.settings.launches_per_round as i32;
        self.score = 0;
        self.aim = spawn;
        self.launch_angle = 0.0;
        self.flight_ticks = 0;
        self.contact_streak = 0;
        self.ceiling_contact = false;

        self.obstacles = self.generate_obstacles();
        self.points.clear();
        for _ in 0..self.settings.points_per_round {
            if let Some(point) = self.spawn_point() {
                self.points.push(point);
            }
        }

        log::info!(
            "Round {}: {} obstacles, {} points, e={}, r={}, g={}",
            self.round,
            self.obstacles.len(),
            self.points.len(),
            self.settings.restitution,
            self.settings.ball_radius,
            self.settings.gravity
        );
    }

    fn generate_obstacles(&mut self) -> Vec<Obstacle> {
        if !self.settings.obstacles_enabled {
            return Vec::new();
        }

        let spawn = self.arena.center();
        let radius = self.settings.ball_radius;
        let kinds = std::iter::repeat_n(false, self.settings.static_obstacles)
            .chain(std::iter::repeat_n(true, self.settings.moving_obstacles));

        let mut obstacles = Vec::new();
        for moving in kinds {
            match place_obstacle(&mut self.rng, &self.arena, spawn, radius, moving) {
                Some(o) => obstacles.push(o),
                None => log::warn!("No room for obstacle (moving: {}), skipping", moving),
            }
        }
        obstacles
    }

    /// A new point away from obstacle bodies and the ball
    ///
    /// `None` if every draw within [`MAX_PLACEMENT_ATTEMPTS`] was blocked.
    fn spawn_point(&mut self) -> Option<Point> {
        let lo = Vec2::splat(POINT_MARGIN);
        let hi = Vec2::new(
            self.arena.width - POINT_MARGIN,
            self.arena.height - POINT_MARGIN,
        )
        .max(lo);

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let pos = Vec2::new(
                self.rng.random_range(lo.x..=hi.x),
                self.rng.random_range(lo.y..=hi.y),
            );
            let blocked = self.obstacles.iter().any(|o| o.rect.contains(pos))
                || point_in_reach(pos, self.particle.pos, self.particle.radius);
            if !blocked {
                return Some(Point::new(pos));
            }
        }
        log::warn!(
            "No free spot for a point after {} attempts, skipping",
            MAX_PLACEMENT_ATTEMPTS
        );
        None
    }

    /// Swap points collected on an earlier tick for fresh ones
    pub fn replace_collected_points(&mut self) {
        let collected = self.points.iter().filter(|p| p.collected).count();
        if collected == 0 {
            return;
        }
        self.points.retain(|p| !p.collected);
        for _ in 0..collected {
            if let Some(point) = self.spawn_point() {
                self.points.push(point);
            }
        }
    }

    /// Score every point the ball currently reaches
    pub fn collect_points(&mut self) {
        let pos = self.particle.pos;
        let radius = self.particle.radius;
        for point in &mut self.points {
            if point.collect(pos, radius) {
                self.score += 1;
                log::debug!("Point collected at {:?}, score {}", point.pos, self.score);
                self.events.push(GameEvent::PointCollected { pos: point.pos });
            }
        }
    }

    /// Launch toward `aim` (screen space)
    pub fn launch(&mut self, aim: Vec2) -> SimResult<LaunchOutcome> {
        if self.phase != GamePhase::Idle {
            return Err(SimError::NotIdle);
        }

        self.launches_remaining -= 1;
        if self.launches_remaining < 0 {
            log::info!("Round {} over with score {}", self.round, self.score);
            self.reset();
            return Ok(LaunchOutcome::RoundOver);
        }

        let from = self.particle.pos;
        let initial_vel = launch_velocity(from, aim);
        let degenerate = initial_vel.y == 0.0;
        if degenerate {
            log::warn!("Horizontal launch, bounce budget falls back to 1");
        }

        self.aim = aim;
        self.launch_angle = launch_angle_degrees(from, aim);
        self.max_bounces = max_bounces(initial_vel.y, self.particle.restitution);
        self.vertical_bounces = 0;
        self.display_bounces = 0;
        self.flight_ticks = 0;
        self.contact_streak = 0;
        self.ceiling_contact = false;
        self.particle.initial_vel = initial_vel;
        self.particle.begin_segment(from);
        self.phase = GamePhase::InFlight;

        log::info!(
            "Launch at {:.1} deg, u={:?}, max bounces {}, {} launches left",
            self.launch_angle,
            initial_vel,
            self.max_bounces,
            self.launches_remaining
        );
        self.events.push(GameEvent::Launched {
            initial_vel,
            max_bounces: self.max_bounces,
            degenerate,
        });

        Ok(LaunchOutcome::Flight {
            initial_vel,
            max_bounces: self.max_bounces,
            degenerate,
        })
    }

    /// End the flight: zero velocity, pinned to the last segment origin and
    /// lifted off the floor contact
    ///
    /// A flight that ended on the ceiling drops to the floor below it. The
    /// spot is then moved sideways out of every obstacle's sweep, so moving
    /// obstacles never cover the idle ball.
    pub fn come_to_rest(&mut self) {
        let floor_rest = self.arena.height - self.particle.radius - REST_NUDGE;
        let origin = self.particle.segment_origin;
        let y = if self.ceiling_contact {
            floor_rest
        } else {
            origin.y.min(floor_rest)
        };
        let pos = self.clear_of_obstacles(Vec2::new(origin.x, y));

        self.particle.rest_at(pos);
        self.phase = GamePhase::Idle;
        log::debug!(
            "Ball at rest at {:?} after {} bounces ({} vertical)",
            pos,
            self.display_bounces,
            self.vertical_bounces
        );
        self.events.push(GameEvent::CameToRest { pos });
    }

    /// Nearest spot at the same height that no obstacle can ever reach
    fn clear_of_obstacles(&self, pos: Vec2) -> Vec2 {
        let radius = self.particle.radius;
        let sweeps: Vec<Rect> = self.obstacles.iter().map(Obstacle::sweep_rect).collect();
        let blocked = |x: f32| {
            sweeps
                .iter()
                .any(|r| r.overlaps_circle(Vec2::new(x, pos.y), radius))
        };
        if !blocked(pos.x) {
            return pos;
        }

        let (min_x, max_x) = (radius, self.arena.width - radius);
        let nearest = sweeps
            .iter()
            .flat_map(|r| [r.left() - radius - REST_NUDGE, r.right() + radius + REST_NUDGE])
            .filter(|x| (min_x..=max_x).contains(x) && !blocked(*x))
            .min_by(|a, b| (a - pos.x).abs().total_cmp(&(b - pos.x).abs()));

        match nearest {
            Some(x) => Vec2::new(x, pos.y),
            None => {
                log::warn!("No obstacle-free rest spot at y={:.1}, keeping {:?}", pos.y, pos);
                pos
            }
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            particle_pos: self.particle.pos,
            particle_radius: self.particle.radius,
            velocity: self.particle.vel,
            speed: self.particle.speed(),
            trail: self.particle.trail.iter().copied().collect(),
            obstacles: self.obstacles.iter().map(|o| o.rect).collect(),
            points: self
                .points
                .iter()
                .filter(|p| !p.collected)
                .map(|p| p.pos)
                .collect(),
            score: self.score,
            launches_remaining: self.launches_remaining,
            display_bounces: self.display_bounces,
            launch_angle: self.launch_angle,
            show_trail: self.settings.show_trail,
            show_velocity: self.settings.show_velocity,
        }
    }
}
