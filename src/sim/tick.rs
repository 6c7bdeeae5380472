//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::bounce::resolve;
use super::collision::{BounceAxis, ContactKind, detect};
use super::kinematics::advance;
use super::state::{GameEvent, GamePhase, GameState, LaunchOutcome};
use crate::consts::*;
use crate::launch_angle_degrees;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in screen space (aim target)
    pub aim: Option<glam::Vec2>,
    /// Launch toward the aim (pointer down while idle)
    pub launch: bool,
    /// Full round reset, honoured in any phase
    pub reset: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.reset {
        state.reset();
        return;
    }

    state.time_ticks += 1;

    if let Some(aim) = input.aim {
        state.aim = aim;
    }
    if state.phase == GamePhase::Idle {
        state.launch_angle = launch_angle_degrees(state.particle.pos, state.aim);
    }

    // Points hit last tick are replaced one tick later
    state.replace_collected_points();

    // Obstacles move whether or not the ball is flying
    for obstacle in &mut state.obstacles {
        obstacle.update(dt);
    }

    if input.launch && state.phase == GamePhase::Idle {
        let aim = state.aim;
        match state.launch(aim) {
            Ok(LaunchOutcome::RoundOver) => return,
            Ok(LaunchOutcome::Flight { .. }) => {}
            Err(e) => log::debug!("Launch ignored: {}", e),
        }
    }

    if state.phase == GamePhase::InFlight {
        step_flight(state, dt);
    }

    state.collect_points();

    if state.phase == GamePhase::InFlight {
        if state.vertical_bounces >= state.max_bounces {
            state.come_to_rest();
        } else if state.contact_streak >= WEDGED_CONTACT_TICKS {
            log::warn!(
                "Ball wedged after {} contact ticks, forcing rest",
                state.contact_streak
            );
            state.come_to_rest();
        } else if state.flight_ticks >= MAX_FLIGHT_TICKS {
            log::warn!(
                "Flight hit the {} tick cap with {}/{} vertical bounces",
                MAX_FLIGHT_TICKS,
                state.vertical_bounces,
                state.max_bounces
            );
            state.come_to_rest();
        }
    }
}

/// Detect, bounce, then integrate the ball one step
fn step_flight(state: &mut GameState, dt: f32) {
    state.flight_ticks += 1;
    state.particle.elapsed += dt;

    let contacts = detect(
        state.particle.pos,
        state.particle.vel,
        state.particle.radius,
        &state.arena,
        &state.obstacles,
    );

    if contacts.is_empty() {
        state.contact_streak = 0;
    } else {
        state.contact_streak += 1;
    }

    for contact in contacts.iter() {
        let origin = resolve(&mut state.particle, &contact);
        state.display_bounces += 1;
        if contact.kind.axis() == BounceAxis::Vertical {
            state.vertical_bounces += 1;
            state.ceiling_contact = contact.kind == ContactKind::TopWall;
        }
        log::debug!(
            "Bounce {:?} at {:?}, u={:?} ({}/{} vertical)",
            contact.kind,
            origin,
            state.particle.initial_vel,
            state.vertical_bounces,
            state.max_bounces
        );
        state.push_event(GameEvent::Bounced(contact.kind));
    }

    let particle = &mut state.particle;
    let motion = advance(
        particle.segment_origin,
        particle.initial_vel,
        -particle.gravity,
        particle.elapsed,
    );
    particle.pos = motion.pos;
    particle.vel = motion.vel;
    particle.trail.push(particle.pos);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::trail::TRAIL_CAPACITY;
    use glam::Vec2;
    use proptest::prelude::*;

    fn open_arena(settings: Settings) -> GameState {
        GameState::new(
            12345,
            Settings {
                obstacles_enabled: false,
                points_per_round: 0,
                ..settings
            },
        )
        .unwrap()
    }

    fn launch_input(aim: Vec2) -> TickInput {
        TickInput {
            aim: Some(aim),
            launch: true,
            ..Default::default()
        }
    }

    /// Tick until idle, returning the number of ticks taken
    fn run_until_idle(state: &mut GameState, limit: u32) -> Option<u32> {
        for i in 1..=limit {
            tick(state, &TickInput::default(), SIM_DT);
            if state.phase == GamePhase::Idle {
                return Some(i);
            }
        }
        None
    }

    #[test]
    fn test_tick_idle_to_in_flight() {
        let mut state = open_arena(Settings::default());
        assert_eq!(state.phase, GamePhase::Idle);

        // Tick without launch - should stay idle
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Idle);

        let start = state.particle.pos;
        tick(&mut state, &launch_input(start + Vec2::new(40.0, -60.0)), SIM_DT);
        assert_eq!(state.phase, GamePhase::InFlight);
        assert_ne!(state.particle.pos, start);
        assert_eq!(state.particle.trail.len(), 1);
    }

    #[test]
    fn test_aim_updates_angle_only_while_idle() {
        let mut state = open_arena(Settings::default());
        let start = state.particle.pos;
        let aim_up = TickInput {
            aim: Some(start + Vec2::new(0.0, -100.0)),
            ..Default::default()
        };
        tick(&mut state, &aim_up, SIM_DT);
        assert!((state.launch_angle - 90.0).abs() < 1e-4);

        tick(&mut state, &launch_input(start + Vec2::new(100.0, -100.0)), SIM_DT);
        let frozen = state.launch_angle;
        assert!((frozen - 45.0).abs() < 1e-4);

        let aim_left = TickInput {
            aim: Some(start + Vec2::new(-100.0, 0.0)),
            ..Default::default()
        };
        tick(&mut state, &aim_left, SIM_DT);
        assert_eq!(state.launch_angle, frozen);
    }

    #[test]
    fn test_straight_up_launch_rests_after_budget() {
        let mut state = open_arena(Settings::default());
        let start = state.particle.pos;
        tick(&mut state, &launch_input(start + Vec2::new(0.0, -50.0)), SIM_DT);
        assert_eq!(state.max_bounces, 7);

        let ticks = run_until_idle(&mut state, 100_000);
        assert!(ticks.is_some());
        assert_eq!(state.vertical_bounces, 7);
        assert_eq!(state.display_bounces, 7);
        assert_eq!(state.particle.vel, Vec2::ZERO);
        assert_eq!(state.particle.pos.x, start.x);
        assert_eq!(
            state.particle.pos.y,
            ARENA_HEIGHT - BALL_RADIUS - REST_NUDGE
        );
    }

    #[test]
    fn test_wall_bounce_counts_for_display_only() {
        let mut state = open_arena(Settings::default());
        state.particle.pos = Vec2::new(5.0, 400.0);
        state.particle.segment_origin = state.particle.pos;
        state.particle.initial_vel = Vec2::new(-3.0, 20.0);
        state.particle.vel = Vec2::new(-3.0, 20.0);
        state.max_bounces = 5;
        state.phase = GamePhase::InFlight;

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.display_bounces, 1);
        assert_eq!(state.vertical_bounces, 0);
        assert!((state.particle.initial_vel.x - 2.1).abs() < 1e-5);
        // Segment restarted from the clamped contact point
        assert_eq!(state.particle.segment_origin, Vec2::new(BALL_RADIUS, 400.0));
        assert_eq!(state.particle.pos, state.particle.segment_origin);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Bounced(ContactKind::LeftWall)));
    }

    #[test]
    fn test_corner_bounces_both_axes_in_one_tick() {
        let mut state = open_arena(Settings::default());
        state.particle.pos = Vec2::new(5.0, ARENA_HEIGHT - 5.0);
        state.particle.segment_origin = state.particle.pos;
        state.particle.initial_vel = Vec2::new(-4.0, -4.0);
        state.particle.vel = Vec2::new(-4.0, -4.0);
        state.max_bounces = 5;
        state.phase = GamePhase::InFlight;

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.display_bounces, 2);
        assert_eq!(state.vertical_bounces, 1);
        assert_eq!(
            state.particle.pos,
            Vec2::new(BALL_RADIUS, ARENA_HEIGHT - BALL_RADIUS)
        );
        assert!(state.particle.initial_vel.x > 0.0);
        assert!(state.particle.initial_vel.y > 0.0);
    }

    #[test]
    fn test_zero_restitution_rests_on_first_floor_hit() {
        let mut state = open_arena(Settings {
            restitution: 0.0,
            ..Default::default()
        });
        let start = state.particle.pos;
        tick(&mut state, &launch_input(start + Vec2::new(30.0, 20.0)), SIM_DT);
        assert_eq!(state.max_bounces, 1);
        assert!(run_until_idle(&mut state, 100_000).is_some());
        assert_eq!(state.vertical_bounces, 1);
    }

    #[test]
    fn test_zero_gravity_horizontal_launch_hits_flight_cap() {
        let mut state = open_arena(Settings {
            gravity: 0.0,
            ..Default::default()
        });
        let start = state.particle.pos;
        tick(&mut state, &launch_input(start + Vec2::new(200.0, 0.0)), SIM_DT);
        assert_eq!(state.max_bounces, 1);
        let ticks = run_until_idle(&mut state, MAX_FLIGHT_TICKS + 2);
        assert!(ticks.is_some());
        assert_eq!(state.vertical_bounces, 0);
        assert!(state.display_bounces > 0);
    }

    #[test]
    fn test_wedged_between_obstacles_comes_to_rest() {
        use crate::sim::obstacle::Obstacle;

        let mut state = open_arena(Settings::default());
        // Gap narrower than the ball
        state.obstacles = vec![
            Obstacle::fixed(300.0, 100.0, &state.arena),
            Obstacle::fixed(360.0, 100.0, &state.arena),
        ];
        state.particle.pos = Vec2::new(355.0, 400.0);
        state.particle.segment_origin = state.particle.pos;
        state.particle.initial_vel = Vec2::new(5.0, 0.0);
        state.particle.vel = Vec2::new(5.0, 0.0);
        state.max_bounces = 5;
        state.phase = GamePhase::InFlight;

        let ticks = run_until_idle(&mut state, 1000);
        assert_eq!(ticks, Some(WEDGED_CONTACT_TICKS));
        assert_eq!(state.vertical_bounces, 0);
        assert_eq!(state.display_bounces, WEDGED_CONTACT_TICKS);
        // Rests outside the gap, clear of both walls
        let ball = state.particle.pos;
        assert!(
            state
                .obstacles
                .iter()
                .all(|o| !o.rect.overlaps_circle(ball, BALL_RADIUS))
        );
    }

    #[test]
    fn test_flight_ending_on_ceiling_rests_on_floor() {
        let mut state = open_arena(Settings {
            gravity: 0.0,
            restitution: 0.5,
            ..Default::default()
        });
        let start = state.particle.pos;
        tick(&mut state, &launch_input(start + Vec2::new(0.0, -380.0)), SIM_DT);
        assert_eq!(state.max_bounces, 7);

        assert!(run_until_idle(&mut state, 100_000).is_some());
        // Odd bounce count: the last one was the ceiling
        assert_eq!(state.vertical_bounces, 7);
        assert!(state.ceiling_contact);
        assert_eq!(
            state.particle.pos,
            Vec2::new(start.x, ARENA_HEIGHT - BALL_RADIUS - REST_NUDGE)
        );
    }

    #[test]
    fn test_resting_ball_never_covered_by_obstacles() {
        for seed in 0..30 {
            let mut state = GameState::new(seed, Settings::default()).unwrap();
            let start = state.particle.pos;
            tick(&mut state, &launch_input(start + Vec2::new(150.0, -100.0)), SIM_DT);
            assert!(run_until_idle(&mut state, MAX_FLIGHT_TICKS + 2).is_some());

            for _ in 0..4000 {
                tick(&mut state, &TickInput::default(), SIM_DT);
                let ball = state.particle.pos;
                let radius = state.particle.radius;
                assert!(
                    state
                        .obstacles
                        .iter()
                        .all(|o| !o.rect.overlaps_circle(ball, radius)),
                    "seed {}: idle ball at {:?} covered by an obstacle",
                    seed,
                    ball
                );
            }
        }
    }

    #[test]
    fn test_reset_mid_flight() {
        let mut state = open_arena(Settings::default());
        let start = state.particle.pos;
        tick(&mut state, &launch_input(start + Vec2::new(80.0, -120.0)), SIM_DT);
        for _ in 0..25 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::InFlight);

        tick(
            &mut state,
            &TickInput {
                reset: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.particle.vel, Vec2::ZERO);
        assert!(state.particle.trail.is_empty());
        assert_eq!(state.launches_remaining, LAUNCHES_PER_ROUND as i32);
        assert_eq!(state.display_bounces, 0);
    }

    #[test]
    fn test_moving_obstacles_update_while_idle() {
        let mut state = GameState::new(77, Settings::default()).unwrap();
        let before: Vec<f32> = state
            .obstacles
            .iter()
            .filter(|o| o.is_moving())
            .map(|o| o.rect.x)
            .collect();
        assert!(!before.is_empty());
        tick(&mut state, &TickInput::default(), SIM_DT);
        let after: Vec<f32> = state
            .obstacles
            .iter()
            .filter(|o| o.is_moving())
            .map(|o| o.rect.x)
            .collect();
        assert_ne!(before, after);
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999, Settings::default()).unwrap();
        let mut state2 = GameState::new(99999, Settings::default()).unwrap();
        let start = state1.particle.pos;

        let mut inputs = vec![
            TickInput {
                aim: Some(start + Vec2::new(50.0, -30.0)),
                ..Default::default()
            },
            launch_input(start + Vec2::new(300.0, -200.0)),
        ];
        inputs.extend((0..2000).map(|_| TickInput::default()));
        inputs.push(launch_input(start + Vec2::new(-250.0, -100.0)));
        inputs.extend((0..2000).map(|_| TickInput::default()));

        for input in &inputs {
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.snapshot(), state2.snapshot());
    }

    #[test]
    fn test_trail_bounded_over_long_flight() {
        let mut state = open_arena(Settings {
            restitution: 0.9,
            ..Default::default()
        });
        let start = state.particle.pos;
        tick(&mut state, &launch_input(start + Vec2::new(400.0, -390.0)), SIM_DT);
        for _ in 0..5000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert!(state.particle.trail.len() <= TRAIL_CAPACITY);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_every_flight_ends(
            dx in -700.0f32..700.0,
            dy in -390.0f32..390.0,
            e in 0.0f32..0.9,
            gravity in 1.0f32..50.0,
            radius in 10.0f32..50.0,
        ) {
            let mut state = GameState::new(
                2024,
                Settings {
                    restitution: e,
                    gravity,
                    ball_radius: radius,
                    ..Default::default()
                },
            )
            .unwrap();
            let start = state.particle.pos;
            tick(&mut state, &launch_input(start + Vec2::new(dx, dy)), SIM_DT);
            prop_assert_eq!(state.phase, GamePhase::InFlight);

            let ticks = run_until_idle(&mut state, MAX_FLIGHT_TICKS + 2);
            prop_assert!(ticks.is_some());
            prop_assert!(state.vertical_bounces <= state.max_bounces);
            prop_assert!(state.particle.trail.len() <= TRAIL_CAPACITY);
        }

        #[test]
        fn prop_ball_stays_near_arena(
            dx in -700.0f32..700.0,
            dy in -390.0f32..390.0,
        ) {
            let mut state = GameState::new(5, Settings::default()).unwrap();
            let start = state.particle.pos;
            tick(&mut state, &launch_input(start + Vec2::new(dx, dy)), SIM_DT);
            for _ in 0..3000 {
                tick(&mut state, &TickInput::default(), SIM_DT);
                let p = state.particle.pos;
                // One tick of travel past a wall at most
                prop_assert!(p.x > -50.0 && p.x < ARENA_WIDTH + 50.0);
                prop_assert!(p.y > -50.0 && p.y < ARENA_HEIGHT + 50.0);
            }
        }
    }
}
