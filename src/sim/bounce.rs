//! Bounce resolution with a coefficient of restitution
//!
//! A bounce ends the current flight segment: the ball is clamped one radius
//! off the contact surface and a new segment starts from there with a damped
//! initial velocity.

use glam::Vec2;

use super::collision::{BounceAxis, Contact};
use super::state::Particle;

/// Velocity at the start of the segment following a bounce
///
/// Both components are scaled by `e`; the one along the bounce axis reverses.
/// `vel` is in physics space (y up).
#[inline]
pub fn rebound_velocity(vel: Vec2, axis: BounceAxis, e: f32) -> Vec2 {
    match axis {
        BounceAxis::Horizontal => Vec2::new(-e * vel.x, e * vel.y),
        BounceAxis::Vertical => Vec2::new(e * vel.x, -e * vel.y),
    }
}

/// Resolve a contact, starting a new flight segment
///
/// Returns the new segment origin. The particle's elapsed time is reset to
/// zero and its velocity set to the rebound velocity, so a second contact in
/// the same tick resolves against the already-bounced state.
pub fn resolve(particle: &mut Particle, contact: &Contact) -> Vec2 {
    let axis = contact.kind.axis();
    let mut origin = particle.pos;

    match axis {
        BounceAxis::Horizontal => origin.x = contact.boundary + contact.outward * particle.radius,
        BounceAxis::Vertical => origin.y = contact.boundary + contact.outward * particle.radius,
    }

    particle.initial_vel = rebound_velocity(particle.vel, axis, particle.restitution);
    particle.begin_segment(origin);
    origin
}
