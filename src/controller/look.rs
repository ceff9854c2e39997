//! Swivels the view towards a target, independently of user orbit input.
//!
//! Normal orbiting rotates the camera about the pivot. This does the opposite: the camera stays
//! put and the pivot swings around the camera, so following a target never appears to translate
//! the view.

use bevy_math::prelude::*;

use super::{settings::LookTowards, smoothing::clamped_time_step};

/// Heading of a direction in degrees, clockwise from -Z seen from above. `None` for vertical or
/// degenerate directions.
pub fn heading_degrees(direction: Vec3) -> Option<f32> {
    let horizontal = Vec2::new(direction.x, -direction.z);
    (horizontal.length_squared() > f32::EPSILON)
        .then(|| horizontal.x.atan2(horizontal.y).to_degrees())
}

/// Signed horizontal angle in `(-180, 180]` from `from` to `to`. Positive is clockwise seen from
/// above, which is the direction of increasing yaw.
pub fn signed_yaw_delta(from: Vec3, to: Vec3) -> Option<f32> {
    let delta = heading_degrees(to)? - heading_degrees(from)?;
    let wrapped = (delta + 180.0).rem_euclid(360.0) - 180.0;
    Some(if wrapped == -180.0 { 180.0 } else { wrapped })
}

/// The yaw step to take this frame for a given misalignment.
///
/// Small misalignments are nearly ignored, and large ones saturate at
/// `max_delta_angle * strength` degrees per second.
pub fn eased_yaw_step(misalignment: f32, settings: &LookTowards, dt: f32) -> f32 {
    let eased = (misalignment / settings.dead_zone).powi(3).tanh();
    settings.max_delta_angle * eased * settings.strength * clamped_time_step(dt)
}

/// How far the pivot moves when it swings by `yaw_step` degrees about the camera.
pub fn pivot_displacement(pivot: Vec3, camera_position: Vec3, yaw_step: f32) -> Vec3 {
    let arm = (pivot - camera_position).reject_from_normalized(Vec3::Y);
    Quat::from_rotation_y(-yaw_step.to_radians()) * arm - arm
}
