//! Frame-rate independent exponential smoothing of the rig's current values towards its targets.

use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::settings::PitchLimits;

/// Longest time step smoothing will integrate in one frame, in seconds. Stalls, such as a
/// debugger pause, would otherwise overshoot.
pub const MAX_TIME_STEP: f32 = 0.02;

/// Once the L1 error between a value and its target drops below this, smoothing stops writing.
pub const CONVERGENCE_EPSILON: f32 = 1e-4;

/// The frame time actually integrated.
pub fn clamped_time_step(delta_seconds: f32) -> f32 {
    delta_seconds.clamp(0.0, MAX_TIME_STEP)
}

/// Interpolation factor for one frame at the given smoothing rate.
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    (rate * clamped_time_step(dt)).clamp(0.0, 1.0)
}

/// Move `current` towards `target`. Returns `false`, without writing, once converged or when
/// this frame would not move it at all.
pub fn smooth_vec3(current: &mut Vec3, target: Vec3, rate: f32, dt: f32) -> bool {
    let error = (*current - target).abs();
    let factor = smoothing_factor(rate, dt);
    if error.x + error.y + error.z < CONVERGENCE_EPSILON || factor == 0.0 {
        return false;
    }
    *current = current.lerp(target, factor);
    true
}

/// Move `current` towards `target`. Returns `false`, without writing, once converged or when
/// this frame would not move it at all.
pub fn smooth_scalar(current: &mut f32, target: f32, rate: f32, dt: f32) -> bool {
    let factor = smoothing_factor(rate, dt);
    if (*current - target).abs() < CONVERGENCE_EPSILON || factor == 0.0 {
        return false;
    }
    *current += (target - *current) * factor;
    true
}

/// Orbit angles in degrees. Roll is always zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct OrbitAngles {
    /// Elevation; positive looks down onto the pivot.
    pub pitch: f32,
    /// Heading; positive turns clockwise seen from above.
    pub yaw: f32,
}

impl OrbitAngles {
    /// Create new angles, in degrees.
    pub const fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    /// The rotation these angles describe, yaw applied first, in Bevy's right handed Y-up space.
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            -self.yaw.to_radians(),
            -self.pitch.to_radians(),
            0.0,
        )
    }

    /// Recover the angles from a rotation, yaw in `[0, 360)` and pitch in `[0, 360)`, mirroring
    /// how engines commonly report euler angles.
    pub fn from_quat(rotation: Quat) -> Self {
        let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
        Self {
            pitch: wrap_degrees(-pitch.to_degrees()),
            yaw: wrap_degrees(-yaw.to_degrees()),
        }
    }
}

/// Consume part of the pending orbit input, and apply it to the current angles.
///
/// The pending delta decays towards zero as it is consumed. Pitch is clamped to `limits` and yaw is
/// wrapped into `[0, 360)`.
pub fn consume_orbit(
    current: &mut OrbitAngles,
    pending: &mut OrbitAngles,
    rate: f32,
    dt: f32,
    limits: &PitchLimits,
) {
    let factor = rate * clamped_time_step(dt);
    let step = OrbitAngles::new(pending.pitch * factor, pending.yaw * factor);
    pending.pitch -= step.pitch;
    pending.yaw -= step.yaw;

    if current.pitch > 180.0 {
        // The lower limit is negative, but angles may arrive normalized to [0, 360).
        current.pitch -= 360.0;
    } else if current.pitch > 90.0 {
        #[cfg(debug_assertions)]
        warn!("Upside-down pitch {} reset to 0", current.pitch);
        current.pitch = 0.0;
    }

    current.pitch = (current.pitch + step.pitch).clamp(limits.min_theta, limits.max_theta);
    current.yaw = wrap_degrees(current.yaw + step.yaw);
}

/// Wrap an angle into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative angles up to exactly 360.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_step_is_clamped() {
        assert_eq!(clamped_time_step(5.0), MAX_TIME_STEP);
        assert_eq!(clamped_time_step(0.01), 0.01);
        assert_eq!(clamped_time_step(-1.0), 0.0);
        assert_eq!(smoothing_factor(1000.0, 1.0), 1.0);
    }

    #[test]
    fn smoothing_converges_and_then_stops() {
        let mut current = Vec3::ZERO;
        let target = Vec3::new(10.0, 0.0, -4.0);
        let mut frames = 0;
        while smooth_vec3(&mut current, target, 8.0, 1.0 / 60.0) {
            frames += 1;
            assert!(frames < 10_000);
        }
        let settled = current;
        assert!(!smooth_vec3(&mut current, target, 8.0, 1.0 / 60.0));
        assert_eq!(current, settled);
        assert!((current - target).abs().element_sum() < CONVERGENCE_EPSILON);
    }

    #[test]
    fn scalar_smoothing_moves_by_rate() {
        let mut zoom = 0.0;
        assert!(smooth_scalar(&mut zoom, 1.0, 5.0, 0.02));
        assert!((zoom - 0.1).abs() < 1e-6);
        let mut settled = 1.0 - 1e-5;
        assert!(!smooth_scalar(&mut settled, 1.0, 5.0, 0.02));
    }

    #[test]
    fn a_frozen_rate_reports_no_change() {
        let mut position = Vec3::ZERO;
        assert!(!smooth_vec3(&mut position, Vec3::X, 0.0, 0.02));
        assert_eq!(position, Vec3::ZERO);
        let mut zoom = 3.0;
        assert!(!smooth_scalar(&mut zoom, 4.0, 0.0, 0.02));
        assert!(!smooth_scalar(&mut zoom, 4.0, 5.0, 0.0));
        assert_eq!(zoom, 3.0);
    }

    #[test]
    fn orbit_input_decays_as_it_is_consumed() {
        let limits = PitchLimits::default();
        let mut current = OrbitAngles::new(0.0, 0.0);
        let mut pending = OrbitAngles::new(10.0, 20.0);
        consume_orbit(&mut current, &mut pending, 8.0, 0.02, &limits);
        assert!((current.pitch - 1.6).abs() < 1e-5);
        assert!((current.yaw - 3.2).abs() < 1e-5);
        assert!((pending.pitch - 8.4).abs() < 1e-5);
        assert!((pending.yaw - 16.8).abs() < 1e-5);
    }

    #[test]
    fn pitch_stays_within_limits() {
        let limits = PitchLimits::default();
        let mut current = OrbitAngles::default();
        for delta in [500.0, -2000.0, 90.0, 1e6] {
            let mut pending = OrbitAngles::new(delta, 0.0);
            for _ in 0..50 {
                consume_orbit(&mut current, &mut pending, 8.0, 0.02, &limits);
                assert!(current.pitch >= limits.min_theta && current.pitch <= limits.max_theta);
            }
        }
    }

    #[test]
    fn yaw_wraps_into_a_full_turn() {
        let limits = PitchLimits::default();
        let mut current = OrbitAngles::new(0.0, 350.0);
        let mut pending = OrbitAngles::new(0.0, 1000.0);
        consume_orbit(&mut current, &mut pending, 8.0, 0.02, &limits);
        assert!((0.0..360.0).contains(&current.yaw));
        assert!((current.yaw - 150.0).abs() < 1e-3);

        let mut pending = OrbitAngles::new(0.0, -5000.0);
        consume_orbit(&mut current, &mut pending, 8.0, 0.02, &limits);
        assert!((0.0..360.0).contains(&current.yaw));
    }

    #[test]
    fn tiny_negative_angles_wrap_below_a_full_turn() {
        assert_eq!(wrap_degrees(-1e-9), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
    }

    #[test]
    fn normalized_pitch_is_rebased_and_upside_down_is_reset() {
        let limits = PitchLimits::default();
        let mut current = OrbitAngles::new(350.0, 0.0);
        consume_orbit(&mut current, &mut OrbitAngles::default(), 8.0, 0.02, &limits);
        assert!((current.pitch - -10.0).abs() < 1e-4);

        let mut current = OrbitAngles::new(120.0, 0.0);
        consume_orbit(&mut current, &mut OrbitAngles::default(), 8.0, 0.02, &limits);
        assert_eq!(current.pitch, 0.0);
    }

    #[test]
    fn quat_round_trip() {
        let angles = OrbitAngles::new(30.0, 45.0);
        let back = OrbitAngles::from_quat(angles.to_quat());
        assert!((back.pitch - 30.0).abs() < 1e-3);
        assert!((back.yaw - 45.0).abs() < 1e-3);

        // Positive pitch looks down, positive yaw turns right (towards +X from -Z).
        let forward = OrbitAngles::new(30.0, 0.0).to_quat() * Vec3::NEG_Z;
        assert!(forward.y < 0.0);
        let forward = OrbitAngles::new(0.0, 90.0).to_quat() * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }
}
