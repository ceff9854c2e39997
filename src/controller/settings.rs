//! Operator-tunable configuration of an [`OrbitRig`](super::component::OrbitRig).

use bevy_input::{keyboard::KeyCode, mouse::MouseButton};
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::zoom::ZoomLimits;

/// All settings of a rig. Validated once by [`RigSettings::validated`] when the rig is built, and
/// read-only afterwards.
#[derive(Debug, Clone, Reflect)]
pub struct RigSettings {
    /// Exponential smoothing rates.
    pub smoothing: Smoothing,
    /// Input sensitivity.
    pub sensitivity: Sensitivity,
    /// Distance and map zoom bounds.
    pub zoom_limits: ZoomLimits,
    /// Bounds of the pitch angle, in degrees.
    pub pitch_limits: PitchLimits,
    /// Horizontal bounds of the pivot when panning freely in world space.
    pub pan_bounds: PanBounds,
    /// How the rig relates to a focus object.
    pub focus: FocusSettings,
    /// Tuning of the look-towards swivel.
    pub look_towards: LookTowards,
    /// Button and key bindings.
    pub bindings: InputBindings,
    /// Manhattan distance, in logical pixels, the click guard button may travel before its release
    /// stops counting as a click.
    pub right_click_threshold: f32,
    /// Vertical field of view in degrees applied to a perspective camera on initialization.
    pub field_of_view: Option<f32>,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            smoothing: Default::default(),
            sensitivity: Default::default(),
            zoom_limits: Default::default(),
            pitch_limits: Default::default(),
            pan_bounds: Default::default(),
            focus: Default::default(),
            look_towards: Default::default(),
            bindings: Default::default(),
            right_click_threshold: 20.0,
            field_of_view: Some(40.0),
        }
    }
}

impl RigSettings {
    /// Repair out of range values instead of failing later, mid-frame. Every repair is logged.
    ///
    /// Non-finite values fall back to their defaults before any range is checked.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        let pitch = &mut self.pitch_limits;
        finite_or_default("min_theta", &mut pitch.min_theta, defaults.pitch_limits.min_theta);
        finite_or_default("max_theta", &mut pitch.max_theta, defaults.pitch_limits.max_theta);
        if pitch.min_theta > pitch.max_theta {
            warn!(
                "min_theta {} is greater than max_theta {}, swapping",
                pitch.min_theta, pitch.max_theta
            );
            std::mem::swap(&mut pitch.min_theta, &mut pitch.max_theta);
        }
        if pitch.min_theta < -90.0 || pitch.max_theta > 90.0 {
            warn!("Pitch limits must stay within [-90, 90] degrees, clamping");
            pitch.min_theta = pitch.min_theta.clamp(-90.0, 90.0);
            pitch.max_theta = pitch.max_theta.clamp(-90.0, 90.0);
        }

        let zoom = &mut self.zoom_limits;
        if !(zoom.min_distance > 0.0 && zoom.min_distance.is_finite()) {
            warn!("min_distance {} must be positive, using 1e-3", zoom.min_distance);
            zoom.min_distance = 1e-3;
        }
        if !(zoom.max_distance > 0.0 && zoom.max_distance.is_finite()) {
            warn!("max_distance {} must be positive, using min_distance", zoom.max_distance);
            zoom.max_distance = zoom.min_distance;
        }
        if zoom.min_distance > zoom.max_distance {
            warn!("min_distance is greater than max_distance, swapping");
            std::mem::swap(&mut zoom.min_distance, &mut zoom.max_distance);
        }
        finite_or_default("min_zoom", &mut zoom.min_zoom, defaults.zoom_limits.min_zoom);
        finite_or_default("max_zoom", &mut zoom.max_zoom, defaults.zoom_limits.max_zoom);
        if zoom.min_zoom > zoom.max_zoom {
            warn!("min_zoom is greater than max_zoom, swapping");
            std::mem::swap(&mut zoom.min_zoom, &mut zoom.max_zoom);
        }

        let bounds = &mut self.pan_bounds;
        finite_or_default("pan_bounds.min.x", &mut bounds.min.x, defaults.pan_bounds.min.x);
        finite_or_default("pan_bounds.min.y", &mut bounds.min.y, defaults.pan_bounds.min.y);
        finite_or_default("pan_bounds.max.x", &mut bounds.max.x, defaults.pan_bounds.max.x);
        finite_or_default("pan_bounds.max.y", &mut bounds.max.y, defaults.pan_bounds.max.y);
        let (min, max) = (bounds.min.min(bounds.max), bounds.min.max(bounds.max));
        if (min, max) != (bounds.min, bounds.max) {
            warn!("Pan bounds are inverted, reordering");
            bounds.min = min;
            bounds.max = max;
        }

        for (name, rate, default) in [
            ("pan smoothing", &mut self.smoothing.pan, defaults.smoothing.pan),
            ("orbit smoothing", &mut self.smoothing.orbit, defaults.smoothing.orbit),
            ("zoom smoothing", &mut self.smoothing.zoom, defaults.smoothing.zoom),
        ] {
            finite_or_default(name, rate, default);
            if *rate < 0.0 {
                warn!("{name} rate {rate} is negative, using 0");
                *rate = 0.0;
            }
        }

        let sensitivity = &mut self.sensitivity;
        let default_orbit = defaults.sensitivity.orbit;
        finite_or_default("orbit sensitivity x", &mut sensitivity.orbit.x, default_orbit.x);
        finite_or_default("orbit sensitivity y", &mut sensitivity.orbit.y, default_orbit.y);
        finite_or_default("zoom sensitivity", &mut sensitivity.zoom, defaults.sensitivity.zoom);

        let look = &mut self.look_towards;
        let default_look = defaults.look_towards;
        finite_or_default("look strength", &mut look.strength, default_look.strength);
        if look.strength < 0.0 {
            warn!("Look-towards strength {} is negative, using 0", look.strength);
            look.strength = 0.0;
        }
        finite_or_default(
            "look max_delta_angle",
            &mut look.max_delta_angle,
            default_look.max_delta_angle,
        );
        finite_or_default("look dead_zone", &mut look.dead_zone, default_look.dead_zone);
        let clamped = (
            look.max_delta_angle.clamp(1.0, 90.0),
            look.dead_zone.clamp(1.0, 90.0),
        );
        if clamped != (look.max_delta_angle, look.dead_zone) {
            warn!("Look-towards angles must be within [1, 90] degrees, clamping");
            (look.max_delta_angle, look.dead_zone) = clamped;
        }

        if self.right_click_threshold.is_nan() {
            warn!(
                "right_click_threshold is NaN, using {}",
                defaults.right_click_threshold
            );
            self.right_click_threshold = defaults.right_click_threshold;
        }
        if self.right_click_threshold < 0.0 {
            warn!("right_click_threshold must not be negative, using 0");
            self.right_click_threshold = 0.0;
        }

        if let Some(fov) = self.field_of_view {
            if !(fov > 0.0 && fov < 180.0) {
                warn!("field_of_view {fov} must be within (0, 180) degrees, using the default");
                self.field_of_view = defaults.field_of_view;
            }
        }
        self
    }
}

fn finite_or_default(name: &str, value: &mut f32, default: f32) {
    if !value.is_finite() {
        warn!("{name} {value} is not finite, using {default}");
        *value = default;
    }
}

/// Rates of the per-frame exponential smoothing. Higher is snappier; `0` freezes the value.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Smoothing {
    /// Pan smoothing rate.
    pub pan: f32,
    /// Orbit smoothing rate. Also the rate at which queued orbit input is consumed.
    pub orbit: f32,
    /// Zoom smoothing rate.
    pub zoom: f32,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            pan: 8.0,
            orbit: 8.0,
            zoom: 5.0,
        }
    }
}

/// The sensitivity of the rig to inputs.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Sensitivity {
    /// Degrees of yaw (x) and pitch (y) per logical pixel of orbit drag.
    pub orbit: Vec2,
    /// Zoom levels per scroll tick or zoom key press.
    pub zoom: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            orbit: Vec2::new(0.4, 0.3),
            zoom: 0.2,
        }
    }
}

/// Pitch bounds in degrees. Positive pitch looks down onto the pivot.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct PitchLimits {
    /// Lowest allowed pitch.
    pub min_theta: f32,
    /// Highest allowed pitch.
    pub max_theta: f32,
}

impl Default for PitchLimits {
    fn default() -> Self {
        Self {
            min_theta: -80.0,
            max_theta: 80.0,
        }
    }
}

/// A rectangle on the ground plane, `x` mapping to world X and `y` to world Z.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct PanBounds {
    /// Minimum X and Z.
    pub min: Vec2,
    /// Maximum X and Z.
    pub max: Vec2,
}

impl Default for PanBounds {
    fn default() -> Self {
        Self {
            min: Vec2::splat(-200.0),
            max: Vec2::splat(200.0),
        }
    }
}

impl PanBounds {
    /// Clamp the horizontal components of a world position, leaving height untouched.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.min.x, self.max.x),
            position.y,
            position.z.clamp(self.min.y, self.max.y),
        )
    }
}

/// How the rig follows a focus object, when one is set.
#[derive(Debug, Clone, Reflect)]
pub struct FocusSettings {
    /// Slave the pivot to the focus object's position, ignoring pan input.
    pub lock_to_focus: bool,
    /// Add the focus object's yaw to the orbit yaw.
    pub follow_focus_yaw: bool,
    /// Swivel the view towards the focus object, or towards the tagged group centroid.
    pub look_towards_focus: bool,
    /// Name of a [`FocusTag`](crate::controller::focus::FocusTag) group whose centroid is looked
    /// towards when there is no unlocked focus object.
    pub centroid_tag: Option<String>,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            lock_to_focus: true,
            follow_focus_yaw: true,
            look_towards_focus: true,
            centroid_tag: None,
        }
    }
}

/// Tuning of the look-towards swivel. Angles are in degrees.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct LookTowards {
    /// Responsiveness multiplier.
    pub strength: f32,
    /// Upper bound of the swivel rate, in degrees per second.
    pub max_delta_angle: f32,
    /// Misalignment at which the swivel runs at about half of `max_delta_angle`.
    pub dead_zone: f32,
}

impl Default for LookTowards {
    fn default() -> Self {
        Self {
            strength: 1.0,
            max_delta_angle: 60.0,
            dead_zone: 20.0,
        }
    }
}

/// Which buttons and keys drive the rig.
#[derive(Debug, Clone, Reflect)]
pub struct InputBindings {
    /// Drag to pan.
    pub pan_button: MouseButton,
    /// Drag to orbit.
    pub orbit_button: MouseButton,
    /// While held, the pan button orbits instead.
    pub modifier_keys: Vec<KeyCode>,
    /// Step the zoom level up.
    pub zoom_in_keys: Vec<KeyCode>,
    /// Step the zoom level down.
    pub zoom_out_keys: Vec<KeyCode>,
    /// The button whose drag is tracked by the [`ClickGuard`](super::inputs::ClickGuard).
    pub click_guard_button: MouseButton,
    /// Flip the scroll sign, for platforms that report it reversed.
    pub invert_scroll: bool,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            pan_button: MouseButton::Left,
            orbit_button: MouseButton::Right,
            modifier_keys: vec![
                KeyCode::ControlLeft,
                KeyCode::ControlRight,
                KeyCode::SuperLeft,
                KeyCode::SuperRight,
            ],
            zoom_in_keys: vec![KeyCode::Equal, KeyCode::NumpadAdd],
            zoom_out_keys: vec![KeyCode::Minus, KeyCode::NumpadSubtract],
            click_guard_button: MouseButton::Right,
            invert_scroll: false,
        }
    }
}
