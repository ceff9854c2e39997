//! Raw per-frame input, and the gesture tracker that turns it into drags and zoom steps.

use bevy_ecs::prelude::*;
use bevy_input::{keyboard::KeyCode, mouse::MouseButton};
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::settings::InputBindings;

/// The state of a single button or key during one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct ButtonState {
    /// Went down this frame.
    pub pressed: bool,
    /// Is down.
    pub held: bool,
    /// Went up this frame.
    pub released: bool,
}

impl ButtonState {
    /// The button went down this frame.
    pub const PRESSED: Self = Self {
        pressed: true,
        held: true,
        released: false,
    };
    /// The button is down, and was already down last frame.
    pub const HELD: Self = Self {
        pressed: false,
        held: true,
        released: false,
    };
    /// The button went up this frame.
    pub const RELEASED: Self = Self {
        pressed: false,
        held: false,
        released: true,
    };
    /// The button is up.
    pub const UP: Self = Self {
        pressed: false,
        held: false,
        released: false,
    };

    /// Combine the states of several keys bound to the same action.
    pub fn any(self, other: Self) -> Self {
        Self {
            pressed: self.pressed || other.pressed,
            held: self.held || other.held,
            released: self.released || other.released,
        }
    }
}

/// Anything that can report pointer, button, key and scroll state for the current frame.
///
/// See [`PolledInput`](super::backends::PolledInput) and
/// [`EventInput`](super::backends::EventInput) for the provided implementations.
pub trait InputBackend {
    /// The pointer position in logical viewport pixels, origin top left.
    fn pointer_position(&self) -> Option<Vec2>;
    /// The state of a mouse button.
    fn mouse_button(&self, button: MouseButton) -> ButtonState;
    /// The state of a key.
    fn key(&self, key: KeyCode) -> ButtonState;
    /// Vertical scroll accumulated this frame, in lines. Positive scrolls up.
    fn scroll(&self) -> f32;

    /// The combined state of a set of keys, as if they were a single key.
    fn any_key(&self, keys: &[KeyCode]) -> ButtonState {
        keys.iter()
            .fold(ButtonState::UP, |state, key| state.any(self.key(*key)))
    }
}

/// Everything the rig reads from the input devices in one frame, with bindings already resolved.
///
/// This is plain data, so frames can also be scripted directly.
#[derive(Debug, Default, Clone, PartialEq, Reflect)]
pub struct RawInput {
    /// Pointer position in logical viewport pixels, origin top left.
    pub pointer: Option<Vec2>,
    /// The pan button.
    pub pan_button: ButtonState,
    /// The orbit button.
    pub orbit_button: ButtonState,
    /// Any of the modifier keys.
    pub modifier: ButtonState,
    /// The button tracked by the [`ClickGuard`].
    pub click_guard_button: ButtonState,
    /// Any zoom-in key went down this frame.
    pub zoom_in_key: bool,
    /// Any zoom-out key went down this frame.
    pub zoom_out_key: bool,
    /// Scroll this frame, positive zooms in.
    pub scroll: f32,
}

impl RawInput {
    /// Sample a backend through the given bindings.
    pub fn capture(backend: &impl InputBackend, bindings: &InputBindings) -> Self {
        let scroll = backend.scroll();
        Self {
            pointer: backend.pointer_position(),
            pan_button: backend.mouse_button(bindings.pan_button),
            orbit_button: backend.mouse_button(bindings.orbit_button),
            modifier: backend.any_key(&bindings.modifier_keys),
            click_guard_button: backend.mouse_button(bindings.click_guard_button),
            zoom_in_key: backend.any_key(&bindings.zoom_in_keys).pressed,
            zoom_out_key: backend.any_key(&bindings.zoom_out_keys).pressed,
            scroll: if bindings.invert_scroll { -scroll } else { scroll },
        }
    }
}

/// Where a drag gesture is in its lifetime, as of this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DragPhase {
    /// No drag.
    #[default]
    Idle,
    /// The drag began this frame.
    Started,
    /// The drag began on an earlier frame and is still held.
    Continuing,
    /// The button was released this frame, ending the drag.
    Ended,
}

impl DragPhase {
    /// Is the drag button held with a drag in progress, including the first frame?
    pub fn is_dragging(self) -> bool {
        matches!(self, Self::Started | Self::Continuing)
    }
}

/// A discrete zoom input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ZoomStep {
    /// No zoom input this frame.
    #[default]
    None,
    /// Increase the zoom level by one step.
    In,
    /// Decrease the zoom level by one step.
    Out,
}

/// The classified gestures of one frame.
#[derive(Debug, Default, Clone, PartialEq, Reflect)]
pub struct Gestures {
    /// Pan drag state.
    pub pan: DragPhase,
    /// Orbit drag state.
    pub orbit: DragPhase,
    /// Pointer position this frame, in logical viewport pixels.
    pub pointer: Option<Vec2>,
    /// Pointer movement since the last frame, in logical pixels, y pointing up.
    pub pointer_delta: Vec2,
    /// Zoom input this frame. Always [`ZoomStep::None`] while the pointer is over UI.
    pub zoom: ZoomStep,
}

/// Process-wide interaction state shared between the rig and other input consumers.
///
/// A drag on the click guard button must not also trigger that button's click action once the
/// pointer has moved further than the rig's `right_click_threshold`. Systems handling the click
/// should check [`ClickGuard::ignore_right_click`] when the button is released.
///
/// Every rig writes this resource while sampling input; with several rigs, the last one to run
/// wins for that frame.
#[derive(Debug, Default, Clone, Resource, Reflect)]
#[reflect(Resource)]
pub struct ClickGuard {
    ignore_right_click: bool,
}

impl ClickGuard {
    /// Should the release of the click guard button be ignored as a click?
    pub fn ignore_right_click(&self) -> bool {
        self.ignore_right_click
    }
}

/// Classifies raw input into drags and zoom steps.
///
/// All state here only lives as long as the current drag, except the last pointer position used
/// for deltas.
#[derive(Debug, Default, Clone, Reflect)]
pub struct GestureTracker {
    last_pointer: Option<Vec2>,
    panning: bool,
    orbiting: bool,
    /// Where the click guard button went down, or the first pointer position seen after that.
    click_start: Option<Vec2>,
}

impl GestureTracker {
    /// Is a pan drag in progress?
    pub fn is_panning(&self) -> bool {
        self.panning
    }

    /// Is an orbit drag in progress?
    pub fn is_orbiting(&self) -> bool {
        self.orbiting
    }

    /// Classify one frame of input.
    ///
    /// `pointer_over_ui` only matters when a drag would start and for zoom: a drag that started off
    /// the UI continues over it until its button is released.
    pub fn track(
        &mut self,
        raw: &RawInput,
        pointer_over_ui: bool,
        right_click_threshold: f32,
        click_guard: &mut ClickGuard,
    ) -> Gestures {
        // Deltas come from raw positions, never from OS-accelerated motion.
        let pointer_delta = match (self.last_pointer, raw.pointer) {
            (Some(last), Some(now)) => Vec2::new(now.x - last.x, last.y - now.y),
            _ => Vec2::ZERO,
        };
        self.last_pointer = raw.pointer;

        // The modifier reroutes the pan button to orbit. Evaluated from raw state every frame so
        // pressing or releasing the modifier mid-drag hands the drag over.
        let (pan, orbit, modifier) = (raw.pan_button, raw.orbit_button, raw.modifier);
        let pan_held = pan.held && !modifier.held;
        let pan_down = (pan.pressed && !modifier.held) || (pan.held && modifier.released);
        let orbit_held = orbit.held || (pan.held && modifier.held);
        let orbit_down =
            orbit.pressed || (pan.pressed && modifier.held) || (pan.held && modifier.pressed);

        let pan = drag_phase(&mut self.panning, pan_held, pan_down, pointer_over_ui);
        let orbit = drag_phase(&mut self.orbiting, orbit_held, orbit_down, pointer_over_ui);
        if pan != DragPhase::Idle && pan != DragPhase::Continuing {
            debug!("Pan drag {pan:?}");
        }
        if orbit != DragPhase::Idle && orbit != DragPhase::Continuing {
            debug!("Orbit drag {orbit:?}");
        }

        self.update_click_guard(raw, right_click_threshold, click_guard);

        let zoom = if pointer_over_ui {
            ZoomStep::None
        } else if raw.zoom_in_key || raw.scroll > 0.0 {
            ZoomStep::In
        } else if raw.zoom_out_key || raw.scroll < 0.0 {
            ZoomStep::Out
        } else {
            ZoomStep::None
        };

        Gestures {
            pan,
            orbit,
            pointer: raw.pointer,
            pointer_delta,
            zoom,
        }
    }

    /// Track how far the click guard button has been dragged, so its release stops counting as a
    /// click once the drag gets long enough.
    fn update_click_guard(&mut self, raw: &RawInput, threshold: f32, guard: &mut ClickGuard) {
        let button = raw.click_guard_button;
        if button.held {
            if button.pressed {
                self.click_start = raw.pointer;
            }
            // Pressed outside the window: measure from where the pointer first shows up.
            let Some(pointer) = raw.pointer else {
                return;
            };
            let moved = (pointer - *self.click_start.get_or_insert(pointer)).abs();
            if moved.x + moved.y > threshold {
                guard.ignore_right_click = true;
            }
        } else {
            self.click_start = None;
            if !button.released {
                // Left set on the release frame itself, which is the frame click handlers look at.
                guard.ignore_right_click = false;
            }
        }
    }
}

fn drag_phase(active: &mut bool, held: bool, down: bool, pointer_over_ui: bool) -> DragPhase {
    if !held {
        return if std::mem::take(active) {
            DragPhase::Ended
        } else {
            DragPhase::Idle
        };
    }
    if down && !pointer_over_ui {
        *active = true;
        return DragPhase::Started;
    }
    if *active {
        DragPhase::Continuing
    } else {
        DragPhase::Idle
    }
}
