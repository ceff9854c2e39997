//! The two provided [`InputBackend`]s, and the pointer-over-UI query.

use bevy_ecs::prelude::*;
use bevy_input::{
    keyboard::{KeyCode, KeyboardInput},
    mouse::{AccumulatedMouseScroll, MouseButton, MouseButtonInput, MouseScrollUnit, MouseWheel},
    prelude::*,
    ButtonState as InputButtonState,
};
use bevy_math::prelude::*;
use bevy_picking::{hover::HoverMap, pointer::PointerId};
use bevy_reflect::prelude::*;
use bevy_ui::Node;
use bevy_window::{CursorMoved, PrimaryWindow, Window};

use super::inputs::{ButtonState, InputBackend};

/// Default number of pixels of smooth scrolling that count as one line.
pub const PIXELS_PER_LINE: f32 = 16.0;

/// Selects which [`InputBackend`] feeds the rigs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum InputBackendKind {
    /// Poll Bevy's [`ButtonInput`] and [`AccumulatedMouseScroll`] resources. See [`PolledInput`].
    #[default]
    Polled,
    /// Fold raw window and device events into per-frame state. See [`EventInput`].
    Events,
}

fn button_state<T>(input: &ButtonInput<T>, button: T) -> ButtonState
where
    T: Copy + Eq + std::hash::Hash + Send + Sync + 'static,
{
    ButtonState {
        pressed: input.just_pressed(button),
        held: input.pressed(button),
        released: input.just_released(button),
    }
}

/// Reads input from Bevy's polled input resources.
pub struct PolledInput<'a> {
    /// Mouse buttons.
    pub mouse: &'a ButtonInput<MouseButton>,
    /// Keyboard keys.
    pub keys: &'a ButtonInput<KeyCode>,
    /// Scroll accumulated over the frame.
    pub scroll: &'a AccumulatedMouseScroll,
    /// Cursor position of the window the camera renders to.
    pub cursor: Option<Vec2>,
    /// How many pixels of smooth scrolling count as one line.
    pub pixels_per_line: f32,
}

impl InputBackend for PolledInput<'_> {
    fn pointer_position(&self) -> Option<Vec2> {
        self.cursor
    }

    fn mouse_button(&self, button: MouseButton) -> ButtonState {
        button_state(self.mouse, button)
    }

    fn key(&self, key: KeyCode) -> ButtonState {
        button_state(self.keys, key)
    }

    fn scroll(&self) -> f32 {
        match self.scroll.unit {
            MouseScrollUnit::Line => self.scroll.delta.y,
            MouseScrollUnit::Pixel => self.scroll.delta.y / self.pixels_per_line,
        }
    }
}

/// Builds per-frame input state from raw events, without relying on Bevy's input resources.
///
/// [`EventInput::collect`] must run once per frame before the rigs sample input.
#[derive(Debug, Clone, Resource, Reflect)]
#[reflect(Resource)]
pub struct EventInput {
    /// How many pixels of smooth scrolling count as one line.
    pub pixels_per_line: f32,
    cursor: Option<Vec2>,
    scroll: f32,
    mouse_held: Vec<MouseButton>,
    mouse_pressed: Vec<MouseButton>,
    mouse_released: Vec<MouseButton>,
    keys_held: Vec<KeyCode>,
    keys_pressed: Vec<KeyCode>,
    keys_released: Vec<KeyCode>,
}

impl Default for EventInput {
    fn default() -> Self {
        Self {
            pixels_per_line: PIXELS_PER_LINE,
            cursor: None,
            scroll: 0.0,
            mouse_held: Vec::new(),
            mouse_pressed: Vec::new(),
            mouse_released: Vec::new(),
            keys_held: Vec::new(),
            keys_pressed: Vec::new(),
            keys_released: Vec::new(),
        }
    }
}

fn apply_transition<T: PartialEq + Copy>(
    held: &mut Vec<T>,
    pressed: &mut Vec<T>,
    released: &mut Vec<T>,
    item: T,
    state: InputButtonState,
) {
    match state {
        InputButtonState::Pressed => {
            if !held.contains(&item) {
                held.push(item);
                pressed.push(item);
            }
        }
        InputButtonState::Released => {
            if let Some(index) = held.iter().position(|h| *h == item) {
                held.swap_remove(index);
                released.push(item);
            }
        }
    }
}

fn state_of<T: PartialEq>(held: &[T], pressed: &[T], released: &[T], item: &T) -> ButtonState {
    ButtonState {
        pressed: pressed.contains(item),
        held: held.contains(item),
        released: released.contains(item),
    }
}

impl EventInput {
    /// Start a new frame: forget this frame's transitions and scroll.
    pub fn begin_frame(&mut self) {
        self.scroll = 0.0;
        self.mouse_pressed.clear();
        self.mouse_released.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Record a mouse button transition.
    pub fn mouse_event(&mut self, button: MouseButton, state: InputButtonState) {
        apply_transition(
            &mut self.mouse_held,
            &mut self.mouse_pressed,
            &mut self.mouse_released,
            button,
            state,
        );
    }

    /// Record a key transition.
    pub fn key_event(&mut self, key: KeyCode, state: InputButtonState) {
        apply_transition(
            &mut self.keys_held,
            &mut self.keys_pressed,
            &mut self.keys_released,
            key,
            state,
        );
    }

    /// Record a cursor move.
    pub fn cursor_event(&mut self, position: Vec2) {
        self.cursor = Some(position);
    }

    /// Record a scroll event.
    pub fn scroll_event(&mut self, unit: MouseScrollUnit, y: f32) {
        self.scroll += match unit {
            MouseScrollUnit::Line => y,
            MouseScrollUnit::Pixel => y / self.pixels_per_line,
        };
    }

    /// Folds this frame's raw events into the resource.
    pub fn collect(
        mut state: ResMut<Self>,
        mut buttons: EventReader<MouseButtonInput>,
        mut keys: EventReader<KeyboardInput>,
        mut cursor: EventReader<CursorMoved>,
        mut wheel: EventReader<MouseWheel>,
        primary: Query<(), With<PrimaryWindow>>,
    ) {
        state.begin_frame();
        for event in buttons.read() {
            state.mouse_event(event.button, event.state);
        }
        for event in keys.read() {
            state.key_event(event.key_code, event.state);
        }
        for event in cursor.read().filter(|e| primary.contains(e.window)) {
            state.cursor_event(event.position);
        }
        for event in wheel.read() {
            state.scroll_event(event.unit, event.y);
        }
    }
}

impl InputBackend for EventInput {
    fn pointer_position(&self) -> Option<Vec2> {
        self.cursor
    }

    fn mouse_button(&self, button: MouseButton) -> ButtonState {
        state_of(
            &self.mouse_held,
            &self.mouse_pressed,
            &self.mouse_released,
            &button,
        )
    }

    fn key(&self, key: KeyCode) -> ButtonState {
        state_of(&self.keys_held, &self.keys_pressed, &self.keys_released, &key)
    }

    fn scroll(&self) -> f32 {
        self.scroll
    }
}

/// Is the mouse pointer over interactive UI? Rigs ignore new drags and zoom input while it is.
///
/// Refreshed from picking hover data by [`PointerOverUi::update_from_picking`] when UI hover
/// detection is enabled on the plugin; otherwise the host owns this flag.
#[derive(Debug, Default, Clone, Copy, Resource, Reflect)]
#[reflect(Resource)]
pub struct PointerOverUi(pub bool);

impl PointerOverUi {
    /// True when the mouse pointer hovers any UI [`Node`].
    pub fn update_from_picking(
        mut over_ui: ResMut<Self>,
        hover_map: Option<Res<HoverMap>>,
        nodes: Query<(), With<Node>>,
    ) {
        let hovering_ui = hover_map
            .as_ref()
            .and_then(|map| map.get(&PointerId::Mouse))
            .is_some_and(|hits| hits.keys().any(|entity| nodes.contains(*entity)));
        if over_ui.0 != hovering_ui {
            over_ui.0 = hovering_ui;
        }
    }
}

/// The primary window's cursor position, used by the polled backend.
pub(crate) fn primary_cursor(windows: &Query<&Window, With<PrimaryWindow>>) -> Option<Vec2> {
    windows.single().ok().and_then(Window::cursor_position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_input_tracks_transitions() {
        let mut input = EventInput::default();
        input.begin_frame();
        input.mouse_event(MouseButton::Left, InputButtonState::Pressed);
        assert_eq!(input.mouse_button(MouseButton::Left), ButtonState::PRESSED);
        assert_eq!(input.mouse_button(MouseButton::Right), ButtonState::UP);

        input.begin_frame();
        assert_eq!(input.mouse_button(MouseButton::Left), ButtonState::HELD);

        input.begin_frame();
        input.mouse_event(MouseButton::Left, InputButtonState::Released);
        assert_eq!(input.mouse_button(MouseButton::Left), ButtonState::RELEASED);

        input.begin_frame();
        assert_eq!(input.mouse_button(MouseButton::Left), ButtonState::UP);
    }

    #[test]
    fn repeated_key_presses_are_not_duplicated() {
        let mut input = EventInput::default();
        input.begin_frame();
        input.key_event(KeyCode::ControlLeft, InputButtonState::Pressed);
        input.begin_frame();
        input.key_event(KeyCode::ControlLeft, InputButtonState::Pressed);
        let state = input.key(KeyCode::ControlLeft);
        assert!(state.held);
        assert!(!state.pressed);
    }

    #[test]
    fn pixel_scroll_is_converted_to_lines() {
        let mut input = EventInput::default();
        input.begin_frame();
        input.scroll_event(MouseScrollUnit::Pixel, 32.0);
        input.scroll_event(MouseScrollUnit::Line, -1.0);
        assert_eq!(input.scroll(), 1.0);
        input.begin_frame();
        assert_eq!(input.scroll(), 0.0);
    }

    #[test]
    fn cursor_persists_across_frames() {
        let mut input = EventInput::default();
        assert_eq!(input.pointer_position(), None);
        input.cursor_event(Vec2::new(4.0, 8.0));
        input.begin_frame();
        assert_eq!(input.pointer_position(), Some(Vec2::new(4.0, 8.0)));
    }

    #[test]
    fn polled_input_reads_resources() {
        let mut mouse = ButtonInput::<MouseButton>::default();
        mouse.press(MouseButton::Right);
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::Minus);
        let scroll = AccumulatedMouseScroll {
            unit: MouseScrollUnit::Pixel,
            delta: Vec2::new(0.0, -8.0),
        };
        let polled = PolledInput {
            mouse: &mouse,
            keys: &keys,
            scroll: &scroll,
            cursor: None,
            pixels_per_line: PIXELS_PER_LINE,
        };
        assert_eq!(polled.mouse_button(MouseButton::Right), ButtonState::PRESSED);
        assert!(polled.key(KeyCode::Minus).pressed);
        assert_eq!(polled.scroll(), -0.5);
    }
}
