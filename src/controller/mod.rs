//! Camera controller implementation.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::InputSystem;
use bevy_picking::PickSet;
use bevy_transform::TransformSystem;

pub mod backends;
pub mod component;
pub mod focus;
pub mod inputs;
pub mod look;
pub mod settings;
pub mod smoothing;
pub mod zoom;

use backends::{EventInput, InputBackendKind, PointerOverUi};
use component::OrbitRig;
use inputs::ClickGuard;

/// Adds [`OrbitRig`] functionality to the app.
///
/// Input is sampled in [`PreUpdate`], after Bevy has processed input for the frame, and rigs are
/// advanced in [`PostUpdate`], before transforms propagate. Gameplay code in [`Update`] can read
/// the frame's [`ClickGuard`] and gestures, and move focus objects, in between.
#[derive(Debug, Clone)]
pub struct OrbitRigPlugin {
    /// Where rigs read input from.
    pub input: InputBackendKind,
    /// Refresh [`PointerOverUi`] from picking hover data. Disable this to set the flag yourself.
    pub detect_ui_hover: bool,
}

impl Default for OrbitRigPlugin {
    fn default() -> Self {
        Self {
            input: InputBackendKind::Polled,
            detect_ui_hover: true,
        }
    }
}

/// System sets of the [`OrbitRigPlugin`], for ordering against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum OrbitRigSystems {
    /// Classifies raw input into gestures, in [`PreUpdate`].
    SampleInput,
    /// Advances rigs and writes their transforms, in [`PostUpdate`].
    Advance,
}

impl Plugin for OrbitRigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClickGuard>()
            .init_resource::<PointerOverUi>()
            .configure_sets(PreUpdate, OrbitRigSystems::SampleInput.after(InputSystem))
            .configure_sets(
                PostUpdate,
                OrbitRigSystems::Advance.before(TransformSystem::TransformPropagate),
            )
            .add_systems(
                PostUpdate,
                OrbitRig::advance_rigs.in_set(OrbitRigSystems::Advance),
            )
            .register_type::<OrbitRig>()
            .register_type::<ClickGuard>()
            .register_type::<PointerOverUi>()
            .register_type::<focus::FocusTag>();

        match self.input {
            InputBackendKind::Polled => {
                app.add_systems(
                    PreUpdate,
                    OrbitRig::sample_polled_input.in_set(OrbitRigSystems::SampleInput),
                );
            }
            InputBackendKind::Events => {
                app.init_resource::<EventInput>()
                    .register_type::<EventInput>()
                    .add_systems(
                        PreUpdate,
                        (EventInput::collect, OrbitRig::sample_event_input)
                            .chain()
                            .in_set(OrbitRigSystems::SampleInput),
                    );
            }
        }

        if self.detect_ui_hover {
            app.add_systems(
                PreUpdate,
                PointerOverUi::update_from_picking
                    .after(PickSet::Hover)
                    .before(OrbitRigSystems::SampleInput),
            );
        }
    }
}
