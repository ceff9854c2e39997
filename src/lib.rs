//! A smoothed third-person orbit camera rig for Bevy, with optional map synchronization.
//!
//! Add the [`DefaultOrbitRigPlugins`] to your app, then spawn an
//! [`OrbitRig`](crate::controller::component::OrbitRig) on a pivot entity with its camera as a
//! child:
//!
//! ```rust,ignore
//! fn setup(mut commands: Commands) {
//!     let camera = commands
//!         .spawn((Camera3d::default(), Transform::from_xyz(0.0, 0.0, 500.0)))
//!         .id();
//!     commands
//!         .spawn((
//!             OrbitRig::new(camera, RigSettings::default()),
//!             Transform::from_rotation(OrbitAngles::new(30.0, 0.0).to_quat()),
//!         ))
//!         .add_child(camera);
//! }
//! ```
//!
//! # Controls
//!
//! - Drag with the pan button to grab the ground and slide it under the pointer.
//! - Drag with the orbit button, or the pan button while holding a modifier key, to orbit.
//! - Scroll, or press a zoom key, to zoom in steps.
//!
//! # Map synchronization
//!
//! Insert a [`MapLink`](crate::map::MapLink) next to the rig to drive an external map instead of
//! the pivot: panning moves the map's center and zooming sets its zoom level. See [`map`].
//!
//! # Focus objects
//!
//! A rig can follow an entity with [`OrbitRig::with_focus`](controller::component::OrbitRig::with_focus),
//! either locked to its position or swiveling towards it, or look towards the centroid of every
//! entity carrying a [`FocusTag`](controller::focus::FocusTag) group.

#![warn(missing_docs)]

use bevy_app::{PluginGroup, PluginGroupBuilder};

pub mod controller;
pub mod extensions;
pub mod map;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            backends::{EventInput, InputBackendKind, PointerOverUi},
            component::{FrameContext, OrbitRig, PanMode, RigPose},
            focus::{FocusSample, FocusTag},
            inputs::{ButtonState, ClickGuard, DragPhase, Gestures, InputBackend, ZoomStep},
            settings::{
                FocusSettings, InputBindings, LookTowards, PanBounds, PitchLimits, RigSettings,
                Sensitivity, Smoothing,
            },
            smoothing::OrbitAngles,
            zoom::ZoomLimits,
            OrbitRigPlugin, OrbitRigSystems,
        },
        map::{mercator::MercatorMap, GeoCoord, MapLink, MapScaleAdapter, MapService},
        DefaultOrbitRigPlugins,
    };
}

/// Adds the [`OrbitRigPlugin`](controller::OrbitRigPlugin) and all enabled extensions.
pub struct DefaultOrbitRigPlugins;

impl PluginGroup for DefaultOrbitRigPlugins {
    #[allow(clippy::let_and_return)]
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>().add(controller::OrbitRigPlugin::default());

        #[cfg(feature = "extension_anchor_indicator")]
        let group = group.add(extensions::anchor_indicator::AnchorIndicatorPlugin);

        group
    }
}
