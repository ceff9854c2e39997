//! An extension that draws an indicator on the ground where a pan drag grabbed it, and at the
//! pivot while orbiting. This makes it obvious what the user is holding on to.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use crate::controller::{component::OrbitRig, OrbitRigSystems};

/// See the [module](self) docs.
pub struct AnchorIndicatorPlugin;

impl Plugin for AnchorIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, draw_anchor.after(OrbitRigSystems::Advance))
            .register_type::<AnchorIndicator>();
    }
}

/// Optional. Configures whether or not an [`OrbitRig`] should show an anchor indicator while
/// dragging. The indicator will be enabled if this component is not present.
#[derive(Debug, Component, Reflect)]
pub struct AnchorIndicator {
    /// Should the indicator be visible for this rig?
    pub enabled: bool,
}

impl Default for AnchorIndicator {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Use gizmos to draw the drag anchor, or the pivot while orbiting, in world space.
pub fn draw_anchor(rigs: Query<(&OrbitRig, Option<&AnchorIndicator>)>, mut gizmos: Gizmos) {
    for (rig, _) in rigs
        .iter()
        .filter(|(_, indicator)| indicator.map(|i| i.enabled).unwrap_or(true))
    {
        let anchor = if rig.is_panning() {
            rig.drag_anchor_world()
        } else if rig.is_orbiting() {
            Some(rig.pivot())
        } else {
            None
        };
        let Some(anchor) = anchor else {
            continue;
        };

        let scale = rig.camera_distance() * 0.01;
        let color = Color::WHITE;
        // Lay the circle flat on the ground, lifted slightly to avoid z-fighting.
        let ground = Isometry3d::new(
            anchor + Vec3::Y * scale * 0.1,
            Quat::from_rotation_arc(Vec3::Z, Vec3::Y),
        );
        gizmos.circle(ground, scale, color);

        let offset = 1.5 * scale;
        let arm_length = 0.4;
        for direction in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
            gizmos.ray(
                anchor + offset * direction,
                offset * arm_length * direction,
                color,
            );
        }
    }
}
