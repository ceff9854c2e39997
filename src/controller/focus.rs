//! Focus targets: an object the rig follows, or a tagged group whose centroid it looks towards.

use bevy_ecs::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use super::look::heading_degrees;

/// Marks an entity as a member of a named focus group. See
/// [`FocusSettings::centroid_tag`](super::settings::FocusSettings::centroid_tag).
#[derive(Debug, Clone, PartialEq, Eq, Component, Reflect)]
pub struct FocusTag(pub String);

impl FocusTag {
    /// Create a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

/// The pose of a focus object, sampled for one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct FocusSample {
    /// World position.
    pub position: Vec3,
    /// Heading in degrees, in the same convention as the rig's yaw.
    pub yaw: f32,
}

impl FocusSample {
    /// Sample an entity's global transform.
    pub fn from_transform(transform: &GlobalTransform) -> Self {
        Self {
            position: transform.translation(),
            yaw: heading_degrees(*transform.forward()).unwrap_or(0.0),
        }
    }
}

/// Mean of a set of positions, or `None` if there are none.
pub fn centroid(positions: impl IntoIterator<Item = Vec3>) -> Option<Vec3> {
    let (sum, count) = positions
        .into_iter()
        .fold((Vec3::ZERO, 0u32), |(sum, count), p| (sum + p, count + 1));
    (count > 0).then(|| sum / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_nothing_is_none() {
        assert_eq!(centroid([]), None);
    }

    #[test]
    fn centroid_is_the_mean() {
        let c = centroid([Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 3.0, 0.0)]);
        assert_eq!(c, Some(Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn focus_yaw_follows_heading() {
        let transform = GlobalTransform::from(
            Transform::from_xyz(1.0, 2.0, 3.0).looking_to(Vec3::X, Vec3::Y),
        );
        let sample = FocusSample::from_transform(&transform);
        assert_eq!(sample.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((sample.yaw - 90.0).abs() < 1e-4);
    }
}
