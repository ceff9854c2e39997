//! Provides [`ZoomLimits`] settings and the zoom level transform.

use bevy_reflect::Reflect;

/// Convert a boom distance into a zoom level.
///
/// The zoom level is `-ln(distance)`: additive steps feel uniform at every scale, and a larger
/// distance maps to a smaller zoom level.
pub fn distance_to_zoom(distance: f32) -> f32 {
    -distance.ln()
}

/// Inverse of [`distance_to_zoom`].
pub fn zoom_to_distance(zoom_level: f32) -> f32 {
    (-zoom_level).exp()
}

/// Bound zooming, both for a free camera boom and for an attached map.
#[derive(Debug, Clone, Reflect)]
pub struct ZoomLimits {
    /// The closest the camera may get to the pivot, in world units, when no map is attached.
    pub min_distance: f32,
    /// The farthest the camera may get from the pivot, in world units, when no map is attached.
    pub max_distance: f32,
    /// The smallest map zoom level, used instead of the distances when a map is attached.
    pub min_zoom: f32,
    /// The largest map zoom level, used instead of the distances when a map is attached.
    pub max_zoom: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_distance: 50.0,
            max_distance: 10_000.0,
            min_zoom: 1.0,
            max_zoom: 20.0,
        }
    }
}

impl ZoomLimits {
    /// The inclusive `(low, high)` zoom level range that applies in the current mode.
    pub fn range(&self, map_attached: bool) -> (f32, f32) {
        if map_attached {
            (self.min_zoom, self.max_zoom)
        } else {
            (
                distance_to_zoom(self.max_distance),
                distance_to_zoom(self.min_distance),
            )
        }
    }

    /// Clamp a zoom level into the active range.
    pub fn clamp(&self, zoom_level: f32, map_attached: bool) -> f32 {
        let (low, high) = self.range(map_attached);
        zoom_level.clamp(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_level_round_trips_distance() {
        for distance in [0.5, 50.0, 1234.5] {
            let back = zoom_to_distance(distance_to_zoom(distance));
            assert!((back - distance).abs() / distance < 1e-5);
        }
    }

    #[test]
    fn farther_is_smaller_zoom() {
        assert!(distance_to_zoom(100.0) < distance_to_zoom(10.0));
    }

    #[test]
    fn range_depends_on_map() {
        let limits = ZoomLimits::default();
        assert_eq!(limits.range(true), (1.0, 20.0));
        let (low, high) = limits.range(false);
        assert!((low - -(10_000f32.ln())).abs() < 1e-5);
        assert!((high - -(50f32.ln())).abs() < 1e-5);
        assert_eq!(limits.clamp(100.0, true), 20.0);
        assert_eq!(limits.clamp(0.0, false), high);
    }
}
