//! Optional synchronization with an external map or projection service.
//!
//! When a [`MapLink`] sits next to an [`OrbitRig`](crate::controller::component::OrbitRig), the
//! rig no longer moves its pivot when panning. Instead, pan offsets are converted to geographic
//! deltas and written to the map's center, and the zoom level becomes the map's zoom.

use core::{
    fmt,
    ops::{Add, Sub},
};
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::Reflect;

pub mod mercator;

/// A geodetic position or offset, in degrees.
#[derive(Clone, Copy, Default, PartialEq, Reflect)]
pub struct GeoCoord {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl GeoCoord {
    /// All zeroes.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a [`GeoCoord`].
    #[inline(always)]
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Add for GeoCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.lat + rhs.lat, self.lon + rhs.lon)
    }
}

impl Sub for GeoCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.lat - rhs.lat, self.lon - rhs.lon)
    }
}

impl fmt::Display for GeoCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = f.precision() {
            write!(f, "[{:.*}, {:.*}]", p, self.lat, p, self.lon)
        } else {
            write!(f, "[{}, {}]", self.lat, self.lon)
        }
    }
}

impl fmt::Debug for GeoCoord {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_tuple(stringify!(GeoCoord))
            .field(&self.lat)
            .field(&self.lon)
            .finish()
    }
}

/// The map the rig drives when one is attached.
pub trait MapService: Send {
    /// Current center of the map.
    fn center(&self) -> GeoCoord;
    /// Move the map's center.
    fn set_center(&mut self, center: GeoCoord);
    /// Current zoom level.
    fn zoom(&self) -> f32;
    /// Set the zoom level.
    fn set_zoom(&mut self, zoom: f32);
    /// Convert a world space offset on the ground plane into a geographic delta.
    fn world_offset_to_geo_delta(&self, offset: Vec3) -> GeoCoord;
    /// Ask the map to refresh its rendered tiles.
    fn request_refresh(&mut self);
}

/// Rescales visuals that depend on the map's scale, after the map moved or zoomed.
pub trait MapScaleAdapter: Send {
    /// Recompute the scale of dependent visuals.
    fn rescale(&mut self);
}

/// Shared handles to the map collaborators of a rig. Other systems keep their own clones of the
/// handles; the rig does not own the map.
#[derive(Component, Clone)]
pub struct MapLink {
    /// The map service.
    pub service: Arc<Mutex<dyn MapService>>,
    /// Optional adapter notified after the map changed.
    pub scale_adapter: Option<Arc<Mutex<dyn MapScaleAdapter>>>,
}

impl MapLink {
    /// Link a map service without a scale adapter.
    pub fn new(service: Arc<Mutex<dyn MapService>>) -> Self {
        Self {
            service,
            scale_adapter: None,
        }
    }

    /// Add a scale adapter.
    #[must_use = "with_scale_adapter returns a modified MapLink"]
    pub fn with_scale_adapter(mut self, adapter: Arc<Mutex<dyn MapScaleAdapter>>) -> Self {
        self.scale_adapter = Some(adapter);
        self
    }
}

impl fmt::Debug for MapLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapLink")
            .field("service", &"<map service>")
            .field(
                "scale_adapter",
                &if self.scale_adapter.is_some() {
                    "Some(<scale adapter>)"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

/// Borrowed access to the map collaborators for the duration of one frame.
pub struct MapAccess<'a> {
    /// The locked map service.
    pub service: &'a mut dyn MapService,
    /// The locked scale adapter, if any.
    pub scale_adapter: Option<&'a mut dyn MapScaleAdapter>,
}
