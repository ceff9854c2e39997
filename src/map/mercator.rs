//! A spherical Web Mercator [`MapService`], for slippy-map style tile renderers.

use std::f64::consts::PI;

use bevy_math::{prelude::*, DVec2};
use bevy_reflect::Reflect;

use super::{GeoCoord, MapService};

/// Half the circumference of the Web Mercator sphere, in meters.
pub const ORIGIN_SHIFT: f64 = PI * 6_378_137.0;

/// Web Mercator is undefined beyond this latitude.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// The zoom range of common tile servers.
pub const ZOOM_RANGE: (f32, f32) = (0.0, 22.0);

/// Convert a geodetic position into Web Mercator meters, `x` east and `y` north.
pub fn lat_lon_to_meters(coord: GeoCoord) -> DVec2 {
    let x = coord.lon * ORIGIN_SHIFT / 180.0;
    let y = ((90.0 + coord.lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    DVec2::new(x, y * ORIGIN_SHIFT / 180.0)
}

/// Convert Web Mercator meters back into a geodetic position.
pub fn meters_to_lat_lon(meters: DVec2) -> GeoCoord {
    let lon = meters.x / ORIGIN_SHIFT * 180.0;
    let lat = meters.y / ORIGIN_SHIFT * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
    GeoCoord::new(lat, lon)
}

/// A map whose world space is Web Mercator meters, scaled by `world_relative_scale` at
/// `initial_zoom`. Tiles at other zoom levels are rendered at the same world size, so one world
/// unit covers `2^(initial_zoom - zoom)` times more ground after zooming out.
///
/// World +X is east and world -Z is north.
#[derive(Debug, Clone, Reflect)]
pub struct MercatorMap {
    center: GeoCoord,
    zoom: f32,
    initial_zoom: f32,
    /// World units per meter at `initial_zoom`.
    pub world_relative_scale: f64,
    /// Rotation of the map's root in the world. Offsets are unrotated by it before conversion.
    pub root_rotation: Quat,
    refresh_requested: bool,
}

impl MercatorMap {
    /// A map centered on `center`, starting at `zoom`, with one world unit per meter.
    pub fn new(center: GeoCoord, zoom: f32) -> Self {
        let zoom = zoom.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
        Self {
            center: clamp_coord(center),
            zoom,
            initial_zoom: zoom,
            world_relative_scale: 1.0,
            root_rotation: Quat::IDENTITY,
            refresh_requested: false,
        }
    }

    /// Set the world units per meter at the initial zoom.
    #[must_use = "with_world_relative_scale returns a modified MercatorMap"]
    pub fn with_world_relative_scale(self, world_relative_scale: f64) -> Self {
        Self {
            world_relative_scale,
            ..self
        }
    }

    /// The zoom level the map was created at.
    pub fn initial_zoom(&self) -> f32 {
        self.initial_zoom
    }

    /// World units per meter of ground at the current zoom level.
    pub fn world_units_per_meter(&self) -> f64 {
        self.world_relative_scale * 2f64.powf((self.zoom - self.initial_zoom) as f64)
    }

    /// Returns `true` once after a refresh was requested, so a tile renderer can poll it.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }
}

fn clamp_coord(coord: GeoCoord) -> GeoCoord {
    GeoCoord::new(
        coord.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        (coord.lon + 180.0).rem_euclid(360.0) - 180.0,
    )
}

impl MapService for MercatorMap {
    fn center(&self) -> GeoCoord {
        self.center
    }

    fn set_center(&mut self, center: GeoCoord) {
        self.center = clamp_coord(center);
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }

    fn world_offset_to_geo_delta(&self, offset: Vec3) -> GeoCoord {
        // Every zoom level is rendered at the same world size, so compensate for it.
        let local =
            (self.root_rotation.inverse() * offset).as_dvec3() / self.world_units_per_meter();
        // Converted about the projection origin; exact at the equator, an approximation elsewhere.
        meters_to_lat_lon(DVec2::new(local.x, -local.z))
    }

    fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }
}
