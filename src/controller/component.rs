//! The primary [`Component`] of the controller, [`OrbitRig`].

use bevy_ecs::prelude::*;
use bevy_input::{mouse::AccumulatedMouseScroll, prelude::*};
use bevy_log::prelude::*;
use bevy_math::{prelude::*, primitives::InfinitePlane3d};
use bevy_reflect::prelude::*;
use bevy_render::prelude::*;
use bevy_time::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::{PrimaryWindow, RequestRedraw, Window};

use crate::map::{GeoCoord, MapAccess, MapLink, MapScaleAdapter, MapService};

use super::{
    backends::{primary_cursor, EventInput, PointerOverUi, PolledInput, PIXELS_PER_LINE},
    focus::{centroid, FocusSample, FocusTag},
    inputs::{ClickGuard, DragPhase, GestureTracker, Gestures, InputBackend, RawInput, ZoomStep},
    look::{eased_yaw_step, pivot_displacement, signed_yaw_delta},
    settings::RigSettings,
    smoothing::{consume_orbit, smooth_scalar, smooth_vec3, OrbitAngles},
    zoom::{distance_to_zoom, zoom_to_distance},
};

/// Tracks all state of an orbiting third-person camera: gestures, targets, and smoothed values.
///
/// The component lives on a pivot entity. The camera is a child of the pivot, offset along the
/// pivot's local +Z by the camera distance, so the pivot's rotation orbits the camera around it.
///
/// ```rust,ignore
/// let camera = commands.spawn((Camera3d::default(), Transform::from_xyz(0.0, 0.0, 500.0))).id();
/// commands
///     .spawn((
///         OrbitRig::new(camera, RigSettings::default()),
///         Transform::from_rotation(OrbitAngles::new(30.0, 0.0).to_quat()),
///     ))
///     .add_child(camera);
/// ```
///
/// # Frame order
///
/// Each frame the rig first samples input ([`OrbitRig::sample_input`]), then advances
/// ([`OrbitRig::advance`]), which runs these steps in order:
///
/// 1. Solve the pan, zoom, and orbit targets from the frame's gestures.
/// 2. Swivel towards the look target, if any.
/// 3. Smooth the current values towards the targets.
/// 4. Compose the pivot pose and camera distance, or drive the map.
///
/// The [`OrbitRigPlugin`](crate::controller::OrbitRigPlugin) schedules both for every rig.
#[derive(Debug, Clone, Reflect, Component)]
pub struct OrbitRig {
    camera: Entity,
    focus: Option<Entity>,
    settings: RigSettings,
    initialized: bool,
    /// Whether the pan and zoom values are currently in map units.
    map_attached: bool,
    tracker: GestureTracker,
    gestures: Gestures,
    /// World position of the pivot.
    pivot: Vec3,
    /// Smoothed pan position. The pivot in world space, or an offset from the geographic drag
    /// anchor when a map is attached.
    pan_current: Vec3,
    pan_target: Vec3,
    drag_anchor_world: Option<Vec3>,
    drag_anchor_geo: Option<GeoCoord>,
    orbit_current: OrbitAngles,
    /// Orbit input not yet consumed by smoothing.
    orbit_target_delta: OrbitAngles,
    zoom_current: f32,
    zoom_target: f32,
    camera_distance: f32,
    rotation: Quat,
}

/// Which source drives the pivot position this frame. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PanMode {
    /// The pivot copies the focus object's position, and pan input is ignored.
    FocusLocked,
    /// Pan input moves the attached map's center; the pivot stays put.
    Map,
    /// Pan input moves the pivot over the ground plane, within the pan bounds.
    World,
}

/// Per-frame inputs to [`OrbitRig::advance`] that come from the world rather than the rig.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Frame time in seconds.
    pub dt: f32,
    /// Where the pointer ray meets the ground plane, if a pan drag is active and it does.
    pub ground_hit: Option<Vec3>,
    /// The focus object, if one is set and still exists.
    pub focus: Option<FocusSample>,
    /// Centroid of the focus tag group, if one is configured and not empty.
    pub group_centroid: Option<Vec3>,
}

/// The result of [`OrbitRig::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigPose {
    /// Pivot translation.
    pub translation: Vec3,
    /// Pivot rotation.
    pub rotation: Quat,
    /// Local camera distance along the pivot's +Z, when the rig owns the zoom.
    pub camera_distance: Option<f32>,
    /// Did the pan position move this frame?
    pub position_changed: bool,
    /// Did the zoom level move this frame?
    pub zoom_changed: bool,
    /// Did the rotation change this frame?
    pub rotation_changed: bool,
}

impl RigPose {
    /// Did anything visible change?
    pub fn changed(&self) -> bool {
        self.position_changed || self.zoom_changed || self.rotation_changed
    }
}

impl OrbitRig {
    /// Create a rig that drives `camera`. The settings are validated here, and are read-only
    /// afterwards.
    pub fn new(camera: Entity, settings: RigSettings) -> Self {
        let settings = settings.validated();
        let camera_distance = settings.zoom_limits.min_distance;
        let zoom = distance_to_zoom(camera_distance);
        Self {
            camera,
            focus: None,
            settings,
            initialized: false,
            map_attached: false,
            tracker: GestureTracker::default(),
            gestures: Gestures::default(),
            pivot: Vec3::ZERO,
            pan_current: Vec3::ZERO,
            pan_target: Vec3::ZERO,
            drag_anchor_world: None,
            drag_anchor_geo: None,
            orbit_current: OrbitAngles::default(),
            orbit_target_delta: OrbitAngles::default(),
            zoom_current: zoom,
            zoom_target: zoom,
            camera_distance,
            rotation: Quat::IDENTITY,
        }
    }

    /// Follow, and depending on [`FocusSettings`](super::settings::FocusSettings), lock to the
    /// given entity.
    #[must_use = "with_focus returns a modified OrbitRig"]
    pub fn with_focus(self, focus: Entity) -> Self {
        Self {
            focus: Some(focus),
            ..self
        }
    }

    /// Change or clear the focus object.
    pub fn set_focus(&mut self, focus: Option<Entity>) {
        self.focus = focus;
    }

    /// The camera entity this rig drives.
    pub fn camera(&self) -> Entity {
        self.camera
    }

    /// The focus entity, if any.
    pub fn focus(&self) -> Option<Entity> {
        self.focus
    }

    /// The validated settings.
    pub fn settings(&self) -> &RigSettings {
        &self.settings
    }

    /// Has [`OrbitRig::initialize`] run?
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The gestures sampled for the current frame.
    pub fn gestures(&self) -> &Gestures {
        &self.gestures
    }

    /// Is a pan drag in progress?
    pub fn is_panning(&self) -> bool {
        self.tracker.is_panning()
    }

    /// Is an orbit drag in progress?
    pub fn is_orbiting(&self) -> bool {
        self.tracker.is_orbiting()
    }

    /// World position of the pivot.
    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Smoothed pan position.
    pub fn pan_current(&self) -> Vec3 {
        self.pan_current
    }

    /// Pan position being smoothed towards.
    pub fn pan_target(&self) -> Vec3 {
        self.pan_target
    }

    /// World point grabbed by the current pan drag.
    pub fn drag_anchor_world(&self) -> Option<Vec3> {
        self.drag_anchor_world
    }

    /// Map center when the current map drag started.
    pub fn drag_anchor_geo(&self) -> Option<GeoCoord> {
        self.drag_anchor_geo
    }

    /// Smoothed orbit angles, before any focus yaw is added.
    pub fn orbit(&self) -> OrbitAngles {
        self.orbit_current
    }

    /// Orbit input not yet applied.
    pub fn pending_orbit(&self) -> OrbitAngles {
        self.orbit_target_delta
    }

    /// Smoothed zoom level.
    pub fn zoom_current(&self) -> f32 {
        self.zoom_current
    }

    /// Zoom level being smoothed towards.
    pub fn zoom_target(&self) -> f32 {
        self.zoom_target
    }

    /// Distance from the pivot to the camera.
    pub fn camera_distance(&self) -> f32 {
        self.camera_distance
    }

    /// World position of the camera, from the last composed pose.
    pub fn camera_position(&self) -> Vec3 {
        self.pivot + self.rotation * Vec3::Z * self.camera_distance
    }

    /// Which source drives the pivot, given what is present this frame.
    pub fn pan_mode(&self, focus_present: bool, map_attached: bool) -> PanMode {
        if focus_present && self.settings.focus.lock_to_focus {
            PanMode::FocusLocked
        } else if map_attached {
            PanMode::Map
        } else {
            PanMode::World
        }
    }

    /// Capture the starting state from the pivot's transform, the camera's local distance, and
    /// the map if one is attached.
    pub fn initialize(
        &mut self,
        rig_transform: &Transform,
        camera_distance: f32,
        map: Option<&dyn MapService>,
    ) {
        self.pivot = rig_transform.translation;
        self.pan_current = self.pivot;
        self.pan_target = self.pivot;
        self.rotation = rig_transform.rotation;
        self.orbit_current = OrbitAngles::from_quat(rig_transform.rotation);
        self.orbit_target_delta = OrbitAngles::default();

        let camera_distance = camera_distance.abs();
        self.camera_distance = if camera_distance > 0.0 && camera_distance.is_finite() {
            camera_distance
        } else {
            warn!(
                "Camera {} sits on its pivot, starting at min_distance instead",
                self.camera
            );
            self.settings.zoom_limits.min_distance
        };
        self.zoom_current = distance_to_zoom(self.camera_distance);
        self.zoom_target = self.zoom_current;
        self.map_attached = false;
        if let Some(map) = map {
            self.attach_map(map);
        }
        self.initialized = true;

        debug!(
            "Initialized rig for camera {}: pivot {}, {:?}, zoom {}",
            self.camera, self.pivot, self.orbit_current, self.zoom_current
        );
    }

    /// Switch the pan and zoom values to map units: offsets from the map's center, and its zoom.
    fn attach_map(&mut self, map: &dyn MapService) {
        self.drag_anchor_geo = Some(map.center());
        self.drag_anchor_world = None;
        self.pan_current = Vec3::ZERO;
        self.pan_target = Vec3::ZERO;
        self.zoom_current = map.zoom();
        self.zoom_target = self.zoom_current;
        self.map_attached = true;
    }

    /// Switch the pan and zoom values back to the world pivot and the camera distance.
    fn detach_map(&mut self) {
        self.drag_anchor_geo = None;
        self.drag_anchor_world = None;
        self.pan_current = self.pivot;
        self.pan_target = self.pivot;
        self.zoom_current = distance_to_zoom(self.camera_distance);
        self.zoom_target = self.zoom_current;
        self.map_attached = false;
    }

    /// Classify this frame's raw input, updating the click guard.
    pub fn sample_input(
        &mut self,
        raw: &RawInput,
        pointer_over_ui: bool,
        click_guard: &mut ClickGuard,
    ) {
        self.gestures = self.tracker.track(
            raw,
            pointer_over_ui,
            self.settings.right_click_threshold,
            click_guard,
        );
    }

    /// Advance the rig by one frame, and return the pose to apply.
    ///
    /// When `map` is present the rig writes the map's center and zoom instead of moving the pivot
    /// or the camera distance.
    pub fn advance(&mut self, frame: &FrameContext, mut map: Option<MapAccess>) -> RigPose {
        match (&map, self.map_attached) {
            (Some(map), false) => {
                debug!("Map attached to rig for camera {}", self.camera);
                self.attach_map(&*map.service);
            }
            (None, true) => {
                debug!("Map detached from rig for camera {}", self.camera);
                self.detach_map();
            }
            _ => {}
        }
        let mode = self.pan_mode(frame.focus.is_some(), map.is_some());

        self.solve_targets(
            mode,
            frame.ground_hit,
            map.as_ref().map(|m| &*m.service),
        );

        if self.settings.focus.look_towards_focus {
            let look_target = match frame.focus {
                Some(focus) if !self.settings.focus.lock_to_focus => Some(focus.position),
                _ => frame.group_centroid,
            };
            if let Some(target) = look_target {
                self.look_towards(mode, target, frame.dt);
            }
        }

        consume_orbit(
            &mut self.orbit_current,
            &mut self.orbit_target_delta,
            self.settings.smoothing.orbit,
            frame.dt,
            &self.settings.pitch_limits,
        );

        let position_changed = self.update_position(mode, frame, map.as_mut());
        let zoom_changed = self.update_zoom(frame.dt, map.as_mut());

        let focus_yaw = match frame.focus {
            Some(focus) if self.settings.focus.follow_focus_yaw => focus.yaw,
            _ => 0.0,
        };
        let rotation =
            OrbitAngles::new(self.orbit_current.pitch, self.orbit_current.yaw + focus_yaw)
                .to_quat();
        let rotation_changed = rotation != self.rotation;
        self.rotation = rotation;

        if let Some(map) = map.as_mut() {
            if position_changed || zoom_changed {
                map.service.request_refresh();
                if let Some(adapter) = map.scale_adapter.as_mut() {
                    adapter.rescale();
                }
            }
        }

        RigPose {
            translation: self.pivot,
            rotation: self.rotation,
            camera_distance: map.is_none().then_some(self.camera_distance),
            position_changed,
            zoom_changed,
            rotation_changed,
        }
    }

    /// Update the pan, zoom, and orbit targets from this frame's gestures. Independent of frame
    /// time.
    fn solve_targets(
        &mut self,
        mode: PanMode,
        ground_hit: Option<Vec3>,
        map: Option<&dyn MapService>,
    ) {
        let gestures = &self.gestures;

        if mode != PanMode::FocusLocked && gestures.pan.is_dragging() {
            if gestures.pan == DragPhase::Started {
                self.drag_anchor_world = None;
            }
            // No hit, e.g. the ray runs parallel to the ground: hold the previous target.
            if let Some(hit) = ground_hit {
                let anchor = match self.drag_anchor_world {
                    Some(anchor) => anchor,
                    None => {
                        if let Some(map) = map {
                            self.drag_anchor_geo = Some(map.center());
                            self.pan_current = Vec3::ZERO;
                        }
                        self.drag_anchor_world = Some(hit);
                        hit
                    }
                };
                match mode {
                    PanMode::Map => self.pan_target = anchor - hit,
                    PanMode::World => {
                        self.pan_target = self.settings.pan_bounds.clamp(self.pivot + anchor - hit)
                    }
                    PanMode::FocusLocked => {}
                }
            }
        }

        let step = self.settings.sensitivity.zoom;
        match gestures.zoom {
            ZoomStep::In => self.zoom_target += step,
            ZoomStep::Out => self.zoom_target -= step,
            ZoomStep::None => {}
        }
        self.zoom_target = self
            .settings
            .zoom_limits
            .clamp(self.zoom_target, map.is_some());

        if gestures.orbit.is_dragging() {
            let sensitivity = self.settings.sensitivity.orbit;
            self.orbit_target_delta.pitch -= gestures.pointer_delta.y * sensitivity.y;
            self.orbit_target_delta.yaw += gestures.pointer_delta.x * sensitivity.x;
        }
    }

    /// Swing the pivot about the camera so the view turns towards `target`, moving everything
    /// anchored to the pivot along with it.
    fn look_towards(&mut self, mode: PanMode, target: Vec3, dt: f32) {
        let camera_position = self.camera_position();
        let forward = self.rotation * Vec3::NEG_Z;
        let Some(misalignment) = signed_yaw_delta(forward, target - camera_position) else {
            return;
        };
        let step = eased_yaw_step(misalignment, &self.settings.look_towards, dt);
        if step == 0.0 {
            return;
        }

        let displacement = pivot_displacement(self.pivot, camera_position, step);
        self.pivot += displacement;
        if mode == PanMode::World {
            self.pan_current += displacement;
            self.pan_target += displacement;
        }
        if self.tracker.is_panning() {
            if let Some(anchor) = self.drag_anchor_world.as_mut() {
                *anchor += displacement;
            }
        }
        self.orbit_current.yaw += step;
    }

    /// Smooth and apply the pan position. Returns whether it changed.
    fn update_position(
        &mut self,
        mode: PanMode,
        frame: &FrameContext,
        map: Option<&mut MapAccess>,
    ) -> bool {
        let rate = self.settings.smoothing.pan;
        match (mode, frame.focus, map) {
            (PanMode::FocusLocked, Some(focus), map) => {
                let changed = self.pivot != focus.position;
                self.pivot = focus.position;
                // With a map, pan values are map offsets and must survive the lock.
                if map.is_none() {
                    self.pan_current = focus.position;
                    self.pan_target = focus.position;
                }
                changed
            }
            (PanMode::Map, _, Some(map)) => {
                if !smooth_vec3(&mut self.pan_current, self.pan_target, rate, frame.dt) {
                    return false;
                }
                let service = &mut *map.service;
                let origin = *self.drag_anchor_geo.get_or_insert_with(|| service.center());
                let delta = service.world_offset_to_geo_delta(self.pan_current);
                service.set_center(origin + delta);
                true
            }
            _ => {
                let changed = smooth_vec3(&mut self.pan_current, self.pan_target, rate, frame.dt);
                self.pivot = self.pan_current;
                changed
            }
        }
    }

    /// Smooth and apply the zoom level. Returns whether it changed.
    fn update_zoom(&mut self, dt: f32, map: Option<&mut MapAccess>) -> bool {
        let rate = self.settings.smoothing.zoom;
        if !smooth_scalar(&mut self.zoom_current, self.zoom_target, rate, dt) {
            return false;
        }
        match map {
            Some(map) => map.service.set_zoom(self.zoom_current),
            None => self.camera_distance = zoom_to_distance(self.zoom_current),
        }
        true
    }

    /// Sample input for every rig from Bevy's input resources.
    pub fn sample_polled_input(
        mut rigs: Query<&mut OrbitRig>,
        mouse: Res<ButtonInput<MouseButton>>,
        keys: Res<ButtonInput<KeyCode>>,
        scroll: Res<AccumulatedMouseScroll>,
        windows: Query<&Window, With<PrimaryWindow>>,
        pointer_over_ui: Res<PointerOverUi>,
        mut click_guard: ResMut<ClickGuard>,
    ) {
        let backend = PolledInput {
            mouse: &mouse,
            keys: &keys,
            scroll: &scroll,
            cursor: primary_cursor(&windows),
            pixels_per_line: PIXELS_PER_LINE,
        };
        Self::sample_all(&mut rigs, &backend, pointer_over_ui.0, &mut click_guard);
    }

    /// Sample input for every rig from the [`EventInput`] resource.
    pub fn sample_event_input(
        mut rigs: Query<&mut OrbitRig>,
        input: Res<EventInput>,
        pointer_over_ui: Res<PointerOverUi>,
        mut click_guard: ResMut<ClickGuard>,
    ) {
        Self::sample_all(&mut rigs, &*input, pointer_over_ui.0, &mut click_guard);
    }

    fn sample_all(
        rigs: &mut Query<&mut OrbitRig>,
        backend: &impl InputBackend,
        pointer_over_ui: bool,
        click_guard: &mut ClickGuard,
    ) {
        for mut rig in rigs.iter_mut() {
            let raw = RawInput::capture(backend, &rig.settings.bindings);
            rig.sample_input(&raw, pointer_over_ui, click_guard);
        }
    }

    /// Advance every rig by one frame and write the resulting transforms. Called once per frame,
    /// before transform propagation.
    pub fn advance_rigs(
        mut rigs: Query<(&mut OrbitRig, &mut Transform, Option<&MapLink>)>,
        mut cameras: Query<
            (
                &Camera,
                &GlobalTransform,
                &mut Transform,
                Option<&mut Projection>,
            ),
            Without<OrbitRig>,
        >,
        targets: Query<&GlobalTransform>,
        tagged: Query<(&FocusTag, &GlobalTransform)>,
        mut redraw: EventWriter<RequestRedraw>,
        time: Res<Time>,
    ) {
        for (mut rig, mut rig_transform, map_link) in rigs.iter_mut() {
            let Ok((camera, camera_global, mut camera_transform, projection)) =
                cameras.get_mut(rig.camera)
            else {
                warn_once!(
                    "Rig camera {} is not a separate entity with a Camera, skipping",
                    rig.camera
                );
                continue;
            };

            let mut service = map_link.and_then(|link| match link.service.lock() {
                Ok(service) => Some(service),
                Err(_) => {
                    error!("Map service lock is poisoned, ignoring the map this frame");
                    None
                }
            });
            let mut scale_adapter = service
                .as_ref()
                .and(map_link)
                .and_then(|link| link.scale_adapter.as_ref())
                .and_then(|adapter| match adapter.lock() {
                    Ok(adapter) => Some(adapter),
                    Err(_) => {
                        error!("Map scale adapter lock is poisoned, skipping rescale");
                        None
                    }
                });

            if !rig.initialized {
                if let (Some(fov), Some(mut projection)) = (rig.settings.field_of_view, projection)
                {
                    if let Projection::Perspective(perspective) = &mut *projection {
                        perspective.fov = fov.to_radians();
                    }
                }
                let distance = camera_transform.translation.z;
                rig.initialize(&rig_transform, distance, service.as_deref());
            }

            let ground_hit = rig
                .gestures
                .pan
                .is_dragging()
                .then_some(rig.gestures.pointer)
                .flatten()
                .and_then(|pointer| ground_plane_hit(camera, camera_global, pointer));

            let focus = rig.focus.and_then(|entity| match targets.get(entity) {
                Ok(transform) => Some(FocusSample::from_transform(transform)),
                Err(_) => {
                    warn_once!("Focus entity {entity} has no transform, ignoring it");
                    None
                }
            });

            let group_centroid = rig.settings.focus.centroid_tag.as_deref().and_then(|tag| {
                centroid(
                    tagged
                        .iter()
                        .filter(|(focus_tag, _)| focus_tag.0 == tag)
                        .map(|(_, transform)| transform.translation()),
                )
            });

            let frame = FrameContext {
                dt: time.delta_secs(),
                ground_hit,
                focus,
                group_centroid,
            };
            let map = service.as_deref_mut().map(|service| MapAccess {
                service,
                scale_adapter: scale_adapter
                    .as_deref_mut()
                    .map(|adapter| adapter as &mut dyn MapScaleAdapter),
            });
            let pose = rig.advance(&frame, map);

            if rig_transform.translation != pose.translation {
                rig_transform.translation = pose.translation;
            }
            if rig_transform.rotation != pose.rotation {
                rig_transform.rotation = pose.rotation;
            }
            if let Some(distance) = pose.camera_distance {
                if camera_transform.translation.z != distance {
                    camera_transform.translation.z = distance;
                }
            }
            if pose.changed() {
                redraw.write(RequestRedraw);
            }
        }
    }
}

/// Where the pointer's ray meets the ground plane, if it does.
pub fn ground_plane_hit(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    pointer: Vec2,
) -> Option<Vec3> {
    let ray = camera.viewport_to_world(camera_transform, pointer).ok()?;
    let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
    Some(ray.get_point(distance))
}

#[cfg(test)]
mod tests {
    use crate::controller::inputs::ButtonState;

    use super::*;

    fn rig_at(distance: f32) -> OrbitRig {
        let mut rig = OrbitRig::new(Entity::PLACEHOLDER, RigSettings::default());
        let transform = Transform::from_rotation(OrbitAngles::new(30.0, 0.0).to_quat());
        rig.initialize(&transform, distance, None);
        rig
    }

    fn frame() -> FrameContext {
        FrameContext {
            dt: 1.0 / 60.0,
            ..Default::default()
        }
    }

    #[test]
    fn initialization_reads_the_pose() {
        let rig = rig_at(500.0);
        assert!(rig.is_initialized());
        assert!((rig.orbit().pitch - 30.0).abs() < 1e-3);
        assert_eq!(rig.camera_distance(), 500.0);
        assert_eq!(rig.zoom_target(), distance_to_zoom(500.0));
        assert_eq!(rig.pan_target(), Vec3::ZERO);
    }

    #[test]
    fn camera_on_the_pivot_starts_at_min_distance() {
        let rig = rig_at(0.0);
        assert_eq!(rig.camera_distance(), rig.settings().zoom_limits.min_distance);
    }

    #[test]
    fn an_idle_rig_reports_no_change() {
        let mut rig = rig_at(500.0);
        rig.advance(&frame(), None);
        let pose = rig.advance(&frame(), None);
        assert!(!pose.changed());
        assert_eq!(pose.camera_distance, Some(500.0));
    }

    #[test]
    fn world_pan_drags_the_ground() {
        let mut rig = rig_at(500.0);
        let mut raw = RawInput {
            pointer: Some(Vec2::ZERO),
            pan_button: ButtonState::PRESSED,
            ..Default::default()
        };
        rig.sample_input(&raw, false, &mut ClickGuard::default());
        let start = FrameContext {
            ground_hit: Some(Vec3::new(10.0, 0.0, 10.0)),
            ..frame()
        };
        rig.advance(&start, None);
        assert_eq!(rig.drag_anchor_world(), Some(Vec3::new(10.0, 0.0, 10.0)));

        raw.pan_button = ButtonState::HELD;
        rig.sample_input(&raw, false, &mut ClickGuard::default());
        let moved = FrameContext {
            ground_hit: Some(Vec3::new(4.0, 0.0, 10.0)),
            ..frame()
        };
        let pose = rig.advance(&moved, None);
        assert_eq!(rig.pan_target(), Vec3::new(6.0, 0.0, 0.0));
        assert!(pose.position_changed);
        assert!(pose.translation.x > 0.0 && pose.translation.x < 6.0);
    }

    fn pan_frame(rig: &mut OrbitRig, button: ButtonState, ground_hit: Option<Vec3>) -> RigPose {
        let raw = RawInput {
            pointer: Some(Vec2::ZERO),
            pan_button: button,
            ..Default::default()
        };
        rig.sample_input(&raw, false, &mut ClickGuard::default());
        rig.advance(
            &FrameContext {
                ground_hit,
                ..frame()
            },
            None,
        )
    }

    #[test]
    fn missing_ground_hit_holds_the_pan_target() {
        let mut rig = rig_at(500.0);
        let anchor = Vec3::new(10.0, 0.0, 10.0);
        pan_frame(&mut rig, ButtonState::PRESSED, Some(anchor));
        pan_frame(&mut rig, ButtonState::HELD, Some(Vec3::new(4.0, 0.0, 10.0)));
        assert_eq!(rig.pan_target(), Vec3::new(6.0, 0.0, 0.0));

        // The pointer ray misses the ground, e.g. it runs above the horizon.
        pan_frame(&mut rig, ButtonState::HELD, None);
        assert_eq!(rig.pan_target(), Vec3::new(6.0, 0.0, 0.0));
        assert_eq!(rig.drag_anchor_world(), Some(anchor));

        pan_frame(&mut rig, ButtonState::RELEASED, None);
        pan_frame(&mut rig, ButtonState::UP, None);

        // A new drag starting off the ground forgets the old anchor rather than reusing it.
        pan_frame(&mut rig, ButtonState::PRESSED, None);
        assert_eq!(rig.drag_anchor_world(), None);
        assert_eq!(rig.pan_target(), Vec3::new(6.0, 0.0, 0.0));
        pan_frame(&mut rig, ButtonState::HELD, None);
        assert_eq!(rig.drag_anchor_world(), None);
        assert_eq!(rig.pan_target(), Vec3::new(6.0, 0.0, 0.0));

        // The first frame that hits the ground becomes the anchor.
        let late = Vec3::new(-3.0, 0.0, 2.0);
        pan_frame(&mut rig, ButtonState::HELD, Some(late));
        assert_eq!(rig.drag_anchor_world(), Some(late));
        assert!((rig.pan_target() - rig.pivot()).length() < 1e-4);
    }

    #[test]
    fn world_pan_respects_the_bounds() {
        let mut rig = rig_at(500.0);
        let raw = RawInput {
            pointer: Some(Vec2::ZERO),
            pan_button: ButtonState::PRESSED,
            ..Default::default()
        };
        rig.sample_input(&raw, false, &mut ClickGuard::default());
        rig.advance(
            &FrameContext {
                ground_hit: Some(Vec3::new(1000.0, 0.0, 0.0)),
                ..frame()
            },
            None,
        );
        rig.sample_input(
            &RawInput {
                pan_button: ButtonState::HELD,
                ..raw
            },
            false,
            &mut ClickGuard::default(),
        );
        rig.advance(
            &FrameContext {
                ground_hit: Some(Vec3::new(-1000.0, 0.0, 0.0)),
                ..frame()
            },
            None,
        );
        assert_eq!(rig.pan_target().x, rig.settings().pan_bounds.max.x);
    }

    #[test]
    fn zooming_moves_the_camera() {
        let mut rig = rig_at(500.0);
        let raw = RawInput {
            scroll: 1.0,
            ..Default::default()
        };
        rig.sample_input(&raw, false, &mut ClickGuard::default());
        let pose = rig.advance(&frame(), None);
        assert!(pose.zoom_changed);
        assert!(rig.camera_distance() < 500.0);
        assert_eq!(pose.camera_distance, Some(rig.camera_distance()));
    }

    #[test]
    fn locked_focus_ignores_panning_and_follows_yaw() {
        let mut rig = rig_at(500.0).with_focus(Entity::PLACEHOLDER);
        let raw = RawInput {
            pointer: Some(Vec2::ZERO),
            pan_button: ButtonState::PRESSED,
            ..Default::default()
        };
        rig.sample_input(&raw, false, &mut ClickGuard::default());
        let focus = FocusSample {
            position: Vec3::new(3.0, 1.0, -2.0),
            yaw: 90.0,
        };
        let pose = rig.advance(
            &FrameContext {
                ground_hit: Some(Vec3::X),
                focus: Some(focus),
                ..frame()
            },
            None,
        );
        assert_eq!(pose.translation, focus.position);
        assert_eq!(rig.drag_anchor_world(), None);
        let forward = pose.rotation * Vec3::NEG_Z;
        assert!(forward.x > 0.5, "{forward}");
    }

    #[test]
    fn unlocked_focus_is_looked_towards() {
        let mut settings = RigSettings::default();
        settings.focus.lock_to_focus = false;
        let mut rig = OrbitRig::new(Entity::PLACEHOLDER, settings).with_focus(Entity::PLACEHOLDER);
        rig.initialize(&Transform::default(), 10.0, None);
        let focus = FocusSample {
            position: Vec3::new(100.0, 0.0, 0.0),
            yaw: 0.0,
        };
        let context = FrameContext {
            focus: Some(focus),
            ..frame()
        };
        let camera_before = rig.camera_position();
        rig.advance(&context, None);
        assert!(rig.orbit().yaw > 0.0);
        // The pivot swings about the camera, so the camera does not appear to move.
        assert!((rig.camera_position() - camera_before).length() < 1e-3);
    }
}
