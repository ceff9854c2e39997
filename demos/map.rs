//! Drives a Web Mercator map instead of moving the camera. Dragging the ground moves the map's
//! center and scrolling changes its zoom level; the overlay shows what a tile renderer would load.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use bevy::{color::palettes, prelude::*};
use bevy_orbit_rig::prelude::*;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultOrbitRigPlugins))
        .add_systems(Startup, setup)
        .add_systems(Update, (poll_map, rescale_grid))
        .run();
}

/// Shared with the rig's [`MapLink`].
#[derive(Resource, Clone)]
struct Map(Arc<Mutex<MercatorMap>>);

/// Set by the scale adapter, cleared once the grid is rescaled.
#[derive(Resource, Clone, Default)]
struct GridStale(Arc<AtomicBool>);

/// The rig holds the map lock while notifying, so this only marks the grid stale.
struct GridScaleAdapter(Arc<AtomicBool>);

impl MapScaleAdapter for GridScaleAdapter {
    fn rescale(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[derive(Component)]
struct Grid;

#[derive(Component)]
struct Overlay;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut matls: ResMut<Assets<StandardMaterial>>,
) {
    // Berkeley, one world unit per meter at zoom 15.
    let map = Arc::new(Mutex::new(MercatorMap::new(
        GeoCoord::new(37.8716, -122.2727),
        15.0,
    )));
    let grid_stale = GridStale::default();
    let adapter = GridScaleAdapter(grid_stale.0.clone());

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(2000.0)))),
        MeshMaterial3d(matls.add(StandardMaterial {
            base_color: Color::Srgba(palettes::css::DARK_OLIVEGREEN),
            ..Default::default()
        })),
    ));
    let tile = meshes.add(Cuboid::new(90.0, 1.0, 90.0));
    let tile_material = matls.add(Color::Srgba(palettes::css::GRAY));
    commands
        .spawn((Transform::default(), Visibility::default(), Grid))
        .with_children(|grid| {
            for x in -5..=5 {
                for z in -5..=5 {
                    grid.spawn((
                        Mesh3d(tile.clone()),
                        MeshMaterial3d(tile_material.clone()),
                        Transform::from_xyz(x as f32 * 100.0, 0.5, z as f32 * 100.0),
                    ));
                }
            }
        });

    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(1.0, 3.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let camera = commands
        .spawn((Camera3d::default(), Transform::from_xyz(0.0, 0.0, 800.0)))
        .id();
    let service: Arc<Mutex<dyn MapService>> = map.clone();
    commands
        .spawn((
            OrbitRig::new(camera, RigSettings::default()),
            Transform::from_rotation(OrbitAngles::new(50.0, 0.0).to_quat()),
            MapLink::new(service).with_scale_adapter(Arc::new(Mutex::new(adapter))),
        ))
        .add_child(camera);

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        Node {
            margin: UiRect::all(Val::Px(20.0)),
            ..Default::default()
        },
        Overlay,
    ));
    commands.insert_resource(Map(map));
    commands.insert_resource(grid_stale);
}

/// Stands in for a tile renderer: reloads when the rig asks for a refresh.
fn poll_map(map: Res<Map>, mut overlay: Single<&mut Text, With<Overlay>>) {
    let Ok(mut map) = map.0.lock() else {
        return;
    };
    if !map.take_refresh_request() && !overlay.0.is_empty() {
        return;
    }
    overlay.0 = format!(
        "Center {:.5}\nZoom {:.2}\n\nLeft Mouse - Pan\nRight Mouse - Orbit\nScroll - Zoom",
        map.center(),
        map.zoom()
    );
}

/// Keeps the grid's ground size constant across zoom levels.
fn rescale_grid(
    stale: Res<GridStale>,
    map: Res<Map>,
    mut grid: Single<&mut Transform, With<Grid>>,
) {
    if !stale.0.swap(false, Ordering::Relaxed) {
        return;
    }
    let Ok(map) = map.0.lock() else {
        return;
    };
    let relative = (map.world_units_per_meter() / map.world_relative_scale) as f32;
    grid.scale = Vec3::new(relative, 1.0, relative);
}
