//! A third-person rig following a wandering cube. Press `F` to toggle between following the cube
//! and panning freely; right click on the ground is reported unless it turned into a drag.

use bevy::{color::palettes, prelude::*};
use bevy_orbit_rig::prelude::*;
use rand::Rng;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultOrbitRigPlugins))
        .add_systems(Startup, (setup, setup_ui))
        .add_systems(Update, (wander, toggle_focus, report_right_clicks))
        .run();
}

#[derive(Component)]
struct Wanderer;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut matls: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(400.0)))),
        MeshMaterial3d(matls.add(StandardMaterial {
            base_color: Color::Srgba(palettes::css::DARK_GRAY),
            ..Default::default()
        })),
    ));

    let mut rng = rand::thread_rng();
    let mesh = meshes.add(Cuboid::default());
    let material = matls.add(Color::srgb(0.3, 0.6, 0.8));
    for _ in 0..200 {
        let height = rng.gen_range(2.0..20.0);
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_xyz(
                rng.gen_range(-200.0..200.0),
                height / 2.0,
                rng.gen_range(-200.0..200.0),
            )
            .with_scale(Vec3::new(4.0, height, 4.0)),
            FocusTag::new("towers"),
        ));
    }

    let wanderer = commands
        .spawn((
            Mesh3d(mesh),
            MeshMaterial3d(matls.add(Color::srgb(0.8, 0.45, 0.5))),
            Transform::from_xyz(0.0, 1.0, 0.0).with_scale(Vec3::splat(2.0)),
            Wanderer,
        ))
        .id();

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..Default::default()
        },
        Transform::from_xyz(1.0, 3.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let camera = commands
        .spawn((Camera3d::default(), Transform::from_xyz(0.0, 0.0, 60.0)))
        .id();
    let settings = RigSettings {
        focus: FocusSettings {
            centroid_tag: Some("towers".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    commands
        .spawn((
            OrbitRig::new(camera, settings).with_focus(wanderer),
            Transform::from_rotation(OrbitAngles::new(30.0, 0.0).to_quat()),
        ))
        .add_child(camera);
}

fn wander(time: Res<Time>, mut wanderer: Single<&mut Transform, With<Wanderer>>) {
    let t = time.elapsed_secs() * 0.2;
    let position = Vec3::new(t.sin() * 80.0, 1.0, (t * 1.3).cos() * 60.0);
    let heading = position - wanderer.translation;
    wanderer.translation = position;
    if heading.length_squared() > f32::EPSILON {
        wanderer.look_to(heading, Vec3::Y);
    }
}

fn toggle_focus(
    keys: Res<ButtonInput<KeyCode>>,
    wanderer: Single<Entity, With<Wanderer>>,
    mut rigs: Query<&mut OrbitRig>,
) {
    if !keys.just_pressed(KeyCode::KeyF) {
        return;
    }
    for mut rig in &mut rigs {
        let focus = match rig.focus() {
            Some(_) => None,
            None => Some(*wanderer),
        };
        rig.set_focus(focus);
    }
}

fn report_right_clicks(mouse: Res<ButtonInput<MouseButton>>, guard: Res<ClickGuard>) {
    if mouse.just_released(MouseButton::Right) && !guard.ignore_right_click() {
        info!("Right click");
    }
}

//
// --- The below code is not important for the example ---
//

fn setup_ui(mut commands: Commands) {
    let text = "Left Mouse - Pan (when not following)\n\
        Right Mouse, or Ctrl + Left Mouse - Orbit\n\
        Scroll, +/- - Zoom\n\
        F - Toggle following the cube";
    commands.spawn((
        Text::new(text),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        Node {
            margin: UiRect::all(Val::Px(20.0)),
            ..Default::default()
        },
    ));
}
