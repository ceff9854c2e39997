//! The rig's systems running inside an [`App`], without a window or renderer.

use std::time::Duration;

use bevy_app::prelude::*;
use bevy_ecs::{event::Events, prelude::*};
use bevy_input::{
    mouse::{MouseButton, MouseButtonInput, MouseScrollUnit, MouseWheel},
    ButtonState as InputButtonState,
};
use bevy_math::prelude::*;
use bevy_orbit_rig::{
    controller::{backends::EventInput, inputs::InputBackend, inputs::RawInput},
    prelude::*,
};
use bevy_picking::{backend::HitData, hover::HoverMap, pointer::PointerId};
use bevy_render::camera::{Camera, PerspectiveProjection, Projection};
use bevy_time::prelude::*;
use bevy_transform::prelude::*;
use bevy_ui::Node;
use bevy_window::{CursorMoved, PrimaryWindow, RequestRedraw, Window};

fn step(app: &mut App) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(1.0 / 60.0));
    app.update();
}

fn rig_app(settings: RigSettings) -> (App, Entity, Entity) {
    let mut app = App::new();
    app.add_event::<RequestRedraw>()
        .init_resource::<Time>()
        .add_systems(Update, OrbitRig::advance_rigs);

    let camera = app
        .world_mut()
        .spawn((
            Camera::default(),
            Projection::Perspective(PerspectiveProjection::default()),
            Transform::from_xyz(0.0, 0.0, 500.0),
        ))
        .id();
    let rig = app
        .world_mut()
        .spawn((
            OrbitRig::new(camera, settings),
            Transform::from_rotation(OrbitAngles::new(30.0, 0.0).to_quat()),
        ))
        .add_child(camera)
        .id();
    (app, rig, camera)
}

#[test]
fn first_frame_initializes_from_the_scene() {
    let (mut app, rig, camera) = rig_app(RigSettings::default());
    step(&mut app);

    let world = app.world();
    let state = world.get::<OrbitRig>(rig).unwrap();
    assert!(state.is_initialized());
    assert_eq!(state.camera_distance(), 500.0);
    assert!((state.orbit().pitch - 30.0).abs() < 1e-3);
    let Some(Projection::Perspective(perspective)) = world.get::<Projection>(camera) else {
        panic!("camera lost its perspective projection");
    };
    assert!((perspective.fov - 40.0_f32.to_radians()).abs() < 1e-6);
    assert_eq!(world.get::<Transform>(camera).unwrap().translation.z, 500.0);
}

#[test]
fn a_zoom_tick_moves_the_camera_along_the_boom() {
    let (mut app, rig, camera) = rig_app(RigSettings::default());
    step(&mut app);

    app.world_mut()
        .get_mut::<OrbitRig>(rig)
        .unwrap()
        .sample_input(
            &RawInput {
                scroll: 1.0,
                ..Default::default()
            },
            false,
            &mut ClickGuard::default(),
        );
    step(&mut app);

    let world = app.world();
    let distance = world.get::<OrbitRig>(rig).unwrap().camera_distance();
    let z = world.get::<Transform>(camera).unwrap().translation.z;
    assert!(z < 500.0, "{z}");
    assert_eq!(z, distance);
    assert!(!world.resource::<Events<RequestRedraw>>().is_empty());
}

#[test]
fn missing_camera_is_skipped() {
    let mut app = App::new();
    app.add_event::<RequestRedraw>()
        .init_resource::<Time>()
        .add_systems(Update, OrbitRig::advance_rigs);
    let not_a_camera = app.world_mut().spawn(Transform::default()).id();
    let rig = app
        .world_mut()
        .spawn((
            OrbitRig::new(not_a_camera, RigSettings::default()),
            Transform::default(),
        ))
        .id();
    step(&mut app);
    assert!(!app.world().get::<OrbitRig>(rig).unwrap().is_initialized());
}

#[test]
fn raw_events_are_folded_into_frames() {
    let mut app = App::new();
    app.add_event::<MouseButtonInput>()
        .add_event::<bevy_input::keyboard::KeyboardInput>()
        .add_event::<CursorMoved>()
        .add_event::<MouseWheel>()
        .init_resource::<EventInput>()
        .add_systems(Update, EventInput::collect);
    let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();
    let other_window = app.world_mut().spawn(Window::default()).id();

    let world = app.world_mut();
    world.send_event(MouseButtonInput {
        button: MouseButton::Left,
        state: InputButtonState::Pressed,
        window,
    });
    world.send_event(MouseWheel {
        unit: MouseScrollUnit::Pixel,
        x: 0.0,
        y: 32.0,
        window,
    });
    world.send_event(MouseWheel {
        unit: MouseScrollUnit::Line,
        x: 0.0,
        y: 1.0,
        window,
    });
    world.send_event(CursorMoved {
        window,
        position: Vec2::new(5.0, 6.0),
        delta: None,
    });
    world.send_event(CursorMoved {
        window: other_window,
        position: Vec2::new(900.0, 900.0),
        delta: None,
    });
    app.update();

    let input = app.world().resource::<EventInput>();
    assert_eq!(input.mouse_button(MouseButton::Left), ButtonState::PRESSED);
    assert_eq!(input.scroll(), 3.0);
    assert_eq!(input.pointer_position(), Some(Vec2::new(5.0, 6.0)));

    app.update();
    let input = app.world().resource::<EventInput>();
    assert_eq!(input.mouse_button(MouseButton::Left), ButtonState::HELD);
    assert_eq!(input.scroll(), 0.0);

    app.world_mut().send_event(MouseButtonInput {
        button: MouseButton::Left,
        state: InputButtonState::Released,
        window,
    });
    app.update();
    let input = app.world().resource::<EventInput>();
    assert_eq!(input.mouse_button(MouseButton::Left), ButtonState::RELEASED);
}

#[test]
fn hovering_a_ui_node_sets_the_flag() {
    let mut app = App::new();
    app.init_resource::<PointerOverUi>()
        .init_resource::<HoverMap>()
        .add_systems(Update, PointerOverUi::update_from_picking);
    let camera = app.world_mut().spawn_empty().id();
    let node = app.world_mut().spawn(Node::default()).id();
    let scenery = app.world_mut().spawn(Transform::default()).id();

    let hover = |app: &mut App, entity: Entity| {
        let mut hover_map = app.world_mut().resource_mut::<HoverMap>();
        hover_map.0.clear();
        hover_map
            .0
            .entry(PointerId::Mouse)
            .or_default()
            .insert(entity, HitData::new(camera, 1.0, None, None));
    };

    hover(&mut app, scenery);
    app.update();
    assert!(!app.world().resource::<PointerOverUi>().0);

    hover(&mut app, node);
    app.update();
    assert!(app.world().resource::<PointerOverUi>().0);

    app.world_mut().resource_mut::<HoverMap>().0.clear();
    app.update();
    assert!(!app.world().resource::<PointerOverUi>().0);
}
