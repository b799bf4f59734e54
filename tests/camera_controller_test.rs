use cgmath::{Deg, EuclideanSpace, InnerSpace, MetricSpace, Point3, Vector2, Vector3};
use hexscape::{
    camera::{Camera, CameraController, CameraMode, Projection},
    config::CameraConfig,
    tiles::TileManager,
};

use crate::common::test_utils::{Clock, assert_close, assert_points_close, assert_unit, seeded_rng};

mod common;

fn controller_at(position: [f32; 3], target: [f32; 3]) -> CameraController {
    CameraController::new(Camera::new(position, target), CameraConfig::default())
}

#[test]
fn camera_looks_at_its_target() {
    let camera = Camera::new([0.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    assert_unit(camera.direction());
    let expected = Vector3::new(0.0, -1.0, -1.0).normalize();
    assert_close(camera.direction().dot(expected), 1.0);
}

#[test]
fn look_at_point_is_ahead_of_the_camera() {
    let controller = controller_at([0.0, 10.0, 0.0], [0.0, 0.0, 0.0]);
    assert_points_close(controller.look_at_point(), Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn animation_is_halfway_at_half_time() {
    let clock = Clock::new();
    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.start_smooth_pan_to_point_at(Point3::origin(), clock.at(0));
    assert!(controller.is_animating());

    assert!(controller.update_camera_animation_at(clock.at(500)));
    assert_points_close(controller.camera().position, Point3::new(6.5, 6.5, 6.5));
}

#[test]
fn animation_eases_in() {
    let clock = Clock::new();
    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.start_smooth_pan_to_point_at(Point3::origin(), clock.at(0));

    controller.update_camera_animation_at(clock.at(250));
    // eased progress at a quarter of the time is 0.0625
    assert_close(controller.camera().position.x, 10.0 - 7.0 * 0.0625);
}

#[test]
fn animation_snaps_to_the_target_and_goes_idle() {
    let clock = Clock::new();
    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let focus = Point3::new(2.0, 0.0, -4.0);
    controller.start_smooth_pan_to_point_at(focus, clock.at(0));

    assert!(!controller.update_camera_animation_at(clock.at(1000)));
    assert_eq!(*controller.mode(), CameraMode::Idle);
    assert_eq!(controller.camera().position, Point3::new(5.0, 3.0, -1.0));
    let expected = (focus - controller.camera().position).normalize();
    assert_close(controller.camera().direction().dot(expected), 1.0);

    // Updates after the end leave the camera alone.
    assert!(!controller.update_camera_animation_at(clock.at(5000)));
    assert_eq!(controller.camera().position, Point3::new(5.0, 3.0, -1.0));
}

#[test]
fn late_frames_snap_instead_of_overshooting() {
    let clock = Clock::new();
    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.start_smooth_pan_to_point_at(Point3::origin(), clock.at(0));
    assert!(!controller.update_camera_animation_at(clock.at(2500)));
    assert_eq!(controller.camera().position, Point3::new(3.0, 3.0, 3.0));
}

#[test]
fn update_before_the_start_keeps_the_starting_pose() {
    let clock = Clock::new();
    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.start_smooth_pan_to_point_at(Point3::origin(), clock.at(100));
    assert!(controller.update_camera_animation_at(clock.at(0)));
    assert_points_close(controller.camera().position, Point3::new(10.0, 10.0, 10.0));
}

#[test]
fn new_pan_continues_from_the_current_pose() {
    let clock = Clock::new();
    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.start_smooth_pan_to_point_at(Point3::origin(), clock.at(0));
    controller.update_camera_animation_at(clock.at(500));

    controller.start_smooth_pan_to_point_at(Point3::new(10.0, 0.0, 0.0), clock.at(500));
    match controller.mode() {
        CameraMode::Animating(animation) => {
            assert_points_close(animation.from.position, Point3::new(6.5, 6.5, 6.5));
            assert_eq!(animation.to.position, Point3::new(13.0, 3.0, 3.0));
        }
        CameraMode::Idle => panic!("expected a running animation"),
    }

    assert!(!controller.update_camera_animation_at(clock.at(1500)));
    assert_eq!(controller.camera().position, Point3::new(13.0, 3.0, 3.0));
}

#[test]
fn idle_update_does_nothing() {
    let clock = Clock::new();
    let mut controller = controller_at([1.0, 2.0, 3.0], [0.0, 0.0, 0.0]);
    let before = *controller.camera();
    assert!(!controller.update_camera_animation_at(clock.at(10)));
    assert_eq!(*controller.camera(), before);
}

#[test]
fn pans_to_a_tile_from_the_configured_offset() {
    let clock = Clock::new();
    let mut tiles = TileManager::new(1.0);
    tiles.create_tiles(4, &mut seeded_rng(3));
    let tile = tiles.center_tile(4).expect("center tile");

    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.start_smooth_pan_to_tile_at(tile, clock.at(0));
    controller.update_camera_animation_at(clock.at(1000));

    let focus = Point3::from_vec(tile.position);
    assert_points_close(controller.camera().position, focus + Vector3::new(3.0, 3.0, 3.0));
}

#[test]
fn dragging_right_moves_the_view_left() {
    let mut controller = controller_at([0.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let direction = controller.camera().direction();

    controller.handle_pan(Vector2::new(100.0, 0.0));

    assert_points_close(controller.camera().position, Point3::new(-1.0, 10.0, 10.0));
    assert_close(controller.camera().direction().dot(direction), 1.0);
}

#[test]
fn dragging_down_moves_the_view_forward_on_the_ground() {
    let mut controller = controller_at([0.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.handle_pan(Vector2::new(0.0, 100.0));
    assert_points_close(controller.camera().position, Point3::new(0.0, 10.0, 9.0));
}

#[test]
fn pan_is_ignored_when_looking_straight_down() {
    let mut controller = controller_at([0.0, 10.0, 0.0], [0.0, 0.0, 0.0]);
    controller.handle_pan(Vector2::new(50.0, 50.0));
    assert_eq!(controller.camera().position, Point3::new(0.0, 10.0, 0.0));
}

#[test]
fn wheel_zoom_moves_along_the_view() {
    let mut controller = controller_at([0.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let start = controller.camera().position.distance(Point3::origin());

    controller.handle_zoom(1.0);
    let closer = controller.camera().position.distance(Point3::origin());
    assert_close(start - closer, 0.3);

    controller.handle_zoom(-1.0);
    controller.handle_zoom(-1.0);
    let further = controller.camera().position.distance(Point3::origin());
    assert_close(further - start, 0.3);
}

#[test]
fn pinch_zoom_follows_the_sign_of_the_pinch() {
    let mut controller = controller_at([0.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    let start = controller.camera().position.distance(Point3::origin());

    controller.handle_pinch_zoom(10.0);
    let spread = controller.camera().position.distance(Point3::origin());
    assert_close(start - spread, 0.5);

    controller.handle_pinch_zoom(-10.0);
    let squeezed = controller.camera().position.distance(Point3::origin());
    assert_close(squeezed, start);

    controller.handle_pinch_zoom(0.0);
    assert_close(controller.camera().position.distance(Point3::origin()), start);
}

#[test]
fn manual_input_does_not_cancel_an_animation() {
    let clock = Clock::new();
    let mut controller = controller_at([10.0, 10.0, 10.0], [0.0, 0.0, 0.0]);
    controller.start_smooth_pan_to_point_at(Point3::origin(), clock.at(0));
    controller.handle_zoom(1.0);
    controller.handle_pan(Vector2::new(30.0, 0.0));
    assert!(controller.is_animating());
    assert!(!controller.update_camera_animation_at(clock.at(1000)));
    assert_eq!(controller.camera().position, Point3::new(3.0, 3.0, 3.0));
}

#[test]
fn projection_follows_the_surface_aspect() {
    let mut projection = Projection::new(800, 600, Deg(50.0), 0.1, 1000.0);
    assert_close(projection.aspect(), 800.0 / 600.0);
    projection.resize(1000, 500);
    assert_close(projection.aspect(), 2.0);
    projection.resize(0, 500);
    assert_close(projection.aspect(), 2.0);
}
