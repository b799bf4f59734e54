use cgmath::{MetricSpace, Point2};
use hexscape::utils::{
    ease_in_out_cubic, hexagon_points, physical_to_logical, pinch_distance, touch_to_pointer,
};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, Touch, TouchPhase},
};

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn easing_hits_its_fixed_points() {
    assert_close(ease_in_out_cubic(0.0), 0.0);
    assert_close(ease_in_out_cubic(0.5), 0.5);
    assert_close(ease_in_out_cubic(1.0), 1.0);
}

#[test]
fn easing_is_slow_at_both_ends() {
    assert_close(ease_in_out_cubic(0.25), 0.0625);
    assert_close(ease_in_out_cubic(0.75), 0.9375);
}

#[test]
fn easing_never_goes_backwards() {
    let samples: Vec<f32> = (0..=100).map(|i| ease_in_out_cubic(i as f32 / 100.0)).collect();
    for pair in samples.windows(2) {
        assert!(pair[1] >= pair[0], "{} came after {}", pair[1], pair[0]);
    }
}

#[test]
fn pinch_distance_is_euclidean() {
    let distance = pinch_distance(Point2::new(10.0, 20.0), Point2::new(13.0, 24.0));
    assert!((distance - 5.0).abs() < 1e-9);
    assert_eq!(pinch_distance(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)), 0.0);
}

#[test]
fn hexagon_corners_sit_on_the_circumcircle() {
    let corners = hexagon_points(2.0);
    assert_close(corners[0].x, 2.0);
    assert_close(corners[0].y, 0.0);
    assert_close(corners[3].x, -2.0);
    assert_close(corners[1].y, 3f32.sqrt());
    for corner in corners {
        assert_close(corner.distance(Point2::new(0.0, 0.0)), 2.0);
    }
}

#[test]
fn touch_becomes_pointer_at_the_same_position() {
    let touch = Touch {
        device_id: DeviceId::dummy(),
        phase: TouchPhase::Started,
        location: PhysicalPosition::new(12.5, 40.0),
        force: None,
        id: 7,
    };
    assert_eq!(touch_to_pointer(&touch, 1.0), Point2::new(12.5, 40.0));
}

#[test]
fn touch_is_measured_in_logical_pixels() {
    let touch = Touch {
        device_id: DeviceId::dummy(),
        phase: TouchPhase::Moved,
        location: PhysicalPosition::new(300.0, 90.0),
        force: None,
        id: 1,
    };
    assert_eq!(touch_to_pointer(&touch, 2.0), Point2::new(150.0, 45.0));
}

#[test]
fn physical_positions_scale_down_to_logical() {
    assert_eq!(
        physical_to_logical(PhysicalPosition::new(30.0, 15.0), 1.5),
        Point2::new(20.0, 10.0)
    );
}
