//! Math helpers shared by the scene, the camera and the input layer.

use std::f32::consts::PI;

use cgmath::{MetricSpace, Point2};
use winit::dpi::{LogicalPosition, PhysicalPosition};

/// Cubic ease-in-out on `t` in `[0, 1]`.
///
/// Accelerates through the first half and decelerates through the second; the
/// curve passes exactly through `0.5` at `t = 0.5`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Distance between two touch points in logical pixels.
pub fn pinch_distance(first: Point2<f64>, second: Point2<f64>) -> f64 {
    first.distance(second)
}

/// The six corners of a flat-topped hexagon with circumradius `size`,
/// starting on the positive x axis and winding counter-clockwise.
pub fn hexagon_points(size: f32) -> [Point2<f32>; 6] {
    std::array::from_fn(|i| {
        let angle = PI / 3.0 * i as f32;
        Point2::new(size * angle.cos(), size * angle.sin())
    })
}

/// Treats a touch contact as a pointer at the same position, in logical
/// pixels for the given window scale factor.
pub fn touch_to_pointer(touch: &winit::event::Touch, scale_factor: f64) -> Point2<f64> {
    physical_to_logical(touch.location, scale_factor)
}

/// Converts a winit surface position to logical (CSS) pixels.
///
/// `scale_factor` must be a positive, finite number; winit panics otherwise.
pub fn physical_to_logical(position: PhysicalPosition<f64>, scale_factor: f64) -> Point2<f64> {
    let logical: LogicalPosition<f64> = position.to_logical(scale_factor);
    Point2::new(logical.x, logical.y)
}
