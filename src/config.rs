//! Tunable constants of the scene.
//!
//! Everything here has a sensible default through [`Default`]; hosts override
//! individual fields before handing the config to [`crate::scene::HexScene`]
//! or [`crate::app::run`].

use cgmath::{Deg, Vector3};
use instant::Duration;

/// Top-level configuration of a mounted hex scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Tiles per grid side; the grid holds `grid_size²` tiles.
    pub grid_size: usize,
    /// Circumradius of a single hexagon.
    pub hex_size: f32,
    pub input: InputConfig,
    pub camera: CameraConfig,
    pub bloom: BloomConfig,
    /// Background of the surface. Transparent lets the host page show through.
    pub clear_colour: wgpu::Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid_size: 64,
            hex_size: 1.0,
            input: InputConfig::default(),
            camera: CameraConfig::default(),
            bloom: BloomConfig::default(),
            clear_colour: wgpu::Color::TRANSPARENT,
        }
    }
}

/// Thresholds separating a click from a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputConfig {
    /// A release later than this after the press is never a click.
    pub drag_time_threshold: Duration,
    /// Pointer travel in pixels after which a press turns into a pan.
    pub drag_distance_threshold: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_time_threshold: Duration::from_millis(200),
            drag_distance_threshold: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub animation_duration: Duration,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub pinch_zoom_speed: f32,
    /// Where the camera ends up relative to a focused tile.
    pub focus_offset: Vector3<f32>,
    /// Distance of the look-at point in front of the camera.
    pub look_ahead: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            animation_duration: Duration::from_millis(1000),
            pan_speed: 0.01,
            zoom_speed: 0.3,
            pinch_zoom_speed: 0.05,
            focus_offset: Vector3::new(3.0, 3.0, 3.0),
            look_ahead: 10.0,
            fovy: Deg(50.0),
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// A very subtle glow around the brightest pixels (mostly the highlight).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomConfig {
    pub strength: f32,
    pub radius: f32,
    /// Luminance below which pixels do not glow.
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            strength: 0.05,
            radius: 0.7,
            threshold: 0.4,
        }
    }
}
