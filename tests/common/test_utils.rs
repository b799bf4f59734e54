use cgmath::{InnerSpace, MetricSpace, Point2, Point3, Vector2};
use hexscape::{
    config::SceneConfig,
    input::GestureTarget,
    pick::Viewport,
    scene::HexScene,
};
use instant::{Duration, Instant};
use rand::{SeedableRng, rngs::StdRng};

pub(crate) const EPSILON: f32 = 1e-4;

/// Records every gesture it is handed, in order.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    clicks: Vec<Point2<f64>>,
    pans: Vec<Vector2<f32>>,
    pinches: Vec<f32>,
    zooms: Vec<f32>,
}

impl GestureTarget for Recorder {
    fn on_click(&mut self, position: Point2<f64>) {
        self.clicks.push(position);
    }

    fn on_pan(&mut self, delta: Vector2<f32>) {
        self.pans.push(delta);
    }

    fn on_pinch(&mut self, delta: f32) {
        self.pinches.push(delta);
    }

    fn on_zoom(&mut self, delta: f32) {
        self.zooms.push(delta);
    }
}

impl Recorder {
    pub fn clicks(&self) -> &[Point2<f64>] {
        &self.clicks
    }

    pub fn pans(&self) -> &[Vector2<f32>] {
        &self.pans
    }

    pub fn pinches(&self) -> &[f32] {
        &self.pinches
    }

    pub fn zooms(&self) -> &[f32] {
        &self.zooms
    }

    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty()
            && self.pans.is_empty()
            && self.pinches.is_empty()
            && self.zooms.is_empty()
    }
}

/// A simulated clock starting at an arbitrary instant.
pub(crate) struct Clock(Instant);

impl Clock {
    pub fn new() -> Self {
        Self(Instant::now())
    }

    pub fn at(&self, millis: u64) -> Instant {
        self.0 + Duration::from_millis(millis)
    }
}

pub(crate) fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub(crate) fn small_config(grid_size: usize) -> SceneConfig {
    SceneConfig {
        grid_size,
        ..SceneConfig::default()
    }
}

pub(crate) fn scene(grid_size: usize, seed: u64) -> HexScene {
    HexScene::new(
        small_config(grid_size),
        Viewport::new(800, 600),
        &mut seeded_rng(seed),
    )
}

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub(crate) fn assert_points_close(actual: Point3<f32>, expected: Point3<f32>) {
    assert!(
        actual.distance(expected) < EPSILON,
        "expected {expected:?}, got {actual:?}"
    );
}

pub(crate) fn assert_unit(vector: cgmath::Vector3<f32>) {
    assert_close(vector.magnitude(), 1.0);
}
