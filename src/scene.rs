//! A mounted hex scene: the tile grid, the camera and the input handler that
//! connects them.
//!
//! [`HexScene`] owns everything that does not touch the GPU, so it can be
//! driven headless in tests. The application loop in [`crate::app`] feeds it
//! window events and frame times and draws whatever it ends up holding.

use cgmath::{EuclideanSpace, Point2, Point3, Vector2};
use instant::Instant;
use rand::Rng;
use winit::event::WindowEvent;

use crate::{
    camera::{Camera, CameraController, Projection},
    config::SceneConfig,
    data_structures::tile::{Tile, TileId},
    input::{GestureTarget, InputHandler, PointerInput},
    pick::{Ray, Viewport, intersect_tiles},
    tiles::TileManager,
};

/// Where the camera starts before the grid is framed, on every axis.
const START_DISTANCE: f32 = 5.0;
/// Offset of the opening view from the center tile, on the xz plane.
const OPENING_OFFSET: f32 = 5.0;
const OPENING_HEIGHT: f32 = 5.0;

#[derive(Debug)]
pub struct HexScene {
    config: SceneConfig,
    /// Surface area in logical pixels, the space input positions arrive in.
    viewport: Viewport,
    /// Surface size in physical pixels.
    surface_size: [u32; 2],
    projection: Projection,
    tiles: TileManager,
    camera: CameraController,
    input: InputHandler,
    disposed: bool,
}

impl HexScene {
    /// Build the grid and frame its center tile.
    ///
    /// The camera starts at (5, 5, 5) looking at the origin. If the grid has
    /// a center tile the camera is moved diagonally above it, aimed at it, and
    /// the tile is selected. Input is attached right away.
    ///
    /// `viewport` is taken at a scale factor of 1; call
    /// [`HexScene::set_scale_factor`] for high density displays.
    pub fn new<R: Rng + ?Sized>(config: SceneConfig, viewport: Viewport, rng: &mut R) -> Self {
        let mut tiles = TileManager::new(config.hex_size);
        tiles.create_tiles(config.grid_size, rng);

        let camera = Camera::new(
            Point3::new(START_DISTANCE, START_DISTANCE, START_DISTANCE),
            Point3::origin(),
        );
        let mut camera = CameraController::new(camera, config.camera);

        if let Some(center) = tiles.center_tile(config.grid_size) {
            let focus = Point3::from_vec(center.position);
            let position = Point3::new(
                focus.x + OPENING_OFFSET,
                OPENING_HEIGHT,
                focus.z + OPENING_OFFSET,
            );
            let id = center.id;
            camera.place(position, focus);
            tiles.select_tile(id);
        } else {
            log::warn!("Grid of size {} has no center tile", config.grid_size);
        }

        let projection = Projection::new(
            viewport.width as u32,
            viewport.height as u32,
            config.camera.fovy,
            config.camera.znear,
            config.camera.zfar,
        );

        let mut input = InputHandler::new(config.input);
        input.attach();

        log::info!(
            "Mounted hex scene of {} tiles on a {}x{} surface",
            tiles.tiles().len(),
            viewport.width,
            viewport.height
        );

        Self {
            config,
            viewport,
            surface_size: [viewport.width as u32, viewport.height as u32],
            projection,
            tiles,
            camera,
            input,
            disposed: false,
        }
    }

    /// [`HexScene::new`] with the thread-local generator.
    pub fn from_entropy(config: SceneConfig, viewport: Viewport) -> Self {
        Self::new(config, viewport, &mut rand::rng())
    }

    /// Feed one raw input event. Returns whether it produced a gesture.
    pub fn handle_input(&mut self, input: &PointerInput, now: Instant) -> bool {
        let Self {
            viewport,
            projection,
            tiles,
            camera,
            input: handler,
            ..
        } = self;
        let mut target = SceneTarget {
            viewport,
            projection,
            tiles,
            camera,
            now,
        };
        handler.handle(input, now, &mut target)
    }

    /// Feed one winit window event. Returns whether it produced a gesture.
    pub fn handle_window_event(&mut self, event: &WindowEvent, now: Instant) -> bool {
        if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
            self.set_scale_factor(*scale_factor);
            return false;
        }
        let Self {
            viewport,
            projection,
            tiles,
            camera,
            input: handler,
            ..
        } = self;
        let mut target = SceneTarget {
            viewport,
            projection,
            tiles,
            camera,
            now,
        };
        handler.handle_window_event(event, now, &mut target)
    }

    /// Advance the camera animation. Returns whether it is still running.
    pub fn update(&mut self, now: Instant) -> bool {
        self.camera.update_camera_animation_at(now)
    }

    /// Follow a new surface size in physical pixels. Zero-sized surfaces are
    /// ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.surface_size = [width, height];
        self.fit_viewport();
        self.projection.resize(width, height);
        log::debug!("Resized scene to {}x{}", width, height);
    }

    /// Follow the window's scale factor, so that drag thresholds and pan
    /// speed are measured in logical pixels.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.input.set_scale_factor(scale_factor);
        self.fit_viewport();
        log::debug!("Scale factor is now {}", self.input.scale_factor());
    }

    fn fit_viewport(&mut self) {
        let scale = self.input.scale_factor();
        self.viewport.width = f64::from(self.surface_size[0]) / scale;
        self.viewport.height = f64::from(self.surface_size[1]) / scale;
    }

    /// Pan the camera to `id` and select it, as if it had been clicked.
    pub fn focus_tile(&mut self, id: TileId, now: Instant) {
        let Some(tile) = self.tiles.tile(id) else {
            log::warn!("Cannot focus unknown tile {:?}", id);
            return;
        };
        self.camera.start_smooth_pan_to_tile_at(tile, now);
        self.tiles.select_tile(id);
    }

    /// Stop listening to input and release every tile. Only the first call
    /// does anything.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.input.detach();
        self.tiles.dispose();
        self.disposed = true;
        log::info!("Disposed hex scene");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn tiles(&self) -> &[Tile] {
        self.tiles.tiles()
    }

    pub fn tile_manager(&self) -> &TileManager {
        &self.tiles
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn input(&self) -> &InputHandler {
        &self.input
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}

/// Routes recognised gestures to the tiles and the camera.
struct SceneTarget<'a> {
    viewport: &'a Viewport,
    projection: &'a Projection,
    tiles: &'a mut TileManager,
    camera: &'a mut CameraController,
    now: Instant,
}

impl GestureTarget for SceneTarget<'_> {
    fn on_click(&mut self, position: Point2<f64>) {
        let Some(ndc) = self.viewport.to_ndc(position) else {
            return;
        };
        let Some(ray) = Ray::from_camera(self.camera.camera(), self.projection, ndc) else {
            return;
        };
        let hit = self
            .tiles
            .geometry()
            .and_then(|geometry| intersect_tiles(&ray, self.tiles.tiles(), &geometry.hull()));

        match hit {
            Some(hit) => {
                self.tiles.select_tile(hit.tile);
                if let Some(tile) = self.tiles.tile(hit.tile) {
                    self.camera.start_smooth_pan_to_tile_at(tile, self.now);
                }
            }
            None => self.tiles.deselect_tile(),
        }
    }

    fn on_pan(&mut self, delta: Vector2<f32>) {
        self.camera.handle_pan(delta);
    }

    fn on_pinch(&mut self, delta: f32) {
        self.camera.handle_pinch_zoom(delta);
    }

    fn on_zoom(&mut self, delta: f32) {
        self.camera.handle_zoom(delta);
    }
}
