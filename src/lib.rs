//! hexscape
//!
//! An interactive grid of hexagonal tiles for native windows and the web.
//! Clicking or tapping a tile highlights it and eases the camera over to it;
//! dragging pans, and the wheel or a two-finger pinch zooms.
//!
//! High-level modules
//! - `scene`: the mounted scene tying tiles, camera and input together
//! - `tiles`: grid generation, selection highlighting and teardown
//! - `camera`: camera pose, projection, eased focus animation and uniforms
//! - `input`: gesture recognition over mouse, touch and wheel input
//! - `pick`: screen-to-world rays and tile hit-testing
//! - `data_structures`: tiles, materials, hexagon geometry, instances, textures
//! - `pipelines`: tile, light and bloom render pipelines
//! - `render`: the GPU copy of the grid and the per-frame draw
//! - `context`: window surface, device and shared uniforms
//! - `app`: the winit event loop
//! - `config`: tunable defaults
//!

pub mod app;
pub mod camera;
#[cfg(feature = "integration-tests")]
pub mod capture;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod input;
pub mod pick;
pub mod pipelines;
pub mod render;
pub mod scene;
pub mod tiles;
pub mod utils;

pub use app::run;
pub use config::SceneConfig;
pub use scene::HexScene;
