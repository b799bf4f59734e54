//! Scene data structures: tiles, materials, geometry, instances and textures.
//!
//! - `tile` holds tiles, terrain kinds and materials
//! - `mesh` builds the shared hexagon geometry and its hit-test hull
//! - `instance` packs per-tile transform and colours for instanced drawing
//! - `texture` wraps depth and offscreen colour targets

pub mod instance;
pub mod mesh;
pub mod texture;
pub mod tile;
