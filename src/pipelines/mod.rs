//! Render pipelines and their GPU-side resources.
//!
//! - `basic` draws the instanced tiles
//! - `light` holds the light uniform the tiles are shaded with
//! - `bloom` post-processes the drawn scene into the final frame

pub mod basic;
pub mod bloom;
pub mod light;
