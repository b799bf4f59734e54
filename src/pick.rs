//! Hit-testing tiles under a screen position.
//!
//! A click is resolved in three steps:
//! 1. convert the pointer position to normalized device coordinates relative
//!    to the surface's bounding box ([`Viewport::to_ndc`])
//! 2. cast a ray from the camera through that point ([`Ray::from_camera`])
//! 3. intersect the ray with every tile's hexagonal prism and keep the nearest
//!    hit ([`intersect_tiles`])

use cgmath::{EuclideanSpace, InnerSpace, Point2, Point3, SquareMatrix, Transform, Vector3};

use crate::{
    camera::{Camera, Projection},
    data_structures::{
        mesh::PrismHull,
        tile::{Tile, TileId},
    },
};

/// The area of the host surface the scene is drawn into, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// A viewport anchored at the top-left corner of its surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: f64::from(width),
            height: f64::from(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Map a surface position to `[-1, 1]` on both axes with y pointing up.
    ///
    /// Returns `None` for an empty viewport.
    pub fn to_ndc(&self, position: Point2<f64>) -> Option<Point2<f32>> {
        if self.is_empty() {
            return None;
        }
        let x = ((position.x - self.left) / self.width) * 2.0 - 1.0;
        let y = -((position.y - self.top) / self.height) * 2.0 + 1.0;
        Some(Point2::new(x as f32, y as f32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Always unit length.
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The ray from the camera through a point given in normalized device
    /// coordinates. `None` if the view-projection cannot be inverted.
    pub fn from_camera(camera: &Camera, projection: &Projection, ndc: Point2<f32>) -> Option<Self> {
        let view_proj = projection.calc_matrix() * camera.calc_matrix();
        let inverse = view_proj.invert()?;
        let through = inverse.transform_point(Point3::new(ndc.x, ndc.y, 0.5));
        let direction = through - camera.position;
        if direction.magnitude2() <= f32::EPSILON {
            return None;
        }
        Some(Self::new(camera.position, direction))
    }

    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub tile: TileId,
    pub distance: f32,
    pub point: Point3<f32>,
}

/// Distance along `ray` to where it enters the prism `hull` placed at `base`.
///
/// Slab test against the three pairs of side faces of a flat-topped hexagon
/// and the horizontal top and bottom. Rays starting inside the prism do not
/// count as hits, matching front-face-only picking.
pub fn intersect_prism(ray: &Ray, base: Point3<f32>, hull: &PrismHull) -> Option<f32> {
    let (sin30, cos30) = (0.5_f32, 3f32.sqrt() / 2.0);
    let slabs = [
        (Vector3::new(cos30, 0.0, sin30), -hull.apothem, hull.apothem),
        (Vector3::new(0.0, 0.0, 1.0), -hull.apothem, hull.apothem),
        (Vector3::new(-cos30, 0.0, sin30), -hull.apothem, hull.apothem),
        (Vector3::unit_y(), hull.bottom, hull.top),
    ];

    let offset = ray.origin - base;
    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;
    for (normal, min, max) in slabs {
        let along = normal.dot(ray.direction);
        let from = normal.dot(offset);
        if along.abs() <= f32::EPSILON {
            // Parallel to this slab: either always inside it or never.
            if from < min || from > max {
                return None;
            }
            continue;
        }
        let (mut enter, mut exit) = ((min - from) / along, (max - from) / along);
        if enter > exit {
            std::mem::swap(&mut enter, &mut exit);
        }
        near = near.max(enter);
        far = far.min(exit);
        if near > far {
            return None;
        }
    }

    (near >= 0.0).then_some(near)
}

/// The nearest tile hit by `ray`, if any.
pub fn intersect_tiles(ray: &Ray, tiles: &[Tile], hull: &PrismHull) -> Option<Hit> {
    tiles
        .iter()
        .filter_map(|tile| {
            intersect_prism(ray, Point3::from_vec(tile.position), hull).map(|distance| Hit {
                tile: tile.id,
                distance,
                point: ray.at(distance),
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
