//! Procedural hexagon tile geometry.
//!
//! Every tile shares one extruded, chamfered hexagon. The mesh is built on the
//! CPU once and uploaded once; tiles only differ by their instance data.

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use crate::utils::hexagon_points;

/// Describes how a vertex type is laid out in a GPU vertex buffer.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// The convex volume a tile occupies, relative to its position.
///
/// Used for hit-testing: a flat-topped hexagonal prism with the given apothem
/// (center to edge distance) spanning `bottom..=top` vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrismHull {
    pub apothem: f32,
    pub bottom: f32,
    pub top: f32,
}

/// Shared tile geometry: a hexagon extruded upwards with a chamfered rim.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGeometry {
    pub radius: f32,
    pub depth: f32,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u16>,
}

impl TileGeometry {
    pub const DEPTH: f32 = 0.2;
    pub const BEVEL: f32 = 0.05;

    /// The standard tile: depth 0.2 with a 0.05 bevel on both rims.
    pub fn extruded_hexagon(radius: f32) -> Self {
        Self::new(radius, Self::DEPTH, Self::BEVEL, Self::BEVEL)
    }

    pub fn new(radius: f32, depth: f32, bevel_thickness: f32, bevel_size: f32) -> Self {
        // Outline rings from bottom to top as (radius, height).
        let rings = [
            (radius, -bevel_thickness),
            (radius + bevel_size, 0.0),
            (radius + bevel_size, depth),
            (radius, depth + bevel_thickness),
        ];
        let corners = hexagon_points(1.0);
        // The outline lies in the xz plane; the hexagon's y becomes -z.
        let corner = |i: usize, (r, h): (f32, f32)| {
            let p = corners[i % 6];
            Vector3::new(p.x * r, h, -p.y * r)
        };

        let mut builder = MeshBuilder::default();

        let (bottom_radius, bottom_height) = rings[0];
        let (top_radius, top_height) = rings[3];
        for i in 0..6 {
            builder.triangle(
                Vector3::new(0.0, top_height, 0.0),
                corner(i, (top_radius, top_height)),
                corner(i + 1, (top_radius, top_height)),
                Vector3::unit_y(),
            );
            builder.triangle(
                Vector3::new(0.0, bottom_height, 0.0),
                corner(i, (bottom_radius, bottom_height)),
                corner(i + 1, (bottom_radius, bottom_height)),
                -Vector3::unit_y(),
            );
        }

        for band in rings.windows(2) {
            for i in 0..6 {
                let (a, b) = (corner(i, band[0]), corner(i + 1, band[0]));
                let (c, d) = (corner(i + 1, band[1]), corner(i, band[1]));
                let mid = (a + b + c + d) / 4.0;
                let outward = Vector3::new(mid.x, 0.0, mid.z).normalize();
                builder.quad(a, b, c, d, outward);
            }
        }

        Self {
            radius,
            depth,
            bevel_thickness,
            bevel_size,
            vertices: builder.vertices,
            indices: builder.indices,
        }
    }

    pub fn hull(&self) -> PrismHull {
        PrismHull {
            apothem: (self.radius + self.bevel_size) * 3f32.sqrt() / 2.0,
            bottom: -self.bevel_thickness,
            top: self.depth + self.bevel_thickness,
        }
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<ModelVertex>,
    indices: Vec<u16>,
}

impl MeshBuilder {
    /// Adds a flat-shaded triangle, flipping its winding so that the front
    /// face (counter-clockwise) points along `outward`.
    fn triangle(
        &mut self,
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
        outward: Vector3<f32>,
    ) {
        let mut normal = (b - a).cross(c - a);
        let (b, c) = if normal.dot(outward) < 0.0 {
            normal = -normal;
            (c, b)
        } else {
            (b, c)
        };
        let normal: [f32; 3] = normal.normalize().into();
        let base = self.vertices.len() as u16;
        for position in [a, b, c] {
            self.vertices.push(ModelVertex {
                position: position.into(),
                normal,
            });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    fn quad(
        &mut self,
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
        d: Vector3<f32>,
        outward: Vector3<f32>,
    ) {
        self.triangle(a, b, c, outward);
        self.triangle(a, c, d, outward);
    }
}

/// The shared geometry living on the GPU.
#[derive(Debug)]
pub struct TileMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl TileMesh {
    pub fn upload(device: &wgpu::Device, geometry: &TileGeometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tile Vertex Buffer"),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        // Index buffer size must be 4-byte aligned, pad odd u16 counts.
        let mut indices = geometry.indices.clone();
        if indices.len() % 2 == 1 {
            indices.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tile Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
        }
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}
