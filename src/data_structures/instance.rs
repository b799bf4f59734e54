//! Per-tile instance data for GPU rendering.
//!
//! All tiles share the same mesh; position and material colours are stored
//! per instance and passed to the vertex shader, so the whole grid is a single
//! instanced draw call.

use cgmath::Vector3;

use crate::data_structures::{
    mesh::Vertex,
    tile::{Material, Tile},
};

/// CPU-side instance: where a tile is and what it currently looks like.
#[derive(Clone, Debug, PartialEq)]
pub struct TileInstance {
    pub position: Vector3<f32>,
    pub colour: [f32; 3],
    pub emissive: [f32; 3],
}

impl TileInstance {
    pub fn new(tile: &Tile, material: &Material) -> Self {
        Self {
            position: tile.position,
            colour: material.colour,
            emissive: material.emitted(),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            colour: self.colour,
            emissive: self.emissive,
        }
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    colour: [f32; 3],
    emissive: [f32; 3],
}

/**
 * Stride layout: the model matrix as four vec4 columns, followed by the base
 * colour and the emitted colour. Locations start at 5 so they never clash with
 * the per-vertex attributes of `ModelVertex`.
 */
impl Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per tile, not once per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}
