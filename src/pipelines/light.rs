use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

/// Lighting of the scene: white ambient light plus a key and a fill light.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Directions point from the scene towards the light. The `w` component holds
/// the intensity.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    ambient: [f32; 4],
    key_direction: [f32; 4],
    fill_direction: [f32; 4],
}

impl LightUniform {
    /// `key` and `fill` are the positions of directional lights shining at
    /// the origin, paired with their intensities.
    pub fn new(ambient: f32, key: (Vector3<f32>, f32), fill: (Vector3<f32>, f32)) -> Self {
        let directional = |(position, intensity): (Vector3<f32>, f32)| {
            let direction = if position.magnitude2() > f32::EPSILON {
                position.normalize()
            } else {
                Vector3::unit_y()
            };
            [direction.x, direction.y, direction.z, intensity]
        };
        Self {
            ambient: [ambient, ambient, ambient, 1.0],
            key_direction: directional(key),
            fill_direction: directional(fill),
        }
    }

    pub fn ambient_intensity(&self) -> f32 {
        self.ambient[0]
    }

    pub fn key_direction(&self) -> Vector3<f32> {
        Vector3::new(self.key_direction[0], self.key_direction[1], self.key_direction[2])
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::new(
            1.2,
            (Vector3::new(5.0, 10.0, 7.5), 1.5),
            (Vector3::new(-5.0, 8.0, -7.5), 1.0),
        )
    }
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightUniform) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Uniform Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
