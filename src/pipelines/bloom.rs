//! Bloom post-processing.
//!
//! The scene is drawn into an offscreen target at full resolution. From there
//! a bright-pass extracts everything above the luminance threshold into a
//! half-resolution target, a separable gaussian blurs it back and forth
//! between two half-resolution targets, and the composite pass adds the glow
//! to the scene while writing the final frame.

use wgpu::util::DeviceExt;

use crate::{
    config::BloomConfig,
    data_structures::texture::{Texture, create_clamped_sampler},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomParams {
    direction: [f32; 2],
    texel_size: [f32; 2],
    threshold: f32,
    strength: f32,
    radius: f32,
    _padding: f32,
}

impl BloomParams {
    fn new(config: &BloomConfig, direction: [f32; 2], size: [u32; 2]) -> Self {
        Self {
            direction,
            texel_size: [1.0 / size[0].max(1) as f32, 1.0 / size[1].max(1) as f32],
            threshold: config.threshold,
            strength: config.strength,
            radius: config.radius,
            _padding: 0.0,
        }
    }
}

/// Everything that depends on the surface size.
#[derive(Debug)]
struct BloomTargets {
    scene: Texture,
    ping: Texture,
    pong: Texture,
    params: [wgpu::Buffer; 4],
    bright: wgpu::BindGroup,
    horizontal: wgpu::BindGroup,
    vertical: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

impl BloomTargets {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        format: wgpu::TextureFormat,
        size: [u32; 2],
        config: &BloomConfig,
    ) -> Self {
        let half = [(size[0] / 2).max(1), (size[1] / 2).max(1)];
        let scene = Texture::create_render_target(device, size, format, "bloom_scene_target");
        let ping = Texture::create_render_target(device, half, format, "bloom_ping_target");
        let pong = Texture::create_render_target(device, half, format, "bloom_pong_target");

        let params = [
            BloomParams::new(config, [0.0, 0.0], size),
            BloomParams::new(config, [1.0, 0.0], half),
            BloomParams::new(config, [0.0, 1.0], half),
            BloomParams::new(config, [0.0, 0.0], size),
        ]
        .map(|params| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bloom Params Buffer"),
                contents: bytemuck::cast_slice(&[params]),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        });

        let bind = |label: &str, source: &Texture, bloom: &Texture, params: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&source.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&bloom.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: params.as_entire_binding(),
                    },
                ],
                label: Some(label),
            })
        };

        // A texture cannot be sampled in the pass that renders to it, so the
        // unused second slot of each pass points at a texture it does not
        // write.
        let bright = bind("bloom_bright_bind_group", &scene, &pong, &params[0]);
        let horizontal = bind("bloom_horizontal_bind_group", &ping, &scene, &params[1]);
        let vertical = bind("bloom_vertical_bind_group", &pong, &scene, &params[2]);
        let composite = bind("bloom_composite_bind_group", &scene, &ping, &params[3]);

        Self {
            scene,
            ping,
            pong,
            params,
            bright,
            horizontal,
            vertical,
            composite,
        }
    }

    fn destroy(&self) {
        self.scene.destroy();
        self.ping.destroy();
        self.pong.destroy();
        for buffer in &self.params {
            buffer.destroy();
        }
    }
}

#[derive(Debug)]
pub struct Bloom {
    config: BloomConfig,
    format: wgpu::TextureFormat,
    size: [u32; 2],
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bright: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
    targets: BloomTargets,
}

impl Bloom {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: [u32; 2],
        config: BloomConfig,
    ) -> Self {
        let bind_group_layout = mk_bind_group_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("bloom.wgsl").into()),
        });

        let bright = mk_fullscreen_pipeline(device, &layout, &shader, "fs_bright", format);
        let blur = mk_fullscreen_pipeline(device, &layout, &shader, "fs_blur", format);
        let composite = mk_fullscreen_pipeline(device, &layout, &shader, "fs_composite", format);

        let sampler = create_clamped_sampler(device);
        let targets =
            BloomTargets::new(device, &bind_group_layout, &sampler, format, size, &config);

        Self {
            config,
            format,
            size,
            bind_group_layout,
            sampler,
            bright,
            blur,
            composite,
            targets,
        }
    }

    /// Where the scene has to be drawn for the glow to pick it up.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Recreate every target for a new surface size.
    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        if size == self.size {
            return;
        }
        self.targets.destroy();
        self.targets = BloomTargets::new(
            device,
            &self.bind_group_layout,
            &self.sampler,
            self.format,
            size,
            &self.config,
        );
        self.size = size;
    }

    /// Run the bright-pass, both blur directions and the composite into
    /// `output`.
    pub fn apply(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let targets = &self.targets;
        let passes = [
            ("Bloom Bright Pass", &targets.ping.view, &self.bright, &targets.bright),
            ("Bloom Horizontal Pass", &targets.pong.view, &self.blur, &targets.horizontal),
            ("Bloom Vertical Pass", &targets.ping.view, &self.blur, &targets.vertical),
            ("Bloom Composite Pass", output, &self.composite, &targets.composite),
        ];
        for (label, view, pipeline, bind_group) in passes {
            fullscreen_pass(encoder, label, view, pipeline, bind_group);
        }
    }

    pub fn destroy(&self) {
        self.targets.destroy();
    }
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
        multiview_mask: None,
    });
    render_pass.set_pipeline(pipeline);
    render_pass.set_bind_group(0, bind_group, &[]);
    render_pass.draw(0..3, 0..1);
}

fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            texture(0),
            texture(1),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("bloom_bind_group_layout"),
    })
}

fn mk_fullscreen_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
