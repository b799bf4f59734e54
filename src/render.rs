//! Drawing the tile grid.
//!
//! [`TileRenderer`] keeps the GPU copy of the grid: the shared hexagon mesh, one
//! instance per tile and the bloom chain. It is synced from a
//! [`TileManager`] once per frame, and only re-uploads instance data when the
//! manager reports a new generation.

use crate::{
    config::BloomConfig,
    data_structures::{
        instance::{InstanceRaw, TileInstance},
        mesh::{TileGeometry, TileMesh},
    },
    pipelines::{basic::mk_tile_pipeline, bloom::Bloom},
    tiles::TileManager,
};

#[derive(Debug)]
pub struct TileRenderer {
    pipeline: wgpu::RenderPipeline,
    mesh: TileMesh,
    instance_buffer: wgpu::Buffer,
    /// Number of instances `instance_buffer` has room for.
    instance_capacity: usize,
    num_instances: u32,
    synced_generation: Option<u64>,
    bloom: Bloom,
    disposed: bool,
}

impl TileRenderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        size: [u32; 2],
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        tiles: &TileManager,
        bloom: BloomConfig,
    ) -> Self {
        let pipeline = mk_tile_pipeline(
            device,
            format,
            camera_bind_group_layout,
            light_bind_group_layout,
        );
        let geometry = tiles
            .geometry()
            .cloned()
            .unwrap_or_else(|| TileGeometry::extruded_hexagon(tiles.hex_size()));
        let mesh = TileMesh::upload(device, &geometry);
        let instance_capacity = tiles.tiles().len().max(1);
        let instance_buffer = mk_instance_buffer(device, instance_capacity);
        let bloom = Bloom::new(device, format, size, bloom);

        let mut renderer = Self {
            pipeline,
            mesh,
            instance_buffer,
            instance_capacity,
            num_instances: 0,
            synced_generation: None,
            bloom,
            disposed: false,
        };
        renderer.sync(device, queue, tiles);
        renderer
    }

    /// Upload the current look of every tile if it changed since the last
    /// sync. Returns whether anything was uploaded.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, tiles: &TileManager) -> bool {
        if self.disposed || self.synced_generation == Some(tiles.generation()) {
            return false;
        }
        let instances: Vec<InstanceRaw> = tiles
            .tiles()
            .iter()
            .filter_map(|tile| {
                let material = tiles.material(tile.material())?;
                Some(TileInstance::new(tile, material).to_raw())
            })
            .collect();

        if instances.len() > self.instance_capacity {
            log::debug!(
                "Growing instance buffer from {} to {} tiles",
                self.instance_capacity,
                instances.len()
            );
            self.instance_buffer.destroy();
            self.instance_capacity = instances.len();
            self.instance_buffer = mk_instance_buffer(device, self.instance_capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.num_instances = instances.len() as u32;
        self.synced_generation = Some(tiles.generation());
        true
    }

    pub fn num_instances(&self) -> u32 {
        self.num_instances
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        if self.disposed {
            return;
        }
        self.bloom.resize(device, size);
    }

    /// Draw the grid into the bloom chain and composite the result into
    /// `target`. `depth` must match the size last passed to
    /// [`TileRenderer::resize`].
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
        clear_colour: wgpu::Color,
    ) {
        if self.disposed {
            return;
        }
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Tile Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.bloom.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if self.num_instances > 0 {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, camera_bind_group, &[]);
                render_pass.set_bind_group(1, light_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..self.mesh.num_elements, 0, 0..self.num_instances);
            }
        }
        self.bloom.apply(encoder, target);
    }

    /// Release every GPU buffer and texture. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.mesh.destroy();
        self.instance_buffer.destroy();
        self.bloom.destroy();
        self.num_instances = 0;
        self.disposed = true;
        log::debug!("Released tile GPU resources");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

fn mk_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Tile Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
