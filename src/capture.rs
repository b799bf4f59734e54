//! Headless rendering for golden image tests.
//!
//! Draws a [`HexScene`] exactly like the application does, but into an
//! offscreen texture that is copied back to the CPU.

use anyhow::Context as _;
use instant::Duration;

use crate::{
    camera::CameraResources,
    data_structures::texture::Texture,
    pipelines::light::{LightResources, LightUniform},
    render::TileRenderer,
    scene::HexScene,
};

/// Colour format of captured frames.
pub const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Debug)]
pub struct Headless {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl Headless {
    pub async fn new() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("No GPU adapter available for headless rendering")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .context("Cannot open the GPU device")?;
        Ok(Self { device, queue })
    }

    /// Render one frame of `scene` at `size` and return it as tightly packed
    /// RGBA8 rows.
    pub async fn capture(&self, scene: &HexScene, size: [u32; 2]) -> anyhow::Result<Vec<u8>> {
        let [width, height] = [size[0].max(1), size[1].max(1)];
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let target = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Golden Image Test Output Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = Texture::create_depth_texture(&self.device, [width, height], "capture_depth");

        let camera = CameraResources::new(&self.device, scene.camera().camera(), scene.projection());
        let light = LightResources::new(&self.device, LightUniform::default());
        let mut renderer = TileRenderer::new(
            &self.device,
            &self.queue,
            CAPTURE_FORMAT,
            [width, height],
            &camera.bind_group_layout,
            &light.bind_group_layout,
            scene.tile_manager(),
            scene.config().bloom,
        );

        // Rows of a texture copy must be aligned to 256 bytes.
        let unpadded_row = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            size: (padded_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("Golden Image Output Buffer"),
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        renderer.draw(
            &mut encoder,
            &target_view,
            &depth.view,
            &camera.bind_group,
            &light.bind_group,
            scene.config().clear_colour,
        );
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            extent,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let pixels = {
            let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
            let buffer_slice = output_buffer.slice(..);
            buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
                if tx.send(result).is_err() {
                    log::warn!("Capture finished after its receiver was dropped");
                }
            });
            self.device.poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })?;
            rx.receive()
                .await
                .context("Buffer mapping was cancelled")?
                .context("Cannot map the capture buffer")?;

            let data = buffer_slice.get_mapped_range();
            data.chunks(padded_row as usize)
                .flat_map(|row| &row[..unpadded_row as usize])
                .copied()
                .collect::<Vec<u8>>()
        };

        output_buffer.unmap();
        output_buffer.destroy();
        renderer.dispose();
        camera.buffer.destroy();
        light.destroy();
        depth.destroy();
        target.destroy();
        Ok(pixels)
    }
}
