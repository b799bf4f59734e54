//! Camera pose, projection and the controller that moves them.
//!
//! [`CameraController`] exclusively owns the [`Camera`]. It is either idle,
//! taking manual pan/zoom/pinch input, or animating towards a focused tile
//! along a cubic ease-in-out curve. The GPU side ([`CameraUniform`],
//! [`CameraResources`]) lives at the bottom of this module.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector2, Vector3};
use instant::{Duration, Instant};
use wgpu::util::DeviceExt;

use crate::{config::CameraConfig, data_structures::tile::Tile, utils::ease_in_out_cubic};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A perspective camera described by a position and a viewing direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    forward: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        let mut camera = Self {
            position: position.into(),
            forward: -Vector3::unit_z(),
            up: Vector3::unit_y(),
        };
        camera.look_at(target.into());
        camera
    }

    /// Turn towards `target`. Looking at the camera's own position keeps the
    /// current direction.
    pub fn look_at(&mut self, target: Point3<f32>) {
        let direction = target - self.position;
        if direction.magnitude2() > f32::EPSILON {
            self.forward = direction.normalize();
        }
    }

    /// Unit vector the camera is looking along.
    pub fn direction(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward, self.up)
    }
}

/// Perspective projection; aspect ratio follows the surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Zero-sized surfaces keep the previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// OpenGL-style clip space; see [`OPENGL_TO_WGPU_MATRIX`] for the GPU.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Where the camera is and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
    pub started: Instant,
    pub from: CameraPose,
    pub to: CameraPose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    Idle,
    Animating(CameraAnimation),
}

#[derive(Debug)]
pub struct CameraController {
    camera: Camera,
    config: CameraConfig,
    mode: CameraMode,
}

impl CameraController {
    pub fn new(camera: Camera, config: CameraConfig) -> Self {
        Self {
            camera,
            config,
            mode: CameraMode::Idle,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.mode, CameraMode::Animating(_))
    }

    /// Move the camera to `position` and aim it at `target` right away.
    pub fn place(&mut self, position: Point3<f32>, target: Point3<f32>) {
        self.camera.position = position;
        self.camera.look_at(target);
    }

    /// The point `look_ahead` units in front of the camera.
    pub fn look_at_point(&self) -> Point3<f32> {
        self.camera.position + self.camera.direction() * self.config.look_ahead
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.camera.position,
            target: self.look_at_point(),
        }
    }

    pub fn start_smooth_pan_to_tile(&mut self, tile: &Tile) {
        self.start_smooth_pan_to_tile_at(tile, Instant::now());
    }

    pub fn start_smooth_pan_to_tile_at(&mut self, tile: &Tile, now: Instant) {
        self.start_smooth_pan_to_point_at(Point3::from_vec(tile.position), now);
    }

    /// Start easing towards a view of `focus` from `focus + focus_offset`.
    ///
    /// The current pose becomes the start of the animation, so a pan started
    /// while another is running continues smoothly from wherever it got to.
    pub fn start_smooth_pan_to_point_at(&mut self, focus: Point3<f32>, now: Instant) {
        let animation = CameraAnimation {
            started: now,
            from: self.pose(),
            to: CameraPose {
                position: focus + self.config.focus_offset,
                target: focus,
            },
        };
        log::debug!("Panning camera to {:?}", focus);
        self.mode = CameraMode::Animating(animation);
    }

    pub fn update_camera_animation(&mut self) -> bool {
        self.update_camera_animation_at(Instant::now())
    }

    /// Advance the animation to `now`. Returns whether it is still running.
    ///
    /// Once the configured duration has elapsed the camera is put exactly on
    /// the target pose and the controller becomes idle.
    pub fn update_camera_animation_at(&mut self, now: Instant) -> bool {
        let CameraMode::Animating(animation) = self.mode else {
            return false;
        };
        let elapsed = if now > animation.started {
            now.duration_since(animation.started)
        } else {
            Duration::ZERO
        };
        let duration = self.config.animation_duration;

        if elapsed >= duration {
            self.place(animation.to.position, animation.to.target);
            self.mode = CameraMode::Idle;
            return false;
        }

        let t = elapsed.as_secs_f32() / duration.as_secs_f32();
        let eased = ease_in_out_cubic(t);
        let lerp = |from: Point3<f32>, to: Point3<f32>| from + (to - from) * eased;
        self.place(
            lerp(animation.from.position, animation.to.position),
            lerp(animation.from.target, animation.to.target),
        );
        true
    }

    /// Slide the camera parallel to the ground by a screen-space drag delta.
    ///
    /// Dragging right moves the view left, dragging down moves it forward.
    pub fn handle_pan(&mut self, delta: Vector2<f32>) {
        let up = Vector3::unit_y();
        let right = self.camera.direction().cross(up);
        if right.magnitude2() <= f32::EPSILON {
            log::warn!("Ignoring pan while looking straight along the up axis");
            return;
        }
        let right = right.normalize();
        let forward = up.cross(right).normalize();

        let speed = self.config.pan_speed;
        self.camera.position += right * (-delta.x * speed);
        self.camera.position += forward * (delta.y * speed);
        self.reaim();
    }

    /// Move along the viewing direction by `delta · zoom_speed`.
    pub fn handle_zoom(&mut self, delta: f32) {
        self.dolly(delta * self.config.zoom_speed);
    }

    /// Move along the viewing direction proportionally to a change in the
    /// distance between two fingers. Spreading them apart moves forward.
    pub fn handle_pinch_zoom(&mut self, pinch_delta: f32) {
        let direction = if pinch_delta > 0.0 { 1.0 } else { -1.0 };
        self.dolly(pinch_delta.abs() * self.config.pinch_zoom_speed * direction);
    }

    fn dolly(&mut self, distance: f32) {
        self.camera.position += self.camera.direction() * distance;
        self.reaim();
    }

    fn reaim(&mut self) {
        let target = self.look_at_point();
        self.camera.look_at(target);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj =
            (OPENGL_TO_WGPU_MATRIX * projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// The camera uniform together with its buffer and bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: &Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
