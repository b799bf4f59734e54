//! Application event loop.
//!
//! Owns the window, the GPU [`Context`], the [`HexScene`] and its
//! [`TileRenderer`], and drives them from winit callbacks.
//!
//! # Lifecycle
//!
//! Each frame, on `RedrawRequested`:
//! 1. advance the camera animation
//! 2. upload changed tile instances and the camera uniform
//! 3. draw the tiles and the bloom chain
//! 4. present and request the next frame
//!
//! `CloseRequested` and the loop exiting both tear the scene down; only the
//! first of them releases anything.

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::SceneConfig, context::Context, pick::Viewport, render::TileRenderer, scene::HexScene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Everything that exists once the window is up.
#[derive(Debug)]
pub(crate) struct AppState {
    pub(crate) ctx: Context,
    scene: HexScene,
    renderer: TileRenderer,
    is_surface_configured: bool,
    disposed: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let clear_colour = config.clear_colour;
        let bloom = config.bloom;
        let mut scene = HexScene::from_entropy(config, Viewport::new(size.width, size.height));
        scene.set_scale_factor(window.scale_factor());

        let ctx = Context::new(
            window,
            scene.camera().camera(),
            scene.projection(),
            clear_colour,
        )
        .await?;

        let renderer = TileRenderer::new(
            &ctx.device,
            &ctx.queue,
            ctx.config.format,
            ctx.size(),
            &ctx.camera.bind_group_layout,
            &ctx.light.bind_group_layout,
            scene.tile_manager(),
            bloom,
        );

        Ok(Self {
            ctx,
            scene,
            renderer,
            is_surface_configured: false,
            disposed: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || !self.ctx.resize(width, height) {
            return;
        }
        self.is_surface_configured = true;
        self.scene.resize(width, height);
        self.renderer.resize(&self.ctx.device, [width, height]);
        log::debug!("Surface resized to {}x{}", width, height);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured || self.disposed {
            return Ok(());
        }

        self.scene.update(Instant::now());
        self.renderer
            .sync(&self.ctx.device, &self.ctx.queue, self.scene.tile_manager());
        self.ctx.camera.write(
            &self.ctx.queue,
            self.scene.camera().camera(),
            self.scene.projection(),
        );

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.renderer.draw(
            &mut encoder,
            &view,
            &self.ctx.depth_texture.view,
            &self.ctx.camera.bind_group,
            &self.ctx.light.bind_group,
            self.ctx.clear_colour,
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scene.dispose();
        self.renderer.dispose();
        self.ctx.destroy();
        self.disposed = true;
    }
}

pub(crate) enum AppEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(String),
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<AppEvent>,
    config: Option<SceneConfig>,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            state: None,
        })
    }

    fn window_attributes() -> anyhow::Result<winit::window::WindowAttributes> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("hexscape");

        #[cfg(target_arch = "wasm32")]
        {
            use anyhow::Context as _;
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().context("No browser window")?;
            let document = window.document().context("No document")?;
            let canvas = document
                .get_element_by_id(CANVAS_ID)
                .with_context(|| format!("No element with id '{CANVAS_ID}'"))?;
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        Ok(window_attributes)
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only the first resume mounts the scene.
        let Some(config) = self.config.take() else {
            return;
        };

        let window = match Self::window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the window: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window, config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(mut app_state) => {
                    let size = app_state.ctx.window.inner_size();
                    app_state.resize(size.width, size.height);
                    self.state = Some(app_state);
                }
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok(app_state) => AppEvent::Initialized(Box::new(app_state)),
                    Err(e) => AppEvent::Failed(format!("{:#}", e)),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("The event loop closed before the scene was mounted");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(app_state) => {
                // This is the message from our wasm `spawn_local`
                let app_state = self.state.insert(*app_state);
                let size = app_state.ctx.window.inner_size();
                app_state.resize(size.width, size.height);
                app_state.ctx.window.request_redraw();
            }
            AppEvent::Failed(message) => {
                log::error!("App initialization failed: {}", message);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if state.scene.handle_window_event(&event, Instant::now()) {
            state.ctx.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                state.dispose();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(e) => {
                    log::error!("Unable to render {}", e);
                }
            },
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.dispose();
        }
    }
}

/// Open a window (or take over the `canvas` element on the web) and run the
/// scene until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {}", e).into());
        }
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(SceneConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
