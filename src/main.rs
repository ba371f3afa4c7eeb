mod app;
mod camera;
mod cli;
mod config;
mod constants;
mod frame;
mod geometry;
mod input;
mod loader;
mod logger;
mod matrix;
mod renderer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use glutin::prelude::*;
use glutin::surface::WindowSurface;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorIcon, Window, WindowId};

use camera::{Camera, ViewportSize};
use config::ViewerConfig;
use constants::DEFAULT_DATA_DIR;
use frame::FrameScheduler;
use geometry::MapGeometry;
use input::{CursorAffordance, InputEvent, InputState};
use loader::MapSources;
use renderer::{GeometryBuffers, Renderer};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logger::init(cli.log_level.as_deref(), cli.log.as_deref())?;

    let config = ViewerConfig::load(cli.config.as_deref())?;
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let _profiler = if cli.profile {
        puffin::set_scopes_on(true);
        let address = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        let server = puffin_http::Server::new(&address)?;
        tracing::info!(%address, "serving profiler data");
        Some(server)
    } else {
        None
    };

    // Nothing is uploaded unless every source loads and validates.
    let geometry = loader::load_map(&MapSources::in_dir(&data_dir))
        .with_context(|| format!("cannot load map from {}", data_dir.display()))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = App::new(config, geometry);
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    config: ViewerConfig,
    geometry: MapGeometry,
    state: Option<ViewerState>,
    frames: FrameScheduler,
    failure: Option<anyhow::Error>,
}

struct ViewerState {
    // Window and GL
    window: Window,
    gl_surface: glutin::surface::Surface<WindowSurface>,
    gl_context: glutin::context::PossiblyCurrentContext,
    #[allow(dead_code)] // Keeps the context alive alongside the renderer
    gl: Arc<glow::Context>,

    // Rendering
    renderer: Renderer,
    buffers: GeometryBuffers,

    // View
    camera: Camera,
    input: InputState,
}

impl App {
    fn new(config: ViewerConfig, geometry: MapGeometry) -> Self {
        Self {
            config,
            geometry,
            state: None,
            frames: FrameScheduler::new(),
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{:#}", err);
        self.failure = Some(err);
        event_loop.exit();
    }
}

impl ViewerState {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig, geometry: &MapGeometry) -> anyhow::Result<Self> {
        let app::WindowContext {
            window,
            gl_surface,
            gl_context,
            gl,
        } = app::create_window(event_loop, &config.window)?;

        let renderer = Renderer::new(gl.clone(), config.render_style())?;
        let buffers = GeometryBuffers::upload(&gl, geometry)?;
        tracing::info!(
            face_indices = buffers.face_index_count(),
            edge_indices = buffers.edge_index_count(),
            "geometry uploaded"
        );
        window.set_title(&format!(
            "{} ({} faces)",
            config.window.title,
            geometry.triangle_count()
        ));

        let size = window.inner_size();
        let camera = config.camera(ViewportSize::new(size.width, size.height));

        Ok(Self {
            window,
            gl_surface,
            gl_context,
            gl,
            renderer,
            buffers,
            camera,
            input: InputState::new(),
        })
    }

    fn draw(&mut self) {
        self.renderer
            .render(&self.buffers, self.camera.matrices(), self.camera.viewport);
        if let Err(err) = self.gl_surface.swap_buffers(&self.gl_context) {
            tracing::error!("failed to present frame: {}", err);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match ViewerState::new(event_loop, &self.config, &self.geometry) {
            Ok(state) => {
                // The CPU copy is no longer needed once it lives on the GPU.
                self.geometry = MapGeometry::default();
                if self.frames.request() {
                    state.window.request_redraw();
                }
                self.state = Some(state);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        let input_event = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                None
            }
            WindowEvent::Resized(size) => {
                app::resize_surface(&state.gl_surface, &state.gl_context, size.width, size.height);
                Some(InputEvent::Resized {
                    width: size.width,
                    height: size.height,
                })
            }
            WindowEvent::KeyboardInput { event, .. } => {
                match (event.state, event.physical_key) {
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::Escape)) => {
                        event_loop.exit();
                        None
                    }
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::Home | KeyCode::KeyR)) => {
                        Some(InputEvent::ResetView)
                    }
                    _ => None,
                }
            }
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved {
                x: position.x,
                y: position.y,
            }),
            WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => Some(InputEvent::PrimaryPressed),
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => Some(InputEvent::PrimaryReleased),
            WindowEvent::MouseWheel { delta, .. } => {
                // Browser convention: positive delta scrolls down and zooms out.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -(y as f64) * self.config.view.wheel_line_delta,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y,
                };
                Some(InputEvent::Wheel { delta_y })
            }
            WindowEvent::RedrawRequested => {
                puffin::GlobalProfiler::lock().new_frame();
                self.frames.begin_frame();
                state.draw();
                tracing::trace!(frame = self.frames.frames_drawn(), "frame drawn");
                None
            }
            _ => None,
        };

        let Some(input_event) = input_event else {
            return;
        };
        let result = input::handle_event(&mut state.input, &mut state.camera, input_event);

        if let Some(cursor) = result.cursor {
            state.window.set_cursor(match cursor {
                CursorAffordance::Default => CursorIcon::Default,
                CursorAffordance::Grabbing => CursorIcon::Grabbing,
            });
        }
        if result.redraw && self.frames.request() {
            state.window.request_redraw();
        }
    }
}
