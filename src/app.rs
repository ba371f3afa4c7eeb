//! Application window and OpenGL context management.
//!
//! This module handles window creation and OpenGL context setup. It keeps
//! platform/graphics concerns out of the viewer logic.

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::config::WindowConfig;

/// Result of window and GL context creation.
pub struct WindowContext {
    pub window: Window,
    pub gl_surface: glutin::surface::Surface<WindowSurface>,
    pub gl_context: glutin::context::PossiblyCurrentContext,
    pub gl: Arc<glow::Context>,
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Create a window with an OpenGL 3.3 core context.
pub fn create_window(event_loop: &ActiveEventLoop, config: &WindowConfig) -> anyhow::Result<WindowContext> {
    let window_attrs = WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(true);

    let template = ConfigTemplateBuilder::new().with_alpha_size(8);
    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attrs));

    let (window, gl_config) = display_builder
        .build(event_loop, template, |configs| {
            configs
                .reduce(|accum, config| {
                    if config.num_samples() > accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .expect("display offered no GL configs")
        })
        .map_err(|e| anyhow!("failed to create window: {}", e))?;

    let window = window.context("display builder returned no window")?;
    let window_handle = window.window_handle().context("window has no native handle")?;
    let gl_display = gl_config.display();

    let context_attrs = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(Some(window_handle.as_raw()));

    let gl_context = unsafe {
        gl_display
            .create_context(&gl_config, &context_attrs)
            .context("failed to create OpenGL 3.3 context")?
    };

    let size = window.inner_size();
    let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        window_handle.as_raw(),
        non_zero(size.width),
        non_zero(size.height),
    );

    let gl_surface = unsafe {
        gl_display
            .create_window_surface(&gl_config, &surface_attrs)
            .context("failed to create window surface")?
    };

    let gl_context = gl_context
        .make_current(&gl_surface)
        .context("failed to make context current")?;

    if let Err(err) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN)) {
        tracing::warn!("vsync unavailable: {}", err);
    }

    let gl = Arc::new(unsafe {
        glow::Context::from_loader_function_cstr(|s| gl_display.get_proc_address(s) as *const _)
    });

    {
        use glow::HasContext;
        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        tracing::info!(
            gl_version = %version,
            scale_factor = window.scale_factor(),
            width = size.width,
            height = size.height,
            "window created"
        );
    }

    Ok(WindowContext {
        window,
        gl_surface,
        gl_context,
        gl,
    })
}

/// Resize the GL surface to match the window size.
pub fn resize_surface(
    gl_surface: &glutin::surface::Surface<WindowSurface>,
    gl_context: &glutin::context::PossiblyCurrentContext,
    width: u32,
    height: u32,
) {
    if width > 0 && height > 0 {
        gl_surface.resize(gl_context, non_zero(width), non_zero(height));
    }
}
