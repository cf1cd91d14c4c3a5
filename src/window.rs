use std::num::NonZeroU32;
use std::sync::Arc;

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::error::ViewerError;

fn init_err(what: &str, err: impl std::fmt::Display) -> ViewerError {
    ViewerError::Initialization(format!("{what}: {err}"))
}

/// The window plus its current GL context and surface. Owns the `glow`
/// context handed to the renderer; everything lives and dies on the one
/// thread that runs the event loop.
pub struct WindowContext {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    gl: Arc<glow::Context>,
}

impl WindowContext {
    /// Creates a fixed-size, non-resizable window with a double-buffered
    /// OpenGL 3.3 core context and vsync enabled.
    pub fn create(
        event_loop: &ActiveEventLoop,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, ViewerError> {
        let window_attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(window_attributes))
            .build(event_loop, template, |mut configs| {
                configs.next().expect("no matching GL configuration")
            })
            .map_err(|e| init_err("failed to create window and GL display", e))?;
        let window =
            window.ok_or_else(|| ViewerError::Initialization("no window was created".into()))?;

        let raw_window_handle = window
            .window_handle()
            .map_err(|e| init_err("failed to get window handle", e))?
            .as_raw();
        let gl_display = gl_config.display();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_window_handle));
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| init_err("failed to create GL context", e))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(|e| init_err("failed to build surface attributes", e))?;
        let surface =
            unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
                .map_err(|e| init_err("failed to create window surface", e))?;

        let context = not_current
            .make_current(&surface)
            .map_err(|e| init_err("failed to make GL context current", e))?;

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| {
                gl_display.get_proc_address(name) as *const _
            })
        };

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            log::warn!("vsync unavailable: {e}");
        }

        Ok(Self {
            window,
            surface,
            context,
            gl: Arc::new(gl),
        })
    }

    pub fn gl(&self) -> Arc<glow::Context> {
        self.gl.clone()
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Presents the frame; blocks on vsync.
    pub fn swap_buffers(&self) -> Result<(), ViewerError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| ViewerError::Present(e.to_string()))
    }
}
