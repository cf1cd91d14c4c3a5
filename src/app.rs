use std::time::Duration;

use glam::{Mat4, Vec3};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::mesh::Mesh;
use crate::rendering::{Lighting, RenderOptions, Renderer, ShaderPair};
use crate::window::WindowContext;

/// Oversized models are scaled down so their largest extent fits this box.
const FIT_EXTENT: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    Stopped,
}

struct ViewerApp {
    config: ViewerConfig,
    mesh: Mesh,
    shaders: ShaderPair,
    camera: Camera,
    state: LoopState,
    window: Option<WindowContext>,
    renderer: Option<Renderer>,
    error: Option<ViewerError>,
}

impl ViewerApp {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window = WindowContext::create(
            event_loop,
            &self.config.title,
            self.config.width,
            self.config.height,
        )?;

        // The window manager may not honor the requested size; the projection
        // has to match the surface the viewport will cover.
        let (width, height) = window.size();
        self.camera
            .set_aspect(width as f32 / height.max(1) as f32)?;

        let options = RenderOptions {
            clear_color: self.config.clear_color,
            lighting: Lighting {
                light_position: Vec3::from(self.config.light_position),
                light_color: Vec3::from(self.config.light_color),
                object_color: Vec3::from(self.config.object_color),
            },
            model: Mat4::from_scale(Vec3::splat(self.mesh.fit_scale(FIT_EXTENT))),
        };
        let renderer = Renderer::initialize(window.gl(), &self.mesh, &self.shaders, options)?;

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn render(&mut self) -> Result<(), ViewerError> {
        let (Some(window), Some(renderer)) = (&self.window, &self.renderer) else {
            return Ok(());
        };
        let (width, height) = window.size();
        renderer.render_frame(&self.camera, width, height);
        window.swap_buffers()?;

        if let Some(delay) = self.config.frame_delay_ms {
            std::thread::sleep(Duration::from_millis(delay));
        }
        window.request_redraw();
        Ok(())
    }

    /// Releases GPU resources, then the context and window. Running this
    /// twice is harmless; every release goes through `Option::take`.
    fn shutdown(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.destroy();
        }
        self.renderer = None;
        self.window = None;
        self.state = LoopState::Stopped;
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("close requested, shutting down");
        self.shutdown();
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        self.error = Some(error);
        self.shutdown();
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(WindowContext::id) != Some(id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.stop(event_loop),
            WindowEvent::RedrawRequested => {
                if self.state != LoopState::Running {
                    return;
                }
                if let Err(e) = self.render() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }
}

fn build_camera(config: &ViewerConfig) -> Result<Camera, ViewerError> {
    Camera::new(
        Vec3::from(config.camera.position),
        Vec3::from(config.camera.target),
        Vec3::from(config.camera.up),
        config.camera.fov_y_deg,
        config.aspect(),
        config.camera.z_near,
        config.camera.z_far,
    )
}

/// Runs the viewer until the window is closed. Blocks on vsync each frame;
/// everything happens on the calling thread.
pub fn run(config: ViewerConfig, mesh: Mesh, shaders: ShaderPair) -> Result<(), ViewerError> {
    let camera = build_camera(&config)?;

    let event_loop = EventLoop::new()
        .map_err(|e| ViewerError::Initialization(format!("failed to create event loop: {e}")))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp {
        config,
        mesh,
        shaders,
        camera,
        state: LoopState::Running,
        window: None,
        renderer: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| ViewerError::Initialization(format!("event loop error: {e}")))?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_twice_is_a_no_op() {
        let config = ViewerConfig::default();
        let camera = build_camera(&config).unwrap();
        let mut app = ViewerApp {
            config,
            mesh: Mesh::triangle(),
            shaders: ShaderPair::flat(),
            camera,
            state: LoopState::Running,
            window: None,
            renderer: None,
            error: None,
        };

        app.shutdown();
        assert_eq!(app.state, LoopState::Stopped);
        assert!(app.window.is_none() && app.renderer.is_none());

        app.shutdown();
        assert_eq!(app.state, LoopState::Stopped);
        assert!(app.window.is_none() && app.renderer.is_none());
        assert!(app.error.is_none());
    }
}
