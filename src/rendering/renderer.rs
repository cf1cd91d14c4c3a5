use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::camera::Camera;
use crate::error::ViewerError;
use crate::mesh::Mesh;
use crate::rendering::gpu_mesh::GpuMesh;
use crate::rendering::shader::{ShaderPair, ShaderProgram};

/// Per-draw lighting uniforms.
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub object_color: Vec3,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub clear_color: [f32; 4],
    pub lighting: Lighting,
    /// Model matrix applied to the mesh, typically a fit scale.
    pub model: Mat4,
}

/// Owns the shader program and the uploaded mesh, and issues the per-frame
/// draw. All GL state flows through this struct; there are no ambient
/// globals.
pub struct Renderer {
    gl: Arc<glow::Context>,
    program: ShaderProgram,
    mesh: GpuMesh,
    options: RenderOptions,
}

impl Renderer {
    pub fn initialize(
        gl: Arc<glow::Context>,
        mesh: &Mesh,
        shaders: &ShaderPair,
        options: RenderOptions,
    ) -> Result<Self, ViewerError> {
        let program = ShaderProgram::link(&gl, shaders)?;
        let gpu_mesh = match GpuMesh::upload(&gl, mesh) {
            Ok(gpu_mesh) => gpu_mesh,
            Err(e) => {
                let mut program = program;
                program.destroy(&gl);
                return Err(e);
            }
        };

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);
        }

        log::info!("renderer initialized, draw params {:?}", gpu_mesh.params());
        Ok(Self {
            gl,
            program,
            mesh: gpu_mesh,
            options,
        })
    }

    /// Clears color and depth, binds the program, uploads the camera and
    /// lighting uniforms and draws the mesh.
    pub fn render_frame(&self, camera: &Camera, width: u32, height: u32) {
        let gl = &self.gl;
        let [r, g, b, a] = self.options.clear_color;

        unsafe {
            gl.viewport(0, 0, width as i32, height as i32);
            gl.clear_color(r, g, b, a);
            gl.clear_depth_f32(1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        self.program.bind(gl);
        let u = &self.program.uniforms;
        let view_pos = camera.position();
        let lighting = self.options.lighting;

        unsafe {
            gl.uniform_matrix_4_f32_slice(
                u.model.as_ref(),
                false,
                &self.options.model.to_cols_array(),
            );
            gl.uniform_matrix_4_f32_slice(
                u.view.as_ref(),
                false,
                &camera.view_matrix().to_cols_array(),
            );
            gl.uniform_matrix_4_f32_slice(
                u.projection.as_ref(),
                false,
                &camera.projection_matrix().to_cols_array(),
            );
            gl.uniform_3_f32(
                u.light_pos.as_ref(),
                lighting.light_position.x,
                lighting.light_position.y,
                lighting.light_position.z,
            );
            gl.uniform_3_f32(u.view_pos.as_ref(), view_pos.x, view_pos.y, view_pos.z);
            gl.uniform_3_f32(
                u.light_color.as_ref(),
                lighting.light_color.x,
                lighting.light_color.y,
                lighting.light_color.z,
            );
            gl.uniform_3_f32(
                u.object_color.as_ref(),
                lighting.object_color.x,
                lighting.object_color.y,
                lighting.object_color.z,
            );
        }

        self.mesh.draw(gl);

        unsafe {
            gl.use_program(None);
        }
    }

    /// Releases the GPU mesh and shader program. Safe to call repeatedly;
    /// releases happen exactly once.
    pub fn destroy(&mut self) {
        self.mesh.destroy(&self.gl);
        self.program.destroy(&self.gl);
    }
}
