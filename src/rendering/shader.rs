use std::fmt;
use std::fs;
use std::path::Path;

use glow::HasContext;

use crate::error::ViewerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Vertex and fragment shader source text.
#[derive(Debug, Clone)]
pub struct ShaderPair {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderPair {
    /// Phong-lit pair used for loaded models.
    pub fn phong() -> Self {
        Self {
            vertex: include_str!("../../shaders/phong.vert").into(),
            fragment: include_str!("../../shaders/phong.frag").into(),
        }
    }

    /// Unlit pass-through pair used for the triangle demo.
    pub fn flat() -> Self {
        Self {
            vertex: include_str!("../../shaders/flat.vert").into(),
            fragment: include_str!("../../shaders/flat.frag").into(),
        }
    }

    /// Reads both stages wholesale from disk.
    pub fn from_files(vertex_path: &Path, fragment_path: &Path) -> Result<Self, ViewerError> {
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|e| {
                ViewerError::Resource(format!(
                    "failed to read shader source {}: {e}",
                    path.display()
                ))
            })
        };
        Ok(Self {
            vertex: read(vertex_path)?,
            fragment: read(fragment_path)?,
        })
    }
}

/// Uniform locations the shaders may expose. Absent uniforms stay `None`
/// and are silently skipped at draw time, matching GL semantics.
#[derive(Debug)]
pub struct Uniforms {
    pub model: Option<glow::UniformLocation>,
    pub view: Option<glow::UniformLocation>,
    pub projection: Option<glow::UniformLocation>,
    pub light_pos: Option<glow::UniformLocation>,
    pub view_pos: Option<glow::UniformLocation>,
    pub light_color: Option<glow::UniformLocation>,
    pub object_color: Option<glow::UniformLocation>,
}

impl Uniforms {
    fn locate(gl: &glow::Context, program: glow::Program) -> Self {
        unsafe {
            Self {
                model: gl.get_uniform_location(program, "model"),
                view: gl.get_uniform_location(program, "view"),
                projection: gl.get_uniform_location(program, "projection"),
                light_pos: gl.get_uniform_location(program, "lightPos"),
                view_pos: gl.get_uniform_location(program, "viewPos"),
                light_color: gl.get_uniform_location(program, "lightColor"),
                object_color: gl.get_uniform_location(program, "objectColor"),
            }
        }
    }
}

fn compile_stage(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, ViewerError> {
    unsafe {
        let shader = gl
            .create_shader(stage.gl_type())
            .map_err(|log| ViewerError::Shader { stage, log })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ViewerError::Shader { stage, log });
        }
        Ok(shader)
    }
}

/// A linked shader program with its uniform locations resolved.
#[derive(Debug)]
pub struct ShaderProgram {
    program: Option<glow::Program>,
    pub uniforms: Uniforms,
}

impl ShaderProgram {
    /// Compiles both stages and links them. Either compile failure aborts
    /// before linking; compile and link failures carry the driver's info
    /// log. No retries, a failure is fatal to startup.
    pub fn link(gl: &glow::Context, sources: &ShaderPair) -> Result<Self, ViewerError> {
        let vs = compile_stage(gl, ShaderStage::Vertex, &sources.vertex)?;
        let fs = match compile_stage(gl, ShaderStage::Fragment, &sources.fragment) {
            Ok(fs) => fs,
            Err(e) => {
                unsafe { gl.delete_shader(vs) };
                return Err(e);
            }
        };

        unsafe {
            let program = match gl.create_program() {
                Ok(program) => program,
                Err(log) => {
                    gl.delete_shader(vs);
                    gl.delete_shader(fs);
                    return Err(ViewerError::ShaderLink { log });
                }
            };
            gl.attach_shader(program, vs);
            gl.attach_shader(program, fs);
            gl.link_program(program);

            let linked = gl.get_program_link_status(program);
            gl.detach_shader(program, vs);
            gl.detach_shader(program, fs);
            gl.delete_shader(vs);
            gl.delete_shader(fs);

            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(ViewerError::ShaderLink { log });
            }

            let uniforms = Uniforms::locate(gl, program);
            Ok(Self {
                program: Some(program),
                uniforms,
            })
        }
    }

    pub fn bind(&self, gl: &glow::Context) {
        if let Some(program) = self.program {
            unsafe { gl.use_program(Some(program)) };
        }
    }

    /// Deletes the program. Subsequent calls are no-ops.
    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(program) = self.program.take() {
            unsafe { gl.delete_program(program) };
        }
    }
}
