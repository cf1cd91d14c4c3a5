pub mod gpu_mesh;
pub mod renderer;
pub mod shader;

pub use gpu_mesh::GpuMesh;
pub use renderer::{Lighting, RenderOptions, Renderer};
pub use shader::{ShaderPair, ShaderProgram, ShaderStage};
