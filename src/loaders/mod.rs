pub mod stl;

use std::path::PathBuf;

use crate::error::ViewerError;
use crate::mesh::Mesh;

/// Where the mesh for the current run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshSource {
    /// The built-in demo triangle.
    Triangle,
    /// An STL model on disk.
    Stl(PathBuf),
}

pub fn load(source: &MeshSource) -> Result<Mesh, ViewerError> {
    match source {
        MeshSource::Triangle => Ok(Mesh::triangle()),
        MeshSource::Stl(path) => stl::load_stl(path),
    }
}
