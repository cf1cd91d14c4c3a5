use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::error::ViewerError;
use crate::mesh::Mesh;

/// Loads an STL model from disk. `stl_io` handles both the binary and ASCII
/// encodings and deduplicates vertices into an indexed mesh; vertex normals
/// are derived afterwards since STL only carries per-facet normals.
pub fn load_stl(path: &Path) -> Result<Mesh, ViewerError> {
    let file = File::open(path).map_err(|e| {
        ViewerError::Resource(format!("failed to open mesh file {}: {e}", path.display()))
    })?;
    let mut reader = BufReader::new(file);
    let mesh = read_stl_mesh(&mut reader).map_err(|e| match e {
        ViewerError::Resource(msg) => {
            ViewerError::Resource(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;
    log::info!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

pub(crate) fn read_stl_mesh<R: Read + Seek>(reader: &mut R) -> Result<Mesh, ViewerError> {
    let stl = stl_io::read_stl(reader)
        .map_err(|e| ViewerError::Resource(format!("failed to parse STL data: {e}")))?;

    let positions = stl
        .vertices
        .iter()
        .map(|v| [v[0], v[1], v[2]])
        .collect::<Vec<_>>();
    let indices = stl
        .faces
        .iter()
        .map(|f| {
            [
                f.vertices[0] as u32,
                f.vertices[1] as u32,
                f.vertices[2] as u32,
            ]
        })
        .collect::<Vec<_>>();

    let mut mesh = Mesh {
        positions,
        normals: None,
        indices: Some(indices),
    };
    mesh.validate()?;
    mesh.normals = Some(mesh.vertex_normals());
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::DrawParams;
    use std::io::Cursor;

    /// Builds a binary STL blob: 80-byte header, triangle count, then per
    /// triangle a normal, three vertices and an attribute word.
    fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            for _ in 0..3 {
                data.extend_from_slice(&0f32.to_le_bytes());
            }
            for vertex in tri {
                for coord in vertex {
                    data.extend_from_slice(&coord.to_le_bytes());
                }
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    #[test]
    fn shared_vertices_are_deduplicated_into_indices() {
        // Two triangles sharing an edge: 6 corners, 4 unique vertices.
        let blob = binary_stl(&[
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        ]);
        let mesh = read_stl_mesh(&mut Cursor::new(blob)).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.draw_params(), DrawParams::Elements { index_count: 6 });
        mesh.validate().unwrap();
        // Loader always attaches derived vertex normals.
        assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn truncated_stl_is_a_resource_error() {
        let mut blob = binary_stl(&[[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        blob.truncate(100);
        let result = read_stl_mesh(&mut Cursor::new(blob));
        assert!(matches!(result, Err(ViewerError::Resource(_))));
    }

    #[test]
    fn missing_file_is_a_resource_error() {
        let result = load_stl(Path::new("/nonexistent/model.stl"));
        assert!(matches!(result, Err(ViewerError::Resource(_))));
    }
}
