use crate::error::ViewerError;

/// Description of the draw call a mesh requires, computed without touching
/// the GL context so it can be checked in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawParams {
    /// Non-indexed draw over `vertex_count` sequential vertices.
    Arrays { vertex_count: usize },
    /// Indexed draw over `index_count` indices (3 per triangle).
    Elements { index_count: usize },
}

/// CPU-side mesh data: vertex positions, optional per-vertex normals and
/// optional triangle indices.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Option<Vec<[u32; 3]>>,
}

impl Mesh {
    /// The hardcoded demo triangle: three vertices facing +Z, no indices.
    pub fn triangle() -> Self {
        Self {
            positions: vec![[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]],
            normals: Some(vec![[0.0, 0.0, 1.0]; 3]),
            indices: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.positions.len() / 3,
        }
    }

    /// Checks the mesh invariants: every index references a valid vertex,
    /// and the normal array (if present) matches the vertex count.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.positions.is_empty() {
            return Err(ViewerError::Resource("mesh has no vertices".into()));
        }
        if let Some(normals) = &self.normals {
            if normals.len() != self.positions.len() {
                return Err(ViewerError::Resource(format!(
                    "mesh has {} vertices but {} normals",
                    self.positions.len(),
                    normals.len()
                )));
            }
        }
        if let Some(indices) = &self.indices {
            let vertex_count = self.positions.len() as u32;
            for triangle in indices {
                for &index in triangle {
                    if index >= vertex_count {
                        return Err(ViewerError::Resource(format!(
                            "index {} out of range for {} vertices",
                            index, vertex_count
                        )));
                    }
                }
            }
        } else if self.positions.len() % 3 != 0 {
            return Err(ViewerError::Resource(format!(
                "non-indexed mesh vertex count {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        Ok(())
    }

    pub fn draw_params(&self) -> DrawParams {
        match &self.indices {
            Some(indices) => DrawParams::Elements {
                index_count: indices.len() * 3,
            },
            None => DrawParams::Arrays {
                vertex_count: self.positions.len(),
            },
        }
    }

    /// Per-vertex normals: the stored ones if present, otherwise smooth
    /// normals derived by accumulating area-weighted face normals.
    /// Degenerate faces contribute nothing; isolated vertices get +Z.
    pub fn vertex_normals(&self) -> Vec<[f32; 3]> {
        if let Some(normals) = &self.normals {
            return normals.clone();
        }

        let mut accum = vec![[0.0f32; 3]; self.positions.len()];
        let mut add_face = |a: usize, b: usize, c: usize| {
            let pa = self.positions[a];
            let pb = self.positions[b];
            let pc = self.positions[c];
            let e1 = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
            let e2 = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
            // Unnormalized cross product weights the contribution by face area.
            let n = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            for &v in &[a, b, c] {
                accum[v][0] += n[0];
                accum[v][1] += n[1];
                accum[v][2] += n[2];
            }
        };

        match &self.indices {
            Some(indices) => {
                for t in indices {
                    add_face(t[0] as usize, t[1] as usize, t[2] as usize);
                }
            }
            None => {
                for t in 0..self.positions.len() / 3 {
                    add_face(t * 3, t * 3 + 1, t * 3 + 2);
                }
            }
        }

        accum
            .into_iter()
            .map(|n| {
                let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
                if len > 1e-12 {
                    [n[0] / len, n[1] / len, n[2] / len]
                } else {
                    [0.0, 0.0, 1.0]
                }
            })
            .collect()
    }

    /// Axis-aligned bounding box, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }

    /// Uniform scale that shrinks the mesh so its largest extent fits
    /// `target_extent`. Meshes that already fit are left alone.
    pub fn fit_scale(&self, target_extent: f32) -> f32 {
        let Some((min, max)) = self.bounds() else {
            return 1.0;
        };
        let extent = (max[0] - min[0])
            .max(max[1] - min[1])
            .max(max[2] - min[2]);
        if extent > target_extent {
            target_extent / extent
        } else {
            1.0
        }
    }

    /// Interleaved position+normal vertex data, 6 floats per vertex, the
    /// layout the GPU upload and both shader pairs expect.
    pub fn interleaved(&self) -> Vec<f32> {
        let normals = self.vertex_normals();
        let mut data = Vec::with_capacity(self.positions.len() * 6);
        for (p, n) in self.positions.iter().zip(&normals) {
            data.extend_from_slice(p);
            data.extend_from_slice(n);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_draws_three_vertices_non_indexed() {
        let mesh = Mesh::triangle();
        mesh.validate().unwrap();
        assert_eq!(mesh.draw_params(), DrawParams::Arrays { vertex_count: 3 });
    }

    #[test]
    fn indexed_mesh_draws_three_indices_per_triangle() {
        let mesh = Mesh {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            normals: None,
            indices: Some(vec![[0, 1, 2], [2, 1, 3]]),
        };
        mesh.validate().unwrap();
        assert_eq!(mesh.draw_params(), DrawParams::Elements { index_count: 6 });
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mesh = Mesh {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: None,
            indices: Some(vec![[0, 1, 3]]),
        };
        assert!(matches!(mesh.validate(), Err(ViewerError::Resource(_))));
    }

    #[test]
    fn normal_count_mismatch_is_rejected() {
        let mesh = Mesh {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Some(vec![[0.0, 0.0, 1.0]; 2]),
            indices: None,
        };
        assert!(matches!(mesh.validate(), Err(ViewerError::Resource(_))));
    }

    #[test]
    fn derived_normals_of_flat_quad_match_face_normal() {
        // Quad in the XY plane, wound counter-clockwise, so every derived
        // vertex normal must be +Z.
        let mesh = Mesh {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: None,
            indices: Some(vec![[0, 1, 2], [0, 2, 3]]),
        };
        for n in mesh.vertex_normals() {
            assert!((n[0]).abs() < 1e-6);
            assert!((n[1]).abs() < 1e-6);
            assert!((n[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_face_contributes_no_normal() {
        // All three vertices coincide, so the fallback +Z normal is used.
        let mesh = Mesh {
            positions: vec![[1.0, 2.0, 3.0]; 3],
            normals: None,
            indices: None,
        };
        assert_eq!(mesh.vertex_normals(), vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn fit_scale_shrinks_oversized_meshes_only() {
        let big = Mesh {
            positions: vec![[0.0; 3], [8.0, 0.0, 0.0], [0.0, 8.0, 0.0]],
            normals: None,
            indices: None,
        };
        assert!((big.fit_scale(4.0) - 0.5).abs() < 1e-6);
        assert!((Mesh::triangle().fit_scale(4.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn interleaved_layout_is_six_floats_per_vertex() {
        let mesh = Mesh::triangle();
        let data = mesh.interleaved();
        assert_eq!(data.len(), 18);
        // First vertex: position then normal.
        assert_eq!(&data[0..6], &[-0.5, -0.5, 0.0, 0.0, 0.0, 1.0][..]);
    }
}
