use glow::HasContext;

use crate::error::ViewerError;
use crate::mesh::{DrawParams, Mesh};

const STRIDE: i32 = 6 * std::mem::size_of::<f32>() as i32;
const NORMAL_OFFSET: i32 = 3 * std::mem::size_of::<f32>() as i32;

/// Handle slots for the VAO and its buffers, separate from [`GpuMesh`] so
/// the take-once release bookkeeping is testable without a GL context.
#[derive(Debug)]
struct HandleSlots<V, B> {
    vao: Option<V>,
    vbo: Option<B>,
    ebo: Option<B>,
}

impl<V, B> HandleSlots<V, B> {
    /// Empties the slots and yields whatever handles were still held.
    /// Repeated calls yield nothing.
    fn release(&mut self) -> (Option<V>, Option<B>, Option<B>) {
        (self.vao.take(), self.vbo.take(), self.ebo.take())
    }
}

/// GPU-resident mesh: one VAO over an interleaved position+normal buffer
/// (location 0 and 1) and, for indexed meshes, an element buffer of `u32`
/// indices. Uploaded once; re-upload means destroy and recreate.
#[derive(Debug)]
pub struct GpuMesh {
    slots: HandleSlots<glow::VertexArray, glow::Buffer>,
    params: DrawParams,
}

impl GpuMesh {
    pub fn upload(gl: &glow::Context, mesh: &Mesh) -> Result<Self, ViewerError> {
        mesh.validate()?;
        let vertex_data = mesh.interleaved();
        let params = mesh.draw_params();

        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| ViewerError::Initialization(format!("failed to create VAO: {e}")))?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl
                .create_buffer()
                .map_err(|e| ViewerError::Initialization(format!("failed to create VBO: {e}")))?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&vertex_data),
                glow::STATIC_DRAW,
            );

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, STRIDE, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, STRIDE, NORMAL_OFFSET);

            let ebo = match &mesh.indices {
                Some(indices) => {
                    let ebo = gl.create_buffer().map_err(|e| {
                        ViewerError::Initialization(format!("failed to create EBO: {e}"))
                    })?;
                    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
                    gl.buffer_data_u8_slice(
                        glow::ELEMENT_ARRAY_BUFFER,
                        bytemuck::cast_slice(indices.as_slice()),
                        glow::STATIC_DRAW,
                    );
                    Some(ebo)
                }
                None => None,
            };

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                slots: HandleSlots {
                    vao: Some(vao),
                    vbo: Some(vbo),
                    ebo,
                },
                params,
            })
        }
    }

    pub fn params(&self) -> DrawParams {
        self.params
    }

    pub fn draw(&self, gl: &glow::Context) {
        let Some(vao) = self.slots.vao else {
            return;
        };
        unsafe {
            gl.bind_vertex_array(Some(vao));
            match self.params {
                DrawParams::Elements { index_count } => {
                    gl.draw_elements(glow::TRIANGLES, index_count as i32, glow::UNSIGNED_INT, 0);
                }
                DrawParams::Arrays { vertex_count } => {
                    gl.draw_arrays(glow::TRIANGLES, 0, vertex_count as i32);
                }
            }
            gl.bind_vertex_array(None);
        }
    }

    /// Releases the VAO and buffers. Handles are taken out of their slots,
    /// so a second call does nothing.
    pub fn destroy(&mut self, gl: &glow::Context) {
        let (vao, vbo, ebo) = self.slots.release();
        unsafe {
            if let Some(vao) = vao {
                gl.delete_vertex_array(vao);
            }
            if let Some(vbo) = vbo {
                gl.delete_buffer(vbo);
            }
            if let Some(ebo) = ebo {
                gl.delete_buffer(ebo);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_yields_each_handle_exactly_once() {
        let mut slots = HandleSlots {
            vao: Some(1u32),
            vbo: Some(2u32),
            ebo: Some(3u32),
        };
        assert_eq!(slots.release(), (Some(1), Some(2), Some(3)));
        assert_eq!(slots.release(), (None, None, None));
        assert_eq!(slots.release(), (None, None, None));
    }

    #[test]
    fn non_indexed_slots_never_yield_an_element_buffer() {
        let mut slots: HandleSlots<u32, u32> = HandleSlots {
            vao: Some(1),
            vbo: Some(2),
            ebo: None,
        };
        assert_eq!(slots.release(), (Some(1), Some(2), None));
        assert_eq!(slots.release(), (None, None, None));
    }
}
