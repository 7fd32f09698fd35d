// src/gl_utils/buffer.rs
//! Write-once GPU buffers for vertex attributes and triangle indices.

use std::rc::Rc;

use log::debug;

use super::{BufferTarget, GlError, GraphicsApi, IndexType};

/// Per-vertex float data, `components` floats per element.
pub struct AttributeBuffer<G: GraphicsApi> {
    gl: Rc<G>,
    buffer: G::Buffer,
    element_count: usize,
    components: i32,
}

impl<G: GraphicsApi> AttributeBuffer<G> {
    /// Create a buffer from fixed-size vectors, e.g. `[f32; 3]` positions.
    pub fn new<const N: usize>(gl: &Rc<G>, items: &[[f32; N]]) -> Result<Self, GlError>
    where
        [f32; N]: bytemuck::Pod,
    {
        let buffer = gl.create_buffer(BufferTarget::Array, bytemuck::cast_slice(items))?;
        debug!("AttributeBuffer: {} x vec{} uploaded", items.len(), N);

        Ok(Self {
            gl: Rc::clone(gl),
            buffer,
            element_count: items.len(),
            components: N as i32,
        })
    }

    /// Bind this buffer to a shader attribute slot.
    pub fn attach(&self, location: u32) -> Result<(), GlError> {
        self.gl
            .attach_attribute(self.buffer, location, self.components)
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn components(&self) -> i32 {
        self.components
    }

    /// Get the underlying buffer handle
    pub fn buffer(&self) -> G::Buffer {
        self.buffer
    }

    pub fn gl(&self) -> &Rc<G> {
        &self.gl
    }
}

impl<G: GraphicsApi> Drop for AttributeBuffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.buffer);
    }
}

/// 16-bit triangle indices.
pub struct ElementBuffer<G: GraphicsApi> {
    gl: Rc<G>,
    buffer: G::Buffer,
    element_count: usize,
}

impl<G: GraphicsApi> ElementBuffer<G> {
    pub const INDEX_TYPE: IndexType = IndexType::U16;

    pub fn new(gl: &Rc<G>, indices: &[u16]) -> Result<Self, GlError> {
        let buffer = gl.create_buffer(BufferTarget::ElementArray, bytemuck::cast_slice(indices))?;
        debug!("ElementBuffer: {} indices uploaded", indices.len());

        Ok(Self {
            gl: Rc::clone(gl),
            buffer,
            element_count: indices.len(),
        })
    }

    /// Narrow 32-bit indices for a mesh of `vertex_count` vertices.
    ///
    /// Fails with [`GlError::IndexOverflow`] when the vertices cannot all be
    /// addressed by a `u16`.
    pub fn from_u32(gl: &Rc<G>, indices: &[u32], vertex_count: usize) -> Result<Self, GlError> {
        if vertex_count > u16::MAX as usize + 1 {
            return Err(GlError::IndexOverflow { vertex_count });
        }
        let narrowed: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
        Self::new(gl, &narrowed)
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn index_type(&self) -> IndexType {
        Self::INDEX_TYPE
    }

    pub fn buffer(&self) -> G::Buffer {
        self.buffer
    }

    pub fn gl(&self) -> &Rc<G> {
        &self.gl
    }
}

impl<G: GraphicsApi> Drop for ElementBuffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.buffer);
    }
}
