// src/gfx/mesh.rs
//! GPU-resident meshes
//!
//! [`Mesh`] holds the four buffers uploaded from a [`GeometryData`] and
//! draws them as an indexed triangle list. [`ArrayMesh`] draws a single
//! position buffer without indices, e.g. a fullscreen quad.

use std::rc::Rc;

use log::debug;

use crate::gfx::geometry::GeometryData;
use crate::gfx::texture::Texture;
use crate::gl_utils::{AttributeBuffer, ElementBuffer, GlError, GraphicsApi, PrimitiveMode};
use crate::math::Vec3;

/// Shader attribute slots a mesh's buffers are bound to.
///
/// Attributes the shader does not use can be left as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshAttributes {
    pub position: u32,
    pub normal: Option<u32>,
    pub tex_coord: Option<u32>,
}

impl MeshAttributes {
    pub fn new(position: u32, normal: u32, tex_coord: u32) -> Self {
        Self {
            position,
            normal: Some(normal),
            tex_coord: Some(tex_coord),
        }
    }

    pub fn position_only(position: u32) -> Self {
        Self {
            position,
            normal: None,
            tex_coord: None,
        }
    }
}

/// Indexed triangle mesh with an optional texture and a flat material colour.
pub struct Mesh<G: GraphicsApi> {
    positions: AttributeBuffer<G>,
    normals: AttributeBuffer<G>,
    tex_coords: AttributeBuffer<G>,
    indices: ElementBuffer<G>,
    index_count: usize,
    pub material_color: Vec3,
    pub texture: Option<Texture<G>>,
}

impl<G: GraphicsApi> Mesh<G> {
    /// Validates `geometry` and uploads it. The geometry is not retained.
    pub fn new(gl: &Rc<G>, geometry: &GeometryData) -> Result<Self, GlError> {
        geometry.validate()?;

        let positions = AttributeBuffer::new(gl, &geometry.positions)?;
        let normals = AttributeBuffer::new(gl, &geometry.normals)?;
        let tex_coords = AttributeBuffer::new(gl, &geometry.tex_coords)?;
        let indices = ElementBuffer::from_u32(gl, &geometry.indices, geometry.vertex_count())?;
        let index_count = indices.element_count();

        debug!(
            "Mesh uploaded: {} vertices, {} triangles",
            geometry.vertex_count(),
            geometry.triangle_count()
        );

        Ok(Self {
            positions,
            normals,
            tex_coords,
            indices,
            index_count,
            material_color: Vec3::new(1.0, 1.0, 1.0),
            texture: None,
        })
    }

    pub fn with_texture(mut self, texture: Texture<G>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_material_color(mut self, color: Vec3) -> Self {
        self.material_color = color;
        self
    }

    /// Binds each buffer to its attribute slot.
    pub fn attach_attributes(&self, attributes: MeshAttributes) -> Result<(), GlError> {
        self.positions.attach(attributes.position)?;
        if let Some(normal) = attributes.normal {
            self.normals.attach(normal)?;
        }
        if let Some(tex_coord) = attributes.tex_coord {
            self.tex_coords.attach(tex_coord)?;
        }
        Ok(())
    }

    /// Binds the mesh texture, if any, to `unit`. Returns whether a texture was bound.
    pub fn activate_texture(&self, unit: u32) -> Result<bool, GlError> {
        match &self.texture {
            Some(texture) => {
                texture.activate(unit)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Issues one indexed triangle-list draw over the whole mesh.
    pub fn draw(&self) -> Result<(), GlError> {
        self.indices.gl().draw_elements(
            PrimitiveMode::Triangles,
            self.indices.buffer(),
            self.index_count,
            self.indices.index_type(),
        )
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.element_count()
    }
}

/// Non-indexed mesh drawn straight from one position buffer.
pub struct ArrayMesh<G: GraphicsApi> {
    positions: AttributeBuffer<G>,
    mode: PrimitiveMode,
}

impl<G: GraphicsApi> ArrayMesh<G> {
    pub fn new(gl: &Rc<G>, positions: &[[f32; 3]], mode: PrimitiveMode) -> Result<Self, GlError> {
        Ok(Self {
            positions: AttributeBuffer::new(gl, positions)?,
            mode,
        })
    }

    /// Two triangles covering clip space, drawn as a strip.
    pub fn fullscreen_quad(gl: &Rc<G>) -> Result<Self, GlError> {
        Self::new(
            gl,
            &[
                [-1.0, -1.0, 0.0],
                [-1.0, 1.0, 0.0],
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            PrimitiveMode::TriangleStrip,
        )
    }

    pub fn attach(&self, position: u32) -> Result<(), GlError> {
        self.positions.attach(position)
    }

    pub fn draw(&self) -> Result<(), GlError> {
        self.positions
            .gl()
            .draw_arrays(self.mode, 0, self.positions.element_count())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.element_count()
    }
}
