// src/gl_utils/mod.rs
//! OpenGL ES 2.0 utility layer
//!
//! [`GraphicsApi`] is the narrow set of calls the rest of the crate needs
//! from a graphics context: compile and link shaders, look up and set
//! uniforms, create buffers and textures, and issue draw calls. Every call
//! reports the first API error it detects instead of batching error checks.
//!
//! [`glow_backend::GlowBackend`] implements it over a live GL ES context.

pub mod buffer;
pub mod glow_backend;

#[cfg(test)]
pub(crate) mod recording;

// Re-export main types
pub use buffer::{AttributeBuffer, ElementBuffer};
pub use glow_backend::GlowBackend;

use std::fmt::Debug;

use thiserror::Error;

use crate::gfx::texture::PixelData;

/// Errors raised by the graphics layer. All of them are fatal during setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlError {
    #[error("failed to compile {stage:?} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link shader program: {0}")]
    Link(String),
    #[error("shader has no active attribute named `{0}`")]
    MissingAttribute(String),
    #[error("failed to create {0}: {1}")]
    Create(&'static str, String),
    #[error("{vertex_count} vertices cannot be addressed by 16-bit indices")]
    IndexOverflow { vertex_count: usize },
    #[error("invalid geometry: {0}")]
    Geometry(#[from] crate::gfx::geometry::GeometryError),
    #[error("GL error 0x{code:04X} after {call}")]
    Api { call: &'static str, code: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data (`GL_ARRAY_BUFFER`)
    Array,
    /// Index data (`GL_ELEMENT_ARRAY_BUFFER`)
    ElementArray,
}

/// Element type of an index buffer. GL ES 2.0 only guarantees 16-bit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    U16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// A value for a single uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
    /// Texture unit index for a `sampler2D`
    Sampler(i32),
}

/// The graphics-API capability the wrappers are built on.
///
/// Handles are opaque copies; the wrapper that created a handle owns the
/// GPU object behind it and is the only one that deletes it.
pub trait GraphicsApi {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type Buffer: Copy + Debug;
    type Texture: Copy + Debug;
    type UniformLocation: Clone + Debug;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<Self::Shader, GlError>;

    /// Links two compiled shaders. The shader objects are released whether or not linking succeeds.
    fn link_program(
        &self,
        vertex: Self::Shader,
        fragment: Self::Shader,
    ) -> Result<Self::Program, GlError>;

    fn use_program(&self, program: Self::Program) -> Result<(), GlError>;

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    fn enable_attrib_array(&self, location: u32) -> Result<(), GlError>;

    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    fn set_uniform(&self, location: &Self::UniformLocation, value: Uniform) -> Result<(), GlError>;

    /// Creates a buffer and fills it once with `bytes` (static usage).
    fn create_buffer(&self, target: BufferTarget, bytes: &[u8]) -> Result<Self::Buffer, GlError>;

    /// Points attribute `location` at `buffer`, read as tightly packed `components`-wide floats.
    fn attach_attribute(
        &self,
        buffer: Self::Buffer,
        location: u32,
        components: i32,
    ) -> Result<(), GlError>;

    fn draw_elements(
        &self,
        mode: PrimitiveMode,
        indices: Self::Buffer,
        count: usize,
        index_type: IndexType,
    ) -> Result<(), GlError>;

    fn draw_arrays(&self, mode: PrimitiveMode, first: usize, count: usize) -> Result<(), GlError>;

    fn create_texture(&self, pixels: &PixelData) -> Result<Self::Texture, GlError>;

    fn bind_texture(&self, texture: Self::Texture, unit: u32) -> Result<(), GlError>;

    fn set_viewport(&self, width: u32, height: u32);

    fn enable_depth_test(&self);

    fn clear(&self, color: [f32; 4]);

    /// Releases a compiled shader that never reached [`GraphicsApi::link_program`].
    fn delete_shader(&self, shader: Self::Shader);

    fn delete_program(&self, program: Self::Program);

    fn delete_buffer(&self, buffer: Self::Buffer);

    fn delete_texture(&self, texture: Self::Texture);
}
