//! # Graphics Module
//!
//! Everything between a parametric shape and a draw call.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - CPU-side mesh descriptions from sphere and cylinder generators
//! - **Meshes** ([`mesh`]) - GPU buffers uploaded from a description, plus the draw call
//! - **Shaders** ([`shader`]) - Compiled and linked programs with attribute/uniform lookup
//! - **Textures** ([`texture`]) - Image decoding into GL ES pixel formats and upload
//!
//! ## Usage
//!
//! ```no_run
//! use std::rc::Rc;
//! use shortcrust::gfx::{geometry::Sphere, mesh::MeshAttributes, shader::ShaderProgram};
//! use shortcrust::gl_utils::GraphicsApi;
//!
//! fn build<G: GraphicsApi>(gl: &Rc<G>, vs: &str, fs: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let shader = ShaderProgram::new(gl, vs, fs)?;
//!     let globe = Sphere::default().build()?.to_mesh(gl)?;
//!
//!     shader.use_program()?;
//!     globe.attach_attributes(MeshAttributes::position_only(shader.attrib("aVertexPosition")?))?;
//!     globe.draw()?;
//!     Ok(())
//! }
//! ```

pub mod geometry;
pub mod mesh;
pub mod shader;
pub mod texture;

// Re-export commonly used types
pub use geometry::{union, Cylinder, GeometryData, GeometryError, Sphere};
pub use mesh::{ArrayMesh, Mesh, MeshAttributes};
pub use shader::ShaderProgram;
pub use texture::{load_pixels, PixelData, PixelFormat, Texture, TextureError};
