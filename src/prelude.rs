//! # Shortcrust Prelude
//!
//! Commonly used types for writing an [`App`].
//!
//! ```rust
//! use shortcrust::prelude::*;
//!
//! let mut model_view = Mat4::look_at(
//!     Vec3::new(0.0, 0.0, -4.0),
//!     Vec3::zero(),
//!     Vec3::unit_y(),
//! );
//! model_view.rotate_y(0.5);
//! let normal_matrix = model_view.to_inverse_mat3().map(|mut m| *m.transpose());
//! assert!(normal_matrix.is_ok());
//! ```

// Application driver
pub use crate::app::{run, App, AppConfig, Viewport};
pub use crate::error::{Error, Result};

// Graphics wrappers
pub use crate::gfx::geometry::{union, Cylinder, GeometryData, Sphere};
pub use crate::gfx::mesh::{ArrayMesh, Mesh, MeshAttributes};
pub use crate::gfx::shader::ShaderProgram;
pub use crate::gfx::texture::{PixelFormat, Texture};
pub use crate::gl_utils::{GlError, GlowBackend, GraphicsApi, PrimitiveMode};

// Math
pub use crate::math::{deg_to_rad, Mat3, Mat4, MathError, Vec3};
