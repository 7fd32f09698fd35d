//! # Matrix and Vector Math
//!
//! Small fixed-size value types used to build the matrices a shader needs:
//! projection, model-view and normal matrices.
//!
//! ## Layout
//!
//! [`Mat4`] stores 16 floats in column-major order, so `m[12..15]` holds the
//! translation column and the array can be handed to `glUniformMatrix4fv`
//! without transposing. [`Mat3`] uses the same convention for the upper-left
//! 3x3 block.
//!
//! ## In place or into a destination
//!
//! Every transform comes in two flavours:
//!
//! - `op(&mut self, ...)` overwrites the matrix it is called on
//! - `op_into(&self, ..., dest)` leaves `self` untouched and writes a complete
//!   result into `dest`
//!
//! Both produce bit-identical values.
//!
//! ```rust
//! use shortcrust::math::{Mat4, Vec3};
//!
//! let mut model_view = Mat4::look_at(
//!     Vec3::new(0.0, 0.0, -4.0),
//!     Vec3::zero(),
//!     Vec3::new(0.0, 1.0, 0.0),
//! );
//! model_view.rotate_y(0.5);
//!
//! let normal_matrix = model_view.to_inverse_mat3().map(|mut m| {
//!     m.transpose();
//!     m
//! });
//! assert!(normal_matrix.is_ok());
//! ```

pub mod mat3;
pub mod mat4;
pub mod vec3;

pub use mat3::Mat3;
pub use mat4::Mat4;
pub use vec3::Vec3;

use thiserror::Error;

/// Inputs for which a math operation has no meaningful result.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// The upper-left 3x3 block has a zero determinant.
    #[error("matrix is singular and cannot be inverted")]
    Singular,
    /// A rotation was requested around a zero-length axis.
    #[error("rotation axis has zero length")]
    ZeroAxis,
}

/// Degrees to radians, the same conversion the generators use for their angular ranges.
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

#[cfg(test)]
pub(crate) fn assert_approx_eq(a: &[f32], b: &[f32], eps: f32) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!(
            (x - y).abs() <= eps,
            "component {} differs: {} vs {} (eps {})",
            i,
            x,
            y,
            eps
        );
    }
}
