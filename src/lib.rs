// src/lib.rs
//! Shortcrust
//!
//! A small OpenGL ES 2.0 toolkit: column-major matrix and vector helpers,
//! parametric sphere and cylinder meshes, shader/buffer/texture wrappers and
//! a setup/draw application loop built on winit and glutin.

pub mod app;
pub mod error;
pub mod gfx;
pub mod gl_utils;
pub mod math;
pub mod prelude;

// Re-export main types for convenience
pub use app::{run, App, AppConfig, Viewport};
pub use error::{Error, Result};
