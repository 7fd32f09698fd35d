//! Crate-wide error type

use thiserror::Error;

use crate::gfx::geometry::GeometryError;
use crate::gfx::texture::TextureError;
use crate::gl_utils::GlError;
use crate::math::MathError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Gl(#[from] GlError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    /// Window, event loop or GL context creation failed.
    #[error("window system: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, Error>;
