//! Texture loading and upload
//!
//! Images are decoded with the `image` crate into RGB or RGBA bytes; the
//! single-channel and two-channel formats are then sub-sampled out of that
//! decode. The resulting [`PixelData`] is uploaded once by [`Texture::new`].

use std::path::Path;
use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::gl_utils::{GlError, GraphicsApi};

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("{format:?} pixel data for {width}x{height} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        format: PixelFormat,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Gl(#[from] GlError),
}

/// Layout of uploaded pixel bytes. Matches the GL ES 2.0 unsized formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Alpha,
    Rgb,
    Rgba,
    Luminance,
    LuminanceAlpha,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Alpha | PixelFormat::Luminance => 1,
            PixelFormat::LuminanceAlpha => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// Whether this format is taken from an RGBA decode (otherwise RGB).
    fn decodes_with_alpha(self) -> bool {
        !matches!(self, PixelFormat::Rgb | PixelFormat::Luminance)
    }
}

/// Tightly packed pixel bytes, rows bottom-up when loaded flipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelData {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelData {
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * format.channels();
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                format,
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            format,
            width,
            height,
            pixels,
        })
    }
}

/// Picks the bytes `format` keeps out of an RGB (`Rgb`, `Luminance`) or
/// RGBA (everything else) decode.
///
/// Alpha keeps byte 3 of every quad, luminance byte 1 of every triple and
/// luminance-alpha bytes 1 and 3 of every quad.
pub fn extract_channels(format: PixelFormat, decoded: &[u8]) -> Vec<u8> {
    match format {
        PixelFormat::Rgb | PixelFormat::Rgba => decoded.to_vec(),
        PixelFormat::Alpha => decoded.iter().skip(3).step_by(4).copied().collect(),
        PixelFormat::Luminance => decoded.iter().skip(1).step_by(3).copied().collect(),
        PixelFormat::LuminanceAlpha => decoded.iter().skip(1).step_by(2).copied().collect(),
    }
}

/// Decodes an image file into pixel data of the requested format.
///
/// With `flipped` set the rows are stored bottom-up, the order GL expects
/// texture coordinate `v = 0` to address.
pub fn load_pixels(
    path: impl AsRef<Path>,
    format: PixelFormat,
    flipped: bool,
) -> Result<PixelData, TextureError> {
    let path = path.as_ref();
    let mut img = image::open(path).map_err(|source| TextureError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    if flipped {
        img = img.flipv();
    }

    let (width, height) = (img.width(), img.height());
    let decoded = if format.decodes_with_alpha() {
        img.into_rgba8().into_raw()
    } else {
        img.into_rgb8().into_raw()
    };
    debug!(
        "Loaded {} ({}x{}) as {:?}",
        path.display(),
        width,
        height,
        format
    );

    PixelData::new(format, width, height, extract_channels(format, &decoded))
}

/// A 2D texture, uploaded once with nearest filtering.
pub struct Texture<G: GraphicsApi> {
    gl: Rc<G>,
    texture: G::Texture,
    format: PixelFormat,
    width: u32,
    height: u32,
}

impl<G: GraphicsApi> Texture<G> {
    pub fn new(gl: &Rc<G>, pixels: &PixelData) -> Result<Self, GlError> {
        let texture = gl.create_texture(pixels)?;
        Ok(Self {
            gl: Rc::clone(gl),
            texture,
            format: pixels.format,
            width: pixels.width,
            height: pixels.height,
        })
    }

    /// Loads an image file and uploads it.
    pub fn from_file(
        gl: &Rc<G>,
        path: impl AsRef<Path>,
        format: PixelFormat,
        flipped: bool,
    ) -> Result<Self, TextureError> {
        let pixels = load_pixels(path, format, flipped)?;
        Ok(Self::new(gl, &pixels)?)
    }

    /// Binds the texture to texture unit `unit` (0 for `GL_TEXTURE0`).
    pub fn activate(&self, unit: u32) -> Result<(), GlError> {
        self.gl.bind_texture(self.texture, unit)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn handle(&self) -> G::Texture {
        self.texture
    }
}

impl<G: GraphicsApi> Drop for Texture<G> {
    fn drop(&mut self) {
        self.gl.delete_texture(self.texture);
    }
}
