// src/gl_utils/glow_backend.rs
//! [`GraphicsApi`] over an OpenGL ES 2.0 context through `glow`.

use glow::HasContext;
use log::{debug, warn};

use super::{BufferTarget, GlError, GraphicsApi, IndexType, PrimitiveMode, ShaderStage, Uniform};
use crate::gfx::texture::{PixelData, PixelFormat};

/// Owns the loaded GL function table. All methods assume the context it was
/// created from is current on the calling thread.
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    /// # Safety
    ///
    /// `gl` must have been loaded from a context that stays current on this
    /// thread for as long as the backend is used.
    pub unsafe fn new(gl: glow::Context) -> Self {
        debug!(
            "GL context: {} / {}",
            gl.get_parameter_string(glow::VERSION),
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION)
        );
        Self { gl }
    }

    pub fn context(&self) -> &glow::Context {
        &self.gl
    }

    /// Reports the first pending GL error after `call`.
    fn check(&self, call: &'static str) -> Result<(), GlError> {
        let code = unsafe { self.gl.get_error() };
        if code == glow::NO_ERROR {
            Ok(())
        } else {
            Err(GlError::Api { call, code })
        }
    }

    /// Errors from calls that cannot fail in a way the caller can act on are only logged.
    fn log_error(&self, call: &'static str) {
        if let Err(err) = self.check(call) {
            warn!("{}", err);
        }
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn index_enum(index_type: IndexType) -> u32 {
    match index_type {
        IndexType::U16 => glow::UNSIGNED_SHORT,
    }
}

fn mode_enum(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Points => glow::POINTS,
        PrimitiveMode::Lines => glow::LINES,
        PrimitiveMode::LineStrip => glow::LINE_STRIP,
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveMode::TriangleFan => glow::TRIANGLE_FAN,
    }
}

fn format_enum(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Alpha => glow::ALPHA,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
        PixelFormat::Luminance => glow::LUMINANCE,
        PixelFormat::LuminanceAlpha => glow::LUMINANCE_ALPHA,
    }
}

impl GraphicsApi for GlowBackend {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Buffer = glow::NativeBuffer;
    type Texture = glow::NativeTexture;
    type UniformLocation = glow::NativeUniformLocation;

    fn compile_shader(&self, stage: ShaderStage, source: &str) -> Result<glow::NativeShader, GlError> {
        unsafe {
            let shader = self
                .gl
                .create_shader(stage_enum(stage))
                .map_err(|e| GlError::Create("shader", e))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);

            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(GlError::Compile { stage, log });
            }
            Ok(shader)
        }
    }

    fn link_program(
        &self,
        vertex: glow::NativeShader,
        fragment: glow::NativeShader,
    ) -> Result<glow::NativeProgram, GlError> {
        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    self.gl.delete_shader(vertex);
                    self.gl.delete_shader(fragment);
                    return Err(GlError::Create("program", e));
                }
            };
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);

            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(GlError::Link(log));
            }

            let notes = self.gl.get_program_info_log(program);
            if !notes.trim().is_empty() {
                debug!("Program link log: {}", notes.trim());
            }
            Ok(program)
        }
    }

    fn use_program(&self, program: glow::NativeProgram) -> Result<(), GlError> {
        unsafe { self.gl.use_program(Some(program)) };
        self.check("use_program")
    }

    fn attrib_location(&self, program: glow::NativeProgram, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn enable_attrib_array(&self, location: u32) -> Result<(), GlError> {
        unsafe { self.gl.enable_vertex_attrib_array(location) };
        self.check("enable_vertex_attrib_array")
    }

    fn uniform_location(&self, program: glow::NativeProgram, name: &str) -> Option<glow::NativeUniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: &glow::NativeUniformLocation, value: Uniform) -> Result<(), GlError> {
        let location = Some(location);
        unsafe {
            match value {
                Uniform::Float(v) => self.gl.uniform_1_f32(location, v),
                Uniform::Vec2([x, y]) => self.gl.uniform_2_f32(location, x, y),
                Uniform::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                Uniform::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(location, false, &m),
                Uniform::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m),
                Uniform::Sampler(unit) => self.gl.uniform_1_i32(location, unit),
            }
        }
        self.check("uniform")
    }

    fn create_buffer(&self, target: BufferTarget, bytes: &[u8]) -> Result<glow::NativeBuffer, GlError> {
        let target = target_enum(target);
        unsafe {
            let buffer = self
                .gl
                .create_buffer()
                .map_err(|e| GlError::Create("buffer", e))?;
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, bytes, glow::STATIC_DRAW);
            if let Err(err) = self.check("buffer_data") {
                self.gl.delete_buffer(buffer);
                return Err(err);
            }
            Ok(buffer)
        }
    }

    fn attach_attribute(
        &self,
        buffer: glow::NativeBuffer,
        location: u32,
        components: i32,
    ) -> Result<(), GlError> {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl
                .vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, 0, 0);
        }
        self.check("vertex_attrib_pointer")
    }

    fn draw_elements(
        &self,
        mode: PrimitiveMode,
        indices: glow::NativeBuffer,
        count: usize,
        index_type: IndexType,
    ) -> Result<(), GlError> {
        unsafe {
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(indices));
            self.gl.draw_elements(
                mode_enum(mode),
                count.min(i32::MAX as usize) as i32,
                index_enum(index_type),
                0,
            );
        }
        self.check("draw_elements")
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: usize, count: usize) -> Result<(), GlError> {
        unsafe {
            self.gl.draw_arrays(
                mode_enum(mode),
                first.min(i32::MAX as usize) as i32,
                count.min(i32::MAX as usize) as i32,
            );
        }
        self.check("draw_arrays")
    }

    fn create_texture(&self, pixels: &PixelData) -> Result<glow::NativeTexture, GlError> {
        let format = format_enum(pixels.format);
        unsafe {
            let texture = self
                .gl
                .create_texture()
                .map_err(|e| GlError::Create("texture", e))?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format as i32,
                pixels.width as i32,
                pixels.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                Some(pixels.pixels.as_slice()),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            if let Err(err) = self.check("tex_image_2d") {
                self.gl.delete_texture(texture);
                return Err(err);
            }
            Ok(texture)
        }
    }

    fn bind_texture(&self, texture: glow::NativeTexture, unit: u32) -> Result<(), GlError> {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
        self.check("bind_texture")
    }

    fn set_viewport(&self, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(
                0,
                0,
                width.min(i32::MAX as u32) as i32,
                height.min(i32::MAX as u32) as i32,
            );
        }
        self.log_error("viewport");
    }

    fn enable_depth_test(&self) {
        unsafe { self.gl.enable(glow::DEPTH_TEST) };
        self.log_error("enable");
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        self.log_error("clear");
    }

    fn delete_shader(&self, shader: glow::NativeShader) {
        unsafe { self.gl.delete_shader(shader) };
    }

    fn delete_program(&self, program: glow::NativeProgram) {
        unsafe { self.gl.delete_program(program) };
    }

    fn delete_buffer(&self, buffer: glow::NativeBuffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn delete_texture(&self, texture: glow::NativeTexture) {
        unsafe { self.gl.delete_texture(texture) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_formats_map_to_unsized_gles_formats() {
        assert_eq!(format_enum(PixelFormat::Alpha), 0x1906);
        assert_eq!(format_enum(PixelFormat::Rgb), 0x1907);
        assert_eq!(format_enum(PixelFormat::Rgba), 0x1908);
        assert_eq!(format_enum(PixelFormat::Luminance), 0x1909);
        assert_eq!(format_enum(PixelFormat::LuminanceAlpha), 0x190A);
    }

    #[test]
    fn test_index_and_mode_enums() {
        assert_eq!(index_enum(IndexType::U16), 0x1403);
        assert_eq!(mode_enum(PrimitiveMode::Triangles), 0x0004);
        assert_eq!(mode_enum(PrimitiveMode::TriangleStrip), 0x0005);
    }

    #[test]
    fn test_backend_texture_upload_signature() {
        // Pins the upload path to the glow API without needing a live context
        let create: fn(&GlowBackend, &PixelData) -> Result<glow::NativeTexture, GlError> =
            <GlowBackend as GraphicsApi>::create_texture;
        let delete: fn(&GlowBackend, glow::NativeShader) = <GlowBackend as GraphicsApi>::delete_shader;
        assert_ne!(create as usize, 0);
        assert_ne!(delete as usize, 0);
    }
}
