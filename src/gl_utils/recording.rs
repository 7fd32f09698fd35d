//! In-memory `GraphicsApi` that records every call, for tests that run without a GPU.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use super::{
    BufferTarget, GlError, GraphicsApi, IndexType, PrimitiveMode, ShaderStage, Uniform,
};
use crate::gfx::texture::{PixelData, PixelFormat};

/// `GL_INVALID_OPERATION`
pub const INVALID_OPERATION: u32 = 0x0502;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CompileShader { stage: ShaderStage, id: u32 },
    LinkProgram { program: u32, vertex: u32, fragment: u32 },
    UseProgram(u32),
    EnableAttribArray(u32),
    SetUniform { location: String, value: Uniform },
    CreateBuffer { id: u32, target: BufferTarget, bytes: Vec<u8> },
    AttachAttribute { buffer: u32, location: u32, components: i32 },
    DrawElements { mode: PrimitiveMode, indices: u32, count: usize, index_type: IndexType },
    DrawArrays { mode: PrimitiveMode, first: usize, count: usize },
    CreateTexture { id: u32, format: PixelFormat, width: u32, height: u32 },
    BindTexture { texture: u32, unit: u32 },
    Viewport(u32, u32),
    EnableDepthTest,
    Clear([f32; 4]),
    DeleteShader(u32),
    DeleteProgram(u32),
    DeleteBuffer(u32),
    DeleteTexture(u32),
}

#[derive(Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    attributes: RefCell<HashMap<String, u32>>,
    missing: RefCell<HashSet<String>>,
    failing: RefCell<HashSet<&'static str>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Makes attribute and uniform lookups for `name` come back empty.
    pub fn hide(&self, name: &str) {
        self.missing.borrow_mut().insert(name.to_string());
    }

    /// Makes the named call fail with `GL_INVALID_OPERATION` (or a compile/link error).
    /// `"compile_fragment_shader"` fails only the fragment stage.
    pub fn fail_on(&self, call: &'static str) {
        self.failing.borrow_mut().insert(call);
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn check(&self, call: &'static str) -> Result<(), GlError> {
        if self.failing.borrow().contains(call) {
            return Err(GlError::Api {
                call,
                code: INVALID_OPERATION,
            });
        }
        Ok(())
    }
}

impl GraphicsApi for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type UniformLocation = String;

    fn compile_shader(&self, stage: ShaderStage, _source: &str) -> Result<u32, GlError> {
        let fails = {
            let failing = self.failing.borrow();
            failing.contains("compile_shader")
                || (stage == ShaderStage::Fragment && failing.contains("compile_fragment_shader"))
        };
        if fails {
            return Err(GlError::Compile {
                stage,
                log: "syntax error".to_string(),
            });
        }
        let id = self.next_id();
        self.record(Call::CompileShader { stage, id });
        Ok(id)
    }

    fn link_program(&self, vertex: u32, fragment: u32) -> Result<u32, GlError> {
        if self.failing.borrow().contains("link_program") {
            return Err(GlError::Link("unresolved varying".to_string()));
        }
        let program = self.next_id();
        self.record(Call::LinkProgram {
            program,
            vertex,
            fragment,
        });
        Ok(program)
    }

    fn use_program(&self, program: u32) -> Result<(), GlError> {
        self.check("use_program")?;
        self.record(Call::UseProgram(program));
        Ok(())
    }

    fn attrib_location(&self, _program: u32, name: &str) -> Option<u32> {
        if self.missing.borrow().contains(name) {
            return None;
        }
        let mut attributes = self.attributes.borrow_mut();
        let next = attributes.len() as u32;
        Some(*attributes.entry(name.to_string()).or_insert(next))
    }

    fn enable_attrib_array(&self, location: u32) -> Result<(), GlError> {
        self.check("enable_attrib_array")?;
        self.record(Call::EnableAttribArray(location));
        Ok(())
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<String> {
        if self.missing.borrow().contains(name) {
            return None;
        }
        Some(name.to_string())
    }

    fn set_uniform(&self, location: &String, value: Uniform) -> Result<(), GlError> {
        self.check("set_uniform")?;
        self.record(Call::SetUniform {
            location: location.clone(),
            value,
        });
        Ok(())
    }

    fn create_buffer(&self, target: BufferTarget, bytes: &[u8]) -> Result<u32, GlError> {
        self.check("create_buffer")?;
        let id = self.next_id();
        self.record(Call::CreateBuffer {
            id,
            target,
            bytes: bytes.to_vec(),
        });
        Ok(id)
    }

    fn attach_attribute(&self, buffer: u32, location: u32, components: i32) -> Result<(), GlError> {
        self.check("attach_attribute")?;
        self.record(Call::AttachAttribute {
            buffer,
            location,
            components,
        });
        Ok(())
    }

    fn draw_elements(
        &self,
        mode: PrimitiveMode,
        indices: u32,
        count: usize,
        index_type: IndexType,
    ) -> Result<(), GlError> {
        self.check("draw_elements")?;
        self.record(Call::DrawElements {
            mode,
            indices,
            count,
            index_type,
        });
        Ok(())
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: usize, count: usize) -> Result<(), GlError> {
        self.check("draw_arrays")?;
        self.record(Call::DrawArrays { mode, first, count });
        Ok(())
    }

    fn create_texture(&self, pixels: &PixelData) -> Result<u32, GlError> {
        self.check("create_texture")?;
        let id = self.next_id();
        self.record(Call::CreateTexture {
            id,
            format: pixels.format,
            width: pixels.width,
            height: pixels.height,
        });
        Ok(id)
    }

    fn bind_texture(&self, texture: u32, unit: u32) -> Result<(), GlError> {
        self.check("bind_texture")?;
        self.record(Call::BindTexture { texture, unit });
        Ok(())
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.record(Call::Viewport(width, height));
    }

    fn enable_depth_test(&self) {
        self.record(Call::EnableDepthTest);
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(Call::Clear(color));
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(Call::DeleteBuffer(buffer));
    }

    fn delete_texture(&self, texture: u32) {
        self.record(Call::DeleteTexture(texture));
    }
}
