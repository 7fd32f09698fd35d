//! Shader program wrapper

use std::rc::Rc;

use log::{debug, warn};

use crate::gl_utils::{GlError, GraphicsApi, ShaderStage, Uniform};
use crate::math::{Mat3, Mat4, Vec3};

/// A linked vertex + fragment program.
pub struct ShaderProgram<G: GraphicsApi> {
    gl: Rc<G>,
    program: G::Program,
}

impl<G: GraphicsApi> ShaderProgram<G> {
    /// Compiles both stages and links them. Any compile or link failure is returned as-is.
    pub fn new(gl: &Rc<G>, vertex_source: &str, fragment_source: &str) -> Result<Self, GlError> {
        let vertex = gl.compile_shader(ShaderStage::Vertex, vertex_source)?;
        let fragment = match gl.compile_shader(ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };
        let program = gl.link_program(vertex, fragment)?;
        debug!("Linked shader program {:?}", program);

        Ok(Self {
            gl: Rc::clone(gl),
            program,
        })
    }

    /// Looks up a vertex attribute and enables its array.
    pub fn attrib(&self, name: &str) -> Result<u32, GlError> {
        let location = self
            .gl
            .attrib_location(self.program, name)
            .ok_or_else(|| GlError::MissingAttribute(name.to_string()))?;
        self.gl.enable_attrib_array(location)?;
        Ok(location)
    }

    /// Looks up a uniform. `None` when the driver reports no such active uniform.
    pub fn uniform(&self, name: &str) -> Option<G::UniformLocation> {
        let location = self.gl.uniform_location(self.program, name);
        if location.is_none() {
            warn!("Uniform `{}` is not active in program {:?}", name, self.program);
        }
        location
    }

    pub fn use_program(&self) -> Result<(), GlError> {
        self.gl.use_program(self.program)
    }

    /// Sets a uniform of the currently used program. A `None` location is skipped.
    pub fn set(&self, location: Option<&G::UniformLocation>, value: Uniform) -> Result<(), GlError> {
        match location {
            Some(location) => self.gl.set_uniform(location, value),
            None => Ok(()),
        }
    }

    pub fn set_float(&self, location: Option<&G::UniformLocation>, value: f32) -> Result<(), GlError> {
        self.set(location, Uniform::Float(value))
    }

    pub fn set_vec2(&self, location: Option<&G::UniformLocation>, x: f32, y: f32) -> Result<(), GlError> {
        self.set(location, Uniform::Vec2([x, y]))
    }

    pub fn set_vec3(&self, location: Option<&G::UniformLocation>, value: Vec3) -> Result<(), GlError> {
        self.set(location, Uniform::Vec3(value.to_array()))
    }

    pub fn set_mat3(&self, location: Option<&G::UniformLocation>, value: &Mat3) -> Result<(), GlError> {
        self.set(location, Uniform::Mat3(*value.as_array()))
    }

    pub fn set_mat4(&self, location: Option<&G::UniformLocation>, value: &Mat4) -> Result<(), GlError> {
        self.set(location, Uniform::Mat4(*value.as_array()))
    }

    pub fn set_sampler(&self, location: Option<&G::UniformLocation>, unit: i32) -> Result<(), GlError> {
        self.set(location, Uniform::Sampler(unit))
    }

    pub fn handle(&self) -> G::Program {
        self.program
    }
}

impl<G: GraphicsApi> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.program);
    }
}
