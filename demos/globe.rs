//! # Globe
//!
//! A textured sphere spinning about its Y axis, lit by a single point light
//! with a Phong shader.
//!
//! ## Usage
//!
//! Run with: `cargo run --example globe -- [path/to/equirectangular.jpg]`
//!
//! The image defaults to `world.jpg` in the working directory.

use std::rc::Rc;

use log::debug;
use shortcrust::prelude::*;

type Location = <GlowBackend as GraphicsApi>::UniformLocation;

const VERTEX_SHADER: &str = r#"
attribute vec3 aVertexPosition;
attribute vec3 aVertexNormal;
attribute vec2 aTexturePosition;

uniform mat4 uMVMatrix;
uniform mat4 uPMatrix;
uniform mat3 uNMatrix;

varying vec3 vNormal;
varying vec4 vPosition;
varying vec2 vTextureCoord;

void main(void) {
    vPosition = uMVMatrix * vec4(aVertexPosition, 1.0);
    vNormal = uNMatrix * aVertexNormal;
    gl_Position = uPMatrix * vPosition;
    vTextureCoord = aTexturePosition;
}
"#;

const FRAGMENT_SHADER: &str = r#"
precision mediump float;

varying vec3 vNormal;
varying vec4 vPosition;
varying vec2 vTextureCoord;

uniform vec3 uLightLocation;
uniform sampler2D uSampler;

const vec3 cAmbientColor = vec3(0.1, 0.1, 0.1);
const vec3 cDiffuseColor = vec3(0.8, 0.8, 0.8);
const vec3 cSpecularColor = vec3(0.0, 0.0, 0.0);
const float cMaterialShininess = 3.0;

void main(void) {
    vec3 lightDirection = normalize(uLightLocation - vPosition.xyz);
    float diffuse = max(dot(vNormal, lightDirection), 0.0);

    vec3 eyeDirection = normalize(-vPosition.xyz);
    vec3 reflectionDirection = reflect(-lightDirection, vNormal);
    float specular = pow(max(dot(reflectionDirection, eyeDirection), 0.0), cMaterialShininess);

    vec3 lightWeighting = cAmbientColor + cDiffuseColor * diffuse + cSpecularColor + specular;
    vec3 materialColor = texture2D(uSampler, vTextureCoord).rgb;

    gl_FragColor = vec4(materialColor * lightWeighting, 1.0);
}
"#;

/// Phong shader with one texture and a point light given in eye space.
struct PhongTextureShader {
    program: ShaderProgram<GlowBackend>,
    attributes: MeshAttributes,
    projection: Option<Location>,
    model_view: Option<Location>,
    normal: Option<Location>,
    light_location: Option<Location>,
    sampler: Option<Location>,
}

impl PhongTextureShader {
    fn new(gl: &Rc<GlowBackend>) -> Result<Self> {
        let program = ShaderProgram::new(gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        program.use_program()?;

        let attributes = MeshAttributes::new(
            program.attrib("aVertexPosition")?,
            program.attrib("aVertexNormal")?,
            program.attrib("aTexturePosition")?,
        );

        Ok(Self {
            projection: program.uniform("uPMatrix"),
            model_view: program.uniform("uMVMatrix"),
            normal: program.uniform("uNMatrix"),
            light_location: program.uniform("uLightLocation"),
            sampler: program.uniform("uSampler"),
            attributes,
            program,
        })
    }

    fn draw(&self, model: &Mesh<GlowBackend>) -> Result<()> {
        model.activate_texture(0)?;
        self.program.set_sampler(self.sampler.as_ref(), 0)?;
        model.attach_attributes(self.attributes)?;
        model.draw()?;
        Ok(())
    }
}

struct Scene {
    shader: PhongTextureShader,
    model: Mesh<GlowBackend>,
    // Reused every frame
    model_view: Mat4,
    normal_matrix: Mat3,
    light_location: Vec3,
}

struct GlobeDemo {
    texture_path: String,
    scene: Option<Scene>,
}

impl App<GlowBackend> for GlobeDemo {
    fn setup(&mut self, gl: &Rc<GlowBackend>, viewport: Viewport) -> Result<()> {
        gl.enable_depth_test();

        let shader = PhongTextureShader::new(gl)?;
        shader.program.set_mat4(
            shader.projection.as_ref(),
            &Mat4::perspective(45.0, viewport.aspect_ratio(), 0.1, 100.0),
        )?;

        let texture = Texture::from_file(gl, &self.texture_path, PixelFormat::Rgb, true)?;
        let model = Sphere::default().build()?.to_mesh(gl)?.with_texture(texture);

        self.scene = Some(Scene {
            shader,
            model,
            model_view: Mat4::identity(),
            normal_matrix: Mat3::identity(),
            light_location: Vec3::new(2.0, 5.0, -3.0),
        });
        Ok(())
    }

    fn draw(&mut self, gl: &Rc<GlowBackend>, elapsed: f32, viewport: Viewport) -> Result<()> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };

        gl.set_viewport(viewport.width, viewport.height);
        gl.clear([0.0, 0.0, 0.0, 1.0]);

        Mat4::look_at_into(
            Vec3::new(0.0, 0.0, -4.0),
            Vec3::zero(),
            Vec3::unit_y(),
            &mut scene.model_view,
        );

        let shader = &scene.shader;
        shader.program.use_program()?;

        // Light is fixed in the world, so it moves with the camera only
        let light = scene.model_view.multiply_vec3(scene.light_location);
        shader
            .program
            .set_vec3(shader.light_location.as_ref(), light)?;

        scene.model_view.rotate_y(elapsed / 2.0);
        shader
            .program
            .set_mat4(shader.model_view.as_ref(), &scene.model_view)?;

        match scene.model_view.to_inverse_mat3_into(&mut scene.normal_matrix) {
            Ok(normal_matrix) => {
                normal_matrix.transpose();
            }
            Err(err) => debug!("Keeping last normal matrix: {}", err),
        }
        shader
            .program
            .set_mat3(shader.normal.as_ref(), &scene.normal_matrix)?;

        shader.draw(&scene.model)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let texture_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "world.jpg".to_string());

    let config = AppConfig::default().with_title("Shortcrust globe example");
    shortcrust::run(
        config,
        GlobeDemo {
            texture_path,
            scene: None,
        },
    )?;
    Ok(())
}
