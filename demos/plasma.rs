//! # Plasma
//!
//! A fullscreen quad coloured by a time-driven fragment shader (the GLSL
//! Sandbox default effect by @mrdoob).
//!
//! ## Usage
//!
//! Run with: `cargo run --example plasma`

use std::rc::Rc;

use shortcrust::prelude::*;

type Location = <GlowBackend as GraphicsApi>::UniformLocation;

const VERTEX_SHADER: &str = r#"
attribute vec4 vPosition;
void main() {
    gl_Position = vPosition;
}
"#;

const FRAGMENT_SHADER: &str = r#"
precision mediump float;

uniform float time;
uniform vec2 resolution;

void main(void) {
    vec2 position = gl_FragCoord.xy / resolution.xy;

    float color = 0.0;
    color += sin(position.x * cos(time / 15.0) * 80.0) + cos(position.y * cos(time / 15.0) * 10.0);
    color += sin(position.y * sin(time / 10.0) * 40.0) + cos(position.x * sin(time / 25.0) * 40.0);
    color += sin(position.x * sin(time / 5.0) * 10.0) + sin(position.y * sin(time / 35.0) * 80.0);
    color *= sin(time / 10.0) * 0.5;

    gl_FragColor = vec4(vec3(color, color * 0.5, sin(color + time / 3.0) * 0.75), 1.0);
}
"#;

struct PlasmaShader {
    program: ShaderProgram<GlowBackend>,
    position: u32,
    time: Option<Location>,
    resolution: Option<Location>,
}

impl PlasmaShader {
    fn new(gl: &Rc<GlowBackend>) -> Result<Self> {
        let program = ShaderProgram::new(gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        Ok(Self {
            position: program.attrib("vPosition")?,
            time: program.uniform("time"),
            resolution: program.uniform("resolution"),
            program,
        })
    }

    fn draw(&self, model: &ArrayMesh<GlowBackend>) -> Result<()> {
        model.attach(self.position)?;
        model.draw()?;
        Ok(())
    }
}

#[derive(Default)]
struct PlasmaDemo {
    scene: Option<(PlasmaShader, ArrayMesh<GlowBackend>)>,
}

impl App<GlowBackend> for PlasmaDemo {
    fn setup(&mut self, gl: &Rc<GlowBackend>, viewport: Viewport) -> Result<()> {
        let shader = PlasmaShader::new(gl)?;
        let quad = ArrayMesh::fullscreen_quad(gl)?;

        shader.program.use_program()?;
        shader.program.set_vec2(
            shader.resolution.as_ref(),
            viewport.width as f32,
            viewport.height as f32,
        )?;

        self.scene = Some((shader, quad));
        Ok(())
    }

    fn draw(&mut self, _gl: &Rc<GlowBackend>, elapsed: f32, _viewport: Viewport) -> Result<()> {
        let Some((shader, quad)) = self.scene.as_ref() else {
            return Ok(());
        };

        shader.program.use_program()?;
        shader.program.set_float(shader.time.as_ref(), elapsed)?;
        shader.draw(quad)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::default().with_title("Shortcrust plasma example");
    shortcrust::run(config, PlasmaDemo::default())?;
    Ok(())
}
