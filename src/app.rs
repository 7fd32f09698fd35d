//! Application driver
//!
//! An [`App`] is set up once after the GL context and window size are
//! known, drawn every frame with the seconds elapsed since setup, and told
//! once when the loop stops. [`FrameDriver`] enforces that lifecycle;
//! [`run`] feeds it from a winit window with an OpenGL ES 2.0 context.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use glutin::config::{Api, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{debug, error, info, warn};
use raw_window_handle::HasWindowHandle;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::error::{Error, Result};
use crate::gl_utils::{GlowBackend, GraphicsApi};

/// Window settings for [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Wait for vertical blank between frames
    pub vsync: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "shortcrust".to_string(),
            width: 800,
            height: 600,
            vsync: true,
        }
    }
}

impl AppConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height (minimised window) counts as 1.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// A program driven by [`run`] or a [`FrameDriver`].
pub trait App<G: GraphicsApi> {
    /// Called once, after the context exists and the viewport is known.
    fn setup(&mut self, gl: &Rc<G>, viewport: Viewport) -> Result<()>;

    /// Called once per frame. `elapsed` is seconds since setup and never decreases.
    fn draw(&mut self, gl: &Rc<G>, elapsed: f32, viewport: Viewport) -> Result<()>;

    /// Called once when the loop stops.
    fn on_exit(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Waiting for setup
    Pending,
    Running,
    /// Setup failed; nothing will be drawn
    Failed,
    Stopped,
}

/// Lifecycle state machine around an [`App`], independent of any window system.
pub struct FrameDriver<G: GraphicsApi, A: App<G>> {
    app: A,
    state: DriverState,
    last_elapsed: f32,
    frames: u64,
    _backend: PhantomData<G>,
}

impl<G: GraphicsApi, A: App<G>> FrameDriver<G, A> {
    pub fn new(app: A) -> Self {
        Self {
            app,
            state: DriverState::Pending,
            last_elapsed: 0.0,
            frames: 0,
            _backend: PhantomData,
        }
    }

    /// Runs the app's setup. Only the first call has any effect.
    pub fn setup(&mut self, gl: &Rc<G>, viewport: Viewport) -> Result<()> {
        if self.state != DriverState::Pending {
            warn!("Ignoring repeated setup in state {:?}", self.state);
            return Ok(());
        }

        match self.app.setup(gl, viewport) {
            Ok(()) => {
                info!("Setup complete ({}x{})", viewport.width, viewport.height);
                self.state = DriverState::Running;
                Ok(())
            }
            Err(err) => {
                self.state = DriverState::Failed;
                Err(err)
            }
        }
    }

    /// Draws one frame if the app is running. Elapsed time earlier than the
    /// previous frame's is clamped up to it.
    pub fn draw(&mut self, gl: &Rc<G>, elapsed: f32, viewport: Viewport) -> Result<()> {
        if self.state != DriverState::Running {
            return Ok(());
        }

        let elapsed = elapsed.max(self.last_elapsed);
        self.last_elapsed = elapsed;
        self.frames += 1;
        self.app.draw(gl, elapsed, viewport)
    }

    /// Stops the loop, calling `on_exit` the first time only.
    pub fn stop(&mut self) {
        if self.state == DriverState::Stopped {
            return;
        }
        debug!("Stopping after {} frames", self.frames);
        self.state = DriverState::Stopped;
        self.app.on_exit();
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn app(&self) -> &A {
        &self.app
    }
}

/// Opens a window with an OpenGL ES 2.0 context and drives `app` until the
/// window is closed or Escape is pressed.
///
/// A setup failure is returned. A draw failure is logged and ends the loop.
pub fn run<A: App<GlowBackend>>(config: AppConfig, app: A) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = Runner {
        driver: FrameDriver::new(app),
        context: None,
        config,
        started: None,
        error: None,
    };
    event_loop
        .run_app(&mut runner)
        .map_err(|e| Error::Window(e.to_string()))?;
    runner.driver.stop();

    match runner.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// The candidate with the largest depth buffer; ties keep the earliest.
fn deepest_config<C>(configs: impl Iterator<Item = C>, depth: impl Fn(&C) -> u8) -> Option<C> {
    configs.reduce(|best, c| if depth(&c) > depth(&best) { c } else { best })
}

struct GlContext {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    gl: Rc<GlowBackend>,
}

impl GlContext {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self> {
        let window_attributes = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));
        let template = ConfigTemplateBuilder::new()
            .with_api(Api::GLES2)
            .with_depth_size(16);

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(window_attributes))
            .build(event_loop, template, |configs| {
                // glutin-winit returns Err from build() when the display reports no
                // matching configs, so the picker never sees an empty iterator
                deepest_config(configs, |c| c.depth_size())
                    .expect("glutin passed an empty config list to the picker")
            })
            .map_err(|e| Error::Window(e.to_string()))?;
        let window = window.ok_or_else(|| Error::Window("no window was created".to_string()))?;

        let raw_window_handle = window
            .window_handle()
            .map_err(|e| Error::Window(e.to_string()))?
            .as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| Error::Window(e.to_string()))?;
        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(|e| Error::Window(e.to_string()))?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(|e| Error::Window(e.to_string()))?;
        let context = not_current
            .make_current(&surface)
            .map_err(|e| Error::Window(e.to_string()))?;

        if config.vsync {
            if let Err(err) =
                surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                warn!("Could not enable vsync: {}", err);
            }
        }

        let gl = unsafe {
            GlowBackend::new(glow::Context::from_loader_function_cstr(|symbol: &CStr| {
                gl_display.get_proc_address(symbol)
            }))
        };

        Ok(Self {
            window,
            surface,
            context,
            gl: Rc::new(gl),
        })
    }

    fn viewport(&self) -> Viewport {
        let PhysicalSize { width, height } = self.window.inner_size();
        Viewport::new(width, height)
    }
}

struct Runner<A: App<GlowBackend>> {
    // Dropped before `context` so GPU objects are released while it is current.
    driver: FrameDriver<GlowBackend, A>,
    context: Option<GlContext>,
    config: AppConfig,
    started: Option<Instant>,
    error: Option<Error>,
}

impl<A: App<GlowBackend>> Runner<A> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl<A: App<GlowBackend>> ApplicationHandler for Runner<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() {
            return;
        }

        let context = match GlContext::new(event_loop, &self.config) {
            Ok(context) => context,
            Err(err) => return self.fail(event_loop, err),
        };

        let viewport = context.viewport();
        context.gl.set_viewport(viewport.width, viewport.height);
        let setup = self.driver.setup(&context.gl, viewport);
        self.context = Some(context);

        match setup {
            Ok(()) => self.started = Some(Instant::now()),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(context) = self.context.as_ref() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
                    context.surface.resize(&context.context, w, h);
                }
            }
            WindowEvent::RedrawRequested => {
                let elapsed = self
                    .started
                    .map(|started| started.elapsed().as_secs_f32())
                    .unwrap_or(0.0);
                let viewport = context.viewport();

                if let Err(err) = self.driver.draw(&context.gl, elapsed, viewport) {
                    error!("Draw failed, stopping: {}", err);
                    event_loop.exit();
                    return;
                }
                if let Err(err) = context.surface.swap_buffers(&context.context) {
                    error!("Swap failed, stopping: {}", err);
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(context) = self.context.as_ref() {
            context.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.driver.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl_utils::recording::{Call, RecordingBackend};
    use crate::gl_utils::GlError;

    #[derive(Default)]
    struct ScriptedApp {
        setups: u32,
        exits: u32,
        times: Vec<f32>,
        fail_setup: bool,
        fail_draw_at: Option<usize>,
    }

    impl App<RecordingBackend> for ScriptedApp {
        fn setup(&mut self, gl: &Rc<RecordingBackend>, _viewport: Viewport) -> Result<()> {
            self.setups += 1;
            if self.fail_setup {
                return Err(GlError::Link("broken".to_string()).into());
            }
            gl.enable_depth_test();
            Ok(())
        }

        fn draw(&mut self, _gl: &Rc<RecordingBackend>, elapsed: f32, _viewport: Viewport) -> Result<()> {
            if self.fail_draw_at == Some(self.times.len()) {
                return Err(GlError::Api {
                    call: "draw_elements",
                    code: 0x0502,
                }
                .into());
            }
            self.times.push(elapsed);
            Ok(())
        }

        fn on_exit(&mut self) {
            self.exits += 1;
        }
    }

    const VIEWPORT: Viewport = Viewport {
        width: 640,
        height: 480,
    };

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.title, "shortcrust");
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.vsync);
        assert_eq!(config.with_title("globe").title, "globe");
    }

    #[test]
    fn test_viewport_aspect_ratio() {
        assert!((VIEWPORT.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(Viewport::new(100, 0).aspect_ratio(), 100.0);
    }

    #[test]
    fn test_no_draw_before_setup() {
        let gl = Rc::new(RecordingBackend::new());
        let mut driver = FrameDriver::new(ScriptedApp::default());

        driver.draw(&gl, 1.0, VIEWPORT).unwrap();
        assert!(driver.app().times.is_empty());
        assert_eq!(driver.state(), DriverState::Pending);
    }

    #[test]
    fn test_setup_runs_once() {
        let gl = Rc::new(RecordingBackend::new());
        let mut driver = FrameDriver::new(ScriptedApp::default());

        driver.setup(&gl, VIEWPORT).unwrap();
        driver.setup(&gl, VIEWPORT).unwrap();
        assert_eq!(driver.app().setups, 1);
        assert!(driver.is_running());
        assert_eq!(gl.calls(), vec![Call::EnableDepthTest]);
    }

    #[test]
    fn test_elapsed_time_never_decreases() {
        let gl = Rc::new(RecordingBackend::new());
        let mut driver = FrameDriver::new(ScriptedApp::default());
        driver.setup(&gl, VIEWPORT).unwrap();

        for t in [0.0, 0.5, 0.25, 1.0] {
            driver.draw(&gl, t, VIEWPORT).unwrap();
        }
        assert_eq!(driver.app().times, vec![0.0, 0.5, 0.5, 1.0]);
        assert_eq!(driver.frames(), 4);
    }

    #[test]
    fn test_failed_setup_is_fatal() {
        let gl = Rc::new(RecordingBackend::new());
        let mut driver = FrameDriver::new(ScriptedApp {
            fail_setup: true,
            ..Default::default()
        });

        assert!(matches!(
            driver.setup(&gl, VIEWPORT),
            Err(Error::Gl(GlError::Link(_)))
        ));
        assert_eq!(driver.state(), DriverState::Failed);

        driver.draw(&gl, 1.0, VIEWPORT).unwrap();
        assert!(driver.app().times.is_empty());
    }

    #[test]
    fn test_draw_error_is_returned() {
        let gl = Rc::new(RecordingBackend::new());
        let mut driver = FrameDriver::new(ScriptedApp {
            fail_draw_at: Some(1),
            ..Default::default()
        });
        driver.setup(&gl, VIEWPORT).unwrap();

        assert!(driver.draw(&gl, 0.1, VIEWPORT).is_ok());
        assert!(matches!(
            driver.draw(&gl, 0.2, VIEWPORT),
            Err(Error::Gl(GlError::Api { .. }))
        ));
    }

    #[test]
    fn test_on_exit_called_exactly_once() {
        let gl = Rc::new(RecordingBackend::new());
        let mut driver = FrameDriver::new(ScriptedApp::default());
        driver.setup(&gl, VIEWPORT).unwrap();

        driver.stop();
        driver.stop();
        assert_eq!(driver.app().exits, 1);
        assert_eq!(driver.state(), DriverState::Stopped);

        driver.draw(&gl, 5.0, VIEWPORT).unwrap();
        assert!(driver.app().times.is_empty());
    }

    #[test]
    fn test_config_picker_prefers_deepest_then_first() {
        let configs = [("a", 16), ("b", 24), ("c", 24), ("d", 0)];
        let picked = deepest_config(configs.into_iter(), |c| c.1);
        assert_eq!(picked, Some(("b", 24)));

        assert_eq!(deepest_config(std::iter::empty::<(&str, u8)>(), |c| c.1), None);
    }
}
