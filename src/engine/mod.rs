//! The rendering engine: GPU context plus [`EngineState`].

/// Commands accepted by the engine.
pub mod command;
mod state;

pub use command::NozzleCommand;
pub use state::EngineState;

use crate::camera::core::Camera;
use crate::controller::{PanelParams, SpraySnapshot};
use crate::error::NozzleError;
use crate::gpu::lighting::Lighting;
use crate::gpu::render_context::RenderContext;
use crate::input::{InputEvent, InputProcessor};
use crate::options::Options;
use crate::renderer::SceneRenderer;
use crate::scene::Scene;
use crate::util::frame_timing::FrameTiming;

/// Target FPS limit
const TARGET_FPS: u32 = 120;

/// Nozzle scene renderer and command sink.
///
/// # Frame loop
///
/// Each frame, call [`render`](Self::render) to draw and present. Call
/// [`resize`](Self::resize) when the window size changes. Raw input is
/// forwarded through [`handle_input`](Self::handle_input) and
/// [`handle_key_press`](Self::handle_key_press); everything else goes
/// through [`execute`](Self::execute).
pub struct NozzleEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    state: EngineState,
    /// GPU lighting uniform and bind group.
    pub lighting: Lighting,
    renderer: SceneRenderer,
    input: InputProcessor,
    frame_timing: FrameTiming,
}

impl NozzleEngine {
    /// Create the GPU context, build the scene and compile pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`NozzleError`] if GPU initialization, shader composition,
    /// or scene binding fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, NozzleError> {
        let context = RenderContext::new(window, size).await?;
        let input = InputProcessor::with_key_bindings(options.keybindings.clone());
        let state = EngineState::new(options, context.size())?;
        let lighting =
            Lighting::new(&context, &state.options().lighting, state.camera());
        let renderer = SceneRenderer::new(&context, &lighting)?;
        log::info!(
            "engine ready: {} nodes, spray scope {:?}",
            state.scene().node_count(),
            state.spray().scope()
        );

        Ok(Self {
            context,
            state,
            lighting,
            renderer,
            input,
            frame_timing: FrameTiming::new(TARGET_FPS),
        })
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// See [`EngineState::execute`].
    pub fn execute(&mut self, cmd: NozzleCommand) -> Result<(), NozzleError> {
        log::debug!("execute {cmd:?}");
        self.state.execute(cmd)
    }

    /// Route a raw input event through the input processor.
    ///
    /// # Errors
    ///
    /// Propagates [`execute`](Self::execute) errors.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), NozzleError> {
        match self.input.handle_event(event) {
            Some(cmd) => self.execute(cmd),
            None => Ok(()),
        }
    }

    /// Route a key press through the key bindings.
    ///
    /// # Errors
    ///
    /// Propagates [`execute`](Self::execute) errors.
    pub fn handle_key_press(&mut self, key: &str) -> Result<(), NozzleError> {
        match self.input.handle_key_press(key) {
            Some(cmd) => self.execute(cmd),
            None => Ok(()),
        }
    }

    /// Execute one frame: sync the light to the camera, upload scene
    /// changes, draw, and present.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the swapchain frame cannot be
    /// acquired.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.frame_timing.should_render() {
            return Ok(());
        }

        let camera = *self.state.camera();
        self.lighting.update(
            &self.context.queue,
            &self.state.options().lighting,
            &camera,
        );
        self.renderer
            .prepare(&self.context, self.state.scene_mut(), &camera);

        let frame = self.context.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let background = self.state.options().display.background;
        let (renderer, lighting) = (&self.renderer, &self.lighting);
        self.context.encode_and_submit("nozzle frame", |encoder| {
            renderer.render(encoder, &view, lighting, background);
        });
        frame.present();

        self.frame_timing.end_frame();
        Ok(())
    }

    /// Resize the surface, depth target and camera projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.context.resize(width, height);
            self.state.resize(width, height);
            self.renderer.resize(&self.context);
        }
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        self.state.options()
    }

    /// Replace options and apply them to every subsystem.
    ///
    /// # Errors
    ///
    /// See [`EngineState::set_options`].
    pub fn set_options(&mut self, options: Options) -> Result<(), NozzleError> {
        self.input.set_key_bindings(options.keybindings.clone());
        self.state.set_options(options)
    }

    /// Values the parameter panel should display.
    #[must_use]
    pub fn panel_params(&self) -> PanelParams {
        self.state.panel_params()
    }

    /// Read-only spray state.
    #[must_use]
    pub fn spray_snapshot(&self) -> SpraySnapshot {
        self.state.spray_snapshot()
    }

    /// The scene model.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.state.scene()
    }

    /// Camera for the current frame.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        self.state.camera()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }

    /// Draws recorded in the last frame.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.renderer.mesh_pass.draw_count()
    }
}
