//! Standalone visualization window backed by winit.
//!
//! When the `gui` feature is enabled, a wry webview panel is created
//! alongside the 3D viewport for the spray and camera sliders.
//!
//! ```no_run
//! # use nozzle::Viewer;
//! Viewer::builder()
//!     .with_title("Nozzle")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    error::NozzleError, options::Options, InputEvent, MouseButton,
    NozzleEngine,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            title: "Nozzle".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays the nozzle scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// [`NozzleError::Viewer`] if the event loop cannot start, or the
    /// engine error that prevented the first frame.
    pub fn run(self) -> Result<(), NozzleError> {
        #[cfg(all(feature = "gui", target_os = "linux"))]
        gtk::init().map_err(|e| NozzleError::Viewer(e.to_string()))?;

        let event_loop =
            EventLoop::new().map_err(|e| NozzleError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            options: Some(self.options),
            title: self.title,
            startup_error: None,
            #[cfg(feature = "gui")]
            panel: crate::gui::panel::PanelController::new(),
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| NozzleError::Viewer(e.to_string()))?;

        app.startup_error.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<NozzleEngine>,
    /// Taken when the engine is created.
    options: Option<Options>,
    title: String,
    /// Why the window closed before the first frame, if it did.
    startup_error: Option<NozzleError>,
    #[cfg(feature = "gui")]
    panel: crate::gui::panel::PanelController,
}

/// The surface always covers the full window; the panel overlays its
/// right edge.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), NozzleError> {
        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| NozzleError::Viewer(e.to_string()))?,
        );

        let options = self.options.take().unwrap_or_default();
        let engine = pollster::block_on(NozzleEngine::new(
            window.clone(),
            viewport_size(window.inner_size()),
            options,
        ))?;

        #[cfg(feature = "gui")]
        self.panel.init_webview(window.as_ref(), &engine);

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };

        #[cfg(all(feature = "gui", target_os = "linux"))]
        while gtk::events_pending() {
            let _ = gtk::main_iteration_do(false);
        }

        #[cfg(feature = "gui")]
        {
            self.panel.drain_and_apply(engine, window);
            self.panel.push_state_if_due(web_time::Instant::now(), engine);
        }

        match engine.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                let (w, h) = viewport_size(window.inner_size());
                engine.resize(w, h);
            }
            Err(e) => {
                log::error!("render error: {e:?}");
            }
        }
        window.request_redraw();
    }

    fn forward(&mut self, event: InputEvent) {
        if let Some(engine) = &mut self.engine {
            if let Err(e) = engine.handle_input(event) {
                log::warn!("input rejected: {e}");
            }
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("failed to initialize: {e}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                let (w, h) = viewport_size(size);
                if let Some(engine) = &mut self.engine {
                    engine.resize(w, h);
                }
                #[cfg(feature = "gui")]
                if let Some(window) = &self.window {
                    self.panel.apply_layout(window);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::MouseInput { button, state, .. } => {
                self.forward(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.forward(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.forward(InputEvent::from(delta));
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.forward(InputEvent::ModifiersChanged {
                    shift: modifiers.state().shift_key(),
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };

                // Backslash toggles the panel
                #[cfg(feature = "gui")]
                if code == winit::keyboard::KeyCode::Backslash {
                    if let Some(window) = &self.window {
                        self.panel.toggle(window);
                    }
                    return;
                }

                let key = format!("{code:?}");
                if let Some(engine) = &mut self.engine {
                    if let Err(e) = engine.handle_key_press(&key) {
                        log::warn!("key {key} rejected: {e}");
                    }
                }
            }

            _ => (),
        }
    }
}
