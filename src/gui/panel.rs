//! Parameter panel controller: owns the wry webview and its state.

use std::sync::mpsc;

use web_time::{Duration, Instant};
use winit::window::Window;

use super::webview::{self, UiAction};
use crate::engine::{NozzleCommand, NozzleEngine};

/// Minimum interval between state pushes to the page.
const STATE_PUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the webview panel and all associated state.
pub(crate) struct PanelController {
    webview: Option<wry::WebView>,
    action_rx: Option<mpsc::Receiver<UiAction>>,
    last_state_push: Instant,
    /// Whether the panel is shown.
    visible: bool,
}

impl PanelController {
    pub(crate) fn new() -> Self {
        Self {
            webview: None,
            action_rx: None,
            last_state_push: Instant::now(),
            visible: true,
        }
    }

    /// Create the wry webview and push the slider schema to it.
    pub(crate) fn init_webview(&mut self, window: &Window, engine: &NozzleEngine) {
        let size = window.inner_size();
        match webview::create_webview(window, size.width, size.height) {
            Ok((wv, rx)) => {
                webview::push_schema(&wv, &engine.panel_params());
                self.webview = Some(wv);
                self.action_rx = Some(rx);
            }
            Err(e) => {
                log::error!("failed to create panel webview: {e}");
            }
        }
    }

    /// Show or hide the panel.
    pub(crate) fn toggle(&mut self, window: &Window) {
        self.visible = !self.visible;
        self.apply_layout(window);
    }

    /// Position the webview for the current window size and visibility.
    pub(crate) fn apply_layout(&self, window: &Window) {
        let Some(ref wv) = self.webview else {
            return;
        };
        let inner = window.inner_size();
        let bounds = if self.visible {
            webview::panel_bounds(inner.width, inner.height)
        } else {
            webview::hidden_bounds(inner.width, inner.height)
        };
        if let Err(e) = wv.set_bounds(bounds) {
            log::warn!("panel layout failed: {e}");
        }
    }

    /// Drain IPC actions from the page and apply them to the engine.
    pub(crate) fn drain_and_apply(
        &mut self,
        engine: &mut NozzleEngine,
        window: &Window,
    ) {
        let Some(ref rx) = self.action_rx else {
            return;
        };
        let actions: Vec<UiAction> = rx.try_iter().collect();

        let mut changed = false;
        for action in actions {
            let cmd = match action {
                UiAction::SetAngle(angle) => NozzleCommand::SetSprayAngle(angle),
                UiAction::Clear => NozzleCommand::ClearSpray,
                UiAction::SetCameraZ(z) => NozzleCommand::SetCameraZ(z),
                UiAction::TogglePanel => {
                    self.toggle(window);
                    continue;
                }
            };
            if let Err(e) = engine.execute(cmd) {
                log::warn!("panel action {action:?} rejected: {e}");
            }
            changed = true;
        }

        if changed {
            self.push_state(engine);
        }
    }

    /// Push current values at a bounded rate, so orbiting with the mouse
    /// keeps the camera slider in sync.
    pub(crate) fn push_state_if_due(&mut self, now: Instant, engine: &NozzleEngine) {
        if now.duration_since(self.last_state_push) >= STATE_PUSH_INTERVAL {
            self.push_state(engine);
        }
    }

    fn push_state(&mut self, engine: &NozzleEngine) {
        if let Some(ref wv) = self.webview {
            webview::push_state(
                wv,
                &engine.panel_params(),
                Some(&engine.spray_snapshot()),
            );
            self.last_state_push = Instant::now();
        }
    }
}
