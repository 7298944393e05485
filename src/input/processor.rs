//! Converts raw platform events into engine commands.
//!
//! The `InputProcessor` owns all transient input state (cursor tracking,
//! drag detection, modifier keys) and the key-binding map. It is the only
//! thing that sits between raw window events and the engine's
//! [`execute`](crate::NozzleEngine::execute) method.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::{InputEvent, MouseButton};
use super::mouse::DragState;
use crate::engine::NozzleCommand;

/// Maps physical key strings to [`NozzleCommand`] variants.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format:
/// `"KeyQ"`, `"Escape"`, etc.
///
/// Only discrete commands make sense as key bindings. Parameterized
/// commands like `RotateCamera` come from mouse gestures.
///
/// ```toml
/// [keybindings.bindings]
/// KeyC = "clear_spray"
/// KeyR = "reset_camera"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    /// Forward map: key string → command tag.
    bindings: HashMap<String, KeyCommandTag>,
}

/// Serializable tag for the parameterless subset of [`NozzleCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommandTag {
    /// Hide the spray.
    ClearSpray,
    /// Return the camera to its initial view.
    ResetCamera,
    /// Show or hide the axes helper.
    ToggleAxes,
}

impl KeyCommandTag {
    const fn to_command(self) -> NozzleCommand {
        match self {
            Self::ClearSpray => NozzleCommand::ClearSpray,
            Self::ResetCamera => NozzleCommand::ResetCamera,
            Self::ToggleAxes => NozzleCommand::ToggleAxes,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("KeyC".into(), KeyCommandTag::ClearSpray),
            ("KeyQ".into(), KeyCommandTag::ResetCamera),
            ("KeyA".into(), KeyCommandTag::ToggleAxes),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the command for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<NozzleCommand> {
        self.bindings.get(key).map(|tag| tag.to_command())
    }

    /// Bind `key` to `tag`, replacing any previous binding of that key.
    pub fn bind(&mut self, key: impl Into<String>, tag: KeyCommandTag) {
        let _ = self.bindings.insert(key.into(), tag);
    }
}

/// Converts raw window events into [`NozzleCommand`]s.
///
/// # Usage
///
/// ```ignore
/// if let Some(cmd) = input_processor.handle_event(event) {
///     engine.execute(cmd)?;
/// }
/// if let Some(cmd) = input_processor.handle_key_press("KeyC") {
///     engine.execute(cmd)?;
/// }
/// ```
#[derive(Debug, Default)]
pub struct InputProcessor {
    state: DragState,
    /// Whether the primary mouse button is currently held.
    mouse_pressed: bool,
    /// Whether the shift modifier is currently held.
    shift_pressed: bool,
    key_bindings: KeyBindings,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeyBindings) -> Self {
        Self {
            key_bindings,
            ..Self::new()
        }
    }

    /// Whether the primary mouse button is pressed.
    #[must_use]
    pub const fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Whether the current press has moved far enough to count as a drag.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// Read-only access to the key bindings.
    #[must_use]
    pub const fn key_bindings(&self) -> &KeyBindings {
        &self.key_bindings
    }

    /// Replace the key bindings, e.g. after options were reloaded.
    pub fn set_key_bindings(&mut self, key_bindings: KeyBindings) {
        self.key_bindings = key_bindings;
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(&self, key: &str) -> Option<NozzleCommand> {
        self.key_bindings.lookup(key)
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<NozzleCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                self.handle_mouse_button(button, pressed);
                None
            }
            InputEvent::Scroll { delta } => Some(NozzleCommand::Zoom(delta)),
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<NozzleCommand> {
        let (dx, dy) = self.state.handle_mouse_position(x, y);
        if !self.mouse_pressed {
            return None;
        }
        self.state.track_drag((dx, dy));

        let delta = Vec2::new(dx, dy);
        if self.shift_pressed {
            Some(NozzleCommand::PanCamera(delta))
        } else {
            Some(NozzleCommand::RotateCamera(delta))
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Left {
            return;
        }
        if pressed {
            self.state.handle_mouse_down();
            self.mouse_pressed = true;
        } else {
            self.mouse_pressed = false;
            let _ = self.state.handle_mouse_up();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(p: &mut InputProcessor, pressed: bool) {
        let cmd = p.handle_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        });
        assert_eq!(cmd, None);
    }

    #[test]
    fn hover_without_press_does_nothing() {
        let mut p = InputProcessor::new();
        assert_eq!(p.handle_event(InputEvent::CursorMoved { x: 1.0, y: 1.0 }), None);
        assert_eq!(p.handle_event(InputEvent::CursorMoved { x: 9.0, y: 9.0 }), None);
    }

    #[test]
    fn drag_rotates() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        press(&mut p, true);
        let cmd = p.handle_event(InputEvent::CursorMoved { x: 15.0, y: 8.0 });
        assert_eq!(cmd, Some(NozzleCommand::RotateCamera(Vec2::new(5.0, -2.0))));
        assert!(p.is_dragging());
        press(&mut p, false);
        assert!(!p.is_dragging());
        assert!(!p.mouse_pressed());
    }

    #[test]
    fn shift_drag_pans() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(InputEvent::ModifiersChanged { shift: true });
        let _ = p.handle_event(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        press(&mut p, true);
        let cmd = p.handle_event(InputEvent::CursorMoved { x: 3.0, y: 4.0 });
        assert_eq!(cmd, Some(NozzleCommand::PanCamera(Vec2::new(3.0, 4.0))));
    }

    #[test]
    fn right_button_is_ignored() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: true,
        });
        assert!(!p.mouse_pressed());
    }

    #[test]
    fn scroll_zooms() {
        let mut p = InputProcessor::new();
        assert_eq!(
            p.handle_event(InputEvent::Scroll { delta: 1.5 }),
            Some(NozzleCommand::Zoom(1.5))
        );
    }

    #[test]
    fn default_bindings() {
        let p = InputProcessor::new();
        assert_eq!(p.handle_key_press("KeyC"), Some(NozzleCommand::ClearSpray));
        assert_eq!(p.handle_key_press("KeyA"), Some(NozzleCommand::ToggleAxes));
        assert_eq!(p.handle_key_press("F13"), None);
    }

    #[test]
    fn rebinding_replaces() {
        let mut bindings = KeyBindings::default();
        bindings.bind("KeyC", KeyCommandTag::ResetCamera);
        let p = InputProcessor::with_key_bindings(bindings);
        assert_eq!(p.handle_key_press("KeyC"), Some(NozzleCommand::ResetCamera));
    }
}
