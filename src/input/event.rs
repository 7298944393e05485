//! Window-system-independent input events.
//!
//! Embedders translate their platform events into [`InputEvent`] and hand
//! them to [`NozzleEngine::handle_input`](crate::NozzleEngine::handle_input).
//! With the `viewer` feature, conversions from winit types live here too.

/// A pointer or modifier change, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to an absolute position.
    CursorMoved {
        /// X in physical pixels.
        x: f32,
        /// Y in physical pixels, growing downward.
        y: f32,
    },
    /// A mouse button went down or up.
    MouseButton {
        /// The button.
        button: MouseButton,
        /// `true` on press.
        pressed: bool,
    },
    /// Wheel motion in lines; positive moves the camera closer.
    Scroll {
        /// Lines scrolled.
        delta: f32,
    },
    /// Shift was pressed or released. Shift-drag pans instead of orbiting.
    ModifiersChanged {
        /// Whether shift is held.
        shift: bool,
    },
}

/// Mouse button. Only [`MouseButton::Left`] drives the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

/// Pixels of trackpad scroll that count as one wheel line.
#[cfg(feature = "viewer")]
const PIXELS_PER_LINE: f32 = 100.0;

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            // Back/forward/other buttons act as the primary button.
            _ => Self::Left,
        }
    }
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseScrollDelta> for InputEvent {
    fn from(delta: winit::event::MouseScrollDelta) -> Self {
        let delta = match delta {
            winit::event::MouseScrollDelta::LineDelta(_, y) => y,
            winit::event::MouseScrollDelta::PixelDelta(pos) => {
                pos.y as f32 / PIXELS_PER_LINE
            }
        };
        Self::Scroll { delta }
    }
}

#[cfg(all(test, feature = "viewer"))]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::event::MouseScrollDelta;

    use super::*;

    #[test]
    fn pixel_scroll_is_scaled_to_lines() {
        let event = InputEvent::from(MouseScrollDelta::PixelDelta(
            PhysicalPosition::new(0.0, 250.0),
        ));
        assert_eq!(event, InputEvent::Scroll { delta: 2.5 });
        let event = InputEvent::from(MouseScrollDelta::LineDelta(3.0, -1.0));
        assert_eq!(event, InputEvent::Scroll { delta: -1.0 });
    }

    #[test]
    fn unknown_buttons_map_to_left() {
        assert_eq!(
            MouseButton::from(winit::event::MouseButton::Back),
            MouseButton::Left
        );
        assert_eq!(
            MouseButton::from(winit::event::MouseButton::Right),
            MouseButton::Right
        );
    }
}
