//! The engine's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, a mouse
//! gesture, the parameter panel, or a programmatic call, is represented as
//! a `NozzleCommand`. Consumers construct commands and pass them to
//! [`NozzleEngine::execute`](super::NozzleEngine::execute).

use glam::Vec2;

/// A single state change the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NozzleCommand {
    // ── Spray ───────────────────────────────────────────────────────
    /// Regenerate the spray cone with this angle and show it.
    SetSprayAngle(f32),
    /// Hide the spray.
    ClearSpray,

    // ── Camera ──────────────────────────────────────────────────────
    /// Place the eye at this Z along the current view axis.
    SetCameraZ(f32),
    /// Orbit by a mouse delta in pixels.
    RotateCamera(Vec2),
    /// Slide the focus point by a mouse delta in pixels.
    PanCamera(Vec2),
    /// Dolly toward (positive) or away from (negative) the focus point.
    Zoom(f32),
    /// Return to the initial view.
    ResetCamera,

    // ── Display ─────────────────────────────────────────────────────
    /// Show or hide the axes helper.
    ToggleAxes,
}
