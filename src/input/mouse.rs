/// Squared pixel distance past which a press counts as a drag.
const DRAG_THRESHOLD_SQ: f32 = 1.0;

/// Tracks cursor position and whether the current press has become a drag.
#[derive(Debug, Default)]
pub(crate) struct DragState {
    pub mouse_pos: Option<(f32, f32)>,
    pub is_dragging: bool,
}

impl DragState {
    /// Start a new press.
    pub fn handle_mouse_down(&mut self) {
        self.is_dragging = false;
    }

    /// Finish the press. Returns whether it was a drag.
    pub fn handle_mouse_up(&mut self) -> bool {
        std::mem::take(&mut self.is_dragging)
    }

    /// Record a cursor position and return the delta from the previous one.
    ///
    /// The first position after startup yields a zero delta.
    pub fn handle_mouse_position(&mut self, x: f32, y: f32) -> (f32, f32) {
        let delta = self
            .mouse_pos
            .map_or((0.0, 0.0), |(px, py)| (x - px, y - py));
        self.mouse_pos = Some((x, y));
        delta
    }

    /// Promote the press to a drag once it moved far enough.
    pub fn track_drag(&mut self, delta: (f32, f32)) {
        if delta.0 * delta.0 + delta.1 * delta.1 > DRAG_THRESHOLD_SQ {
            self.is_dragging = true;
        }
    }
}
