//! Pure spray state machine.
//!
//! [`SprayState::transition`] maps `(state, event)` to the next state
//! without touching the scene. The scene side effects live in
//! [`SprayController`](super::SprayController).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ControllerError;
use crate::scene::ConeParams;

/// Inclusive lower bound of the spray angle.
pub const ANGLE_MIN: f32 = 0.0;
/// Inclusive upper bound of the spray angle.
pub const ANGLE_MAX: f32 = 30.0;
/// Slider granularity of the spray angle.
pub const ANGLE_STEP: f32 = 0.1;

/// UI-driven events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SprayEvent {
    /// Regenerate the cone with this base radius and show it.
    SetAngle(f32),
    /// Hide the spray.
    Clear,
}

/// Visibility state of one controlled spray instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetState {
    /// Drawn with the given cone. `None` is the geometry built with the
    /// scene, before any angle was applied.
    Visible {
        /// Cone currently attached, if regenerated.
        geometry: Option<ConeParams>,
    },
    /// Hidden through its private material.
    Hidden,
}

impl TargetState {
    /// Whether the instance is drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }
}

/// Controller state: the slider value plus one entry per target.
#[derive(Debug, Clone, PartialEq)]
pub struct SprayState {
    angle: f32,
    targets: Vec<TargetState>,
}

impl SprayState {
    /// Initial state: angle 0, every target visible with its default cone.
    #[must_use]
    pub fn new(target_count: usize) -> Self {
        Self {
            angle: ANGLE_MIN,
            targets: vec![TargetState::Visible { geometry: None }; target_count],
        }
    }

    /// Current slider value.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Per-target states.
    #[must_use]
    pub fn targets(&self) -> &[TargetState] {
        &self.targets
    }

    /// Compute the state that follows `event`.
    ///
    /// `self` is never modified.
    ///
    /// # Errors
    ///
    /// [`ControllerError::AngleOutOfRange`] for out-of-range and
    /// non-finite angles.
    pub fn transition(&self, event: SprayEvent) -> Result<Self, ControllerError> {
        match event {
            SprayEvent::SetAngle(angle) => {
                validate_angle(angle)?;
                let cone = ConeParams::spray(angle);
                Ok(Self {
                    angle,
                    targets: vec![
                        TargetState::Visible {
                            geometry: Some(cone)
                        };
                        self.targets.len()
                    ],
                })
            }
            SprayEvent::Clear => Ok(Self {
                angle: self.angle,
                targets: vec![TargetState::Hidden; self.targets.len()],
            }),
        }
    }

    /// Immutable copy for a render loop.
    #[must_use]
    pub fn snapshot(&self) -> SpraySnapshot {
        SpraySnapshot {
            angle: self.angle,
            visible: self.targets.iter().filter(|t| t.is_visible()).count(),
            hidden: self.targets.iter().filter(|t| !t.is_visible()).count(),
        }
    }
}

/// Reject angles outside `[ANGLE_MIN, ANGLE_MAX]`, NaN included.
///
/// # Errors
///
/// [`ControllerError::AngleOutOfRange`] carrying the rejected value.
pub fn validate_angle(angle: f32) -> Result<(), ControllerError> {
    if (ANGLE_MIN..=ANGLE_MAX).contains(&angle) {
        Ok(())
    } else {
        Err(ControllerError::AngleOutOfRange(angle))
    }
}

/// Read-only summary of the controller state, pushed to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpraySnapshot {
    /// Current slider value.
    pub angle: f32,
    /// Number of targets currently drawn.
    pub visible: usize,
    /// Number of targets currently hidden.
    pub hidden: usize,
}

/// Values the parameter panel edits, with the slider ranges it renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Panel")]
pub struct PanelParams {
    /// Spray cone angle.
    #[schemars(title = "angle", range(min = 0.0, max = 30.0), extend("step" = 0.1))]
    pub angle: f32,
    /// Camera eye Z.
    #[schemars(title = "z", range(min = 0.0, max = 10.0), extend("step" = 1.0))]
    pub camera_z: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_angle_makes_every_target_visible() {
        let state = SprayState::new(2).transition(SprayEvent::Clear).unwrap();
        let next = state.transition(SprayEvent::SetAngle(5.0)).unwrap();
        assert_eq!(next.angle(), 5.0);
        for t in next.targets() {
            assert_eq!(
                *t,
                TargetState::Visible {
                    geometry: Some(ConeParams::spray(5.0))
                }
            );
        }
    }

    #[test]
    fn clear_keeps_angle() {
        let state = SprayState::new(1)
            .transition(SprayEvent::SetAngle(12.5))
            .unwrap()
            .transition(SprayEvent::Clear)
            .unwrap();
        assert_eq!(state.angle(), 12.5);
        assert_eq!(state.targets(), &[TargetState::Hidden]);
    }

    #[test]
    fn clear_is_idempotent() {
        let once = SprayState::new(3).transition(SprayEvent::Clear).unwrap();
        let twice = once.transition(SprayEvent::Clear).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn bounds_are_inclusive() {
        let state = SprayState::new(1);
        assert!(state.transition(SprayEvent::SetAngle(0.0)).is_ok());
        assert!(state.transition(SprayEvent::SetAngle(30.0)).is_ok());
        for bad in [-0.1, 30.1, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                state.transition(SprayEvent::SetAngle(bad)),
                Err(ControllerError::AngleOutOfRange(_))
            ));
        }
    }

    #[test]
    fn snapshot_counts() {
        let state = SprayState::new(5);
        let snap = state.snapshot();
        assert_eq!((snap.visible, snap.hidden), (5, 0));
        let snap = state.transition(SprayEvent::Clear).unwrap().snapshot();
        assert_eq!((snap.visible, snap.hidden), (0, 5));
    }

    #[test]
    fn panel_schema_carries_slider_ranges() {
        let schema =
            serde_json::to_value(schemars::schema_for!(PanelParams)).unwrap();
        let angle = &schema["properties"]["angle"];
        assert_eq!(angle["minimum"], 0.0);
        assert_eq!(angle["maximum"], 30.0);
        assert_eq!(angle["step"], 0.1);
        assert_eq!(schema["properties"]["camera_z"]["maximum"], 10.0);
    }
}
