//! GPU-free engine state: scene, spray controller, camera and options.
//!
//! [`NozzleEngine`](super::NozzleEngine) wraps this with a render context.
//! Keeping the command semantics here lets them run without a device.

use super::command::NozzleCommand;
use crate::camera::controller::OrbitController;
use crate::camera::core::Camera;
use crate::controller::{PanelParams, SpraySnapshot, SprayController};
use crate::error::NozzleError;
use crate::options::Options;
use crate::scene::nozzle::{self, NozzleParts};
use crate::scene::Scene;

/// Scene model plus everything commands act on.
pub struct EngineState {
    scene: Scene,
    parts: NozzleParts,
    spray: SprayController,
    camera: OrbitController,
    options: Options,
}

impl EngineState {
    /// Build the nozzle scene and bind the spray controller.
    ///
    /// # Errors
    ///
    /// [`NozzleError::Controller`] if the scene has no spray to bind to
    /// (e.g. `spray.instance_count = 0`).
    pub fn new(options: Options, size: (u32, u32)) -> Result<Self, NozzleError> {
        let (scene, parts, spray) = build_scene(&options)?;
        let camera = OrbitController::new(&options.camera, size.0, size.1);
        Ok(Self {
            scene,
            parts,
            spray,
            camera,
            options,
        })
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Spray commands propagate [`ControllerError`](crate::ControllerError)s;
    /// a rejected angle leaves the scene untouched.
    pub fn execute(&mut self, cmd: NozzleCommand) -> Result<(), NozzleError> {
        match cmd {
            NozzleCommand::SetSprayAngle(angle) => {
                self.spray.set_angle(&mut self.scene, angle)?;
            }
            NozzleCommand::ClearSpray => self.spray.clear(&mut self.scene)?,
            NozzleCommand::SetCameraZ(z) => {
                if z.is_finite() {
                    self.camera.set_eye_z(z);
                } else {
                    log::warn!("ignoring non-finite camera z {z}");
                }
            }
            NozzleCommand::RotateCamera(delta) => self.camera.rotate(delta),
            NozzleCommand::PanCamera(delta) => self.camera.pan(delta),
            NozzleCommand::Zoom(delta) => self.camera.zoom(delta),
            NozzleCommand::ResetCamera => self.camera.reset(),
            NozzleCommand::ToggleAxes => {
                let show = !self.options.display.show_axes;
                self.options.display.show_axes = show;
                let _ = self.scene.set_node_visible(self.parts.axes, show);
            }
        }
        Ok(())
    }

    /// Replace options.
    ///
    /// Camera and axes settings apply in place. Changes to how the scene is
    /// built (spray scope and count, box segments, textures) rebuild it,
    /// which resets the spray to its initial state.
    ///
    /// # Errors
    ///
    /// Propagates a failed controller bind; the previous state is kept.
    pub fn set_options(&mut self, new: Options) -> Result<(), NozzleError> {
        if needs_rebuild(&self.options, &new) {
            let (scene, parts, spray) = build_scene(&new)?;
            log::info!("options changed scene construction, rebuilding");
            self.scene = scene;
            self.parts = parts;
            self.spray = spray;
        } else {
            let _ = self
                .scene
                .set_node_visible(self.parts.axes, new.display.show_axes);
        }
        self.camera.apply_options(&new.camera);
        self.options = new;
        Ok(())
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The scene model.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for the renderer, which drains disposed ids.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Node ids of the built model.
    #[must_use]
    pub fn parts(&self) -> &NozzleParts {
        &self.parts
    }

    /// The bound spray controller.
    #[must_use]
    pub fn spray(&self) -> &SprayController {
        &self.spray
    }

    /// Camera for the current frame.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        self.camera.camera()
    }

    /// Update the camera aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// Values the parameter panel should display.
    #[must_use]
    pub fn panel_params(&self) -> PanelParams {
        PanelParams {
            angle: self.spray.state().angle(),
            camera_z: self.camera().eye.z,
        }
    }

    /// Summary of the spray state.
    #[must_use]
    pub fn spray_snapshot(&self) -> SpraySnapshot {
        self.spray.state().snapshot()
    }
}

fn build_scene(
    options: &Options,
) -> Result<(Scene, NozzleParts, SprayController), NozzleError> {
    let mut scene = Scene::new();
    let parts = nozzle::build(&mut scene, options);
    let spray = SprayController::bind(&scene, options.spray.scope)?;
    Ok((scene, parts, spray))
}

fn needs_rebuild(old: &Options, new: &Options) -> bool {
    old.spray != new.spray
        || old.display.box_segments != new.display.box_segments
        || old.display.axes_size != new.display.axes_size
        || old.display.texture_dir != new.display.texture_dir
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::controller::{ControllerError, TargetState};
    use crate::options::ApplyScope;

    fn state() -> EngineState {
        let mut options = Options::default();
        options.display.box_segments = 2;
        EngineState::new(options, (800, 600)).unwrap()
    }

    #[test]
    fn spray_commands_reach_controller() {
        let mut s = state();
        s.execute(NozzleCommand::SetSprayAngle(12.0)).unwrap();
        assert_eq!(s.panel_params().angle, 12.0);
        s.execute(NozzleCommand::ClearSpray).unwrap();
        assert_eq!(s.spray().state().targets(), &[TargetState::Hidden]);
        let snap = s.spray_snapshot();
        assert_eq!((snap.angle, snap.visible, snap.hidden), (12.0, 0, 1));
    }

    #[test]
    fn rejected_angle_is_an_error() {
        let mut s = state();
        let err = s.execute(NozzleCommand::SetSprayAngle(45.0)).unwrap_err();
        assert!(matches!(
            err,
            NozzleError::Controller(ControllerError::AngleOutOfRange(_))
        ));
        assert_eq!(s.panel_params().angle, 0.0);
    }

    #[test]
    fn camera_z_from_panel() {
        let mut s = state();
        assert_eq!(s.panel_params().camera_z, 7.0);
        s.execute(NozzleCommand::SetCameraZ(4.0)).unwrap();
        assert!((s.camera().eye.z - 4.0).abs() < 1e-5);
        s.execute(NozzleCommand::SetCameraZ(f32::NAN)).unwrap();
        assert!((s.camera().eye.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn orbit_and_reset() {
        let mut s = state();
        s.execute(NozzleCommand::RotateCamera(Vec2::new(100.0, 0.0)))
            .unwrap();
        assert!(s.camera().eye.x.abs() > 0.1);
        s.execute(NozzleCommand::Zoom(1.0)).unwrap();
        s.execute(NozzleCommand::ResetCamera).unwrap();
        assert_eq!(s.camera().eye, Vec3::new(0.0, 0.0, 7.0));
    }

    #[test]
    fn toggle_axes_hides_helper() {
        let mut s = state();
        assert_eq!(s.scene().axes().len(), 1);
        s.execute(NozzleCommand::ToggleAxes).unwrap();
        assert!(s.scene().axes().is_empty());
        assert!(!s.options().display.show_axes);
    }

    #[test]
    fn scope_change_rebuilds() {
        let mut s = state();
        s.execute(NozzleCommand::SetSprayAngle(3.0)).unwrap();
        let mut options = s.options().clone();
        options.spray.scope = ApplyScope::All;
        s.set_options(options).unwrap();
        assert_eq!(s.spray().targets().len(), 5);
        assert_eq!(s.panel_params().angle, 0.0);
    }

    #[test]
    fn rebuild_starts_a_new_scene_epoch() {
        let mut s = state();
        let body = |s: &EngineState| {
            let g = s.scene().mesh(s.parts().body).unwrap().geometry;
            let indices = s.scene().geometries.get(g).unwrap().mesh().indices.len();
            (g, indices)
        };
        let epoch = s.scene().epoch();
        let (old_geometry, old_indices) = body(&s);

        let mut options = s.options().clone();
        options.display.box_segments = 4;
        s.set_options(options).unwrap();

        // Same handle, different mesh: only the epoch tells them apart.
        let (new_geometry, new_indices) = body(&s);
        assert_eq!(new_geometry, old_geometry);
        assert_eq!(new_indices, old_indices * 4);
        assert_ne!(s.scene().epoch(), epoch);
    }

    #[test]
    fn options_without_rebuild_keep_epoch() {
        let mut s = state();
        let epoch = s.scene().epoch();
        let mut options = s.options().clone();
        options.display.show_axes = false;
        s.set_options(options).unwrap();
        assert_eq!(s.scene().epoch(), epoch);
    }

    #[test]
    fn camera_change_keeps_spray() {
        let mut s = state();
        s.execute(NozzleCommand::SetSprayAngle(3.0)).unwrap();
        let mut options = s.options().clone();
        options.camera.fovy = 60.0;
        s.set_options(options).unwrap();
        assert_eq!(s.camera().fovy, 60.0);
        assert_eq!(s.panel_params().angle, 3.0);
    }

    #[test]
    fn zero_instances_fail_to_bind() {
        let mut options = Options::default();
        options.display.box_segments = 2;
        options.spray.instance_count = 0;
        assert!(matches!(
            EngineState::new(options, (1, 1)),
            Err(NozzleError::Controller(ControllerError::NotInitialized))
        ));
    }
}
