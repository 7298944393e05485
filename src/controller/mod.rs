//! Spray parameter controller.
//!
//! Binds to the spray instance(s) of a populated scene and turns panel
//! events into scene mutations. Geometry and material changes go through
//! the scene's resource pools so that shared resources are copied before
//! they are written and superseded ones are disposed.

mod state;

use std::fmt;

pub use state::{
    validate_angle, PanelParams, SprayEvent, SpraySnapshot, SprayState,
    TargetState, ANGLE_MAX, ANGLE_MIN, ANGLE_STEP,
};

use crate::options::ApplyScope;
use crate::scene::nozzle::SPRAY_PIVOT;
use crate::scene::{ConeParams, Geometry, NodeId, Scene};

/// Errors raised by the spray controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerError {
    /// Angle outside `[ANGLE_MIN, ANGLE_MAX]` or not finite.
    AngleOutOfRange(f32),
    /// The scene has no spray instance to bind to.
    NotInitialized,
    /// A target node no longer references a live resource.
    UnknownResource(NodeId),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AngleOutOfRange(a) => write!(
                f,
                "spray angle {a} outside [{ANGLE_MIN}, {ANGLE_MAX}]"
            ),
            Self::NotInitialized => {
                write!(f, "no '{SPRAY_PIVOT}' with a mesh child in the scene")
            }
            Self::UnknownResource(id) => {
                write!(f, "node {} references a disposed resource", id.index())
            }
        }
    }
}

impl std::error::Error for ControllerError {}

/// Drives the spray cone(s) from panel events.
#[derive(Debug, Clone)]
pub struct SprayController {
    state: SprayState,
    targets: Vec<NodeId>,
    scope: ApplyScope,
}

impl SprayController {
    /// Find the spray instance(s) in `scene`.
    ///
    /// Each `sprayPivot` node contributes its first mesh child. With
    /// [`ApplyScope::One`] only the first pivot in scene order is used.
    ///
    /// # Errors
    ///
    /// [`ControllerError::NotInitialized`] if no pivot with a mesh child
    /// exists yet.
    pub fn bind(scene: &Scene, scope: ApplyScope) -> Result<Self, ControllerError> {
        let mut targets: Vec<NodeId> = scene
            .find_all_by_name(SPRAY_PIVOT)
            .into_iter()
            .filter_map(|pivot| {
                scene
                    .children(pivot)
                    .into_iter()
                    .find(|&child| scene.mesh(child).is_some())
            })
            .collect();
        if targets.is_empty() {
            return Err(ControllerError::NotInitialized);
        }
        if scope == ApplyScope::One {
            targets.truncate(1);
        }
        log::debug!("spray controller bound to {} instance(s)", targets.len());
        Ok(Self {
            state: SprayState::new(targets.len()),
            targets,
            scope,
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SprayState {
        &self.state
    }

    /// Controlled mesh nodes.
    #[must_use]
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Scope this controller was bound with.
    #[must_use]
    pub const fn scope(&self) -> ApplyScope {
        self.scope
    }

    /// Apply an event: compute the next state, then mutate the scene.
    ///
    /// # Errors
    ///
    /// Rejected angles leave both state and scene untouched. A stale target
    /// resource yields [`ControllerError::UnknownResource`].
    pub fn dispatch(
        &mut self,
        scene: &mut Scene,
        event: SprayEvent,
    ) -> Result<(), ControllerError> {
        let next = self.state.transition(event)?;
        match event {
            SprayEvent::SetAngle(angle) => {
                self.regenerate(scene, ConeParams::spray(angle))?;
            }
            SprayEvent::Clear => self.hide(scene)?,
        }
        self.state = next;
        Ok(())
    }

    /// Regenerate the cone with base radius `angle` and show it.
    ///
    /// # Errors
    ///
    /// [`ControllerError::AngleOutOfRange`] for angles outside
    /// `[ANGLE_MIN, ANGLE_MAX]`.
    pub fn set_angle(
        &mut self,
        scene: &mut Scene,
        angle: f32,
    ) -> Result<(), ControllerError> {
        self.dispatch(scene, SprayEvent::SetAngle(angle))
    }

    /// Hide the controlled spray(s) without touching sibling instances.
    ///
    /// # Errors
    ///
    /// [`ControllerError::UnknownResource`] if a target lost its material.
    pub fn clear(&mut self, scene: &mut Scene) -> Result<(), ControllerError> {
        self.dispatch(scene, SprayEvent::Clear)
    }

    /// Fail before any mutation if a target lost its mesh or material.
    fn check_targets(&self, scene: &Scene) -> Result<(), ControllerError> {
        for &node in &self.targets {
            let material = scene
                .material_of(node, 0)
                .filter(|&m| scene.materials.contains(m));
            if scene.mesh(node).is_none() || material.is_none() {
                return Err(ControllerError::UnknownResource(node));
            }
        }
        Ok(())
    }

    fn regenerate(
        &self,
        scene: &mut Scene,
        cone: ConeParams,
    ) -> Result<(), ControllerError> {
        self.check_targets(scene)?;
        for &node in &self.targets {
            set_material_visible(scene, node, true)?;
        }
        // One new geometry shared by every target; each swap releases the
        // target's previous reference.
        let geometry = scene.add_geometry(Geometry::cone(cone));
        for &node in &self.targets {
            if !scene.set_geometry(node, geometry) {
                if scene.geometries.ref_count(geometry) == Some(0) {
                    let _ = scene.geometries.release(geometry);
                }
                return Err(ControllerError::UnknownResource(node));
            }
        }
        log::debug!(
            "spray cone regenerated (radius {}), {} geometries live",
            cone.radius,
            scene.geometries.live_count()
        );
        Ok(())
    }

    fn hide(&self, scene: &mut Scene) -> Result<(), ControllerError> {
        self.check_targets(scene)?;
        for &node in &self.targets {
            set_material_visible(scene, node, false)?;
        }
        Ok(())
    }
}

/// Set a node's material visibility, copying the material first if it is
/// shared. No copy is made when the flag already has the requested value.
fn set_material_visible(
    scene: &mut Scene,
    node: NodeId,
    visible: bool,
) -> Result<(), ControllerError> {
    let current = scene
        .material_of(node, 0)
        .and_then(|m| scene.materials.get(m))
        .ok_or(ControllerError::UnknownResource(node))?;
    if current.visible == visible {
        return Ok(());
    }
    let private = scene
        .make_material_unique(node, 0)
        .ok_or(ControllerError::UnknownResource(node))?;
    let material = scene
        .material_mut(private)
        .ok_or(ControllerError::UnknownResource(node))?;
    material.visible = visible;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::scene::nozzle::{self, NozzleParts};

    fn setup(scope: ApplyScope) -> (Scene, NozzleParts, SprayController) {
        let mut options = Options::default();
        options.display.box_segments = 1;
        let mut scene = Scene::new();
        let parts = nozzle::build(&mut scene, &options);
        let controller = SprayController::bind(&scene, scope).unwrap();
        (scene, parts, controller)
    }

    fn is_drawn(scene: &Scene, node: NodeId) -> bool {
        let m = scene.material_of(node, 0).unwrap();
        scene.materials.get(m).unwrap().visible
    }

    fn cone_of(scene: &Scene, node: NodeId) -> ConeParams {
        let g = scene.mesh(node).unwrap().geometry;
        *scene.geometries.get(g).unwrap().cone_params().unwrap()
    }

    #[test]
    fn binds_to_first_spray_by_default() {
        let (_, parts, controller) = setup(ApplyScope::One);
        assert_eq!(controller.targets(), &[parts.sprays[0]]);
    }

    #[test]
    fn bind_on_empty_scene_fails_fast() {
        let scene = Scene::new();
        assert_eq!(
            SprayController::bind(&scene, ApplyScope::One).unwrap_err(),
            ControllerError::NotInitialized
        );
    }

    #[test]
    fn clear_twice_is_same_as_once() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::One);
        let target = parts.sprays[0];
        controller.clear(&mut scene).unwrap();
        let after_one = scene.material_of(target, 0);
        let live_after_one = scene.materials.live_count();
        controller.clear(&mut scene).unwrap();
        assert_eq!(scene.material_of(target, 0), after_one);
        assert_eq!(scene.materials.live_count(), live_after_one);
        assert!(!is_drawn(&scene, target));
        assert_eq!(controller.state().targets(), &[TargetState::Hidden]);
    }

    #[test]
    fn repeated_angle_gives_same_cone() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::One);
        controller.set_angle(&mut scene, 7.5).unwrap();
        controller.set_angle(&mut scene, 7.5).unwrap();
        assert_eq!(
            cone_of(&scene, parts.sprays[0]),
            ConeParams {
                radius: 7.5,
                height: 3.0,
                radial_segments: 64,
                height_segments: 10,
                open_ended: true,
            }
        );
    }

    #[test]
    fn superseded_geometries_are_disposed() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::One);
        let target = parts.sprays[0];
        let shared = scene.mesh(target).unwrap().geometry;
        let live_before = scene.geometries.live_count();
        let disposed_before = scene.geometries.total_disposed();

        let angles = [1.0, 2.0, 3.5, 10.0, 29.9];
        for a in angles {
            controller.set_angle(&mut scene, a).unwrap();
        }

        // Siblings keep the shared cone; the target holds exactly one
        // private cone; every earlier private cone is gone.
        let private = scene.mesh(target).unwrap().geometry;
        assert_ne!(private, shared);
        assert_eq!(scene.geometries.ref_count(private), Some(1));
        assert_eq!(scene.geometries.ref_count(shared), Some(4));
        assert_eq!(scene.geometries.live_count(), live_before + 1);
        assert_eq!(
            scene.geometries.total_disposed() - disposed_before,
            angles.len() as u64 - 1
        );
    }

    #[test]
    fn clear_leaves_siblings_on_shared_material() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::One);
        let shared = scene.material_of(parts.sprays[1], 0).unwrap();
        controller.clear(&mut scene).unwrap();
        assert_ne!(scene.material_of(parts.sprays[0], 0), Some(shared));
        for &sibling in &parts.sprays[1..] {
            assert_eq!(scene.material_of(sibling, 0), Some(shared));
            assert!(is_drawn(&scene, sibling));
        }
    }

    #[test]
    fn bounds_accept_edges_and_reject_outside() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::One);
        for a in [0.0, 30.0] {
            controller.set_angle(&mut scene, a).unwrap();
            let g = scene.mesh(parts.sprays[0]).unwrap().geometry;
            let mesh = scene.geometries.get(g).unwrap().mesh();
            assert_eq!(mesh.vertices.len(), 65 * 11);
            assert!(mesh
                .vertices
                .iter()
                .all(|v| v.position.iter().all(|c| c.is_finite())));
        }
        let before = controller.state().clone();
        let geometry = scene.mesh(parts.sprays[0]).unwrap().geometry;
        for bad in [-1.0, 30.5, f32::NAN] {
            assert!(matches!(
                controller.set_angle(&mut scene, bad),
                Err(ControllerError::AngleOutOfRange(_))
            ));
        }
        assert_eq!(controller.state(), &before);
        assert_eq!(scene.mesh(parts.sprays[0]).unwrap().geometry, geometry);
    }

    #[test]
    fn set_angle_after_clear_shows_again() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::One);
        controller.clear(&mut scene).unwrap();
        controller.set_angle(&mut scene, 5.0).unwrap();
        assert!(is_drawn(&scene, parts.sprays[0]));
        assert!(controller.state().targets()[0].is_visible());
        assert_eq!(cone_of(&scene, parts.sprays[0]).radius, 5.0);
    }

    #[test]
    fn set_angle_on_visible_spray_copies_no_material() {
        let (mut scene, _, mut controller) = setup(ApplyScope::One);
        let materials = scene.materials.live_count();
        controller.set_angle(&mut scene, 4.0).unwrap();
        assert_eq!(scene.materials.live_count(), materials);
    }

    #[test]
    fn broken_target_leaves_scene_untouched() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::One);
        controller.clear(&mut scene).unwrap();
        let spray = parts.sprays[0];
        let geometry = scene.mesh(spray).unwrap().geometry;
        let geometries = scene.geometries.live_count();
        let materials = scene.materials.live_count();

        // The axes helper has no mesh, so it cannot take a cone.
        let mut broken = SprayController {
            state: SprayState::new(2),
            targets: vec![spray, parts.axes],
            scope: ApplyScope::All,
        };
        let before = broken.state().clone();
        assert_eq!(
            broken.set_angle(&mut scene, 4.0),
            Err(ControllerError::UnknownResource(parts.axes))
        );
        assert_eq!(
            broken.clear(&mut scene),
            Err(ControllerError::UnknownResource(parts.axes))
        );
        assert_eq!(broken.state(), &before);
        assert!(!is_drawn(&scene, spray));
        assert_eq!(scene.mesh(spray).unwrap().geometry, geometry);
        assert_eq!(scene.geometries.live_count(), geometries);
        assert_eq!(scene.materials.live_count(), materials);
    }

    #[test]
    fn scope_all_repeated_angles_share_one_cone() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::All);
        let live_before = scene.geometries.live_count();
        let disposed_before = scene.geometries.total_disposed();

        let angles = [2.0, 4.0, 8.0, 16.0];
        for a in angles {
            controller.set_angle(&mut scene, a).unwrap();
        }

        // The original shared cone and every intermediate cone are gone;
        // all five instances hold the last one.
        let cone = scene.mesh(parts.sprays[0]).unwrap().geometry;
        assert_eq!(scene.geometries.ref_count(cone), Some(5));
        assert!(parts
            .sprays
            .iter()
            .all(|&s| scene.mesh(s).unwrap().geometry == cone));
        assert_eq!(cone_of(&scene, parts.sprays[4]).radius, 16.0);
        assert_eq!(scene.geometries.live_count(), live_before);
        assert_eq!(
            scene.geometries.total_disposed() - disposed_before,
            angles.len() as u64
        );
    }

    #[test]
    fn scope_all_drives_every_instance() {
        let (mut scene, parts, mut controller) = setup(ApplyScope::All);
        assert_eq!(controller.targets().len(), 5);
        let shared = scene.mesh(parts.sprays[0]).unwrap().geometry;

        controller.set_angle(&mut scene, 3.0).unwrap();
        let g = scene.mesh(parts.sprays[0]).unwrap().geometry;
        assert!(!scene.geometries.contains(shared));
        for &s in &parts.sprays {
            assert_eq!(scene.mesh(s).unwrap().geometry, g);
        }

        controller.clear(&mut scene).unwrap();
        assert!(parts.sprays.iter().all(|&s| !is_drawn(&scene, s)));
        assert_eq!(controller.state().snapshot().hidden, 5);
    }
}
