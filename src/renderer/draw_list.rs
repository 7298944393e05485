//! Flattening the scene into an ordered list of draws.

use std::ops::Range;

use glam::{Mat4, Vec3};

use crate::scene::{GeometryId, MaterialId, NodeId, Scene, Side};

/// Blend mode a draw is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Depth-written, no blending.
    Opaque,
    /// Alpha-blended, depth-tested but not written.
    Transparent,
}

/// One material group of one mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Mesh node, keys the model uniform.
    pub node: NodeId,
    /// World matrix of the node.
    pub world: Mat4,
    /// Geometry whose buffers are bound.
    pub geometry: GeometryId,
    /// Material of this group.
    pub material: MaterialId,
    /// Index range within the geometry's index buffer.
    pub indices: Range<u32>,
    /// Pipeline blend mode.
    pub blend: BlendMode,
    /// Pipeline cull mode.
    pub side: Side,
    /// Squared distance from the eye to the node origin.
    pub depth: f32,
}

/// Draws for every visible mesh group whose material is visible.
///
/// Opaque draws come first in scene order, then transparent draws sorted
/// back to front.
#[must_use]
pub fn build(scene: &Scene, eye: Vec3) -> Vec<DrawItem> {
    let mut opaque = Vec::new();
    let mut transparent = Vec::new();

    for drawable in scene.drawables() {
        let Some(geometry) = scene.geometries.get(drawable.mesh.geometry) else {
            log::warn!("node {:?} references a disposed geometry", drawable.node);
            continue;
        };
        let depth = drawable
            .world
            .transform_point3(Vec3::ZERO)
            .distance_squared(eye);

        for group in geometry.mesh().draw_groups() {
            let Some(&material_id) =
                drawable.mesh.materials.get(group.material_index)
            else {
                continue;
            };
            let Some(material) = scene.materials.get(material_id) else {
                continue;
            };
            if !material.visible || group.count == 0 {
                continue;
            }
            let blend = if material.transparent {
                BlendMode::Transparent
            } else {
                BlendMode::Opaque
            };
            let item = DrawItem {
                node: drawable.node,
                world: drawable.world,
                geometry: drawable.mesh.geometry,
                material: material_id,
                indices: group.start..group.start + group.count,
                blend,
                side: material.side,
                depth,
            };
            match blend {
                BlendMode::Opaque => opaque.push(item),
                BlendMode::Transparent => transparent.push(item),
            }
        }
    }

    transparent.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    opaque.extend(transparent);
    opaque
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SprayController;
    use crate::options::{ApplyScope, Options};
    use crate::scene::nozzle;

    fn nozzle_scene() -> (Scene, nozzle::NozzleParts) {
        let mut options = Options::default();
        options.display.box_segments = 2;
        let mut scene = Scene::new();
        let parts = nozzle::build(&mut scene, &options);
        (scene, parts)
    }

    #[test]
    fn opaque_before_transparent() {
        let (scene, _) = nozzle_scene();
        let draws = build(&scene, Vec3::new(0.0, 0.0, 7.0));
        let first_transparent = draws
            .iter()
            .position(|d| d.blend == BlendMode::Transparent)
            .unwrap();
        assert!(draws[first_transparent..]
            .iter()
            .all(|d| d.blend == BlendMode::Transparent));
        // 6 box faces + 5 rings + ground, then 5 sprays
        assert_eq!(first_transparent, 12);
        assert_eq!(draws.len(), 17);
    }

    #[test]
    fn transparent_sorted_back_to_front() {
        let (scene, _) = nozzle_scene();
        let draws = build(&scene, Vec3::new(0.0, 0.0, 7.0));
        let depths: Vec<f32> = draws
            .iter()
            .filter(|d| d.blend == BlendMode::Transparent)
            .map(|d| d.depth)
            .collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn cleared_spray_is_skipped() {
        let (mut scene, parts) = nozzle_scene();
        let mut controller =
            SprayController::bind(&scene, ApplyScope::One).unwrap();
        controller.clear(&mut scene).unwrap();
        let draws = build(&scene, Vec3::ZERO);
        assert!(!draws.iter().any(|d| d.node == parts.sprays[0]));
        assert!(draws.iter().any(|d| d.node == parts.sprays[1]));
    }

    #[test]
    fn hidden_node_is_skipped() {
        let (mut scene, parts) = nozzle_scene();
        assert!(scene.set_node_visible(parts.ground, false));
        let draws = build(&scene, Vec3::ZERO);
        assert!(!draws.iter().any(|d| d.node == parts.ground));
    }
}
