//! Construction of the nozzle scene.
//!
//! A textured box whose +Z face is the grille nozzle, a ring of decorative
//! tori under it, a ring of spray cones, a ground plane and an axes helper.

use glam::Vec3;

use super::{
    deg, ConeParams, Geometry, GeometryDesc, Node, NodeId, NodeKind, Scene,
    Side, StandardMaterial, TextureSlots, Transform,
};
use crate::options::Options;

/// Name shared by the five spray pivot nodes.
pub const SPRAY_PIVOT: &str = "sprayPivot";
/// Name shared by the five ring pivot nodes.
pub const TORUS_PIVOT: &str = "torusPivot";

/// Angular spacing between symmetric instances.
const INSTANCE_STEP_DEG: f32 = 72.0;
/// Box face group that carries the nozzle material (+Z).
const NOZZLE_FACE: usize = 4;

/// Node ids of the parts built by [`build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NozzleParts {
    /// The central box.
    pub body: NodeId,
    /// Ring mesh nodes (children of the ring pivots).
    pub rings: Vec<NodeId>,
    /// Spray mesh nodes (children of the spray pivots), in pivot order.
    pub sprays: Vec<NodeId>,
    /// The ground plane.
    pub ground: NodeId,
    /// The axes helper.
    pub axes: NodeId,
}

/// Populate `scene` with the nozzle model.
pub fn build(scene: &mut Scene, options: &Options) -> NozzleParts {
    let axes = scene.add_node(
        None,
        Node {
            name: "axes".into(),
            parent: None,
            transform: Transform::IDENTITY,
            kind: NodeKind::Axes {
                size: options.display.axes_size,
            },
            visible: options.display.show_axes,
        },
    );
    let body = add_body(scene, options);
    let rings = add_rings(scene);
    let sprays = add_sprays(scene, options);
    let ground = add_ground(scene);
    log::debug!(
        "nozzle scene: {} nodes, {} geometries, {} materials",
        scene.node_count(),
        scene.geometries.live_count(),
        scene.materials.live_count()
    );
    NozzleParts {
        body,
        rings,
        sprays,
        ground,
        axes,
    }
}

fn add_body(scene: &mut Scene, options: &Options) -> NodeId {
    let dir = &options.display.texture_dir;
    let side = scene.add_material(StandardMaterial {
        roughness: 0.2,
        metalness: 0.9,
        displacement_scale: 0.1,
        displacement_bias: -0.037,
        ao_map_intensity: 3.0,
        textures: TextureSlots::from_set(dir, "Metal_scratched_008", false),
        ..StandardMaterial::default()
    });
    let nozzle = scene.add_material(StandardMaterial {
        roughness: 0.4,
        metalness: 0.8,
        displacement_scale: 0.1,
        displacement_bias: -0.033,
        ao_map_intensity: 3.0,
        side: Side::Double,
        textures: TextureSlots::from_set(dir, "Metal_Grill_021", true),
        ..StandardMaterial::default()
    });
    let geometry = scene.add_geometry(Geometry::new(GeometryDesc::Box {
        size: Vec3::ONE,
        segments: options.display.box_segments,
    }));
    let mut materials = vec![side; 6];
    materials[NOZZLE_FACE] = nozzle;
    scene.add_mesh(None, "box", Transform::IDENTITY, geometry, materials)
}

fn add_rings(scene: &mut Scene) -> Vec<NodeId> {
    let geometry = scene.add_geometry(Geometry::new(GeometryDesc::Torus {
        radius: 0.08,
        tube: 0.03,
        radial_segments: 32,
        tubular_segments: 32,
    }));
    let material = scene.add_material(StandardMaterial {
        roughness: 0.5,
        metalness: 0.9,
        ..StandardMaterial::with_hex(0x9b_59_b6)
    });
    (0..5)
        .map(|i| {
            let pivot = scene.add_node(
                None,
                Node::pivot(
                    TORUS_PIVOT,
                    Transform::from_euler(
                        0.0,
                        deg(INSTANCE_STEP_DEG * i as f32),
                        0.0,
                    ),
                ),
            );
            scene.add_mesh(
                Some(pivot),
                "torus",
                Transform::from_translation(Vec3::new(0.3, -0.5, -0.05))
                    .with_euler(deg(90.0), 0.0, 0.0),
                geometry,
                vec![material],
            )
        })
        .collect()
}

fn add_sprays(scene: &mut Scene, options: &Options) -> Vec<NodeId> {
    let geometry = scene.add_geometry(Geometry::cone(ConeParams::spray(
        options.spray.initial_radius,
    )));
    let material = scene.add_material(StandardMaterial {
        opacity: options.spray.opacity,
        transparent: true,
        side: Side::Double,
        ..StandardMaterial::with_hex(0xff_ff_ff)
    });
    (0..options.spray.instance_count)
        .map(|i| {
            let pivot = scene.add_node(
                None,
                Node::pivot(
                    SPRAY_PIVOT,
                    Transform::from_euler(
                        0.0,
                        deg(INSTANCE_STEP_DEG * i as f32),
                        0.0,
                    ),
                ),
            );
            scene.add_mesh(
                Some(pivot),
                "spray",
                Transform::from_translation(Vec3::new(0.3, -2.0, -0.05)),
                geometry,
                vec![material],
            )
        })
        .collect()
}

fn add_ground(scene: &mut Scene) -> NodeId {
    let geometry = scene.add_geometry(Geometry::new(GeometryDesc::Plane {
        width: 10.0,
        height: 10.0,
    }));
    let material = scene.add_material(StandardMaterial {
        roughness: 0.5,
        metalness: 0.5,
        side: Side::Double,
        ..StandardMaterial::with_hex(0x2c_3e_50)
    });
    scene.add_mesh(
        None,
        "ground",
        Transform::from_translation(Vec3::new(0.0, -3.5, 0.0))
            .with_euler(deg(-90.0), 0.0, 0.0),
        geometry,
        vec![material],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_options() -> Options {
        let mut options = Options::default();
        options.display.box_segments = 2;
        options
    }

    #[test]
    fn builds_five_sprays_sharing_resources() {
        let mut scene = Scene::new();
        let parts = build(&mut scene, &small_options());
        assert_eq!(parts.sprays.len(), 5);
        assert_eq!(scene.find_all_by_name(SPRAY_PIVOT).len(), 5);

        let first = scene.mesh(parts.sprays[0]).unwrap().clone();
        for &id in &parts.sprays[1..] {
            assert_eq!(scene.mesh(id), Some(&first));
        }
        assert_eq!(scene.geometries.ref_count(first.geometry), Some(5));
        assert_eq!(
            scene.geometries.get(first.geometry).unwrap().cone_params(),
            Some(&ConeParams::spray(0.5))
        );
        let material = scene.materials.get(first.materials[0]).unwrap();
        assert!(material.transparent);
        assert_eq!(material.opacity, 0.6);
    }

    #[test]
    fn sprays_are_spaced_by_72_degrees() {
        let mut scene = Scene::new();
        let parts = build(&mut scene, &small_options());
        let pivots = scene.find_all_by_name(SPRAY_PIVOT);
        for (i, pivot) in pivots.iter().enumerate() {
            let rotation = scene.node(*pivot).unwrap().transform.rotation;
            let expected = glam::Quat::from_rotation_y(deg(72.0 * i as f32));
            assert!(rotation.angle_between(expected) < 1e-4);
            assert_eq!(scene.children(*pivot), vec![parts.sprays[i]]);
        }
    }

    #[test]
    fn box_uses_nozzle_material_on_front_face() {
        let mut scene = Scene::new();
        let parts = build(&mut scene, &small_options());
        let mesh = scene.mesh(parts.body).unwrap();
        assert_eq!(mesh.materials.len(), 6);
        let nozzle = mesh.materials[NOZZLE_FACE];
        assert!(mesh
            .materials
            .iter()
            .enumerate()
            .all(|(i, &m)| (i == NOZZLE_FACE) == (m == nozzle)));
        let material = scene.materials.get(nozzle).unwrap();
        assert_eq!(material.side, Side::Double);
        assert!(material.textures.alpha_map.is_some());
    }

    #[test]
    fn rings_and_ground_present() {
        let mut scene = Scene::new();
        let parts = build(&mut scene, &small_options());
        assert_eq!(parts.rings.len(), 5);
        assert_eq!(scene.find_all_by_name(TORUS_PIVOT).len(), 5);
        let ground = scene.world_matrix(parts.ground).transform_point3(Vec3::ZERO);
        assert!((ground.y + 3.5).abs() < 1e-6);
        // box + 5 rings + 5 sprays + ground
        assert_eq!(scene.drawables().len(), 12);
        assert_eq!(scene.axes().len(), 1);
    }
}
