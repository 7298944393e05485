//! Authoritative scene: node graph plus shared geometry and material pools.
//!
//! Nodes reference resources by handle. Every mesh node holds one pool
//! reference on its geometry and one per material slot, so swapping a
//! handle through [`Scene::set_geometry`] or [`Scene::make_material_unique`]
//! keeps reference counts honest and disposes resources nobody uses.

mod geometry;
mod material;
mod node;
/// Nozzle model construction.
pub mod nozzle;
mod resources;

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Mat4;

pub use geometry::{
    axes_lines, deg, ConeParams, Geometry, GeometryDesc, LineVertex, MeshData,
    MeshGroup, MeshVertex,
};
pub use material::{hex_to_linear, Side, StandardMaterial, TextureSlots};
pub use node::{MeshNode, Node, NodeId, NodeKind, Transform};
pub use resources::{Handle, ResourcePool};

/// Handle to a pooled [`Geometry`].
pub type GeometryId = Handle<Geometry>;
/// Handle to a pooled [`StandardMaterial`].
pub type MaterialId = Handle<StandardMaterial>;

/// A mesh ready to draw: world matrix plus its payload.
#[derive(Debug, Clone, Copy)]
pub struct Drawable<'a> {
    /// Node that owns the mesh.
    pub node: NodeId,
    /// Accumulated world matrix.
    pub world: Mat4,
    /// Mesh payload.
    pub mesh: &'a MeshNode,
}

/// Source of [`Scene::epoch`] values.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(0);

/// The scene graph and its resource pools.
pub struct Scene {
    /// Unique per scene in this process. Handles from different scenes can
    /// compare equal, so GPU caches are only valid for one epoch.
    epoch: u64,
    nodes: Vec<Node>,
    /// Shared geometries.
    pub geometries: ResourcePool<Geometry>,
    /// Shared materials.
    pub materials: ResourcePool<StandardMaterial>,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    /// Generation that was last consumed by the renderer.
    rendered_generation: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: NEXT_EPOCH.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            geometries: ResourcePool::new(),
            materials: ResourcePool::new(),
            generation: 0,
            rendered_generation: 0,
        }
    }

    /// Identity of this scene for renderer caches.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    // -- Mutation helpers --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Whether scene data changed since last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Mark current generation as rendered.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    // -- Resources --

    /// Pool a geometry. The handle has no holders until a node takes it.
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    /// Pool a material. The handle has no holders until a node takes it.
    pub fn add_material(&mut self, material: StandardMaterial) -> MaterialId {
        self.materials.insert(material)
    }

    // -- Nodes --

    /// Append a node under `parent`. Retains any resources it references.
    pub fn add_node(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        if let NodeKind::Mesh(mesh) = &node.kind {
            let _ = self.geometries.retain(mesh.geometry);
            for &m in &mesh.materials {
                let _ = self.materials.retain(m);
            }
        }
        node.parent = parent;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.invalidate();
        id
    }

    /// Append a mesh node under `parent`.
    pub fn add_mesh(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        transform: Transform,
        geometry: GeometryId,
        materials: Vec<MaterialId>,
    ) -> NodeId {
        self.add_node(
            parent,
            Node {
                name: name.into(),
                parent: None,
                transform,
                kind: NodeKind::Mesh(MeshNode {
                    geometry,
                    materials,
                }),
                visible: true,
            },
        )
    }

    /// Read access to a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Mutable access to a node's transform.
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.invalidate();
        self.nodes.get_mut(id.index()).map(|n| &mut n.transform)
    }

    /// Show or hide a node and its subtree.
    pub fn set_node_visible(&mut self, id: NodeId, visible: bool) -> bool {
        let Some(node) = self.nodes.get_mut(id.index()) else {
            return false;
        };
        node.visible = visible;
        self.invalidate();
        true
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// First node with the given name, in insertion order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    /// All nodes with the given name, in insertion order.
    #[must_use]
    pub fn find_all_by_name(&self, name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.name == name)
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// Direct children of a node, in insertion order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// Mesh payload of a node.
    #[must_use]
    pub fn mesh(&self, id: NodeId) -> Option<&MeshNode> {
        self.node(id)?.mesh()
    }

    fn mesh_mut(&mut self, id: NodeId) -> Option<&mut MeshNode> {
        match &mut self.nodes.get_mut(id.index())?.kind {
            NodeKind::Mesh(m) => Some(m),
            _ => None,
        }
    }

    /// Material of a mesh node's slot.
    #[must_use]
    pub fn material_of(&self, id: NodeId, slot: usize) -> Option<MaterialId> {
        self.mesh(id)?.materials.get(slot).copied()
    }

    /// Swap a mesh node's geometry for `geometry`.
    ///
    /// The new handle is retained before the old one is released, so the
    /// previous geometry is disposed here if this node was its last holder.
    /// Returns `false` if `id` is not a mesh node or `geometry` is stale.
    pub fn set_geometry(&mut self, id: NodeId, geometry: GeometryId) -> bool {
        let Some(old) = self.mesh(id).map(|m| m.geometry) else {
            return false;
        };
        if !self.geometries.retain(geometry) {
            return false;
        }
        if let Some(mesh) = self.mesh_mut(id) {
            mesh.geometry = geometry;
        }
        let _ = self.geometries.release(old);
        self.invalidate();
        true
    }

    /// Give a mesh node's material slot a private copy if it is shared.
    ///
    /// Returns the (possibly new) handle now in the slot.
    pub fn make_material_unique(
        &mut self,
        id: NodeId,
        slot: usize,
    ) -> Option<MaterialId> {
        let current = self.material_of(id, slot)?;
        let unique = self.materials.make_unique(current)?;
        if unique != current {
            if let Some(mesh) = self.mesh_mut(id) {
                mesh.materials[slot] = unique;
            }
            self.invalidate();
        }
        Some(unique)
    }

    /// Mutate a material, bumping the scene generation.
    pub fn material_mut(
        &mut self,
        id: MaterialId,
    ) -> Option<&mut StandardMaterial> {
        self.invalidate();
        self.materials.get_mut(id)
    }

    // -- Traversal --

    /// Accumulated world matrix of a node.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                break;
            };
            matrix = node.transform.matrix() * matrix;
            cursor = node.parent;
        }
        matrix
    }

    /// Whether a node and all its ancestors are visible.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(node) if node.visible => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Visible mesh nodes with their world matrices.
    #[must_use]
    pub fn drawables(&self) -> Vec<Drawable<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                let id = NodeId(i as u32);
                let mesh = n.mesh()?;
                self.is_visible(id).then(|| Drawable {
                    node: id,
                    world: self.world_matrix(id),
                    mesh,
                })
            })
            .collect()
    }

    /// Visible axes helpers as `(world, size)`.
    #[must_use]
    pub fn axes(&self) -> Vec<(Mat4, f32)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n.kind {
                NodeKind::Axes { size } => {
                    let id = NodeId(i as u32);
                    self.is_visible(id).then(|| (self.world_matrix(id), size))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn scene_with_shared_cone(count: usize) -> (Scene, Vec<NodeId>) {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry::cone(ConeParams::spray(0.5)));
        let m = scene.add_material(StandardMaterial::default());
        let ids = (0..count)
            .map(|i| {
                let pivot = scene.add_node(
                    None,
                    Node::pivot(
                        "pivot",
                        Transform::from_euler(0.0, deg(72.0 * i as f32), 0.0),
                    ),
                );
                scene.add_mesh(
                    Some(pivot),
                    "cone",
                    Transform::from_translation(Vec3::new(0.3, -2.0, -0.05)),
                    g,
                    vec![m],
                )
            })
            .collect();
        (scene, ids)
    }

    #[test]
    fn add_mesh_retains_resources() {
        let (scene, ids) = scene_with_shared_cone(5);
        let mesh = scene.mesh(ids[0]).unwrap();
        assert_eq!(scene.geometries.ref_count(mesh.geometry), Some(5));
        assert_eq!(scene.materials.ref_count(mesh.materials[0]), Some(5));
    }

    #[test]
    fn set_geometry_releases_previous() {
        let (mut scene, ids) = scene_with_shared_cone(1);
        let old = scene.mesh(ids[0]).unwrap().geometry;
        let new = scene.add_geometry(Geometry::cone(ConeParams::spray(1.0)));
        assert!(scene.set_geometry(ids[0], new));
        assert!(!scene.geometries.contains(old));
        assert_eq!(scene.geometries.live_count(), 1);
    }

    #[test]
    fn make_material_unique_leaves_siblings() {
        let (mut scene, ids) = scene_with_shared_cone(3);
        let shared = scene.material_of(ids[0], 0).unwrap();
        let private = scene.make_material_unique(ids[0], 0).unwrap();
        assert_ne!(private, shared);
        assert_eq!(scene.material_of(ids[1], 0), Some(shared));
        assert_eq!(scene.materials.ref_count(shared), Some(2));
        // Already private: no further copy.
        assert_eq!(scene.make_material_unique(ids[0], 0), Some(private));
        assert_eq!(scene.materials.live_count(), 2);
    }

    #[test]
    fn lookup_by_name_and_children() {
        let (scene, ids) = scene_with_shared_cone(5);
        let pivots = scene.find_all_by_name("pivot");
        assert_eq!(pivots.len(), 5);
        assert_eq!(scene.find_by_name("pivot"), Some(pivots[0]));
        assert_eq!(scene.children(pivots[2]), vec![ids[2]]);
        assert!(scene.find_by_name("missing").is_none());
    }

    #[test]
    fn world_matrix_composes_pivot_rotation() {
        let (scene, ids) = scene_with_shared_cone(2);
        // Second pivot is rotated 72 degrees about +Y.
        let p = scene.world_matrix(ids[1]).transform_point3(Vec3::ZERO);
        let expected = glam::Quat::from_rotation_y(deg(72.0))
            * Vec3::new(0.3, -2.0, -0.05);
        assert!((p - expected).length() < 1e-5);
    }

    #[test]
    fn hidden_parent_hides_children() {
        let (mut scene, ids) = scene_with_shared_cone(2);
        let parent = scene.node(ids[0]).unwrap().parent.unwrap();
        assert!(scene.set_node_visible(parent, false));
        assert!(!scene.is_visible(ids[0]));
        assert_eq!(scene.drawables().len(), 1);
    }
}
