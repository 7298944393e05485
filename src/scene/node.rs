use glam::{EulerRot, Mat4, Quat, Vec3};

use super::{GeometryId, MaterialId};

/// Index of a node in its [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Translation / rotation / scale relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset from the parent origin.
    pub translation: Vec3,
    /// Orientation relative to the parent.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No-op transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Pure translation.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Pure rotation from XYZ Euler angles in radians.
    #[must_use]
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        Self {
            rotation: Quat::from_euler(EulerRot::XYZ, x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Replace the rotation with XYZ Euler angles in radians.
    #[must_use]
    pub fn with_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
        self
    }

    /// Local matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }
}

/// Renderable payload of a mesh node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshNode {
    /// Geometry handle (one reference held by this node).
    pub geometry: GeometryId,
    /// Material per geometry group (one reference held per slot).
    pub materials: Vec<MaterialId>,
}

/// What a node carries besides its transform.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Grouping / pivot node.
    Empty,
    /// Triangle mesh.
    Mesh(MeshNode),
    /// RGB axes helper with the given axis length.
    Axes {
        /// Axis length.
        size: f32,
    },
}

/// One entry in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Lookup name; several nodes may share one.
    pub name: String,
    /// Parent node, `None` for roots.
    pub parent: Option<NodeId>,
    /// Local transform.
    pub transform: Transform,
    /// Payload.
    pub kind: NodeKind,
    /// Node-level visibility (inherited by children).
    pub visible: bool,
}

impl Node {
    /// Empty pivot node.
    #[must_use]
    pub fn pivot(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            parent: None,
            transform,
            kind: NodeKind::Empty,
            visible: true,
        }
    }

    /// The mesh payload, if any.
    #[must_use]
    pub const fn mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(m) => Some(m),
            _ => None,
        }
    }
}
