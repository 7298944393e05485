//! Geometry descriptors and CPU mesh generation.
//!
//! Each primitive keeps the parameters it was built from alongside the
//! generated vertex/index data, so callers can inspect what a geometry is
//! without walking its triangles.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Interleaved vertex consumed by the standard mesh pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space unit normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl MeshVertex {
    /// wgpu vertex layout matching `@location(0..3)` in the mesh shader.
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ];
        wgpu::VertexBufferLayout {
            array_stride: size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// A contiguous index range drawn with one material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshGroup {
    /// First index in the index buffer.
    pub start: u32,
    /// Number of indices.
    pub count: u32,
    /// Slot in the owning mesh node's material list.
    pub material_index: usize,
}

/// Triangle-list mesh data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex data.
    pub vertices: Vec<MeshVertex>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Material groups. Empty means one group covering every index.
    pub groups: Vec<MeshGroup>,
}

impl MeshData {
    /// Material groups, synthesizing a single slot-0 group when none are
    /// declared.
    #[must_use]
    pub fn draw_groups(&self) -> Vec<MeshGroup> {
        if self.groups.is_empty() {
            vec![MeshGroup {
                start: 0,
                count: self.indices.len() as u32,
                material_index: 0,
            }]
        } else {
            self.groups.clone()
        }
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) {
        self.vertices.push(MeshVertex {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        });
    }

    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }
}

/// Parameters of a cone (cylinder with a zero top radius).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeParams {
    /// Base radius.
    pub radius: f32,
    /// Height along +Y, centered on the origin.
    pub height: f32,
    /// Segments around the circumference.
    pub radial_segments: u32,
    /// Segments along the height.
    pub height_segments: u32,
    /// Skip the base cap.
    pub open_ended: bool,
}

impl ConeParams {
    /// Height of every spray cone.
    pub const SPRAY_HEIGHT: f32 = 3.0;
    /// Radial segments of every spray cone.
    pub const SPRAY_RADIAL_SEGMENTS: u32 = 64;
    /// Height segments of every spray cone.
    pub const SPRAY_HEIGHT_SEGMENTS: u32 = 10;

    /// The open-ended spray cone with the given base radius.
    #[must_use]
    pub const fn spray(radius: f32) -> Self {
        Self {
            radius,
            height: Self::SPRAY_HEIGHT,
            radial_segments: Self::SPRAY_RADIAL_SEGMENTS,
            height_segments: Self::SPRAY_HEIGHT_SEGMENTS,
            open_ended: true,
        }
    }
}

/// What a geometry was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryDesc {
    /// Axis-aligned box with six material groups (+X, -X, +Y, -Y, +Z, -Z).
    Box {
        /// Size along X, Y, Z.
        size: Vec3,
        /// Segments per edge.
        segments: u32,
    },
    /// Cone pointing up +Y.
    Cone(ConeParams),
    /// Torus in the XY plane.
    Torus {
        /// Distance from the center to the middle of the tube.
        radius: f32,
        /// Tube radius.
        tube: f32,
        /// Segments around the tube.
        radial_segments: u32,
        /// Segments around the ring.
        tubular_segments: u32,
    },
    /// Single-quad plane in the XY plane facing +Z.
    Plane {
        /// Size along X.
        width: f32,
        /// Size along Y.
        height: f32,
    },
}

/// A geometry resource: descriptor plus generated mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    desc: GeometryDesc,
    mesh: MeshData,
}

impl Geometry {
    /// Generate the mesh for a descriptor.
    #[must_use]
    pub fn new(desc: GeometryDesc) -> Self {
        let mesh = match desc {
            GeometryDesc::Box { size, segments } => box_mesh(size, segments),
            GeometryDesc::Cone(params) => cone_mesh(&params),
            GeometryDesc::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus_mesh(radius, tube, radial_segments, tubular_segments),
            GeometryDesc::Plane { width, height } => plane_mesh(width, height),
        };
        Self { desc, mesh }
    }

    /// Cone shortcut.
    #[must_use]
    pub fn cone(params: ConeParams) -> Self {
        Self::new(GeometryDesc::Cone(params))
    }

    /// Parameters this geometry was built from.
    #[must_use]
    pub const fn desc(&self) -> &GeometryDesc {
        &self.desc
    }

    /// Cone parameters, if this is a cone.
    #[must_use]
    pub const fn cone_params(&self) -> Option<&ConeParams> {
        match &self.desc {
            GeometryDesc::Cone(p) => Some(p),
            _ => None,
        }
    }

    /// Generated mesh data.
    #[must_use]
    pub const fn mesh(&self) -> &MeshData {
        &self.mesh
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn cone_mesh(p: &ConeParams) -> MeshData {
    let radial = p.radial_segments.max(3);
    let rows = p.height_segments.max(1);
    let half = p.height * 0.5;
    // Normal tilt for a surface whose radius grows from 0 at the top.
    let slope = if p.height > 0.0 { p.radius / p.height } else { 0.0 };

    let mut mesh = MeshData::default();
    for y in 0..=rows {
        let v = y as f32 / rows as f32;
        let r = v * p.radius;
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.push(
                Vec3::new(r * sin, -v * p.height + half, r * cos),
                Vec3::new(sin, slope, cos).normalize_or(Vec3::Y),
                [u, 1.0 - v],
            );
        }
    }

    let stride = radial + 1;
    for y in 0..rows {
        for x in 0..radial {
            let a = y * stride + x;
            let b = (y + 1) * stride + x;
            let c = (y + 1) * stride + x + 1;
            let d = y * stride + x + 1;
            mesh.push_quad(a, b, c, d);
        }
    }

    if !p.open_ended && p.radius > 0.0 {
        let base = mesh.vertices.len() as u32;
        let center = Vec3::new(0.0, -half, 0.0);
        for x in 0..radial {
            let u = (x as f32 + 0.5) / radial as f32;
            mesh.push(center, Vec3::NEG_Y, [u, 0.0]);
        }
        let rim = base + radial;
        for x in 0..=radial {
            let theta = x as f32 / radial as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.push(
                Vec3::new(p.radius * sin, -half, p.radius * cos),
                Vec3::NEG_Y,
                [cos * 0.5 + 0.5, sin * 0.5 + 0.5],
            );
        }
        for x in 0..radial {
            mesh.indices
                .extend_from_slice(&[rim + x + 1, rim + x, base + x]);
        }
    }
    mesh
}

/// Which object-space axes a box face maps its grid onto.
struct FaceAxes {
    u: usize,
    v: usize,
    w: usize,
    udir: f32,
    vdir: f32,
}

impl FaceAxes {
    /// Grid `u`/`v` axes with their directions; `w` is the face normal axis.
    const fn new(u: usize, v: usize, w: usize, udir: f32, vdir: f32) -> Self {
        Self {
            u,
            v,
            w,
            udir,
            vdir,
        }
    }
}

fn box_mesh(size: Vec3, segments: u32) -> MeshData {
    let n = segments.max(1);
    let (w, h, d) = (size.x, size.y, size.z);
    // +X, -X, +Y, -Y, +Z, -Z in material-group order.
    let faces = [
        (FaceAxes::new(2, 1, 0, -1.0, -1.0), d, h, w),
        (FaceAxes::new(2, 1, 0, 1.0, -1.0), d, h, -w),
        (FaceAxes::new(0, 2, 1, 1.0, 1.0), w, d, h),
        (FaceAxes::new(0, 2, 1, 1.0, -1.0), w, d, -h),
        (FaceAxes::new(0, 1, 2, 1.0, -1.0), w, h, d),
        (FaceAxes::new(0, 1, 2, -1.0, -1.0), w, h, -d),
    ];

    let mut mesh = MeshData::default();
    for (material_index, (axes, width, height, depth)) in
        faces.iter().enumerate()
    {
        let start = mesh.indices.len() as u32;
        box_face(&mut mesh, axes, *width, *height, *depth, n);
        mesh.groups.push(MeshGroup {
            start,
            count: mesh.indices.len() as u32 - start,
            material_index,
        });
    }
    mesh
}

fn box_face(
    mesh: &mut MeshData,
    axes: &FaceAxes,
    width: f32,
    height: f32,
    depth: f32,
    n: u32,
) {
    let base = mesh.vertices.len() as u32;
    let seg_w = width / n as f32;
    let seg_h = height / n as f32;
    let facing = if depth > 0.0 { 1.0 } else { -1.0 };

    for iy in 0..=n {
        let y = iy as f32 * seg_h - height * 0.5;
        for ix in 0..=n {
            let x = ix as f32 * seg_w - width * 0.5;
            let mut pos = [0.0f32; 3];
            pos[axes.u] = x * axes.udir;
            pos[axes.v] = y * axes.vdir;
            pos[axes.w] = depth * 0.5;
            let mut normal = [0.0f32; 3];
            normal[axes.w] = facing;
            mesh.push(
                Vec3::from_array(pos),
                Vec3::from_array(normal),
                [ix as f32 / n as f32, 1.0 - iy as f32 / n as f32],
            );
        }
    }

    let stride = n + 1;
    for iy in 0..n {
        for ix in 0..n {
            let a = base + ix + stride * iy;
            let b = base + ix + stride * (iy + 1);
            let c = base + ix + 1 + stride * (iy + 1);
            let d = base + ix + 1 + stride * iy;
            mesh.push_quad(a, b, c, d);
        }
    }
}

fn torus_mesh(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> MeshData {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);

    let mut mesh = MeshData::default();
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let ring = radius + tube * v.cos();
            let pos = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.push(
                pos,
                (pos - center).normalize_or(Vec3::Z),
                [i as f32 / tubular as f32, j as f32 / radial as f32],
            );
        }
    }

    let stride = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            mesh.push_quad(a, b, c, d);
        }
    }
    mesh
}

fn plane_mesh(width: f32, height: f32) -> MeshData {
    let mut mesh = MeshData::default();
    for iy in 0..=1u32 {
        let y = iy as f32 * height - height * 0.5;
        for ix in 0..=1u32 {
            let x = ix as f32 * width - width * 0.5;
            mesh.push(
                Vec3::new(x, -y, 0.0),
                Vec3::Z,
                [ix as f32, 1.0 - iy as f32],
            );
        }
    }
    mesh.push_quad(0, 2, 3, 1);
    mesh
}

/// Colored line vertex for the axes helper.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
}

impl LineVertex {
    /// wgpu vertex layout matching the line shader.
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
        ];
        wgpu::VertexBufferLayout {
            array_stride: size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Line list for an RGB axes helper of the given length.
#[must_use]
pub fn axes_lines(size: f32) -> Vec<LineVertex> {
    let axis = |dir: Vec3, color: [f32; 3]| {
        [
            LineVertex {
                position: [0.0; 3],
                color,
            },
            LineVertex {
                position: (dir * size).to_array(),
                color,
            },
        ]
    };
    [
        axis(Vec3::X, [1.0, 0.0, 0.0]),
        axis(Vec3::Y, [0.0, 1.0, 0.0]),
        axis(Vec3::Z, [0.0, 0.0, 1.0]),
    ]
    .concat()
}

/// Degrees to radians, named for readability at scene-building call sites.
#[must_use]
pub fn deg(degrees: f32) -> f32 {
    degrees * PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_finite(mesh: &MeshData) -> bool {
        mesh.vertices.iter().all(|v| {
            v.position.iter().chain(&v.normal).chain(&v.uv).all(|c| c.is_finite())
        })
    }

    #[test]
    fn spray_cone_counts() {
        let g = Geometry::cone(ConeParams::spray(0.5));
        let mesh = g.mesh();
        assert_eq!(mesh.vertices.len(), 65 * 11);
        assert_eq!(mesh.indices.len(), 64 * 10 * 6);
        assert!(all_finite(mesh));
        assert_eq!(g.cone_params(), Some(&ConeParams::spray(0.5)));
    }

    #[test]
    fn cone_apex_and_base() {
        let mesh = cone_mesh(&ConeParams::spray(2.0));
        // First row is the apex at +h/2, last row is the base ring at -h/2.
        assert_eq!(mesh.vertices[0].position, [0.0, 1.5, 0.0]);
        let last = mesh.vertices.last().unwrap().position;
        assert!((last[1] + 1.5).abs() < 1e-6);
        assert!((last[0].hypot(last[2]) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn zero_radius_cone_is_still_well_formed() {
        let mesh = cone_mesh(&ConeParams::spray(0.0));
        assert_eq!(mesh.vertices.len(), 65 * 11);
        assert_eq!(mesh.indices.len(), 64 * 10 * 6);
        assert!(all_finite(&mesh));
    }

    #[test]
    fn closed_cone_adds_cap() {
        let mut p = ConeParams::spray(1.0);
        p.open_ended = false;
        let mesh = cone_mesh(&p);
        assert_eq!(mesh.vertices.len(), 65 * 11 + 64 + 65);
        assert_eq!(mesh.indices.len(), 64 * 10 * 6 + 64 * 3);
    }

    #[test]
    fn box_has_six_groups() {
        let mesh = box_mesh(Vec3::ONE, 4);
        assert_eq!(mesh.groups.len(), 6);
        assert_eq!(mesh.vertices.len(), 6 * 5 * 5);
        for (i, g) in mesh.groups.iter().enumerate() {
            assert_eq!(g.material_index, i);
            assert_eq!(g.count, 4 * 4 * 6);
        }
        // Group 4 is the +Z face.
        let g = mesh.groups[4];
        let first = mesh.indices[g.start as usize] as usize;
        assert_eq!(mesh.vertices[first].normal, [0.0, 0.0, 1.0]);
        assert!((mesh.vertices[first].position[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn torus_counts() {
        let mesh = torus_mesh(0.08, 0.03, 32, 32);
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert_eq!(mesh.indices.len(), 32 * 32 * 6);
        assert!(all_finite(&mesh));
    }

    #[test]
    fn plane_is_single_quad() {
        let mesh = plane_mesh(10.0, 10.0);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.draw_groups().len(), 1);
        assert_eq!(mesh.draw_groups()[0].count, 6);
    }

    #[test]
    fn axes_are_three_segments() {
        let lines = axes_lines(5.0);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1].position, [5.0, 0.0, 0.0]);
        assert_eq!(lines[5].color, [0.0, 0.0, 1.0]);
    }
}
