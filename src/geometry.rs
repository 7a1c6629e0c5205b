//! CPU-side geometry builders.
//!
//! Every visual primitive of a phase sequence starts life as a
//! [`RawGeometry`]: boxes for bars and strips, flat rings, extruded outlines
//! for solid shapes and billboard clouds for particle sets. Builders return
//! plain vertex/index data so they can be inspected in tests and uploaded to
//! the GPU once through a scene output.
//!
//! ```ignore
//! let housing = RawGeometry::prism(&epitrochoid(1.5, 0.5, 0.3, 1.2, 64), 0.3);
//! let ring = RawGeometry::ring(1.8, 2.2, 32);
//! let mesh_id = output.upload_mesh(&ring);
//! ```

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use glam::{Quat, Vec2, Vec3};
use std::f32::consts::TAU;

#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        let (min, max) = self.bounds();
        max - min
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).to_array();
        }
    }

    pub fn scale_xyz(&mut self, factors: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) * factors).to_array();
        }
    }

    pub fn rotate(&mut self, rotation: Quat) {
        for v in &mut self.vertices {
            v.position = (rotation * Vec3::from(v.position)).to_array();
            v.normal = (rotation * Vec3::from(v.normal)).to_array();
        }
    }

    /// Appends another geometry, rebasing its indices.
    pub fn append(&mut self, other: &RawGeometry) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }

    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        for (p, uv) in corners.iter().zip(uvs) {
            self.vertices
                .push(Vertex3d::new(p.to_array(), normal.to_array(), uv));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let h = Vec3::new(width, height, depth) * 0.5;
        let mut g = Self::default();
        // Each face lists its corners counter-clockwise seen from outside.
        let faces: [(Vec3, [[f32; 3]; 4]); 6] = [
            (Vec3::Z, [[-1., -1., 1.], [1., -1., 1.], [1., 1., 1.], [-1., 1., 1.]]),
            (Vec3::NEG_Z, [[1., -1., -1.], [-1., -1., -1.], [-1., 1., -1.], [1., 1., -1.]]),
            (Vec3::X, [[1., -1., 1.], [1., -1., -1.], [1., 1., -1.], [1., 1., 1.]]),
            (Vec3::NEG_X, [[-1., -1., -1.], [-1., -1., 1.], [-1., 1., 1.], [-1., 1., -1.]]),
            (Vec3::Y, [[-1., 1., 1.], [1., 1., 1.], [1., 1., -1.], [-1., 1., -1.]]),
            (Vec3::NEG_Y, [[-1., -1., -1.], [1., -1., -1.], [1., -1., 1.], [-1., -1., 1.]]),
        ];
        for (normal, corners) in faces {
            g.push_quad(corners.map(|c| Vec3::from(c) * h), normal);
        }
        g
    }

    /// Flat rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let mut g = Self::default();
        g.push_quad(
            [
                Vec3::new(-hw, -hh, 0.0),
                Vec3::new(hw, -hh, 0.0),
                Vec3::new(hw, hh, 0.0),
                Vec3::new(-hw, hh, 0.0),
            ],
            Vec3::Z,
        );
        g
    }

    /// Flat annulus in the XY plane facing +Z. Six segments give a hexagon.
    pub fn ring(inner: f32, outer: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut g = Self::default();
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let (s, c) = (t * TAU).sin_cos();
            for (radius, v) in [(inner, 0.0), (outer, 1.0)] {
                g.vertices.push(Vertex3d::new(
                    [c * radius, s * radius, 0.0],
                    [0.0, 0.0, 1.0],
                    [t, v],
                ));
            }
        }
        for i in 0..segments {
            let a = i * 2;
            let (inner_a, outer_a, inner_b, outer_b) = (a, a + 1, a + 2, a + 3);
            g.indices
                .extend_from_slice(&[inner_a, outer_a, outer_b, inner_a, outer_b, inner_b]);
        }
        g
    }

    /// Extrudes a closed outline along Z, centered on `z = 0`.
    ///
    /// The outline must be counter-clockwise and star-shaped around its
    /// centroid; caps are fanned from the centroid.
    pub fn prism(outline: &[Vec2], depth: f32) -> Self {
        let mut g = Self::default();
        if outline.len() < 3 {
            return g;
        }
        let half = depth * 0.5;
        let centroid = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;

        for (z, normal) in [(half, 1.0f32), (-half, -1.0)] {
            let base = g.vertices.len() as u32;
            g.vertices.push(Vertex3d::new(
                [centroid.x, centroid.y, z],
                [0.0, 0.0, normal],
                [0.5, 0.5],
            ));
            for p in outline {
                g.vertices
                    .push(Vertex3d::new([p.x, p.y, z], [0.0, 0.0, normal], [0.5, 0.5]));
            }
            let n = outline.len() as u32;
            for i in 0..n {
                let a = base + 1 + i;
                let b = base + 1 + (i + 1) % n;
                if normal > 0.0 {
                    g.indices.extend_from_slice(&[base, a, b]);
                } else {
                    g.indices.extend_from_slice(&[base, b, a]);
                }
            }
        }

        for i in 0..outline.len() {
            let a = outline[i];
            let b = outline[(i + 1) % outline.len()];
            let edge = b - a;
            let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
            g.push_quad(
                [
                    Vec3::new(a.x, a.y, -half),
                    Vec3::new(b.x, b.y, -half),
                    Vec3::new(b.x, b.y, half),
                    Vec3::new(a.x, a.y, half),
                ],
                normal,
            );
        }
        g
    }

    /// One small camera-facing quad per point.
    pub fn point_cloud(points: &[Vec3], size: f32) -> Self {
        let h = size * 0.5;
        let mut g = Self {
            vertices: Vec::with_capacity(points.len() * 4),
            indices: Vec::with_capacity(points.len() * 6),
        };
        for p in points {
            g.push_quad(
                [
                    *p + Vec3::new(-h, -h, 0.0),
                    *p + Vec3::new(h, -h, 0.0),
                    *p + Vec3::new(h, h, 0.0),
                    *p + Vec3::new(-h, h, 0.0),
                ],
                Vec3::Z,
            );
        }
        g
    }
}

/// Regular polygon outline, counter-clockwise, first vertex at `phase` radians.
pub fn regular_polygon(sides: u32, radius: f32, phase: f32) -> Vec<Vec2> {
    (0..sides.max(3))
        .map(|i| {
            let angle = phase + i as f32 / sides.max(3) as f32 * TAU;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Rotor-housing outline: a rolling-circle curve with a fixed pen offset.
///
/// `big_r` and `small_r` are the fixed and rolling radii, `pen` the pen
/// offset and `scale` a final uniform scale.
pub fn epitrochoid(big_r: f32, small_r: f32, pen: f32, scale: f32, segments: u32) -> Vec<Vec2> {
    let k = (big_r - small_r) / small_r;
    (0..segments.max(3))
        .map(|i| {
            let t = i as f32 / segments.max(3) as f32 * TAU;
            let x = (big_r - small_r) * t.cos() + pen * (k * t).cos();
            let y = (big_r - small_r) * t.sin() - pen * (k * t).sin();
            Vec2::new(x, y) * scale
        })
        .collect()
}

/// Deterministic points scattered through a cube of half-width `extent`.
pub fn scatter_points(count: usize, extent: f32, seed: u32) -> Vec<Vec3> {
    (0..count as u32)
        .map(|i| {
            let axis = |k: u32| unit_hash(i, k, seed) * 2.0 - 1.0;
            Vec3::new(axis(0), axis(1), axis(2)) * extent
        })
        .collect()
}

fn unit_hash(x: u32, y: u32, seed: u32) -> f32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    (h & 0x00ff_ffff) as f32 / 0x0100_0000 as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_bounds() {
        let g = RawGeometry::cuboid(2.0, 0.08, 0.15);
        let (min, max) = g.bounds();
        assert_eq!(min, Vec3::new(-1.0, -0.04, -0.075));
        assert_eq!(max, Vec3::new(1.0, 0.04, 0.075));
        assert_eq!(g.vertices.len(), 24);
        assert_eq!(g.triangle_count(), 12);
    }

    #[test]
    fn ring_counts_and_radii() {
        let g = RawGeometry::ring(1.8, 2.0, 6);
        assert_eq!(g.vertices.len(), 14);
        assert_eq!(g.indices.len(), 36);
        for v in &g.vertices {
            let r = Vec2::new(v.position[0], v.position[1]).length();
            assert!((r - 1.8).abs() < 1e-4 || (r - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn prism_faces() {
        let outline = regular_polygon(3, 1.2, -std::f32::consts::FRAC_PI_2);
        let g = RawGeometry::prism(&outline, 0.25);
        // Two fanned caps plus one quad per edge.
        assert_eq!(g.triangle_count(), 3 * 2 + 3 * 2);
        let size = g.size();
        assert!((size.z - 0.25).abs() < 1e-6);
    }

    #[test]
    fn prism_cap_faces_outward() {
        let outline = regular_polygon(4, 1.0, 0.0);
        let g = RawGeometry::prism(&outline, 1.0);
        let tri = &g.indices[0..3];
        let p = |i: u32| Vec3::from(g.vertices[i as usize].position);
        let n = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
        assert!(n.z > 0.0);
    }

    #[test]
    fn degenerate_outline_is_empty() {
        let g = RawGeometry::prism(&[Vec2::ZERO, Vec2::X], 1.0);
        assert!(g.is_empty());
    }

    #[test]
    fn epitrochoid_stays_in_band() {
        let outline = epitrochoid(1.5, 0.5, 0.3, 1.2, 64);
        assert_eq!(outline.len(), 64);
        for p in outline {
            let r = p.length();
            assert!(r >= 0.7 * 1.2 - 1e-4 && r <= 1.3 * 1.2 + 1e-4);
        }
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = RawGeometry::plane(1.0, 1.0);
        let b = RawGeometry::plane(1.0, 1.0);
        a.append(&b);
        assert_eq!(a.vertices.len(), 8);
        assert_eq!(a.indices[6..], [4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn scatter_is_deterministic_and_bounded() {
        let a = scatter_points(200, 50.0, 7);
        let b = scatter_points(200, 50.0, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.abs().max_element() <= 50.0));
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn rotate_turns_normals() {
        let mut g = RawGeometry::plane(1.0, 1.0);
        g.rotate(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let n = Vec3::from(g.vertices[0].normal);
        assert!((n - Vec3::X).length() < 1e-5);
    }
}
