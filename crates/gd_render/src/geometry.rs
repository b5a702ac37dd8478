//! Triangle lists and their flattened per-attribute buffers.
//!
//! Model loaders produce `Triangle`s; `MeshData` holds the same geometry as
//! flat, parallel arrays (3 floats per position, 4 per color, 2 per texcoord,
//! 3 per normal) which are interleaved into `MeshVertex` at upload time.

use glam::{Vec2, Vec3};

use crate::vertex::MeshVertex;

pub const DEFAULT_VERTEX_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleVertex {
    pub position: Vec3,
    /// Absent normals are replaced by the face normal when flattening.
    pub normal: Option<Vec3>,
    pub tex_coords: Vec2,
    pub color: [f32; 4],
}

impl TriangleVertex {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            normal: None,
            tex_coords: Vec2::ZERO,
            color: DEFAULT_VERTEX_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [TriangleVertex; 3],
}

impl Triangle {
    pub fn new(a: TriangleVertex, b: TriangleVertex, c: TriangleVertex) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Counter-clockwise face normal. Degenerate triangles face +Z.
    pub fn face_normal(&self) -> Vec3 {
        let [a, b, c] = self.vertices;
        let n = (b.position - a.position).cross(c.position - a.position);
        n.try_normalize().unwrap_or(Vec3::Z)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub normals: Vec<f32>,
}

impl MeshData {
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let vertex_count = triangles.len() * 3;
        let mut mesh = MeshData {
            positions: Vec::with_capacity(vertex_count * 3),
            colors: Vec::with_capacity(vertex_count * 4),
            tex_coords: Vec::with_capacity(vertex_count * 2),
            normals: Vec::with_capacity(vertex_count * 3),
        };

        for triangle in triangles {
            let face_normal = triangle.face_normal();
            for vertex in &triangle.vertices {
                mesh.positions.extend_from_slice(&vertex.position.to_array());
                mesh.colors.extend_from_slice(&vertex.color);
                mesh.tex_coords.extend_from_slice(&vertex.tex_coords.to_array());
                let normal = vertex
                    .normal
                    .and_then(Vec3::try_normalize)
                    .unwrap_or(face_normal);
                mesh.normals.extend_from_slice(&normal.to_array());
            }
        }
        mesh
    }

    /// Two-triangle quad in the XY plane at depth `z`, texcoord origin top-left.
    pub fn screen_quad(left: f32, top: f32, right: f32, bottom: f32, z: f32) -> Self {
        let corner = |x: f32, y: f32, u: f32, v: f32| TriangleVertex {
            position: Vec3::new(x, y, z),
            normal: Some(Vec3::Z),
            tex_coords: Vec2::new(u, v),
            color: DEFAULT_VERTEX_COLOR,
        };
        let upper_left = corner(left, top, 0.0, 0.0);
        let lower_left = corner(left, bottom, 0.0, 1.0);
        let lower_right = corner(right, bottom, 1.0, 1.0);
        let upper_right = corner(right, top, 1.0, 0.0);
        Self::from_triangles(&[
            Triangle::new(upper_left, lower_left, lower_right),
            Triangle::new(lower_right, upper_right, upper_left),
        ])
    }

    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Interleave the parallel arrays into GPU vertices.
    pub fn interleave(&self) -> Vec<MeshVertex> {
        (0..self.vertex_count() as usize)
            .map(|i| MeshVertex {
                position: read3(&self.positions, i),
                color: [
                    self.colors.get(i * 4).copied().unwrap_or(1.0),
                    self.colors.get(i * 4 + 1).copied().unwrap_or(1.0),
                    self.colors.get(i * 4 + 2).copied().unwrap_or(1.0),
                    self.colors.get(i * 4 + 3).copied().unwrap_or(1.0),
                ],
                tex_coords: [
                    self.tex_coords.get(i * 2).copied().unwrap_or(0.0),
                    self.tex_coords.get(i * 2 + 1).copied().unwrap_or(0.0),
                ],
                normal: read3(&self.normals, i),
            })
            .collect()
    }
}

fn read3(values: &[f32], index: usize) -> [f32; 3] {
    [
        values.get(index * 3).copied().unwrap_or(0.0),
        values.get(index * 3 + 1).copied().unwrap_or(0.0),
        values.get(index * 3 + 2).copied().unwrap_or(0.0),
    ]
}
