use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Indexed triangle geometry in model space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Upright triangle inscribed in the unit square.
    pub fn triangle() -> Self {
        Self {
            vertices: vec![
                Vec3::new(0.0, 0.5, 0.0),
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
            ],
            indices: vec![0, 1, 2],
            uvs: vec![Vec2::new(0.5, 1.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
            normals: vec![Vec3::Z; 3],
        }
    }

    /// Unit square centred on the origin.
    pub fn quad() -> Self {
        Self {
            vertices: vec![
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(-0.5, -0.5, 0.0),
            ],
            indices: vec![0, 1, 2, 1, 3, 2],
            uvs: vec![
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
        }
    }

    /// Ribbon through `points`, `width` thick along y.
    pub fn line(points: &[Vec3], width: f32) -> Self {
        let half = width * 0.5;
        let mut mesh = Mesh::default();
        for point in points {
            mesh.vertices.push(*point + Vec3::new(0.0, half, 0.0));
            mesh.vertices.push(*point - Vec3::new(0.0, half, 0.0));
            mesh.normals.extend([Vec3::Z, Vec3::Z]);
        }
        let last = points.len().saturating_sub(1).max(1) as f32;
        for i in 0..points.len() {
            let u = i as f32 / last;
            mesh.uvs.extend([Vec2::new(u, 1.0), Vec2::new(u, 0.0)]);
        }
        for segment in 0..points.len().saturating_sub(1) as u32 {
            let base = segment * 2;
            mesh.indices
                .extend([base, base + 1, base + 2, base + 1, base + 3, base + 2]);
        }
        mesh
    }

    /// Fan of `segments` triangles around the origin, sweeping
    /// `angular_size` radians from `start_angle`.
    pub fn circle(radius: f32, segments: u32, start_angle: f32, angular_size: f32) -> Self {
        let segments = segments.max(1);
        let mut mesh = Mesh {
            vertices: vec![Vec3::ZERO],
            indices: Vec::new(),
            uvs: vec![Vec2::splat(0.5)],
            normals: vec![Vec3::Z],
        };
        for i in 0..=segments {
            let angle = start_angle + angular_size * i as f32 / segments as f32;
            let (sin, cos) = angle.sin_cos();
            mesh.vertices.push(Vec3::new(cos * radius, sin * radius, 0.0));
            mesh.uvs.push(Vec2::new(cos * 0.5 + 0.5, sin * 0.5 + 0.5));
            mesh.normals.push(Vec3::Z);
        }
        for i in 1..=segments {
            mesh.indices.extend([i + 1, i, 0]);
        }
        mesh
    }

    /// Full circle with the default tessellation.
    pub fn unit_circle() -> Self {
        Self::circle(1.0, 15, 0.0, TAU)
    }
}
