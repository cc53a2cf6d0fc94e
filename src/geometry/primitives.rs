// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed primitive meshes, consistently oriented with outward normals

use super::HalfEdgeMesh;
use crate::error::MeshError;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Corner tetrahedron spanning the three positive axes
    Tetrahedron { size: f64 },
    Cube { size: Vector3<f64>, center: bool },
    /// Latitude/longitude sphere centred at the origin
    Sphere { r: f64, segments: usize, rings: usize },
}

impl Primitive {
    pub fn tetrahedron(size: f64) -> Self {
        Self::Tetrahedron { size }
    }

    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64, segments: usize, rings: usize) -> Self {
        Self::Sphere {
            r,
            segments: segments.max(3),
            rings: rings.max(2),
        }
    }

    pub fn to_mesh(&self) -> Result<HalfEdgeMesh, MeshError> {
        match *self {
            Self::Tetrahedron { size } => generate_tetrahedron_mesh(size),
            Self::Cube { size, center } => generate_cube_mesh(size, center),
            Self::Sphere { r, segments, rings } => generate_sphere_mesh(r, segments, rings),
        }
    }
}

fn generate_tetrahedron_mesh(size: f64) -> Result<HalfEdgeMesh, MeshError> {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(size, 0.0, 0.0),
        Point3::new(0.0, size, 0.0),
        Point3::new(0.0, 0.0, size),
    ];
    HalfEdgeMesh::from_triangles(points, &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]])
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Result<HalfEdgeMesh, MeshError> {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    let points = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let triangles = [
        // Front (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Back (z-)
        [1, 0, 3],
        [1, 3, 2],
        // Right (x+)
        [5, 1, 2],
        [5, 2, 6],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Top (y+)
        [7, 6, 2],
        [7, 2, 3],
        // Bottom (y-)
        [0, 1, 5],
        [0, 5, 4],
    ];

    HalfEdgeMesh::from_triangles(points, &triangles)
}

fn generate_sphere_mesh(radius: f64, segments: usize, rings: usize) -> Result<HalfEdgeMesh, MeshError> {
    let north = 0;
    let south = 1;
    let mut points = vec![Point3::new(0.0, 0.0, radius), Point3::new(0.0, 0.0, -radius)];

    // Interior latitude rows, north to south
    for i in 1..rings {
        let theta = PI * i as f64 / rings as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for j in 0..segments {
            let phi = 2.0 * PI * j as f64 / segments as f64;
            let (sin_phi, cos_phi) = phi.sin_cos();
            points.push(Point3::new(
                radius * sin_theta * cos_phi,
                radius * sin_theta * sin_phi,
                radius * cos_theta,
            ));
        }
    }

    let ring_vertex = |row: usize, j: usize| 2 + (row - 1) * segments + j % segments;
    let last_row = rings - 1;

    let mut triangles = Vec::with_capacity(2 * segments * (rings - 1));
    for j in 0..segments {
        triangles.push([north, ring_vertex(1, j), ring_vertex(1, j + 1)]);
        triangles.push([south, ring_vertex(last_row, j + 1), ring_vertex(last_row, j)]);
    }

    for row in 1..last_row {
        for j in 0..segments {
            let a = ring_vertex(row, j);
            let b = ring_vertex(row + 1, j);
            let c = ring_vertex(row + 1, j + 1);
            let d = ring_vertex(row, j + 1);
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        }
    }

    HalfEdgeMesh::from_triangles(points, &triangles)
}
