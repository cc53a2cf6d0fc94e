// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Adjacency filter and exact narrow-phase test for candidate facet pairs

use crate::error::KernelError;
use crate::geometry::{GeometryKernel, HalfEdgeMesh};

/// Topological relation between two candidate facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// One of the first facet's half-edges has its opposite in the second facet
    SharedEdge,
    /// First coincident vertex, as positions in each facet's vertex cycle
    SharedVertex { first: usize, second: usize },
    Unrelated,
}

/// Outcome of testing one candidate pair
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<T> {
    NoIntersection,
    /// The two facets' triangles, in the order the pair was tested
    Intersection(T, T),
}

impl<T> Verdict<T> {
    pub fn is_intersection(&self) -> bool {
        matches!(self, Verdict::Intersection(..))
    }
}

/// Classify a candidate pair.
///
/// The shared vertex is the first match scanning the first facet's cycle
/// against the second's. Pairs with two coincident vertices but no common
/// half-edge pair are resolved on that first vertex only. A collinear facet
/// fails its pair test with `DegenerateTriangle` whenever its box overlaps
/// another, even if the two triangles are clearly apart.
pub fn classify<P>(mesh: &HalfEdgeMesh<P>, first: usize, second: usize) -> Adjacency {
    let shares_edge = mesh
        .triangle_halfedges(first)
        .iter()
        .any(|&he| mesh.opposite_facet(he) == Some(second));
    if shares_edge {
        return Adjacency::SharedEdge;
    }

    let first_vertices = mesh.facet_vertices(first);
    let second_vertices = mesh.facet_vertices(second);
    for (i, vertex) in first_vertices.iter().enumerate() {
        if let Some(j) = second_vertices.iter().position(|other| other == vertex) {
            return Adjacency::SharedVertex { first: i, second: j };
        }
    }

    Adjacency::Unrelated
}

/// Decide whether two facets of a triangulated mesh intersect
pub fn test_pair<K: GeometryKernel>(
    kernel: &K,
    mesh: &HalfEdgeMesh<K::Point>,
    first: usize,
    second: usize,
) -> Result<Verdict<K::Triangle>, KernelError> {
    let adjacency = classify(mesh, first, second);
    if adjacency == Adjacency::SharedEdge {
        return Ok(Verdict::NoIntersection);
    }

    let first_triangle = facet_triangle(kernel, mesh, first);
    let second_triangle = facet_triangle(kernel, mesh, second);

    let intersects = match adjacency {
        Adjacency::SharedVertex {
            first: first_corner,
            second: second_corner,
        } => {
            let first_edge = opposite_segment(kernel, mesh, first, first_corner);
            let second_edge = opposite_segment(kernel, mesh, second, second_corner);
            kernel.triangle_segment_intersect(&first_triangle, &second_edge)?
                || kernel.triangle_segment_intersect(&second_triangle, &first_edge)?
        }
        _ => kernel.triangles_intersect(&first_triangle, &second_triangle)?,
    };

    Ok(if intersects {
        Verdict::Intersection(first_triangle, second_triangle)
    } else {
        Verdict::NoIntersection
    })
}

/// Triangle of a facet, following its canonical half-edge cycle
pub fn facet_triangle<K: GeometryKernel>(kernel: &K, mesh: &HalfEdgeMesh<K::Point>, facet: usize) -> K::Triangle {
    let [a, b, c] = mesh.facet_vertices(facet);
    kernel.triangle(mesh.point(a), mesh.point(b), mesh.point(c))
}

/// Edge of a facet that does not touch the vertex at `corner`
fn opposite_segment<K: GeometryKernel>(
    kernel: &K,
    mesh: &HalfEdgeMesh<K::Point>,
    facet: usize,
    corner: usize,
) -> K::Segment {
    let vertices = mesh.facet_vertices(facet);
    let source = vertices[(corner + 1) % 3];
    let target = vertices[(corner + 2) % 3];
    kernel.segment(mesh.point(source), mesh.point(target))
}
