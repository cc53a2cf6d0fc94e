// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge mesh representation
//! Index-addressed arenas for vertices, half-edges and facets with O(1)
//! `next`, `opposite` and owning-facet lookups

use super::BoundingBox;
use crate::error::MeshError;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::ops::Range;

/// Directed edge owned by exactly one facet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Next half-edge around the same facet
    pub next: usize,
    /// Previous half-edge around the same facet
    pub prev: usize,
    /// Oppositely directed half-edge of the neighbouring facet, if any
    pub opposite: Option<usize>,
    /// Vertex this half-edge points to
    pub vertex: usize,
    /// Facet this half-edge bounds
    pub facet: usize,
}

/// Face bounded by a cycle of `degree` half-edges starting at `halfedge`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facet {
    pub halfedge: usize,
    pub degree: usize,
}

/// Polygonal surface with half-edge connectivity
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<P = Point3<f64>> {
    points: Vec<P>,
    half_edges: Vec<HalfEdge>,
    facets: Vec<Facet>,
}

impl<P> HalfEdgeMesh<P> {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            half_edges: Vec::new(),
            facets: Vec::new(),
        }
    }

    /// Build a mesh from indexed polygons of any degree ≥ 3.
    ///
    /// Polygon `[v0, v1, ..., vk]` yields half-edges `v0 -> v1`, ...,
    /// `vk -> v0`. The facet's canonical half-edge is the one pointing to
    /// `v0`, so walking `next` from it visits the vertices in input order.
    pub fn from_polygons<I>(points: Vec<P>, polygons: I) -> Result<Self, MeshError>
    where
        I: IntoIterator,
        I::Item: AsRef<[usize]>,
    {
        let mut mesh = Self {
            points,
            half_edges: Vec::new(),
            facets: Vec::new(),
        };

        for (facet_idx, polygon) in polygons.into_iter().enumerate() {
            mesh.add_facet(facet_idx, polygon.as_ref())?;
        }
        mesh.link_opposites()?;

        Ok(mesh)
    }

    pub fn from_triangles(points: Vec<P>, triangles: &[[usize; 3]]) -> Result<Self, MeshError> {
        Self::from_polygons(points, triangles)
    }

    fn add_facet(&mut self, facet_idx: usize, polygon: &[usize]) -> Result<(), MeshError> {
        let degree = polygon.len();
        if degree < 3 {
            return Err(MeshError::TooFewVertices {
                facet: facet_idx,
                degree,
            });
        }

        for (i, &vertex) in polygon.iter().enumerate() {
            if vertex >= self.points.len() {
                return Err(MeshError::VertexIndexOutOfRange {
                    facet: facet_idx,
                    vertex,
                    vertex_count: self.points.len(),
                });
            }
            if polygon[..i].contains(&vertex) {
                return Err(MeshError::RepeatedVertex {
                    facet: facet_idx,
                    vertex,
                });
            }
        }

        let base = self.half_edges.len();
        for i in 0..degree {
            self.half_edges.push(HalfEdge {
                next: base + (i + 1) % degree,
                prev: base + (i + degree - 1) % degree,
                opposite: None,
                vertex: polygon[(i + 1) % degree],
                facet: facet_idx,
            });
        }

        self.facets.push(Facet {
            halfedge: base + degree - 1,
            degree,
        });
        Ok(())
    }

    /// Pair each half-edge with its reverse through a directed-edge map
    fn link_opposites(&mut self) -> Result<(), MeshError> {
        let mut directed: HashMap<(usize, usize), usize> = HashMap::with_capacity(self.half_edges.len());

        for (he_idx, he) in self.half_edges.iter().enumerate() {
            let key = (self.half_edges[he.prev].vertex, he.vertex);
            if directed.insert(key, he_idx).is_some() {
                return Err(MeshError::DuplicateEdge {
                    from: key.0,
                    to: key.1,
                });
            }
        }

        for he_idx in 0..self.half_edges.len() {
            let (from, to) = self.endpoints(he_idx);
            self.half_edges[he_idx].opposite = directed.get(&(to, from)).copied();
        }

        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    pub fn halfedge_count(&self) -> usize {
        self.half_edges.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.half_edges
            .iter()
            .enumerate()
            .filter(|(idx, he)| he.opposite.map_or(true, |opposite| opposite > *idx))
            .count()
    }

    /// Facet handles in index order
    pub fn facets(&self) -> Range<usize> {
        0..self.facets.len()
    }

    pub fn facet(&self, facet: usize) -> &Facet {
        &self.facets[facet]
    }

    pub fn halfedge(&self, he: usize) -> &HalfEdge {
        &self.half_edges[he]
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn point(&self, vertex: usize) -> &P {
        &self.points[vertex]
    }

    pub fn next(&self, he: usize) -> usize {
        self.half_edges[he].next
    }

    /// Vertex the half-edge points to
    pub fn head(&self, he: usize) -> usize {
        self.half_edges[he].vertex
    }

    /// Vertex the half-edge starts from
    pub fn tail(&self, he: usize) -> usize {
        self.half_edges[self.half_edges[he].prev].vertex
    }

    pub fn endpoints(&self, he: usize) -> (usize, usize) {
        (self.tail(he), self.head(he))
    }

    pub fn opposite(&self, he: usize) -> Option<usize> {
        self.half_edges[he].opposite
    }

    /// Facet on the other side of the half-edge, if the edge is not a border
    pub fn opposite_facet(&self, he: usize) -> Option<usize> {
        self.opposite(he).map(|opposite| self.half_edges[opposite].facet)
    }

    /// Half-edges around a facet in cyclic order, starting at the canonical one
    pub fn facet_halfedges(&self, facet: usize) -> impl Iterator<Item = usize> + '_ {
        let Facet { halfedge, degree } = self.facets[facet];
        std::iter::successors(Some(halfedge), move |&he| Some(self.next(he))).take(degree)
    }

    /// The three half-edges of a triangular facet in cyclic order.
    ///
    /// Only meaningful when the facet has degree 3.
    pub fn triangle_halfedges(&self, facet: usize) -> [usize; 3] {
        let first = self.facets[facet].halfedge;
        let second = self.next(first);
        [first, second, self.next(second)]
    }

    /// Head vertices of [`Self::triangle_halfedges`]
    pub fn facet_vertices(&self, facet: usize) -> [usize; 3] {
        self.triangle_halfedges(facet).map(|he| self.head(he))
    }

    pub fn degree(&self, facet: usize) -> usize {
        self.facets[facet].degree
    }

    /// First facet whose boundary is not a triangle, with its degree
    pub fn first_non_triangle(&self) -> Option<(usize, usize)> {
        self.facets
            .iter()
            .enumerate()
            .find(|(_, facet)| facet.degree != 3)
            .map(|(idx, facet)| (idx, facet.degree))
    }

    pub fn is_pure_triangle(&self) -> bool {
        self.first_non_triangle().is_none()
    }

    /// Every half-edge has an opposite
    pub fn is_closed(&self) -> bool {
        self.half_edges.iter().all(|he| he.opposite.is_some())
    }

    /// Number of half-edges without an opposite
    pub fn border_halfedge_count(&self) -> usize {
        self.half_edges.iter().filter(|he| he.opposite.is_none()).count()
    }

    /// Vertex indices of every facet, in cyclic order
    pub fn polygons(&self) -> Vec<Vec<usize>> {
        self.facets()
            .map(|facet| self.facet_halfedges(facet).map(|he| self.head(he)).collect())
            .collect()
    }
}

impl HalfEdgeMesh<Point3<f64>> {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Copy of the mesh with every point moved by `offset`
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            points: self.points.iter().map(|p| p + offset).collect(),
            half_edges: self.half_edges.clone(),
            facets: self.facets.clone(),
        }
    }

    /// Disjoint union of two meshes; the other mesh's indices are shifted
    pub fn merged(&self, other: &Self) -> Self {
        let vertex_offset = self.points.len();
        let halfedge_offset = self.half_edges.len();
        let facet_offset = self.facets.len();

        let mut points = self.points.clone();
        points.extend_from_slice(&other.points);

        let mut half_edges = self.half_edges.clone();
        half_edges.extend(other.half_edges.iter().map(|he| HalfEdge {
            next: he.next + halfedge_offset,
            prev: he.prev + halfedge_offset,
            opposite: he.opposite.map(|opposite| opposite + halfedge_offset),
            vertex: he.vertex + vertex_offset,
            facet: he.facet + facet_offset,
        }));

        let mut facets = self.facets.clone();
        facets.extend(other.facets.iter().map(|facet| Facet {
            halfedge: facet.halfedge + halfedge_offset,
            degree: facet.degree,
        }));

        Self {
            points,
            half_edges,
            facets,
        }
    }
}

impl<P> Default for HalfEdgeMesh<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> HalfEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        HalfEdgeMesh::from_triangles(points, &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_tetrahedron_topology() {
        let mesh = tetrahedron();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.facet_count(), 4);
        assert_eq!(mesh.halfedge_count(), 12);
        assert_eq!(mesh.edge_count(), 6);
        assert!(mesh.is_closed());
        assert!(mesh.is_pure_triangle());
    }

    #[test]
    fn test_canonical_cycle_follows_input_order() {
        let mesh = tetrahedron();
        assert_eq!(mesh.facet_vertices(0), [0, 2, 1]);
        assert_eq!(mesh.facet_vertices(3), [1, 2, 3]);

        let [h0, h1, h2] = mesh.triangle_halfedges(1);
        assert_eq!(mesh.next(h2), h0);
        assert_eq!(mesh.halfedge(h1).prev, h0);
        assert_eq!(mesh.endpoints(h1), (0, 1));
    }

    #[test]
    fn test_opposites_are_symmetric() {
        let mesh = tetrahedron();
        for he in 0..mesh.halfedge_count() {
            let opposite = mesh.opposite(he).unwrap();
            assert_eq!(mesh.opposite(opposite), Some(he));
            assert_ne!(mesh.halfedge(he).facet, mesh.halfedge(opposite).facet);

            let (from, to) = mesh.endpoints(he);
            assert_eq!(mesh.endpoints(opposite), (to, from));
        }
    }

    #[test]
    fn test_open_mesh_has_border() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = HalfEdgeMesh::from_triangles(points, &[[0, 1, 2], [0, 2, 3]]).unwrap();

        assert!(!mesh.is_closed());
        assert_eq!(mesh.border_halfedge_count(), 4);
        assert_eq!(mesh.opposite_facet(mesh.triangle_halfedges(0)[0]), Some(1));
        assert_eq!(mesh.opposite_facet(mesh.triangle_halfedges(0)[2]), None);
    }

    #[test]
    fn test_polygon_degrees() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = HalfEdgeMesh::from_polygons(points, vec![vec![0, 1, 2, 3]]).unwrap();

        assert_eq!(mesh.degree(0), 4);
        assert_eq!(mesh.first_non_triangle(), Some((0, 4)));
        assert!(!mesh.is_pure_triangle());
        assert_eq!(mesh.polygons(), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_construction_errors() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];

        assert_eq!(
            HalfEdgeMesh::from_triangles(points.clone(), &[[0, 1, 5]]).unwrap_err(),
            MeshError::VertexIndexOutOfRange {
                facet: 0,
                vertex: 5,
                vertex_count: 3
            }
        );
        assert_eq!(
            HalfEdgeMesh::from_polygons(points.clone(), vec![vec![0, 1]]).unwrap_err(),
            MeshError::TooFewVertices { facet: 0, degree: 2 }
        );
        assert_eq!(
            HalfEdgeMesh::from_triangles(points.clone(), &[[0, 1, 1]]).unwrap_err(),
            MeshError::RepeatedVertex { facet: 0, vertex: 1 }
        );
        assert!(matches!(
            HalfEdgeMesh::from_triangles(points, &[[0, 1, 2], [0, 1, 2]]).unwrap_err(),
            MeshError::DuplicateEdge { .. }
        ));
    }

    #[test]
    fn test_merged_and_translated() {
        let mesh = tetrahedron();
        let shifted = mesh.translated(Vector3::new(5.0, 0.0, 0.0));
        let both = mesh.merged(&shifted);

        assert_eq!(both.facet_count(), 8);
        assert_eq!(both.vertex_count(), 8);
        assert!(both.is_closed());
        assert_eq!(both.facet_vertices(4), [4, 6, 5]);
        assert_eq!(both.opposite_facet(both.triangle_halfedges(4)[0]).map(|f| f >= 4), Some(true));
        assert_eq!(both.bounding_box().max.x, 6.0);
    }
}
