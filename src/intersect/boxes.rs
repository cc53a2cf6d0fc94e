// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-facet bounding boxes fed to the broad phase

use crate::geometry::{BoundingBox, GeometryKernel, HalfEdgeMesh};
use serde::{Deserialize, Serialize};

/// Bounding box of one facet, tagged with the facet index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacetBox {
    pub bbox: BoundingBox,
    pub facet: usize,
}

impl FacetBox {
    pub fn new(bbox: BoundingBox, facet: usize) -> Self {
        Self { bbox, facet }
    }

    pub fn overlaps(&self, other: &FacetBox) -> bool {
        self.bbox.overlaps(&other.bbox)
    }
}

/// One box per facet, covering the facet's three vertices
pub fn build_boxes<K: GeometryKernel>(kernel: &K, mesh: &HalfEdgeMesh<K::Point>) -> Vec<FacetBox> {
    mesh.facets()
        .map(|facet| {
            let bbox = mesh
                .facet_vertices(facet)
                .iter()
                .map(|&vertex| kernel.bounding_box(mesh.point(vertex)))
                .fold(BoundingBox::empty(), |acc, bbox| acc.union(&bbox));
            FacetBox::new(bbox, facet)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ExactKernel, Primitive};
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_one_box_per_facet() {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh().unwrap();
        let boxes = build_boxes(&ExactKernel::new(), &mesh);

        assert_eq!(boxes.len(), mesh.facet_count());
        for (idx, facet_box) in boxes.iter().enumerate() {
            assert_eq!(facet_box.facet, idx);
            for vertex in mesh.facet_vertices(idx) {
                assert!(facet_box.bbox.contains_point(mesh.point(vertex)));
            }
        }

        // Front face lies in z = 1
        assert_eq!(boxes[0].bbox.min.z, 1.0);
        assert_eq!(boxes[0].bbox.max.z, 1.0);
    }

    #[test]
    fn test_non_finite_vertex_widens_box() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, f64::NAN, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = HalfEdgeMesh::from_triangles(points, &[[0, 1, 2]]).unwrap();
        let boxes = build_boxes(&ExactKernel::new(), &mesh);

        assert_eq!(boxes[0].bbox.min.y, f64::NEG_INFINITY);
        assert_eq!(boxes[0].bbox.max.y, f64::INFINITY);
        assert_eq!(boxes[0].bbox.max.x, 1.0);
    }
}
