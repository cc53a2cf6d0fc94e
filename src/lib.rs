// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshcheck
//!
//! Self-intersection detection for triangle meshes stored as half-edge
//! structures. Facet bounding boxes are paired by a sweep-and-prune broad
//! phase (parallel above a configurable cutoff), adjacent facets are
//! filtered by their shared edge or vertex, and the remaining pairs are
//! decided with exact orientation predicates.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod intersect;
pub mod io;

pub use config::{DetectionConfig, KernelKind};
pub use error::{Error, KernelError, MeshError, Result};
pub use geometry::{ExactKernel, FloatKernel, GeometryKernel, HalfEdgeMesh, Primitive, Triangle3};
pub use intersect::{AllPairs, BroadPhase, SelfIntersectionDetector, SelfIntersectionReport, SweepAndPrune};
pub use io::load_mesh;

/// Every pair of intersecting non-adjacent triangles, using exact predicates
pub fn find_self_intersections(mesh: &HalfEdgeMesh) -> Result<Vec<(Triangle3, Triangle3)>> {
    SelfIntersectionDetector::exact().find_self_intersections(mesh)
}

/// Whether any two non-adjacent triangles intersect, using exact predicates
pub fn has_self_intersections(mesh: &HalfEdgeMesh) -> Result<bool> {
    SelfIntersectionDetector::exact().has_self_intersections(mesh)
}
