// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, kernels and predicates

mod bbox;
mod halfedge;
mod kernel;
mod primitives;
pub mod robust_predicates;
pub mod triangle_intersection;

pub use bbox::BoundingBox;
pub use halfedge::{Facet, HalfEdge, HalfEdgeMesh};
pub use kernel::{CartesianKernel, ExactKernel, FloatKernel, GeometryKernel, Segment3, Triangle3};
pub use primitives::Primitive;
pub use robust_predicates::{FilteredExact, Floating, Orientation, Sign};
