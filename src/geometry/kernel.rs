// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry kernels
//!
//! A kernel bundles the point type, the derived triangle and segment values
//! and the two intersection predicates the detector needs.

use super::robust_predicates::{FilteredExact, Floating, Orientation};
use super::triangle_intersection::{triangle_segment_intersect, triangles_intersect};
use super::BoundingBox;
use crate::error::KernelError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;

/// Geometric operations used by self-intersection detection
pub trait GeometryKernel: Sync {
    type Point: Sync;
    type Triangle: Debug + Clone + Send;
    type Segment;

    /// Box enclosing a point
    fn bounding_box(&self, point: &Self::Point) -> BoundingBox;

    fn triangle(&self, a: &Self::Point, b: &Self::Point, c: &Self::Point) -> Self::Triangle;

    fn segment(&self, source: &Self::Point, target: &Self::Point) -> Self::Segment;

    /// Closed triangle-triangle overlap
    fn triangles_intersect(&self, first: &Self::Triangle, second: &Self::Triangle) -> Result<bool, KernelError>;

    /// Closed triangle-segment overlap
    fn triangle_segment_intersect(&self, triangle: &Self::Triangle, segment: &Self::Segment) -> Result<bool, KernelError>;
}

/// Triangle in 3-D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle3 {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub c: Point3<f64>,
}

impl Triangle3 {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    pub fn vertices(&self) -> [Point3<f64>; 3] {
        [self.a, self.b, self.c]
    }

    /// Unit normal following the right-hand rule, zero for degenerate triangles
    pub fn normal(&self) -> Vector3<f64> {
        (self.b - self.a)
            .cross(&(self.c - self.a))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn area(&self) -> f64 {
        (self.b - self.a).cross(&(self.c - self.a)).norm() * 0.5
    }
}

/// Segment in 3-D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment3 {
    pub source: Point3<f64>,
    pub target: Point3<f64>,
}

impl Segment3 {
    pub fn new(source: Point3<f64>, target: Point3<f64>) -> Self {
        Self { source, target }
    }
}

/// Kernel over `Point3<f64>` parameterised by its orientation predicates
#[derive(Debug, Clone, Copy, Default)]
pub struct CartesianKernel<O> {
    predicates: PhantomData<O>,
}

impl<O: Orientation> CartesianKernel<O> {
    pub fn new() -> Self {
        Self {
            predicates: PhantomData,
        }
    }
}

/// Exact predicates on double-precision input
pub type ExactKernel = CartesianKernel<FilteredExact>;

/// Inexact predicates evaluated in plain double precision
pub type FloatKernel = CartesianKernel<Floating>;

impl<O: Orientation> GeometryKernel for CartesianKernel<O> {
    type Point = Point3<f64>;
    type Triangle = Triangle3;
    type Segment = Segment3;

    fn bounding_box(&self, point: &Point3<f64>) -> BoundingBox {
        BoundingBox::from_point(point)
    }

    fn triangle(&self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Triangle3 {
        Triangle3::new(*a, *b, *c)
    }

    fn segment(&self, source: &Point3<f64>, target: &Point3<f64>) -> Segment3 {
        Segment3::new(*source, *target)
    }

    fn triangles_intersect(&self, first: &Triangle3, second: &Triangle3) -> Result<bool, KernelError> {
        triangles_intersect::<O>(&first.vertices(), &second.vertices())
    }

    fn triangle_segment_intersect(&self, triangle: &Triangle3, segment: &Segment3) -> Result<bool, KernelError> {
        triangle_segment_intersect::<O>(&triangle.vertices(), &[segment.source, segment.target])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernels_agree_on_generic_input() {
        let exact = ExactKernel::new();
        let float = FloatKernel::new();

        let t1 = Triangle3::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        let t2 = Triangle3::new(
            Point3::new(0.5, 0.5, -1.0),
            Point3::new(0.5, 0.5, 1.0),
            Point3::new(3.0, 3.0, 0.0),
        );
        assert!(exact.triangles_intersect(&t1, &t2).unwrap());
        assert!(float.triangles_intersect(&t1, &t2).unwrap());

        let segment = float.segment(&Point3::new(0.3, 0.3, 1.0), &Point3::new(0.3, 0.3, -1.0));
        assert!(exact.triangle_segment_intersect(&t1, &segment).unwrap());
        assert!(float.triangle_segment_intersect(&t1, &segment).unwrap());
    }

    #[test]
    fn test_triangle_values() {
        let kernel = ExactKernel::default();
        let tri = kernel.triangle(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(tri.normal(), Vector3::new(0.0, 0.0, 1.0));
        approx::assert_relative_eq!(tri.area(), 0.5);

        let json = serde_json::to_string(&tri).unwrap();
        let back: Triangle3 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tri);
    }

    #[test]
    fn test_point_box_is_degenerate() {
        let kernel = ExactKernel::new();
        let bbox = kernel.bounding_box(&Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.min, bbox.max);
    }
}
