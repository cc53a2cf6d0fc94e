// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Self-intersection detection
//!
//! Facets are boxed, overlapping boxes are paired by a [`BroadPhase`], and
//! every candidate pair goes through the adjacency filter and an exact
//! narrow-phase test. Enumeration collects every positive verdict; the
//! existence query cancels the scan at the first one.

mod boxes;
mod broad_phase;
mod narrow_phase;
mod sink;

pub use boxes::{build_boxes, FacetBox};
pub use broad_phase::{AllPairs, BroadPhase, SweepAndPrune, DEFAULT_CUTOFF};
pub use narrow_phase::{classify, facet_triangle, test_pair, Adjacency, Verdict};

use crate::error::{Error, Result};
use crate::geometry::{ExactKernel, GeometryKernel, HalfEdgeMesh};
use serde::{Deserialize, Serialize};
use sink::{Existence, FacetPairs, ResultSink, TrianglePairs};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Why a scan stopped before the broad phase was exhausted
enum Halt {
    Cancelled,
    Failed(Error),
}

/// Counters gathered during one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub facets: usize,
    pub candidate_pairs: usize,
    pub elapsed: Duration,
}

/// Enumeration result with statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfIntersectionReport {
    pub facet_count: usize,
    pub candidate_pairs: usize,
    /// Intersecting facet pairs, each as `(lower, higher)` index, sorted
    pub intersecting_pairs: Vec<(usize, usize)>,
    pub elapsed_ms: f64,
}

impl SelfIntersectionReport {
    pub fn is_self_intersecting(&self) -> bool {
        !self.intersecting_pairs.is_empty()
    }

    /// Facets taking part in at least one intersection, sorted
    pub fn intersecting_facets(&self) -> Vec<usize> {
        let mut facets: Vec<usize> = self
            .intersecting_pairs
            .iter()
            .flat_map(|&(first, second)| [first, second])
            .collect();
        facets.sort_unstable();
        facets.dedup();
        facets
    }
}

/// Self-intersection detector over a geometry kernel and a broad phase
#[derive(Debug, Clone)]
pub struct SelfIntersectionDetector<K = ExactKernel, B = SweepAndPrune> {
    kernel: K,
    broad_phase: B,
    cutoff: usize,
}

impl SelfIntersectionDetector {
    /// Exact predicates with the sweep-and-prune broad phase
    pub fn exact() -> Self {
        Self::new(ExactKernel::new(), SweepAndPrune)
    }
}

impl Default for SelfIntersectionDetector {
    fn default() -> Self {
        Self::exact()
    }
}

impl<K: GeometryKernel, B: BroadPhase> SelfIntersectionDetector<K, B> {
    pub fn new(kernel: K, broad_phase: B) -> Self {
        Self {
            kernel,
            broad_phase,
            cutoff: DEFAULT_CUTOFF,
        }
    }

    /// Box count from which the broad phase may run in parallel
    pub fn with_cutoff(mut self, cutoff: usize) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn broad_phase(&self) -> &B {
        &self.broad_phase
    }

    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    /// Every pair of non-adjacent facets whose triangles intersect
    pub fn find_self_intersections(&self, mesh: &HalfEdgeMesh<K::Point>) -> Result<Vec<(K::Triangle, K::Triangle)>> {
        let sink = TrianglePairs::new();
        let stats = self.scan(mesh, &sink)?;
        let pairs = sink.into_pairs();
        info!(
            facets = stats.facets,
            candidates = stats.candidate_pairs,
            intersections = pairs.len(),
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "Self-intersection enumeration complete"
        );
        Ok(pairs)
    }

    /// Whether any two non-adjacent facets intersect. Stops at the first hit.
    pub fn has_self_intersections(&self, mesh: &HalfEdgeMesh<K::Point>) -> Result<bool> {
        let sink = Existence::new();
        let stats = self.scan(mesh, &sink)?;
        let found = sink.found();
        info!(
            facets = stats.facets,
            candidates = stats.candidate_pairs,
            found,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "Self-intersection query complete"
        );
        Ok(found)
    }

    /// Facet index pairs of every intersection, in the order they were found
    pub fn find_intersecting_facets(&self, mesh: &HalfEdgeMesh<K::Point>) -> Result<Vec<(usize, usize)>> {
        let sink = FacetPairs::new();
        self.scan(mesh, &sink)?;
        Ok(sink.into_pairs())
    }

    /// Enumerate intersections and collect scan statistics
    pub fn report(&self, mesh: &HalfEdgeMesh<K::Point>) -> Result<SelfIntersectionReport> {
        let sink = FacetPairs::new();
        let stats = self.scan(mesh, &sink)?;

        let mut intersecting_pairs: Vec<(usize, usize)> = sink
            .into_pairs()
            .into_iter()
            .map(|(first, second)| (first.min(second), first.max(second)))
            .collect();
        intersecting_pairs.sort_unstable();

        Ok(SelfIntersectionReport {
            facet_count: stats.facets,
            candidate_pairs: stats.candidate_pairs,
            intersecting_pairs,
            elapsed_ms: stats.elapsed.as_secs_f64() * 1000.0,
        })
    }

    fn scan<S: ResultSink<K::Triangle>>(&self, mesh: &HalfEdgeMesh<K::Point>, sink: &S) -> Result<ScanStats> {
        let start = Instant::now();

        if let Some((facet, degree)) = mesh.first_non_triangle() {
            return Err(Error::InvalidMeshKind { facet, degree });
        }

        let boxes = build_boxes(&self.kernel, mesh);
        let handles: Vec<&FacetBox> = boxes.iter().collect();
        debug!(boxes = handles.len(), cutoff = self.cutoff, "Built facet boxes");

        let candidates = AtomicUsize::new(0);
        let flow = self.broad_phase.self_intersect(&handles, self.cutoff, |a, b| {
            candidates.fetch_add(1, Ordering::Relaxed);
            match test_pair(&self.kernel, mesh, a.facet, b.facet) {
                Ok(Verdict::NoIntersection) => ControlFlow::Continue(()),
                Ok(Verdict::Intersection(first, second)) => {
                    trace!(first = a.facet, second = b.facet, "Facets intersect");
                    match sink.record(a.facet, b.facet, (first, second)) {
                        ControlFlow::Continue(()) => ControlFlow::Continue(()),
                        ControlFlow::Break(()) => ControlFlow::Break(Halt::Cancelled),
                    }
                }
                Err(source) => ControlFlow::Break(Halt::Failed(Error::GeometricPredicate {
                    first: a.facet,
                    second: b.facet,
                    source,
                })),
            }
        });

        let stats = ScanStats {
            facets: mesh.facet_count(),
            candidate_pairs: candidates.into_inner(),
            elapsed: start.elapsed(),
        };
        debug!(
            candidates = stats.candidate_pairs,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "Broad phase finished"
        );

        // A parallel sweep hands back whichever break it saw first. Once the
        // sink holds its answer, a kernel failure from another worker is moot.
        match flow {
            ControlFlow::Continue(()) | ControlFlow::Break(Halt::Cancelled) => Ok(stats),
            ControlFlow::Break(Halt::Failed(err)) if sink.settled() => {
                debug!(error = %err, "Dropping failure after the answer was found");
                Ok(stats)
            }
            ControlFlow::Break(Halt::Failed(err)) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::geometry::{FloatKernel, Primitive};
    use nalgebra::{Point3, Vector3};

    fn crossing_pair() -> HalfEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.5, 0.5, -1.0),
            Point3::new(0.5, 0.5, 1.0),
            Point3::new(3.0, 3.0, 0.0),
        ];
        HalfEdgeMesh::from_triangles(points, &[[0, 1, 2], [3, 4, 5]]).unwrap()
    }

    #[test]
    fn test_empty_and_single_facet() {
        let detector = SelfIntersectionDetector::exact();

        let empty = HalfEdgeMesh::new();
        assert!(detector.find_self_intersections(&empty).unwrap().is_empty());
        assert!(!detector.has_self_intersections(&empty).unwrap());

        let single = HalfEdgeMesh::from_triangles(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            &[[0, 1, 2]],
        )
        .unwrap();
        assert!(detector.find_self_intersections(&single).unwrap().is_empty());
        assert!(!detector.has_self_intersections(&single).unwrap());
    }

    #[test]
    fn test_crossing_pair_reported_once() {
        let mesh = crossing_pair();
        let detector = SelfIntersectionDetector::exact();

        let pairs = detector.find_self_intersections(&mesh).unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(detector.has_self_intersections(&mesh).unwrap());
        assert_eq!(detector.find_intersecting_facets(&mesh).unwrap().len(), 1);

        let report = detector.report(&mesh).unwrap();
        assert_eq!(report.intersecting_pairs, vec![(0, 1)]);
        assert_eq!(report.candidate_pairs, 1);
        assert_eq!(report.intersecting_facets(), vec![0, 1]);
        assert!(report.is_self_intersecting());
    }

    #[test]
    fn test_quad_mesh_rejected() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let mesh = HalfEdgeMesh::from_polygons(points, vec![vec![0, 1, 2], vec![0, 2, 3, 4]]).unwrap();

        let err = SelfIntersectionDetector::exact().has_self_intersections(&mesh).unwrap_err();
        assert!(matches!(err, Error::InvalidMeshKind { facet: 1, degree: 4 }));
    }

    #[test]
    fn test_closed_primitives_are_clean() {
        let detector = SelfIntersectionDetector::exact();
        for primitive in [
            Primitive::tetrahedron(1.0),
            Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false),
            Primitive::sphere(1.0, 16, 8),
        ] {
            let mesh = primitive.to_mesh().unwrap();
            assert!(!detector.has_self_intersections(&mesh).unwrap(), "{primitive:?}");
        }
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let sphere = Primitive::sphere(1.0, 24, 12).to_mesh().unwrap();
        let mesh = sphere.merged(&sphere.translated(Vector3::new(0.7, 0.1, 0.05)));

        let sequential = SelfIntersectionDetector::exact().with_cutoff(usize::MAX).report(&mesh).unwrap();
        let parallel = SelfIntersectionDetector::exact().with_cutoff(0).report(&mesh).unwrap();
        let reference = SelfIntersectionDetector::new(ExactKernel::new(), AllPairs).report(&mesh).unwrap();

        assert!(sequential.is_self_intersecting());
        assert_eq!(sequential.intersecting_pairs, parallel.intersecting_pairs);
        assert_eq!(sequential.intersecting_pairs, reference.intersecting_pairs);
        assert_eq!(sequential.candidate_pairs, reference.candidate_pairs);
    }

    /// Visits every overlapping pair without stopping and hands back the
    /// last break, as a parallel sweep may
    struct LastBreak;

    impl BroadPhase for LastBreak {
        fn self_intersect<B, F>(&self, boxes: &[&FacetBox], _cutoff: usize, visit: F) -> ControlFlow<B>
        where
            B: Send,
            F: Fn(&FacetBox, &FacetBox) -> ControlFlow<B> + Sync,
        {
            let mut last = ControlFlow::Continue(());
            for (i, first) in boxes.iter().enumerate() {
                for second in &boxes[i + 1..] {
                    if first.overlaps(second) {
                        if let ControlFlow::Break(halt) = visit(*first, *second) {
                            last = ControlFlow::Break(halt);
                        }
                    }
                }
            }
            last
        }
    }

    /// The crossing pair plus a collinear sliver overlapping the first facet
    fn crossing_pair_with_sliver() -> HalfEdgeMesh {
        let mut points: Vec<Point3<f64>> = crossing_pair().points().to_vec();
        points.extend([
            Point3::new(0.25, 0.25, -1.0),
            Point3::new(0.5, 0.5, 0.0),
            Point3::new(0.75, 0.75, 1.0),
        ]);
        HalfEdgeMesh::from_triangles(points, &[[0, 1, 2], [3, 4, 5], [6, 7, 8]]).unwrap()
    }

    #[test]
    fn test_found_intersection_outranks_later_failure() {
        let mesh = crossing_pair_with_sliver();
        let detector = SelfIntersectionDetector::new(ExactKernel::new(), LastBreak);

        assert!(detector.has_self_intersections(&mesh).unwrap());
        assert!(matches!(
            detector.find_intersecting_facets(&mesh),
            Err(Error::GeometricPredicate {
                source: KernelError::DegenerateTriangle,
                ..
            })
        ));
    }

    #[test]
    fn test_float_kernel_detector() {
        let detector = SelfIntersectionDetector::new(FloatKernel::new(), SweepAndPrune);
        assert!(detector.has_self_intersections(&crossing_pair()).unwrap());
    }
}
