// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Runs detection jobs for the command line with the configured kernel and
//! thread pool

use crate::config::{DetectionConfig, KernelKind};
use crate::geometry::{BoundingBox, ExactKernel, FloatKernel, GeometryKernel, HalfEdgeMesh, Triangle3};
use crate::intersect::{facet_triangle, SelfIntersectionDetector, SelfIntersectionReport, SweepAndPrune};
use crate::io;
use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

/// Existence check of one file
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub path: PathBuf,
    pub facets: usize,
    pub self_intersecting: bool,
    pub duration: Duration,
}

/// Structural summary of a mesh
#[derive(Debug, Clone, Serialize)]
pub struct MeshInfo {
    pub vertices: usize,
    pub facets: usize,
    pub edges: usize,
    pub border_halfedges: usize,
    pub closed: bool,
    pub triangulated: bool,
    pub bounds: BoundingBox,
}

impl MeshInfo {
    pub fn of(mesh: &HalfEdgeMesh) -> Self {
        Self {
            vertices: mesh.vertex_count(),
            facets: mesh.facet_count(),
            edges: mesh.edge_count(),
            border_halfedges: mesh.border_halfedge_count(),
            closed: mesh.is_closed(),
            triangulated: mesh.is_pure_triangle(),
            bounds: mesh.bounding_box(),
        }
    }
}

/// Runner for detection jobs
pub struct Runner {
    config: DetectionConfig,
    pool: Option<ThreadPool>,
}

impl Runner {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        let pool = match config.threads {
            Some(threads) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .context("Failed to build thread pool")?,
            ),
            None => None,
        };

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Existence query with the configured kernel
    pub fn has_self_intersections(&self, mesh: &HalfEdgeMesh) -> crate::Result<bool> {
        self.install(|| match self.config.kernel {
            KernelKind::Exact => self.detector(ExactKernel::new()).has_self_intersections(mesh),
            KernelKind::Float => self.detector(FloatKernel::new()).has_self_intersections(mesh),
        })
    }

    /// Enumeration with statistics using the configured kernel
    pub fn report(&self, mesh: &HalfEdgeMesh) -> crate::Result<SelfIntersectionReport> {
        self.install(|| match self.config.kernel {
            KernelKind::Exact => self.detector(ExactKernel::new()).report(mesh),
            KernelKind::Float => self.detector(FloatKernel::new()).report(mesh),
        })
    }

    /// Load a mesh file and run the existence query on it
    pub fn check_file(&self, path: &Path) -> Result<CheckOutcome> {
        let start = Instant::now();
        let mesh = io::load_mesh(path).with_context(|| format!("Failed to load mesh: {}", path.display()))?;
        let self_intersecting = self
            .has_self_intersections(&mesh)
            .with_context(|| format!("Self-intersection check failed: {}", path.display()))?;

        debug!(path = %path.display(), self_intersecting, "Checked file");
        Ok(CheckOutcome {
            path: path.to_path_buf(),
            facets: mesh.facet_count(),
            self_intersecting,
            duration: start.elapsed(),
        })
    }

    /// Load a mesh file and enumerate its intersecting facet pairs
    pub fn list_file(&self, path: &Path) -> Result<(HalfEdgeMesh, SelfIntersectionReport)> {
        let mesh = io::load_mesh(path).with_context(|| format!("Failed to load mesh: {}", path.display()))?;
        let report = self
            .report(&mesh)
            .with_context(|| format!("Self-intersection scan failed: {}", path.display()))?;
        Ok((mesh, report))
    }

    pub fn info_file(&self, path: &Path) -> Result<MeshInfo> {
        let mesh = io::load_mesh(path).with_context(|| format!("Failed to load mesh: {}", path.display()))?;
        Ok(MeshInfo::of(&mesh))
    }

    fn detector<K: GeometryKernel>(&self, kernel: K) -> SelfIntersectionDetector<K, SweepAndPrune> {
        SelfIntersectionDetector::new(kernel, SweepAndPrune).with_cutoff(self.config.cutoff)
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Triangles of every facet involved in an intersection, each once
pub fn intersecting_triangles(mesh: &HalfEdgeMesh, report: &SelfIntersectionReport) -> Vec<Triangle3> {
    let kernel = ExactKernel::new();
    report
        .intersecting_facets()
        .into_iter()
        .map(|facet| facet_triangle(&kernel, mesh, facet))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    fn overlapping_cubes() -> HalfEdgeMesh {
        let cube = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh().unwrap();
        cube.merged(&cube.translated(Vector3::new(1.0, 0.5, 0.25)))
    }

    #[test]
    fn test_kernels_agree_on_overlapping_cubes() {
        let mesh = overlapping_cubes();
        for kernel in [KernelKind::Exact, KernelKind::Float] {
            let runner = Runner::new(DetectionConfig {
                kernel,
                threads: Some(2),
                ..DetectionConfig::default()
            })
            .unwrap();
            assert!(runner.has_self_intersections(&mesh).unwrap());
            assert!(runner.report(&mesh).unwrap().is_self_intersecting());
        }
    }

    #[test]
    fn test_check_and_list_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cubes.stl");
        let mesh = overlapping_cubes();
        let all: Vec<Triangle3> = mesh
            .facets()
            .map(|facet| facet_triangle(&ExactKernel::new(), &mesh, facet))
            .collect();
        io::export_triangles_stl(&path, &all).unwrap();

        let runner = Runner::new(DetectionConfig::default()).unwrap();
        let outcome = runner.check_file(&path).unwrap();
        assert!(outcome.self_intersecting);
        assert_eq!(outcome.facets, 24);

        let (loaded, report) = runner.list_file(&path).unwrap();
        let triangles = intersecting_triangles(&loaded, &report);
        assert_eq!(triangles.len(), report.intersecting_facets().len());
        assert!(!triangles.is_empty());
    }

    #[test]
    fn test_info_of_sphere() {
        let sphere = Primitive::sphere(1.0, 12, 6).to_mesh().unwrap();
        let info = MeshInfo::of(&sphere);
        assert!(info.closed);
        assert!(info.triangulated);
        assert_eq!(info.border_halfedges, 0);
        assert_eq!(info.vertices + info.facets, info.edges + 2);
    }

    #[test]
    fn test_missing_file_has_context() {
        let runner = Runner::new(DetectionConfig::default()).unwrap();
        let err = runner.check_file(Path::new("/nonexistent/model.off")).unwrap_err();
        assert!(err.to_string().contains("Failed to load mesh"));
    }
}
