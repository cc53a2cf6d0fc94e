// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh construction, geometric predicates and detection

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for detection and I/O operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by the public entry points
#[derive(Debug, Error)]
pub enum Error {
    /// The mesh is not a pure triangulation. Raised before any pairwise work starts.
    #[error("invalid mesh kind: facet {facet} is bounded by {degree} half-edges, expected 3")]
    InvalidMeshKind { facet: usize, degree: usize },

    /// The geometry kernel could not classify a candidate pair
    #[error("geometric predicate failed on facets {first} and {second}: {source}")]
    GeometricPredicate {
        first: usize,
        second: usize,
        #[source]
        source: KernelError,
    },

    /// The mesh could not be assembled from its polygons
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {format} file at line {line}: {message}")]
    Parse {
        format: &'static str,
        line: usize,
        message: String,
    },

    #[error("unsupported mesh format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Failure raised by a geometry kernel predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("input contains a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("triangle is degenerate (its vertices are collinear)")]
    DegenerateTriangle,
}

/// Failure while building the half-edge arenas
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("facet {facet} references vertex {vertex}, but the mesh has only {vertex_count} vertices")]
    VertexIndexOutOfRange {
        facet: usize,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("facet {facet} has {degree} vertices, at least 3 are required")]
    TooFewVertices { facet: usize, degree: usize },

    #[error("facet {facet} uses vertex {vertex} more than once")]
    RepeatedVertex { facet: usize, vertex: usize },

    #[error("directed edge {from} -> {to} is used by more than one facet (non-manifold or inconsistent orientation)")]
    DuplicateEdge { from: usize, to: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_error_keeps_source() {
        let err = Error::GeometricPredicate {
            first: 3,
            second: 7,
            source: KernelError::DegenerateTriangle,
        };

        let message = err.to_string();
        assert!(message.contains("facets 3 and 7"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_mesh_error_is_transparent() {
        let err: Error = MeshError::DuplicateEdge { from: 1, to: 2 }.into();
        assert!(err.to_string().starts_with("directed edge 1 -> 2"));
    }
}
