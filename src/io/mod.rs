// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh readers and the STL exporter

mod obj;
mod off;
mod stl;

pub use obj::{read_obj, read_obj_file};
pub use off::{read_off, read_off_file};
pub use stl::{export_triangles_stl, read_stl, read_stl_file, write_triangles_stl};

use crate::error::{Error, Result};
use crate::geometry::HalfEdgeMesh;
use std::path::Path;
use tracing::debug;

/// Mesh file formats understood by [`load_mesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Off,
    Obj,
}

impl MeshFormat {
    /// Format implied by the file extension, case-insensitive
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "stl" => Some(MeshFormat::Stl),
            "off" => Some(MeshFormat::Off),
            "obj" => Some(MeshFormat::Obj),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "STL",
            MeshFormat::Off => "OFF",
            MeshFormat::Obj => "OBJ",
        }
    }
}

/// Read a mesh, choosing the reader from the file extension
pub fn load_mesh(path: impl AsRef<Path>) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;

    let mesh = match format {
        MeshFormat::Stl => read_stl_file(path)?,
        MeshFormat::Off => read_off_file(path)?,
        MeshFormat::Obj => read_obj_file(path)?,
    };

    debug!(
        path = %path.display(),
        format = format.name(),
        vertices = mesh.vertex_count(),
        facets = mesh.facet_count(),
        "Loaded mesh"
    );
    Ok(mesh)
}

/// Split a text line into whitespace-separated tokens, dropping `#` comments
fn tokenize(line: &str) -> Vec<&str> {
    line.split('#').next().unwrap_or_default().split_whitespace().collect()
}

fn parse_error(format: &'static str, line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        format,
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path(Path::new("part.STL")), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path(Path::new("a/b/model.off")), Some(MeshFormat::Off));
        assert_eq!(MeshFormat::from_path(Path::new("model.obj")), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path(Path::new("model.ply")), None);
        assert_eq!(MeshFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_unsupported_format() {
        let err = load_mesh("model.3mf").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_tokenize_strips_comments() {
        assert_eq!(tokenize("v 1 2 3 # corner"), vec!["v", "1", "2", "3"]);
        assert!(tokenize("# only a comment").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
