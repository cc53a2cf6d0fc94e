// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ reader (`v` and `f` records only)

use super::{parse_error, tokenize};
use crate::error::Result;
use crate::geometry::HalfEdgeMesh;
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const FORMAT: &str = "OBJ";

pub fn read_obj_file(path: impl AsRef<Path>) -> Result<HalfEdgeMesh> {
    let file = File::open(path.as_ref())?;
    read_obj(BufReader::new(file))
}

/// Read an OBJ mesh. Face corners may be written as `v`, `v/vt`, `v//vn` or
/// `v/vt/vn`; negative indices count back from the latest vertex.
pub fn read_obj<R: BufRead>(reader: R) -> Result<HalfEdgeMesh> {
    let mut points: Vec<Point3<f64>> = Vec::new();
    let mut polygons: Vec<Vec<usize>> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let tokens = tokenize(&line);

        match tokens.first().copied() {
            Some("v") => {
                if tokens.len() < 4 {
                    return Err(parse_error(FORMAT, line_no, "vertex needs three coordinates"));
                }
                let mut coords = [0.0; 3];
                for (coord, token) in coords.iter_mut().zip(&tokens[1..4]) {
                    *coord = token
                        .parse()
                        .map_err(|_| parse_error(FORMAT, line_no, format!("invalid coordinate '{token}'")))?;
                }
                points.push(Point3::from(coords));
            }
            Some("f") => {
                let polygon = tokens[1..]
                    .iter()
                    .map(|corner| resolve_index(corner, points.len(), line_no))
                    .collect::<Result<Vec<usize>>>()?;
                polygons.push(polygon);
            }
            _ => {}
        }
    }

    Ok(HalfEdgeMesh::from_polygons(points, polygons)?)
}

fn resolve_index(corner: &str, vertex_count: usize, line: usize) -> Result<usize> {
    let position = corner.split('/').next().unwrap_or_default();
    let index: i64 = position
        .parse()
        .map_err(|_| parse_error(FORMAT, line, format!("invalid face corner '{corner}'")))?;

    let resolved = match index {
        0 => None,
        i if i > 0 => usize::try_from(i - 1).ok(),
        i => vertex_count.checked_sub(usize::try_from(-i).unwrap_or(usize::MAX)),
    };
    resolved.ok_or_else(|| parse_error(FORMAT, line, format!("face corner '{corner}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_read_tetrahedron_with_attributes() {
        let text = "# tetrahedron
o tet
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
vn 0 0 1
f 1//1 3//1 2//1
f 1/1/1 2/1/1 4/1/1
f 1 4 3
f -3 -2 -1
";
        let mesh = read_obj(text.as_bytes()).unwrap();
        assert_eq!(mesh.facet_count(), 4);
        assert!(mesh.is_closed());
        assert_eq!(mesh.facet_vertices(0), [0, 2, 1]);
        assert_eq!(mesh.facet_vertices(3), [1, 2, 3]);
    }

    #[test]
    fn test_bad_corners() {
        let err = read_obj("v 0 0 0\nf 1 2 x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = read_obj("v 0 0 0\nf 0 1 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = read_obj("v 0 0 0\nf -4 1 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }
}
