// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL reading and the intersecting-triangle exporter

use crate::error::Result;
use crate::geometry::{HalfEdgeMesh, Triangle3};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

pub fn read_stl_file(path: impl AsRef<Path>) -> Result<HalfEdgeMesh> {
    let file = File::open(path.as_ref())?;
    read_stl(&mut BufReader::new(file))
}

/// Read binary or ASCII STL. Coincident vertices are merged by `stl_io`, so
/// the facets come back connected.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<HalfEdgeMesh> {
    let indexed = stl_io::read_stl(reader)?;

    let points = indexed
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let triangles: Vec<[usize; 3]> = indexed.faces.iter().map(|face| face.vertices).collect();

    Ok(HalfEdgeMesh::from_triangles(points, &triangles)?)
}

/// Write triangles as binary STL
pub fn write_triangles_stl<W: Write>(writer: &mut W, triangles: &[Triangle3]) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let to_vertex = |p: &Point3<f64>| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);
    let stl_triangles: Vec<StlTriangle> = triangles
        .iter()
        .map(|tri| {
            let normal = tri.normal();
            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [to_vertex(&tri.a), to_vertex(&tri.b), to_vertex(&tri.c)],
            }
        })
        .collect();

    stl_io::write_stl(writer, stl_triangles.iter())?;
    Ok(())
}

/// Export triangles (typically the intersecting ones) to a binary STL file
pub fn export_triangles_stl(path: impl AsRef<Path>, triangles: &[Triangle3]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_triangles_stl(&mut writer, triangles)?;
    writer.flush()?;
    Ok(())
}
