// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object File Format (OFF) reader

use super::{parse_error, tokenize};
use crate::error::Result;
use crate::geometry::HalfEdgeMesh;
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

const FORMAT: &str = "OFF";

pub fn read_off_file(path: impl AsRef<Path>) -> Result<HalfEdgeMesh> {
    let file = File::open(path.as_ref())?;
    read_off(BufReader::new(file))
}

/// Read an OFF mesh. Facets may have any degree; trailing colour values on
/// vertex and facet records are ignored.
pub fn read_off<R: BufRead>(reader: R) -> Result<HalfEdgeMesh> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<String> = tokenize(&line).into_iter().map(str::to_owned).collect();
        if !tokens.is_empty() {
            records.push((idx + 1, tokens));
        }
    }
    let mut records = records.into_iter();

    let (header_line, mut header) = records
        .next()
        .ok_or_else(|| parse_error(FORMAT, 1, "missing OFF header"))?;
    if !header[0].ends_with("OFF") {
        return Err(parse_error(FORMAT, header_line, format!("expected OFF header, found '{}'", header[0])));
    }
    header.remove(0);

    // Counts may share the header line
    let (counts_line, counts) = if header.is_empty() {
        records
            .next()
            .ok_or_else(|| parse_error(FORMAT, header_line, "missing element counts"))?
    } else {
        (header_line, header)
    };
    if counts.len() < 2 {
        return Err(parse_error(FORMAT, counts_line, "expected vertex and facet counts"));
    }
    let vertex_count: usize = parse(&counts[0], counts_line, "vertex count")?;
    let facet_count: usize = parse(&counts[1], counts_line, "facet count")?;

    // Every element needs a record of its own, which bounds both counts
    let remaining = records.len();
    if vertex_count.checked_add(facet_count).map_or(true, |total| total > remaining) {
        return Err(parse_error(
            FORMAT,
            counts_line,
            format!("declares {vertex_count} vertices and {facet_count} facets but only {remaining} records follow"),
        ));
    }

    let mut points = Vec::with_capacity(vertex_count);
    for vertex in 0..vertex_count {
        let (line, tokens) = records
            .next()
            .ok_or_else(|| parse_error(FORMAT, counts_line, format!("missing vertex {vertex}")))?;
        if tokens.len() < 3 {
            return Err(parse_error(FORMAT, line, "vertex needs three coordinates"));
        }
        points.push(Point3::new(
            parse(&tokens[0], line, "coordinate")?,
            parse(&tokens[1], line, "coordinate")?,
            parse(&tokens[2], line, "coordinate")?,
        ));
    }

    let mut polygons = Vec::with_capacity(facet_count);
    for facet in 0..facet_count {
        let (line, tokens) = records
            .next()
            .ok_or_else(|| parse_error(FORMAT, counts_line, format!("missing facet {facet}")))?;
        let degree: usize = parse(&tokens[0], line, "facet degree")?;
        if tokens.len() - 1 < degree {
            return Err(parse_error(FORMAT, line, format!("facet lists fewer than {degree} vertices")));
        }
        let polygon = tokens[1..=degree]
            .iter()
            .map(|token| parse(token, line, "vertex index"))
            .collect::<Result<Vec<usize>>>()?;
        polygons.push(polygon);
    }

    Ok(HalfEdgeMesh::from_polygons(points, polygons)?)
}

fn parse<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| parse_error(FORMAT, line, format!("invalid {what} '{token}'")))
}
