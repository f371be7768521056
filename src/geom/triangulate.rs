//! Polygon-loop triangulation.
//!
//! The polygon vertex index stream packs variable-size polygons without a
//! separate count array: the last corner of each polygon is stored as the
//! bitwise complement of the real control-point index (`-index - 1`), so a
//! negative entry both carries a corner and terminates its polygon.

use crate::util::{Error, Result};

/// Decode one stream entry to its control-point index.
#[inline]
fn decode_index(value: i32) -> i32 {
    if value < 0 {
        -value - 1
    } else {
        value
    }
}

/// Triangle list produced from a polygon stream.
pub struct Triangulation {
    /// Flattened triangle corners, as control-point indices.
    pub triangles: Vec<i32>,
    /// For each entry of `triangles`, the stream position it came from.
    /// Used to re-resolve corners after vertex expansion.
    pub corner_to_loop: Vec<usize>,
}

/// Fan-triangulate the polygon stream in place.
///
/// Each polygon's first three corners form its first triangle; every
/// further corner `c` adds `(first, previous, c)`. Terminal entries are
/// rewritten with their decoded magnitude, so downstream consumers never
/// see complement-encoded values.
pub fn triangulate(stream: &mut [i32]) -> Triangulation {
    let mut triangles = Vec::with_capacity(stream.len());
    let mut corner_to_loop = Vec::with_capacity(stream.len());
    let mut in_polygon = 0usize;

    for i in 0..stream.len() {
        let index = decode_index(stream[i]);
        if in_polygon <= 2 {
            triangles.push(index);
            corner_to_loop.push(i);
        } else {
            let first = i - in_polygon;
            triangles.push(stream[first]);
            corner_to_loop.push(first);
            triangles.push(stream[i - 1]);
            corner_to_loop.push(i - 1);
            triangles.push(index);
            corner_to_loop.push(i);
        }
        in_polygon += 1;
        if stream[i] < 0 {
            stream[i] = index;
            in_polygon = 0;
        }
    }

    Triangulation { triangles, corner_to_loop }
}

/// One polygon's extent in the raw (sign-terminated) stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolygonSpan {
    /// Corners in the polygon, terminal entry included.
    pub corners: usize,
    /// Triangles the polygon fans into (`corners - 2`).
    pub triangles: usize,
    /// Stream offset of the next polygon.
    pub next: usize,
}

/// Measure the polygon starting at `start` in the raw stream.
///
/// Counts forward to the terminal (negative) entry inclusive. Fails on a
/// stream that ends without a terminal entry or a polygon with fewer than
/// three corners.
pub fn polygon_span(stream: &[i32], start: usize) -> Result<PolygonSpan> {
    let mut end = start;
    loop {
        match stream.get(end) {
            None => return Err(Error::decode("polygon stream ends without a terminal entry")),
            Some(&value) if value < 0 => break,
            Some(_) => end += 1,
        }
    }
    let corners = end - start + 1;
    if corners < 3 {
        return Err(Error::decode(format!("degenerate {corners}-corner polygon")));
    }
    Ok(PolygonSpan { corners, triangles: corners - 2, next: end + 1 })
}

/// Measure every polygon in the raw stream, validating the terminal-sign
/// convention along the way.
pub fn polygon_spans(stream: &[i32]) -> Result<Vec<PolygonSpan>> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    while cursor < stream.len() {
        let span = polygon_span(stream, cursor)?;
        cursor = span.next;
        spans.push(span);
    }
    Ok(spans)
}
