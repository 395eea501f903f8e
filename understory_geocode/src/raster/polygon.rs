// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scanline polygon fill.

use alloc::vec::Vec;

use smallvec::SmallVec;

use super::{BoundingBox, Grid, Point};
use crate::code::GeoCode;
use crate::coverage::Coverage;
use crate::resolution::Resolution;

/// Covers a simple polygon with cells of a single resolution.
///
/// The polygon is closed implicitly between the last and the first vertex.
/// With `resolution` set to `None`, it is picked by
/// [`BoundingBox::auto_resolution`].
///
/// Rows are scanned at every vertex latitude and at the bottom and top edge
/// of every cell row in the bounding box. On each scan latitude the edges
/// crossing it are intersected, and the cells between pairs of crossings are
/// added. Horizontal edges add the cells along them. The coverage may hold
/// the same cell more than once.
///
/// Polygons crossing the antimeridian are not supported.
///
/// ```
/// use understory_geocode::{GeoCode, Resolution, cover_polygon};
///
/// let square = [
///     GeoCode::from_lat_lon(0.0, 0.0),
///     GeoCode::from_lat_lon(0.0, 10.0),
///     GeoCode::from_lat_lon(10.0, 10.0),
///     GeoCode::from_lat_lon(10.0, 0.0),
/// ];
/// let coverage = cover_polygon(&square, Some(Resolution::new(8)));
/// assert_eq!(coverage.resolutions().collect::<Vec<_>>(), [Resolution::new(8)]);
/// assert!(coverage.contains(GeoCode::from_lat_lon(5.0, 5.0)));
/// assert!(!coverage.contains(GeoCode::from_lat_lon(-5.0, 5.0)));
/// ```
#[must_use]
pub fn cover_polygon(vertices: &[GeoCode], resolution: Option<Resolution>) -> Coverage {
    let mut coverage = Coverage::new();
    let Some(bbox) = BoundingBox::of(vertices) else {
        return coverage;
    };
    let resolution = resolution.unwrap_or_else(|| {
        let resolution = bbox.auto_resolution();
        tracing::debug!(
            resolution = resolution.get(),
            vertices = vertices.len(),
            "picked polygon resolution"
        );
        resolution
    });
    let grid = Grid::new(resolution);
    let points: Vec<Point> = vertices.iter().copied().map(Point::of).collect();
    let Some(&last) = points.last() else {
        return coverage;
    };

    for lat in scan_latitudes(&points, &bbox, &grid) {
        let mut crossings: SmallVec<[i64; 8]> = SmallVec::new();
        let mut prev = last;
        for &point in &points {
            if (point.lat > lat) != (prev.lat > lat) {
                crossings.push(intersect(point, prev, lat));
            } else if point.lat == prev.lat && point.lat == lat {
                let (west, east) = (point.lon.min(prev.lon), point.lon.max(prev.lon));
                let mut lon = grid.floor(west);
                while lon <= east {
                    coverage.add_cell(grid.cell(lat, lon), resolution);
                    lon += grid.width;
                }
            }
            prev = point;
        }

        crossings.sort_unstable();
        for pair in crossings.chunks_exact(2) {
            let end = grid.ceil(pair[1]);
            let mut lon = pair[0];
            while lon <= end {
                coverage.add_cell(grid.cell(lat, lon), resolution);
                lon += grid.width;
            }
        }
    }
    coverage
}

/// Sorted, distinct latitudes to scan: every vertex latitude plus the bottom
/// and top coordinate of each cell row spanned by the polygon.
fn scan_latitudes(points: &[Point], bbox: &BoundingBox, grid: &Grid) -> Vec<i64> {
    let mut lats: Vec<i64> = points.iter().map(|p| p.lat).collect();
    let top = grid.ceil(i64::from(bbox.north));
    let mut lat = grid.floor(i64::from(bbox.south));
    while lat < top {
        lats.push(grid.floor(lat));
        lats.push(grid.ceil(lat));
        lat += grid.width;
    }
    lats.sort_unstable();
    lats.dedup();
    lats
}

/// Longitude at which the edge from `a` to `b` crosses `lat`.
///
/// The edge must not be horizontal.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the result lies between the edge's longitudes"
)]
fn intersect(a: Point, b: Point, lat: i64) -> i64 {
    let num = i128::from(lat - a.lat) * i128::from(b.lon - a.lon);
    (i128::from(a.lon) + num / i128::from(b.lat - a.lat)) as i64
}
