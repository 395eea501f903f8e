// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line segments and polylines.

use super::{BoundingBox, Grid, LineMode, Point};
use crate::code::GeoCode;
use crate::coverage::Coverage;
use crate::resolution::Resolution;

/// Adds the cells crossed by the segment from `from` to `to` to `coverage`.
///
/// The segment is walked west to east. From the current point the walk
/// compares the slope to the next cell corner with the slope of the segment
/// to decide whether the segment leaves the cell through its east side, its
/// north (or south) side, or exactly through the corner, then moves to the
/// entry point in the next cell.
///
/// The walk stops once the end point's row or column is reached, so the
/// final cell is left out when the end point sits on its west or south
/// edge. Consecutive segments of a polyline share that point, and the next
/// segment adds it.
pub fn cover_line(from: GeoCode, to: GeoCode, coverage: &mut Coverage, resolution: Resolution) {
    let grid = Grid::new(resolution);
    let (mut a, mut b) = (Point::of(from), Point::of(to));
    if a.lon > b.lon {
        core::mem::swap(&mut a, &mut b);
    }

    let rise = b.lat - a.lat;
    let dlat = i128::from(rise.abs());
    let dlon = i128::from(b.lon - a.lon);
    let mut add = |lat: i64, lon: i64| coverage.add_cell(grid.cell(lat, lon), resolution);

    if rise == 0 {
        let mut lon = a.lon;
        while grid.floor(lon) < b.lon {
            add(a.lat, lon);
            lon += grid.width;
        }
        return;
    }

    if dlon == 0 {
        let mut lat = a.lat;
        if rise > 0 {
            while grid.floor(lat) < b.lat {
                add(lat, a.lon);
                lat += grid.width;
            }
        } else {
            while grid.ceil(lat) > b.lat {
                add(lat, a.lon);
                lat -= grid.width;
            }
        }
        return;
    }

    let north = rise > 0;
    // Next row boundary in the direction of travel.
    let next_row = |lat: i64| {
        if north {
            grid.ceil(lat) + 1
        } else {
            grid.floor(lat) - 1
        }
    };

    let (mut lat, mut lon) = (a.lat, a.lon);
    loop {
        add(lat, lon);

        let lat_to_edge = i128::from(if north {
            grid.ceil(lat) + 1 - lat
        } else {
            lat - grid.floor(lat) + 1
        });
        let lon_to_edge = i128::from(grid.ceil(lon) + 1 - lon);
        let lat_run = lat_to_edge * dlon;
        let lon_run = lon_to_edge * dlat;

        match lat_run.cmp(&lon_run) {
            core::cmp::Ordering::Greater => {
                // Leaves through the east side.
                let step = narrow(lon_run / dlon);
                lat += if north { step } else { -step };
                lon = grid.ceil(lon) + 1;
            }
            core::cmp::Ordering::Less => {
                // Leaves through the north or south side.
                lat = next_row(lat);
                lon += narrow(lat_run / dlat);
            }
            core::cmp::Ordering::Equal => {
                lat = next_row(lat);
                lon = grid.ceil(lon) + 1;
            }
        }

        let lat_inside = if north {
            grid.floor(lat) < b.lat
        } else {
            grid.ceil(lat) > b.lat
        };
        if !(lat_inside && grid.floor(lon) < b.lon) {
            break;
        }
    }
}

/// Covers a polyline with cells of a single resolution.
///
/// With `resolution` set to `None`, it is picked by
/// [`BoundingBox::polyline_resolution`]. Fewer than two nodes give an empty
/// coverage.
///
/// ```
/// use understory_geocode::{GeoCode, LineMode, Resolution, cover_polyline};
///
/// let nodes = [GeoCode::from_lat_lon(48.0, -4.5), GeoCode::from_lat_lon(48.5, -3.0)];
/// let walk = cover_polyline(&nodes, Some(Resolution::new(16)), LineMode::CellWalk);
/// let steps = cover_polyline(&nodes, Some(Resolution::new(16)), LineMode::Bresenham);
/// assert!(walk.cell_count() >= steps.cell_count());
/// assert!(walk.contains(nodes[0]));
/// ```
#[must_use]
pub fn cover_polyline(
    nodes: &[GeoCode],
    resolution: Option<Resolution>,
    mode: LineMode,
) -> Coverage {
    let mut coverage = Coverage::new();
    if nodes.len() < 2 {
        return coverage;
    }
    let resolution = match resolution {
        Some(resolution) => resolution,
        None => {
            let Some(bbox) = BoundingBox::of(nodes) else {
                return coverage;
            };
            let resolution = bbox.polyline_resolution();
            tracing::debug!(
                resolution = resolution.get(),
                nodes = nodes.len(),
                "picked polyline resolution"
            );
            resolution
        }
    };

    for segment in nodes.windows(2) {
        match mode {
            LineMode::CellWalk => cover_line(segment[0], segment[1], &mut coverage, resolution),
            LineMode::Bresenham => bresenham(segment[0], segment[1], &mut coverage, resolution),
        }
    }
    coverage
}

/// Steps one cell at a time along the major axis of the segment, moving one
/// cell along the minor axis whenever the accumulated error requires it.
fn bresenham(from: GeoCode, to: GeoCode, coverage: &mut Coverage, resolution: Resolution) {
    let grid = Grid::new(resolution);
    let (from, to) = (Point::of(from), Point::of(to));
    let steep = (to.lat - from.lat).abs() > (to.lon - from.lon).abs();

    // (minor, major) axes.
    let (mut start, mut end) = if steep {
        ((from.lon, from.lat), (to.lon, to.lat))
    } else {
        ((from.lat, from.lon), (to.lat, to.lon))
    };
    if start.1 > end.1 {
        core::mem::swap(&mut start, &mut end);
    }

    let delta_minor = (end.0 - start.0).abs();
    let delta_major = end.1 - start.1;
    let minor_step = if start.0 < end.0 {
        grid.width
    } else {
        -grid.width
    };
    let mut error = delta_major / 2;
    let (mut minor, mut major) = start;

    while grid.floor(major) <= end.1 {
        let cell = if steep {
            grid.cell(major, minor)
        } else {
            grid.cell(minor, major)
        };
        coverage.add_cell(cell, resolution);

        error -= delta_minor;
        if error < 0 {
            minor += minor_step;
            error += delta_major;
        }
        major += grid.width;
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "offsets along a segment are bounded by its 32-bit extent"
)]
fn narrow(value: i128) -> i64 {
    value as i64
}
