// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterization of shapes into coverages.
//!
//! Shapes are given as sequences of [`GeoCode`] points. All arithmetic runs on
//! the full-precision quantized coordinates widened to `i64`, so stepping past
//! the edge of the coordinate space never wraps silently.
//!
//! - [`cover_polygon`]: scanline fill of a simple polygon.
//! - [`cover_line`] and [`cover_polyline`]: cells crossed by line segments,
//!   either by walking cell boundaries exactly or by Bresenham stepping.
//! - [`cover_rectangle`]: a latitude/longitude box, split in two when it
//!   crosses the antimeridian.
//!
//! None of these handle polygons spanning the antimeridian themselves; only
//! rectangles are split.

mod line;
mod polygon;
mod rect;

pub use line::{cover_line, cover_polyline};
pub use polygon::cover_polygon;
pub use rect::cover_rectangle;

use crate::code::GeoCode;
use crate::resolution::Resolution;

/// Largest number of cells per axis [`cover_polyline`] accepts when it picks
/// the resolution itself.
const MAX_CELLS_PER_SIDE: u64 = 64;

/// Finest resolution [`cover_polyline`] picks by itself.
const POLYLINE_MAX: Resolution = Resolution::new(26);

/// How [`cover_polyline`] steps along each segment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineMode {
    /// Follow the segment across cell boundaries, adding every cell it
    /// actually passes through.
    #[default]
    CellWalk,
    /// Advance one cell along the major axis per step, Bresenham style. This
    /// adds one cell per column and may skip cells the segment only clips.
    Bresenham,
}

/// Axis-aligned bounds of a set of points, in quantized coordinates.
///
/// ```
/// use understory_geocode::{BoundingBox, GeoCode, Resolution};
///
/// let nodes = [GeoCode::from_lat_lon(-90.0, -180.0), GeoCode::from_lat_lon(90.0, 180.0)];
/// let bbox = BoundingBox::of(&nodes).unwrap();
/// assert_eq!(bbox.lat_span(), u32::MAX);
/// assert_eq!(bbox.auto_resolution(), Resolution::MIN);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    south: u32,
    west: u32,
    north: u32,
    east: u32,
}

impl BoundingBox {
    /// Bounds of `points`, or `None` when there are none.
    #[must_use]
    pub fn of(points: &[GeoCode]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let (lat, lon) = first.coords(Resolution::MAX);
        let init = Self {
            south: lat,
            west: lon,
            north: lat,
            east: lon,
        };
        Some(rest.iter().fold(init, |bbox, point| {
            let (lat, lon) = point.coords(Resolution::MAX);
            Self {
                south: bbox.south.min(lat),
                west: bbox.west.min(lon),
                north: bbox.north.max(lat),
                east: bbox.east.max(lon),
            }
        }))
    }

    /// Southernmost latitude.
    #[must_use]
    pub const fn south(&self) -> u32 {
        self.south
    }

    /// Westernmost longitude.
    #[must_use]
    pub const fn west(&self) -> u32 {
        self.west
    }

    /// Northernmost latitude.
    #[must_use]
    pub const fn north(&self) -> u32 {
        self.north
    }

    /// Easternmost longitude.
    #[must_use]
    pub const fn east(&self) -> u32 {
        self.east
    }

    /// Latitude extent.
    #[must_use]
    pub const fn lat_span(&self) -> u32 {
        self.north.abs_diff(self.south)
    }

    /// Longitude extent.
    #[must_use]
    pub const fn lon_span(&self) -> u32 {
        self.east.abs_diff(self.west)
    }

    /// Resolution whose cells are just smaller than the smaller side of the
    /// box, as used to fill polygons.
    ///
    /// A box that is flat along one axis is sized by its other side, so a
    /// degenerate shape still gets a handful of cells. A single point gets
    /// the full resolution.
    #[must_use]
    pub fn auto_resolution(&self) -> Resolution {
        let span = match (self.lat_span(), self.lon_span()) {
            (0, span) | (span, 0) => span,
            (lat, lon) => lat.min(lon),
        };
        Resolution::new(32 - even_log2(span))
    }

    /// Resolution used to cover a polyline with these bounds.
    ///
    /// Starts two levels finer than [`auto_resolution`](Self::auto_resolution),
    /// coarsens until neither axis needs more than 64 cells, then caps the
    /// result at resolution 26.
    #[must_use]
    pub fn polyline_resolution(&self) -> Resolution {
        let cells = |span: u32, bits: u8| -> u64 {
            let span = u64::from(span);
            if bits <= 32 {
                span >> (32 - bits)
            } else {
                span << (bits - 32)
            }
        };
        let mut bits = 32 - even_log2(self.lat_span().min(self.lon_span())) + 4;
        while bits > Resolution::MIN.get()
            && (cells(self.lat_span(), bits) > MAX_CELLS_PER_SIDE
                || cells(self.lon_span(), bits) > MAX_CELLS_PER_SIDE)
        {
            bits -= 2;
        }
        Resolution::new(bits.min(POLYLINE_MAX.get()))
    }
}

/// Floor of the base 2 logarithm of `span`, rounded down to an even value.
/// An empty span counts as `0`.
fn even_log2(span: u32) -> u8 {
    let log2 = span.checked_ilog2().unwrap_or(0);
    #[expect(clippy::cast_possible_truncation, reason = "log2 of a u32 is below 32")]
    let log2 = log2 as u8;
    log2 & 0xfe
}

/// Quantized coordinates widened for stepping arithmetic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Point {
    lat: i64,
    lon: i64,
}

impl Point {
    fn of(code: GeoCode) -> Self {
        let (lat, lon) = code.coords(Resolution::MAX);
        Self {
            lat: i64::from(lat),
            lon: i64::from(lon),
        }
    }
}

/// Cell step sizes at one resolution, as `i64`.
#[derive(Copy, Clone, Debug)]
struct Grid {
    resolution: Resolution,
    width: i64,
    offset_mask: i64,
}

impl Grid {
    fn new(resolution: Resolution) -> Self {
        let width = i64::from(resolution.cell_width());
        Self {
            resolution,
            width,
            offset_mask: width - 1,
        }
    }

    /// Start of the cell containing `coord`.
    fn floor(&self, coord: i64) -> i64 {
        coord & !self.offset_mask
    }

    /// Last coordinate of the cell containing `coord`.
    fn ceil(&self, coord: i64) -> i64 {
        coord | self.offset_mask
    }

    /// The cell containing the given coordinates, keeping their low 32 bits.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "coordinates are reduced to 32 bits like the code space"
    )]
    fn cell(&self, lat: i64, lon: i64) -> GeoCode {
        GeoCode::from_coords(lat as u32, lon as u32, self.resolution)
    }
}
