// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Geocode: Z-order geocodes and hierarchical cell coverages.
//!
//! This crate maps points on the globe to 64-bit Z-order codes and
//! approximates shapes by sets of cells, for use as spatial index keys.
//!
//! - **Codes** ([`GeoCode`]): latitude and longitude quantized to 32 bits each
//!   and bit-interleaved, latitude first. Every nibble selects one of 16
//!   sub-cells, so code prefixes name cells at coarser [`Resolution`]s.
//! - **Navigation** ([`Direction`], [`GeoCode::neighbor`]): the eight
//!   adjacent cells at any resolution, wrapping around at the edges.
//! - **Coverages** ([`Coverage`]): cells bucketed by resolution, with a
//!   compact text form, containment tests and area estimates.
//! - **Rasterization** ([`cover_polygon`], [`cover_polyline`],
//!   [`cover_rectangle`]): coverages of shapes at a fixed or automatically
//!   picked resolution.
//! - **Optimization** ([`Coverage::optimize`], [`Thresholds`]): replaces dense
//!   groups of sibling cells by their parent.
//! - **Set operations** ([`Coverage::minus`], [`Coverage::intersection`],
//!   [`Coverage::union`], [`Coverage::normalize`]): exact on coverages mixing
//!   resolutions.
//! - **Distances** ([`orthodromic_distance`], [`loxodromic_distance`]): great
//!   circle and rhumb line distances in meters.
//! - **Interchange** ([`GeoCell`], [`GeoCode::to_indexable_string`],
//!   [`resample_polyline`]): self-describing cells, search index terms and
//!   polylines snapped to cell centers.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_geocode::{GeoCode, Resolution, Thresholds, cover_rectangle};
//!
//! // Encode a point and look at its cell at a coarser resolution.
//! let brest = GeoCode::from_lat_lon(48.39, -4.49);
//! let r = Resolution::new(12);
//! assert_eq!(brest.to_hex(r).len(), 6);
//!
//! // Cover a box and merge clusters of cells.
//! let mut coverage = cover_rectangle(48.0, -5.0, 49.0, -4.0);
//! assert!(coverage.contains(brest));
//! coverage.optimize(Thresholds::NONE);
//! assert!(coverage.contains(brest));
//!
//! // Coverages round-trip through their text form.
//! let text = coverage.to_string();
//! assert_eq!(text.parse::<understory_geocode::Coverage>().unwrap().to_string(), text);
//! ```
//!
//! ## Resolutions
//!
//! A resolution `R` is an even number from 2 to 32, the number of significant
//! bits per axis. A cell at `R` is written with `R / 2` hex digits and holds
//! 16 cells at `R + 2`. At the equator a resolution 2 cell is about
//! 10,000 km wide and a resolution 16 cell about 610 m.
//!
//! ## Edge Behavior
//!
//! Encoding clamps latitudes above 90° and longitudes above 180° to the last
//! coordinate. Navigation wraps instead: north of the top row is the bottom
//! row. Polygons crossing the antimeridian are not split, only rectangles
//! are.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Disable default features and
//! enable `libm` for floating point rounding without `std`.
//!
//! ## Features
//!
//! - `std` (default): use the standard library's float functions.
//! - `libm`: use `libm` for float functions in `no_std` builds.
//! - `serde`: `Serialize`/`Deserialize` for codes, resolutions, thresholds
//!   (as their packed `u64`), geocells and coverages.
//!
//! ## Logging
//!
//! Automatic resolution choices, antimeridian splits and optimizer summaries
//! are reported through [`tracing`] at `debug` and `trace` level. No
//! subscriber is installed.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod algebra;
mod code;
mod coverage;
mod distance;
mod error;
mod geocell;
mod neighbor;
mod optimize;
mod raster;
mod resample;
mod resolution;
mod thresholds;

pub use code::{
    DEGREES_PER_LAT_UNIT, DEGREES_PER_LON_UNIT, GeoCode, dequantize_lat, dequantize_lon,
    quantize_lat, quantize_lon,
};
pub use coverage::Coverage;
pub use distance::{EARTH_RADIUS_METERS, loxodromic_distance, orthodromic_distance};
pub use error::{GeoCellError, ParseError, ResolutionError};
pub use geocell::GeoCell;
pub use neighbor::Direction;
pub use raster::{
    BoundingBox, LineMode, cover_line, cover_polygon, cover_polyline, cover_rectangle,
};
pub use resample::resample_polyline;
pub use resolution::Resolution;
pub use thresholds::Thresholds;
