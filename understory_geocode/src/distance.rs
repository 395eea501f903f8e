// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distances between points on a spherical Earth.

use core::f64::consts::{FRAC_PI_4, PI, TAU};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for trigonometry

use crate::code::GeoCode;
use crate::resolution::Resolution;

/// Mean radius of the Earth, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Great circle distance between two points, in meters.
///
/// ```
/// use understory_geocode::{GeoCode, orthodromic_distance};
///
/// let brest = GeoCode::from_lat_lon(48.39, -4.49);
/// let new_york = GeoCode::from_lat_lon(40.71, -74.0);
/// let d = orthodromic_distance(brest, new_york);
/// assert!((5_000_000.0..6_000_000.0).contains(&d));
/// ```
#[must_use]
pub fn orthodromic_distance(from: GeoCode, to: GeoCode) -> f64 {
    let (lat1, lon1) = radians(from);
    let (lat2, lon2) = radians(to);
    let sin_lat = ((lat2 - lat1) / 2.0).sin();
    let sin_lon = ((lon2 - lon1) / 2.0).sin();
    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).max(0.0).sqrt())
}

/// Rhumb line distance between two points, in meters.
///
/// A rhumb line keeps a constant bearing. It takes the shorter way around,
/// across the antimeridian when that is shorter.
#[must_use]
pub fn loxodromic_distance(from: GeoCode, to: GeoCode) -> f64 {
    let (lat1, lon1) = radians(from);
    let (lat2, lon2) = radians(to);
    let d_lat = lat2 - lat1;
    let mut d_lon = lon2 - lon1;
    if d_lon.abs() > PI {
        d_lon -= TAU.copysign(d_lon);
    }
    let d_psi = ((FRAC_PI_4 + lat2 / 2.0).tan() / (FRAC_PI_4 + lat1 / 2.0).tan()).ln();
    // Along a parallel the stretched latitude difference vanishes.
    let q = if d_psi.abs() > 1e-12 {
        d_lat / d_psi
    } else {
        lat1.cos()
    };
    d_lat.hypot(q * d_lon) * EARTH_RADIUS_METERS
}

fn radians(code: GeoCode) -> (f64, f64) {
    let (lat, lon) = code.to_lat_lon(Resolution::MAX);
    (lat.to_radians(), lon.to_radians())
}
