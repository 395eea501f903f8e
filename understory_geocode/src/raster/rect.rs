// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latitude/longitude rectangles.

use super::cover_polygon;
use crate::code::GeoCode;
use crate::coverage::Coverage;

/// Covers the rectangle between a south-west and a north-east corner, given
/// in degrees, at an automatically picked resolution.
///
/// When the west longitude is greater than the east one and the two have
/// different signs (or one is zero), the rectangle is taken to cross the
/// antimeridian: it is covered as two rectangles, one on each side, whose
/// coverages are merged. When the signs agree, the corners are reordered
/// instead.
///
/// ```
/// use understory_geocode::{Thresholds, cover_rectangle};
///
/// let mut quadrant = cover_rectangle(0.0, 0.0, 90.0, 180.0);
/// quadrant.optimize(Thresholds::NONE);
/// assert_eq!(quadrant.to_string(), "c d e f");
/// ```
#[must_use]
pub fn cover_rectangle(sw_lat: f64, sw_lon: f64, ne_lat: f64, ne_lon: f64) -> Coverage {
    if sw_lon > ne_lon {
        if sw_lon * ne_lon <= 0.0 {
            tracing::debug!(sw_lon, ne_lon, "splitting rectangle at the antimeridian");
            let mut coverage = cover_box(sw_lat, sw_lon, ne_lat, 180.0);
            coverage.merge(&cover_box(sw_lat, -180.0, ne_lat, ne_lon));
            return coverage;
        }
        return cover_box(sw_lat.min(ne_lat), ne_lon, sw_lat.max(ne_lat), sw_lon);
    }
    cover_box(sw_lat, sw_lon, ne_lat, ne_lon)
}

fn cover_box(south: f64, west: f64, north: f64, east: f64) -> Coverage {
    let corners = [
        GeoCode::from_lat_lon(south, west),
        GeoCode::from_lat_lon(south, east),
        GeoCode::from_lat_lon(north, east),
        GeoCode::from_lat_lon(north, west),
    ];
    cover_polygon(&corners, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::Resolution;
    use crate::thresholds::Thresholds;
    use alloc::string::ToString;

    #[test]
    fn full_globe_is_sixteen_cells() {
        let mut c = cover_rectangle(-90.0, -180.0, 90.0, 180.0);
        c.optimize(Thresholds::NONE);
        assert_eq!(
            c.resolutions().collect::<alloc::vec::Vec<_>>(),
            [Resolution::MIN]
        );
        assert_eq!(c.cells(Resolution::MIN).len(), 16);
    }

    #[test]
    fn north_east_quadrant() {
        let mut c = cover_rectangle(0.0, 0.0, 90.0, 180.0);
        c.optimize(Thresholds::NONE);
        assert_eq!(c.to_string(), "c d e f");
    }

    #[test]
    fn antimeridian_split_is_union_of_halves() {
        let mut crossing = cover_rectangle(10.0, 170.0, 20.0, -170.0);
        let mut halves = cover_rectangle(10.0, 170.0, 20.0, 180.0);
        halves.merge(&cover_rectangle(10.0, -180.0, 20.0, -170.0));
        crossing.dedup();
        halves.dedup();
        assert_eq!(crossing, halves);
        assert!(crossing.contains(GeoCode::from_lat_lon(15.0, 175.0)));
        assert!(crossing.contains(GeoCode::from_lat_lon(15.0, -175.0)));
        assert!(!crossing.contains(GeoCode::from_lat_lon(15.0, 0.0)));
    }

    #[test]
    fn zero_height_rectangles_stay_small() {
        let mut strip = cover_rectangle(10.0, 0.0, 10.0, 0.5);
        strip.dedup();
        assert_eq!(
            strip.resolutions().collect::<alloc::vec::Vec<_>>(),
            [Resolution::new(10)]
        );
        assert_eq!(strip.cell_count(), 2);
        assert!(strip.contains(GeoCode::from_lat_lon(10.0, 0.25)));

        let mut equator = cover_rectangle(0.0, -180.0, 0.0, 180.0);
        equator.dedup();
        assert_eq!(
            equator.resolutions().collect::<alloc::vec::Vec<_>>(),
            [Resolution::MIN]
        );
        assert_eq!(equator.cell_count(), 4);
    }

    #[test]
    fn swapped_corners_with_same_sign_are_reordered() {
        let mut swapped = cover_rectangle(20.0, 40.0, 10.0, 30.0);
        let mut ordered = cover_rectangle(10.0, 30.0, 20.0, 40.0);
        swapped.dedup();
        ordered.dedup();
        assert_eq!(swapped, ordered);
    }
}
