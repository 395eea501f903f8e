// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polyline resampling.

use alloc::vec::Vec;

use crate::code::GeoCode;
use crate::resolution::Resolution;

/// Snaps the nodes of a polyline to the centers of their cells at
/// `resolution`, dropping nodes that fall in the same cell as the node kept
/// right before them.
///
/// At full resolution cells are points and nodes are only deduplicated.
/// Resampling an already resampled polyline at the same resolution returns it
/// unchanged.
///
/// ```
/// use understory_geocode::{GeoCode, Resolution, resample_polyline};
///
/// let nodes = [
///     GeoCode::from_raw(0x1234_0000_0000_0000),
///     GeoCode::from_raw(0x1234_5678_0000_0000),
///     GeoCode::from_raw(0x1240_0000_0000_0000),
/// ];
/// let resampled = resample_polyline(&nodes, Resolution::new(8));
/// assert_eq!(
///     resampled,
///     [GeoCode::from_raw(0x1234_c000_0000_0000), GeoCode::from_raw(0x1240_c000_0000_0000)],
/// );
/// ```
#[must_use]
pub fn resample_polyline(nodes: &[GeoCode], resolution: Resolution) -> Vec<GeoCode> {
    let mut resampled: Vec<GeoCode> = Vec::new();
    let mut last = None;
    for node in nodes {
        let cell = node.prefix(resolution);
        if last == Some(cell) {
            continue;
        }
        last = Some(cell);
        resampled.push(cell.center(resolution));
    }
    resampled
}
