// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coverage optimization: clustering sibling cells into their parents.
//!
//! Optimization runs in two passes:
//!
//! 1. From the finest resolution to the coarsest, sibling cells (cells that
//!    share their parent at the next coarser resolution) are grouped. A group
//!    is replaced by its parent when all 16 siblings are present, or when the
//!    number of distinct siblings reaches the resolution's threshold. Other
//!    groups are kept, sorted and deduplicated. Parents are appended to the
//!    coarser bucket, which is processed next, so merges cascade.
//! 2. From the coarsest resolution up, cells at `R + 4` lying inside a cell at
//!    `R` are dropped. These appear when a merge at `R + 2` produces a cell
//!    that already had finer descendants two levels down.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::code::GeoCode;
use crate::coverage::Coverage;
use crate::resolution::Resolution;
use crate::thresholds::Thresholds;

/// Finest resolution whose cells are checked against the `R + 4` bucket.
const CLEANUP_MAX: Resolution = Resolution::new(26);

impl Coverage {
    /// Clusters dense groups of cells into coarser cells, in place.
    ///
    /// After optimization every bucket is sorted and free of duplicates.
    /// Running it again with the same thresholds changes nothing.
    ///
    /// ```
    /// use understory_geocode::{Coverage, Resolution, Thresholds};
    ///
    /// let mut coverage: Coverage = "a0 a1 a2 a3".parse().unwrap();
    ///
    /// coverage.optimize(Thresholds::NONE.with(Resolution::new(4), 5));
    /// assert_eq!(coverage.to_string(), "a0 a1 a2 a3");
    ///
    /// coverage.optimize(Thresholds::NONE.with(Resolution::new(4), 4));
    /// assert_eq!(coverage.to_string(), "a");
    /// ```
    pub fn optimize(&mut self, thresholds: Thresholds) {
        let before = self.cell_count();
        for resolution in Resolution::all().rev() {
            match resolution.coarser() {
                Some(parent) => self.cluster(resolution, parent, thresholds.get(resolution)),
                None => {
                    let bucket = self.bucket_mut(resolution);
                    bucket.sort_unstable();
                    bucket.dedup();
                }
            }
        }
        for resolution in Resolution::all().take_while(|r| *r <= CLEANUP_MAX) {
            self.drop_covered(resolution);
        }
        tracing::debug!(before, after = self.cell_count(), "optimized coverage");
    }

    /// Merges the sibling groups of `resolution` into `parent` where they are
    /// dense enough.
    fn cluster(&mut self, resolution: Resolution, parent: Resolution, threshold: u8) {
        let mut cells = core::mem::take(self.bucket_mut(resolution));
        if cells.is_empty() {
            return;
        }
        cells.sort_unstable();

        let mut kept = Vec::with_capacity(cells.len());
        let mut merged = Vec::new();
        for group in cells.chunk_by(|a, b| a.prefix(parent) == b.prefix(parent)) {
            let prefix = group[0].prefix(parent);
            let mut offsets = 0_u16;
            for cell in group {
                offsets |= 1 << cell.offset(resolution);
            }
            let distinct = offsets.count_ones();
            if offsets == u16::MAX || (threshold > 0 && distinct >= u32::from(threshold)) {
                merged.push(prefix);
            } else {
                kept.extend(
                    (0..16_u64)
                        .filter(|i| offsets & (1 << i) != 0)
                        .map(|i| GeoCode::from_raw(prefix.raw() | (i << resolution.code_shift()))),
                );
            }
        }

        if !merged.is_empty() {
            tracing::trace!(
                resolution = resolution.get(),
                merged = merged.len(),
                kept = kept.len(),
                "clustered cells into parents"
            );
        }
        self.bucket_mut(parent).extend(merged);
        *self.bucket_mut(resolution) = kept;
    }

    /// Drops the cells two levels below `resolution` that lie inside one of
    /// its cells.
    fn drop_covered(&mut self, resolution: Resolution) {
        let Some(finer) = resolution.finer().and_then(Resolution::finer) else {
            return;
        };
        if self.cells(resolution).is_empty() || self.cells(finer).is_empty() {
            return;
        }
        let covering: HashSet<GeoCode> = self.cells(resolution).iter().copied().collect();
        let mut seen = HashSet::new();
        let bucket = self.bucket_mut(finer);
        let before = bucket.len();
        bucket.retain(|cell| !covering.contains(&cell.prefix(resolution)) && seen.insert(*cell));
        if bucket.len() != before {
            tracing::trace!(
                resolution = finer.get(),
                dropped = before - bucket.len(),
                "dropped cells covered by a coarser cell"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn r(bits: u8) -> Resolution {
        Resolution::new(bits)
    }

    #[test]
    fn single_point_with_threshold_one() {
        let mut c = Coverage::new();
        c.add_cell(GeoCode::from_raw(0x1), Resolution::MAX);
        c.optimize(Thresholds::from_packed(0x1));
        assert_eq!(c.to_string(), "000000000000000");
    }

    #[test]
    fn threshold_controls_partial_groups() {
        let mut c: Coverage = "a0 a1 a2 a3".parse().unwrap();
        let original = c.clone();
        c.optimize(Thresholds::from_packed(0x0500_0000_0000_0000));
        assert_eq!(c, original);
        c.optimize(Thresholds::from_packed(0x0400_0000_0000_0000));
        assert_eq!(c.to_string(), "a");
    }

    #[test]
    fn cleanup_drops_covered_cells() {
        let mut c: Coverage = "a a00 a01 a02 a03".parse().unwrap();
        c.optimize(Thresholds::from_packed(0x0500_0000_0000_0000));
        assert_eq!(c.to_string(), "a");
    }

    #[test]
    fn cleanup_checks_every_covering_cell() {
        let mut c: Coverage = "a b a00 b00 c00".parse().unwrap();
        c.optimize(Thresholds::NONE);
        assert_eq!(c.to_string(), "a b c00");
    }

    #[test]
    fn full_groups_always_merge() {
        let mut c = Coverage::new();
        for i in 0..16_u64 {
            c.add_cell(GeoCode::from_raw(0x3a00_0000_0000_0000 | (i << 52)), r(6));
        }
        c.optimize(Thresholds::NONE);
        assert_eq!(c.to_string(), "3a");
    }

    #[test]
    fn merges_cascade_to_coarser_resolutions() {
        let mut c = Coverage::new();
        for i in 0..16_u64 {
            for j in 0..16_u64 {
                c.add_cell(GeoCode::from_raw((i << 56) | (j << 52)), r(6));
            }
        }
        c.add_cell(GeoCode::ZERO, r(6));
        c.optimize(Thresholds::NONE);
        assert_eq!(c.to_string(), "0");
    }

    #[test]
    fn sorts_and_dedups_sparse_cells() {
        let mut c: Coverage = "f 3 f 71 17 71".parse().unwrap();
        c.optimize(Thresholds::NONE);
        assert_eq!(c.to_string(), "3 f 17 71");
    }

    #[test]
    fn optimize_is_idempotent() {
        let text = "a0 a1 a2 a3 b b00 b01 c123 c124 c125 d0000 d0001";
        let mut c: Coverage = text.parse().unwrap();
        let t = Thresholds::NONE.with(r(4), 4).with(r(8), 2);
        c.optimize(t);
        let once = c.clone();
        c.optimize(t);
        assert_eq!(c, once);
    }
}
