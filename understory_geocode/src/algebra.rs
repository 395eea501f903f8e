// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution changes and set operations on coverages.
//!
//! Set operations are exact on mixed resolution coverages: a cell of one
//! operand that only partly overlaps the other is split into its children
//! until every piece is either fully inside or fully outside.

use alloc::vec::Vec;

use crate::code::GeoCode;
use crate::coverage::Coverage;
use crate::resolution::Resolution;
use crate::thresholds::Thresholds;

impl Coverage {
    /// Rewrites the coverage with cells of a single resolution.
    ///
    /// Finer cells are replaced by their ancestor at `resolution` and coarser
    /// cells by all their descendants at `resolution`, so the result holds
    /// `16^k` cells for each cell `k` levels coarser. The result is sorted and
    /// free of duplicates.
    ///
    /// ```
    /// use understory_geocode::{Coverage, Resolution};
    ///
    /// let mut coverage: Coverage = "f f000 f00000".parse().unwrap();
    /// coverage.normalize(Resolution::new(4));
    /// assert_eq!(coverage.to_string(), "f0 f1 f2 f3 f4 f5 f6 f7 f8 f9 fa fb fc fd fe ff");
    /// ```
    pub fn normalize(&mut self, resolution: Resolution) {
        let shift = resolution.code_shift();
        let mut cells = Vec::new();
        for (r, cell) in self.iter() {
            if r > resolution {
                cells.push(cell.prefix(resolution));
            } else {
                let descendants = 1_u64 << (4 * (resolution.index() - r.index()));
                let first = cell.raw();
                cells.extend((0..descendants).map(|i| GeoCode::from_raw(first | (i << shift))));
            }
        }
        cells.sort_unstable();
        cells.dedup();
        tracing::debug!(
            resolution = resolution.get(),
            cells = cells.len(),
            "normalized coverage"
        );
        self.clear();
        *self.bucket_mut(resolution) = cells;
    }

    /// The part of this coverage outside `other`.
    ///
    /// Cells of `self` inside a cell of `other` are dropped. Cells holding
    /// finer cells of `other` are split down to their resolution. The result
    /// is deduplicated.
    ///
    /// ```
    /// use understory_geocode::{Coverage, GeoCode};
    ///
    /// let world: Coverage = "0".parse().unwrap();
    /// let hole: Coverage = "00".parse().unwrap();
    /// let rest = world.minus(&hole);
    /// assert_eq!(rest.to_string(), "01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f");
    /// assert!(!rest.contains(GeoCode::ZERO));
    /// ```
    #[must_use]
    pub fn minus(&self, other: &Self) -> Self {
        let mut sorted = other.clone();
        sorted.dedup();
        let mut out = Self::new();
        let mut pending: Vec<(Resolution, GeoCode)> = self.iter().collect();
        while let Some((resolution, cell)) = pending.pop() {
            if covered(&sorted, cell, resolution) {
                continue;
            }
            let overlapped = finer_inside(&sorted, cell, resolution).next().is_some();
            match (resolution.finer(), cell.children(resolution)) {
                (Some(finer), Some(children)) if overlapped => {
                    pending.extend(children.map(|child| (finer, child)));
                }
                _ => out.add_cell(cell, resolution),
            }
        }
        out.dedup();
        out
    }

    /// The part of this coverage inside `other`.
    ///
    /// Each cell of `self` inside a cell of `other` is kept. Otherwise the
    /// finer cells of `other` lying inside it are taken. The result is
    /// deduplicated.
    ///
    /// ```
    /// use understory_geocode::Coverage;
    ///
    /// let a: Coverage = "0 a".parse().unwrap();
    /// let b: Coverage = "000000 a1".parse().unwrap();
    /// assert_eq!(a.intersection(&b).to_string(), "a1 000000");
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut sorted = other.clone();
        sorted.dedup();
        let mut out = Self::new();
        for (resolution, cell) in self.iter() {
            if covered(&sorted, cell, resolution) {
                out.add_cell(cell, resolution);
            } else {
                out.extend(finer_inside(&sorted, cell, resolution));
            }
        }
        out.dedup();
        out
    }

    /// All cells of both coverages, deduplicated and optimized without
    /// thresholds.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.merge(other);
        out.optimize(Thresholds::NONE);
        out
    }

    /// Drops sparse sibling groups.
    ///
    /// At every resolution finer than `min_resolution`, cells are grouped by
    /// their parent. A group with at most as many distinct cells as the
    /// resolution's threshold is removed. A threshold of 0 keeps everything.
    /// Pruned buckets are sorted and deduplicated.
    pub fn prune(&mut self, thresholds: Thresholds, min_resolution: Resolution) {
        for resolution in Resolution::all().skip(min_resolution.index() + 1) {
            let threshold = usize::from(thresholds.get(resolution));
            let Some(parent) = resolution.coarser() else {
                continue;
            };
            if threshold == 0 || self.cells(resolution).is_empty() {
                continue;
            }
            let bucket = self.bucket_mut(resolution);
            bucket.sort_unstable();
            bucket.dedup();
            let before = bucket.len();
            let mut kept = Vec::with_capacity(before);
            for group in bucket.chunk_by(|a, b| a.prefix(parent) == b.prefix(parent)) {
                if group.len() > threshold {
                    kept.extend_from_slice(group);
                }
            }
            if kept.len() != before {
                tracing::trace!(
                    resolution = resolution.get(),
                    pruned = before - kept.len(),
                    "pruned sparse cells"
                );
            }
            *bucket = kept;
        }
    }

    /// Coarsens the finest cells until at most `max_cells` remain.
    ///
    /// The coverage is deduplicated first. Then the finest bucket is
    /// repeatedly folded into its parents, which only grows the covered
    /// area. Reduction stops at resolution 2, so the count may stay above
    /// `max_cells`.
    pub fn reduce(&mut self, max_cells: usize) {
        self.dedup();
        while self.cell_count() > max_cells {
            let Some(finest) = self.finest_resolution() else {
                break;
            };
            let Some(coarser) = finest.coarser() else {
                break;
            };
            let cells = self.remove_resolution(finest);
            let bucket = self.bucket_mut(coarser);
            bucket.extend(cells.into_iter().map(|cell| cell.prefix(coarser)));
            bucket.sort_unstable();
            bucket.dedup();
        }
    }
}

/// Whether `sorted` holds `cell` or one of its ancestors.
///
/// Every bucket of `sorted` must be sorted.
fn covered(sorted: &Coverage, cell: GeoCode, resolution: Resolution) -> bool {
    Resolution::all()
        .take(resolution.index() + 1)
        .any(|r| sorted.cells(r).binary_search(&cell.prefix(r)).is_ok())
}

/// Cells of `sorted` finer than `resolution` that lie inside `cell`.
///
/// Every bucket of `sorted` must be sorted, which keeps the descendants of a
/// cell contiguous.
fn finer_inside(
    sorted: &Coverage,
    cell: GeoCode,
    resolution: Resolution,
) -> impl Iterator<Item = (Resolution, GeoCode)> + '_ {
    Resolution::all()
        .skip(resolution.index() + 1)
        .flat_map(move |r| {
            let cells = sorted.cells(r);
            let start = cells.partition_point(|c| *c < cell);
            cells[start..]
                .iter()
                .take_while(move |c| c.prefix(resolution) == cell)
                .map(move |&c| (r, c))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn r(bits: u8) -> Resolution {
        Resolution::new(bits)
    }

    fn cov(text: &str) -> Coverage {
        text.parse().unwrap()
    }

    #[test]
    fn normalize_expands_coarse_cells() {
        let mut c = cov("f");
        c.normalize(r(4));
        assert_eq!(c.resolutions().collect::<Vec<_>>(), [r(4)]);
        assert_eq!(
            c.to_string(),
            "f0 f1 f2 f3 f4 f5 f6 f7 f8 f9 fa fb fc fd fe ff"
        );
    }

    #[test]
    fn normalize_compacts_fine_cells() {
        let mut c = Coverage::new();
        c.add_cell(GeoCode::from_raw(0xf000_0000_0000_0000), r(2));
        c.add_cell(GeoCode::from_raw(0xf000_0000_0000_0001), r(32));
        c.add_cell(GeoCode::from_raw(0xf000_0000_0000_0010), r(30));
        c.normalize(r(4));
        assert_eq!(c.resolutions().collect::<Vec<_>>(), [r(4)]);
        assert_eq!(c.cell_count(), 16);
        assert_eq!(
            c.to_string(),
            "f0 f1 f2 f3 f4 f5 f6 f7 f8 f9 fa fb fc fd fe ff"
        );
    }

    #[test]
    fn normalize_spans_several_levels() {
        let mut c = cov("0");
        c.normalize(r(6));
        assert_eq!(c.cells(r(6)).len(), 256);
        assert!(c.remove_cell(GeoCode::ZERO, r(6)));
        assert_eq!(c.cell_count(), 255);
        assert!(!c.contains(GeoCode::ZERO));
    }

    #[test]
    fn minus_removes_one_child() {
        let a = cov("0");
        let b = cov("00");
        let c = a.minus(&b);
        assert_eq!(a, cov("0"));
        assert_eq!(b, cov("00"));
        assert_eq!(
            c.to_string(),
            "01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f"
        );
    }

    #[test]
    fn minus_splits_down_to_the_hole() {
        let c = cov("0").minus(&cov("000000"));
        assert_eq!(
            c.resolutions().collect::<Vec<_>>(),
            [r(4), r(6), r(8), r(10), r(12)]
        );
        assert_eq!(c.cell_count(), 75);
        for resolution in c.resolutions() {
            assert_eq!(c.cells(resolution).len(), 15);
        }
        assert!(!c.contains(GeoCode::ZERO));
        assert!(c.contains(GeoCode::from_raw(0x0000_0100_0000_0000)));
        assert!(!c.to_string().split(' ').any(|token| token == "000000"));
    }

    #[test]
    fn minus_drops_cells_inside_coarser_ones() {
        assert!(cov("000 a12").minus(&cov("0 a")).is_empty());
        assert_eq!(cov("000 a12").minus(&cov("b")).to_string(), "000 a12");
    }

    #[test]
    fn intersection_keeps_the_finer_side() {
        let a = cov("0");
        assert_eq!(a.intersection(&cov("000")).to_string(), "000");
        let c = a.intersection(&cov("000000"));
        assert_eq!(c.resolutions().collect::<Vec<_>>(), [r(12)]);
        assert_eq!(c.to_string(), "000000");
        assert!(a.intersection(&cov("f")).is_empty());
        assert_eq!(cov("000").intersection(&a).to_string(), "000");
    }

    #[test]
    fn union_merges_full_groups() {
        let low = cov("a0 a1 a2 a3 a4 a5 a6 a7");
        let high = cov("a8 a9 aa ab ac ad ae af a3");
        assert_eq!(low.union(&high).to_string(), "a");
    }

    #[test]
    fn prune_removes_sparse_groups() {
        let mut c = cov("11 12 13 14 15");

        c.prune(Thresholds::from_packed(0x0400_0000_0000_0000), r(2));
        assert_eq!(c.cell_count(), 5);

        // Resolutions up to the minimum are left alone.
        c.prune(Thresholds::from_packed(0x0500_0000_0000_0000), r(4));
        assert_eq!(c.cell_count(), 5);

        c.prune(Thresholds::from_packed(0x0500_0000_0000_0000), r(2));
        assert_eq!(c.cell_count(), 0);
    }

    #[test]
    fn prune_is_per_parent() {
        let mut c = cov("11 12 13 21");
        c.prune(Thresholds::NONE.with(r(4), 2), r(2));
        assert_eq!(c.to_string(), "11 12 13");
    }

    #[test]
    fn reduce_coarsens_the_finest_cells() {
        let mut c = cov("0");
        c.normalize(r(8));
        c.remove_cell(GeoCode::ZERO, r(8));
        assert_eq!(c.cell_count(), 4095);

        c.reduce(4094);
        assert_eq!(c.resolutions().collect::<Vec<_>>(), [r(6)]);
        assert_eq!(c.cell_count(), 256);
        assert!(c.contains(GeoCode::ZERO));

        let mut count = c.cell_count();
        while count > 16 {
            c.reduce(count - 1);
            assert!(c.cell_count() <= count);
            c.optimize(Thresholds::NONE);
            count = c.cell_count();
        }
        assert_eq!(c.to_string(), "0");
    }

    #[test]
    fn reduce_stops_at_the_coarsest_resolution() {
        let mut c = cov("12 a34 f5678");
        c.reduce(0);
        assert_eq!(c.to_string(), "1 a f");
    }
}
