// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sets of cells grouped by resolution.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write as _};
use core::str::FromStr;

use crate::code::GeoCode;
use crate::error::ParseError;
use crate::geocell::GeoCell;
use crate::resolution::Resolution;

/// A set of cells approximating a shape, bucketed by [`Resolution`].
///
/// Each bucket keeps its cells in insertion order and every stored code is
/// normalized to its bucket's resolution, including cells read back with the
/// `serde` feature. Buckets may contain duplicates until [`Coverage::dedup`]
/// or [`Coverage::optimize`] runs.
///
/// The text form lists the hex tokens of all cells, coarsest resolution
/// first, separated by single spaces. The length of a token gives its
/// resolution, so the form parses back with [`str::parse`].
///
/// ```
/// use understory_geocode::{Coverage, GeoCode, Resolution};
///
/// let mut coverage = Coverage::new();
/// coverage.add_cell(GeoCode::from_raw(0xa100_0000_0000_0000), Resolution::new(4));
/// coverage.add_cell(GeoCode::from_raw(0x7fff_ffff_ffff_ffff), Resolution::MIN);
///
/// assert_eq!(coverage.to_string(), "7 a1");
/// assert!(coverage.contains(GeoCode::from_raw(0xa123_4567_89ab_cdef)));
/// assert_eq!("7 a1".parse::<Coverage>(), Ok(coverage));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "StoredCoverage")
)]
pub struct Coverage {
    buckets: [Vec<GeoCode>; Resolution::COUNT],
}

/// Deserialized buckets, not yet normalized.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct StoredCoverage {
    buckets: [Vec<GeoCode>; Resolution::COUNT],
}

#[cfg(feature = "serde")]
impl From<StoredCoverage> for Coverage {
    fn from(stored: StoredCoverage) -> Self {
        Resolution::all()
            .zip(stored.buckets)
            .flat_map(|(resolution, cells)| cells.into_iter().map(move |code| (resolution, code)))
            .collect()
    }
}

impl Coverage {
    /// Creates an empty coverage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a coverage from packed geocells.
    #[must_use]
    pub fn from_geocells(geocells: &[GeoCell]) -> Self {
        geocells
            .iter()
            .map(|cell| (cell.resolution(), cell.code()))
            .collect()
    }

    /// Adds the cell of `code` at `resolution`.
    ///
    /// The code is normalized to the resolution first, so any point inside
    /// the cell may be passed.
    pub fn add_cell(&mut self, code: GeoCode, resolution: Resolution) {
        self.buckets[resolution.index()].push(code.prefix(resolution));
    }

    /// Removes every copy of the cell of `code` at `resolution`, returning
    /// whether there was one.
    pub fn remove_cell(&mut self, code: GeoCode, resolution: Resolution) -> bool {
        let cell = code.prefix(resolution);
        let bucket = self.bucket_mut(resolution);
        let before = bucket.len();
        bucket.retain(|c| *c != cell);
        bucket.len() != before
    }

    /// Cells at `resolution`, in insertion order.
    #[must_use]
    pub fn cells(&self, resolution: Resolution) -> &[GeoCode] {
        &self.buckets[resolution.index()]
    }

    pub(crate) fn bucket_mut(&mut self, resolution: Resolution) -> &mut Vec<GeoCode> {
        &mut self.buckets[resolution.index()]
    }

    /// Iterates over all cells, coarsest resolution first.
    pub fn iter(&self) -> impl Iterator<Item = (Resolution, GeoCode)> + '_ {
        Resolution::all().flat_map(move |resolution| {
            self.cells(resolution)
                .iter()
                .map(move |&code| (resolution, code))
        })
    }

    /// Resolutions that hold at least one cell, coarsest first.
    pub fn resolutions(&self) -> impl DoubleEndedIterator<Item = Resolution> + '_ {
        Resolution::all().filter(|resolution| !self.cells(*resolution).is_empty())
    }

    /// The finest resolution holding a cell.
    #[must_use]
    pub fn finest_resolution(&self) -> Option<Resolution> {
        self.resolutions().next_back()
    }

    /// The coarsest resolution holding a cell.
    #[must_use]
    pub fn coarsest_resolution(&self) -> Option<Resolution> {
        self.resolutions().next()
    }

    /// Total number of stored cells, duplicates included.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Whether the coverage holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Removes all cells.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Removes and returns the cells at `resolution`.
    pub fn remove_resolution(&mut self, resolution: Resolution) -> Vec<GeoCode> {
        core::mem::take(self.bucket_mut(resolution))
    }

    /// Appends the cells of `other`, resolution by resolution.
    ///
    /// No deduplication is done.
    pub fn merge(&mut self, other: &Self) {
        for (bucket, extra) in self.buckets.iter_mut().zip(&other.buckets) {
            bucket.extend_from_slice(extra);
        }
    }

    /// Sorts every bucket and removes duplicate cells.
    pub fn dedup(&mut self) {
        for bucket in &mut self.buckets {
            bucket.sort_unstable();
            bucket.dedup();
        }
    }

    /// Whether any cell of the coverage contains `point`.
    #[must_use]
    pub fn contains(&self, point: GeoCode) -> bool {
        Resolution::all().any(|resolution| {
            let cell = point.prefix(resolution);
            self.cells(resolution).contains(&cell)
        })
    }

    /// Sum of the areas of all cells, in squared quantization units halved.
    ///
    /// A resolution 2 cell counts for `2^59` and a full resolution point for
    /// nothing. Overlapping or duplicate cells are counted each time. The sum
    /// saturates at `u64::MAX`.
    #[must_use]
    pub fn area(&self) -> u64 {
        Resolution::all()
            .map(|resolution| {
                let cell_area = (1_u64 << resolution.code_shift()) >> 1;
                let count = self.cells(resolution).len() as u64;
                cell_area.saturating_mul(count)
            })
            .fold(0, u64::saturating_add)
    }

    /// Exports the coverage as sorted, deduplicated geocells.
    ///
    /// Cells finer than `max_resolution` (at most 30, since geocells have no
    /// resolution 32 form) are replaced by their ancestor at that resolution.
    #[must_use]
    pub fn to_geocells(&self, max_resolution: Resolution) -> Vec<GeoCell> {
        let max_resolution = max_resolution.min(GeoCell::MAX_RESOLUTION);
        let mut geocells: Vec<GeoCell> = self
            .iter()
            .map(|(resolution, code)| GeoCell::new(code, resolution.min(max_resolution)))
            .collect();
        geocells.sort_unstable();
        geocells.dedup();
        geocells
    }

    /// Multi-line listing with one `resolution: tokens` line per non-empty
    /// resolution.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for resolution in self.resolutions() {
            let _ = write!(out, "{resolution}:");
            for token in self.tokens(resolution) {
                out.push(' ');
                out.push_str(&token);
            }
            out.push('\n');
        }
        out
    }

    /// Hex tokens of the cells at `resolution`, skipping a cell equal to the
    /// one right before it.
    fn tokens(&self, resolution: Resolution) -> impl Iterator<Item = String> + '_ {
        let cells = self.cells(resolution);
        cells
            .iter()
            .enumerate()
            .filter(move |(i, code)| *i == 0 || cells[i - 1] != **code)
            .map(move |(_, code)| code.to_hex(resolution))
    }
}

impl fmt::Debug for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.resolutions().map(|r| (r.get(), self.cells(r))))
            .finish()
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for resolution in self.resolutions() {
            for token in self.tokens(resolution) {
                if !first {
                    f.write_char(' ')?;
                }
                f.write_str(&token)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl FromStr for Coverage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut coverage = Self::new();
        for token in s.split_whitespace() {
            let code = GeoCode::from_hex(token)?;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "parsed tokens have 1 to 16 nibbles"
            )]
            let resolution = Resolution::new(2 * token.len() as u8);
            coverage.add_cell(code, resolution);
        }
        Ok(coverage)
    }
}

impl FromIterator<(Resolution, GeoCode)> for Coverage {
    fn from_iter<I: IntoIterator<Item = (Resolution, GeoCode)>>(iter: I) -> Self {
        let mut coverage = Self::new();
        coverage.extend(iter);
        coverage
    }
}

impl Extend<(Resolution, GeoCode)> for Coverage {
    fn extend<I: IntoIterator<Item = (Resolution, GeoCode)>>(&mut self, iter: I) {
        for (resolution, code) in iter {
            self.add_cell(code, resolution);
        }
    }
}
