// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Self-describing cells that carry their resolution in the top nibble.

use core::fmt;

use crate::code::GeoCode;
use crate::error::GeoCellError;
use crate::resolution::Resolution;

/// A cell packed with its resolution into a single `u64`.
///
/// The top nibble holds `R / 2` (1 to 15) and the remaining 60 bits hold the
/// code prefix shifted right by one nibble. Sorting geocells orders them by
/// resolution first, then along the Z-order curve.
///
/// Resolution 32 has no geocell form since its prefix needs all 64 bits.
///
/// ```
/// use understory_geocode::{GeoCell, GeoCode, Resolution};
///
/// let code = GeoCode::from_raw(0x1234_5678_90ab_cdef);
/// let cell = GeoCell::new(code, Resolution::new(4));
/// assert_eq!(cell.raw(), 0x2120_0000_0000_0000);
/// assert_eq!(cell.resolution(), Resolution::new(4));
/// assert_eq!(cell.code().raw(), 0x1200_0000_0000_0000);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u64", into = "u64")
)]
pub struct GeoCell(u64);

impl GeoCell {
    /// Finest resolution a geocell can carry.
    pub const MAX_RESOLUTION: Resolution = Resolution::new(30);

    /// Packs the cell of `code` at `resolution`.
    ///
    /// # Panics
    ///
    /// Panics if `resolution` is 32.
    #[must_use]
    pub const fn new(code: GeoCode, resolution: Resolution) -> Self {
        assert!(
            resolution.get() <= Self::MAX_RESOLUTION.get(),
            "GeoCell resolution must be at most 30"
        );
        let tag = (resolution.nibbles() as u64) << 60;
        Self(tag | (code.prefix(resolution).raw() >> 4))
    }

    /// Wraps a raw geocell, checking that it carries a resolution tag.
    pub const fn from_raw(raw: u64) -> Result<Self, GeoCellError> {
        if raw >> 60 == 0 {
            Err(GeoCellError(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// Returns the raw packed value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Resolution of the cell.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "tag is a single nibble")]
    pub const fn resolution(self) -> Resolution {
        Resolution::new(((self.0 >> 60) as u8) * 2)
    }

    /// Normalized code of the cell.
    #[must_use]
    pub const fn code(self) -> GeoCode {
        GeoCode::from_raw(self.0 << 4).prefix(self.resolution())
    }

    /// The 16 geocells one resolution finer, or `None` at resolution 30
    /// whose children have no geocell form.
    ///
    /// ```
    /// use understory_geocode::GeoCell;
    ///
    /// let root = GeoCell::from_raw(0x1000_0000_0000_0000).unwrap();
    /// let children = root.children().unwrap();
    /// assert_eq!(children[0].raw(), 0x2000_0000_0000_0000);
    /// assert_eq!(children[15].raw(), 0x20f0_0000_0000_0000);
    /// ```
    #[must_use]
    pub fn children(self) -> Option<[Self; 16]> {
        let resolution = self.resolution();
        let finer = resolution.finer().filter(|r| *r <= Self::MAX_RESOLUTION)?;
        let codes = self.code().children(resolution)?;
        Some(codes.map(|code| Self::new(code, finer)))
    }
}

impl fmt::Debug for GeoCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolution = self.resolution();
        f.debug_struct("GeoCell")
            .field("resolution", &resolution.get())
            .field("code", &self.code().to_hex(resolution))
            .finish()
    }
}

impl TryFrom<u64> for GeoCell {
    type Error = GeoCellError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<GeoCell> for u64 {
    fn from(cell: GeoCell) -> Self {
        cell.0
    }
}
