// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell resolutions and the bit masks derived from them.

use core::fmt;

use crate::error::ResolutionError;

/// Precision level of a cell: an even number of significant bits per axis.
///
/// Resolutions range from 2 (the coarsest, 16 cells covering the globe) to 32
/// (full point precision). A [`GeoCode`](crate::GeoCode) at resolution `R`
/// has `2R` significant bits, which is `R / 2` hex nibbles. Between two
/// consecutive resolutions each axis is split in four, so a cell has 16
/// children at the next finer resolution, one per value of its next nibble.
///
/// # Example
///
/// ```
/// use understory_geocode::Resolution;
///
/// const STREET: Resolution = Resolution::new(20);
///
/// assert_eq!(STREET.nibbles(), 10);
/// assert_eq!(STREET.cell_width(), 1 << 12);
/// assert_eq!(STREET.coarser(), Some(Resolution::new(18)));
/// assert!(Resolution::try_new(19).is_err());
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct Resolution(u8);

impl Resolution {
    /// The coarsest resolution.
    pub const MIN: Self = Self(2);

    /// The finest resolution, at which a code addresses a single point.
    pub const MAX: Self = Self(32);

    /// Number of distinct resolutions.
    pub const COUNT: usize = 16;

    /// Creates a resolution.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is odd or outside `2..=32`.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        assert!(
            bits >= 2 && bits <= 32 && bits % 2 == 0,
            "Resolution must be an even value in 2..=32"
        );
        Self(bits)
    }

    /// Creates a resolution, returning an error for odd or out of range values.
    pub const fn try_new(bits: u8) -> Result<Self, ResolutionError> {
        if bits >= 2 && bits <= 32 && bits % 2 == 0 {
            Ok(Self(bits))
        } else {
            Err(ResolutionError(bits))
        }
    }

    /// Returns the resolution for a bucket index in `0..16`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 16`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "index is below 16")]
    pub const fn from_index(index: usize) -> Self {
        assert!(index < Self::COUNT, "Resolution index must be less than 16");
        Self((index as u8 + 1) * 2)
    }

    /// Number of significant bits per axis.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Dense index of this resolution, `0` for resolution 2 up to `15` for 32.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 / 2 - 1) as usize
    }

    /// Number of hex nibbles in the textual form of a code at this resolution.
    #[must_use]
    pub const fn nibbles(self) -> usize {
        (self.0 / 2) as usize
    }

    /// The next coarser resolution, if any.
    #[must_use]
    pub const fn coarser(self) -> Option<Self> {
        if self.0 > 2 {
            Some(Self(self.0 - 2))
        } else {
            None
        }
    }

    /// The next finer resolution, if any.
    #[must_use]
    pub const fn finer(self) -> Option<Self> {
        if self.0 < 32 {
            Some(Self(self.0 + 2))
        } else {
            None
        }
    }

    /// Iterates over all resolutions from coarsest to finest.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator + Clone {
        (0..Self::COUNT).map(Self::from_index)
    }

    /// Number of low coordinate bits that are not significant at this resolution.
    #[must_use]
    pub const fn cell_shift(self) -> u32 {
        32 - self.0 as u32
    }

    /// Width of a cell along one axis, in quantized coordinate units.
    #[must_use]
    pub const fn cell_width(self) -> u32 {
        1 << self.cell_shift()
    }

    /// Mask of the insignificant low bits of a quantized coordinate.
    #[must_use]
    pub const fn coord_offset_mask(self) -> u32 {
        self.cell_width() - 1
    }

    /// Mask of the significant high bits of a quantized coordinate.
    #[must_use]
    pub const fn coord_prefix_mask(self) -> u32 {
        !self.coord_offset_mask()
    }

    /// Number of low code bits that are not significant at this resolution.
    #[must_use]
    pub const fn code_shift(self) -> u32 {
        2 * self.cell_shift()
    }

    /// Mask of the `2R` significant high bits of a code.
    #[must_use]
    pub const fn code_prefix_mask(self) -> u64 {
        u64::MAX << self.code_shift()
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resolution").field(&self.0).finish()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u8> for Resolution {
    type Error = ResolutionError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::try_new(bits)
    }
}

impl From<Resolution> for u8 {
    fn from(resolution: Resolution) -> Self {
        resolution.0
    }
}
