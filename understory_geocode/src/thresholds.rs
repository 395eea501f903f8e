// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-resolution clustering thresholds for coverage optimization.

use core::fmt;

use crate::resolution::Resolution;

/// Sixteen 4-bit thresholds, one per [`Resolution`].
///
/// During [`Coverage::optimize`](crate::Coverage::optimize), a group of
/// sibling cells at resolution `R` is replaced by its parent when it holds at
/// least `threshold(R)` distinct cells. A threshold of `0` only merges
/// complete groups of 16.
///
/// The packed form stores resolution 2 in the top nibble down to resolution
/// 32 in the bottom one, which is the layout used to persist thresholds
/// alongside indexed shapes.
///
/// ```
/// use understory_geocode::{Resolution, Thresholds};
///
/// let t = Thresholds::NONE.with(Resolution::new(4), 4);
/// assert_eq!(t.to_packed(), 0x0400_0000_0000_0000);
/// assert_eq!(Thresholds::from_packed(0x0400_0000_0000_0000), t);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "u64", into = "u64")
)]
pub struct Thresholds([u8; Resolution::COUNT]);

impl Thresholds {
    /// No partial merging at any resolution.
    pub const NONE: Self = Self([0; Resolution::COUNT]);

    /// Unpacks thresholds from their 64-bit stored form.
    #[must_use]
    pub const fn from_packed(packed: u64) -> Self {
        let mut values = [0_u8; Resolution::COUNT];
        let mut i = 0;
        while i < Resolution::COUNT {
            #[expect(clippy::cast_possible_truncation, reason = "masked to 4 bits")]
            let value = ((packed >> (60 - 4 * i)) & 0xf) as u8;
            values[i] = value;
            i += 1;
        }
        Self(values)
    }

    /// Packs the thresholds into their 64-bit stored form.
    #[must_use]
    pub const fn to_packed(&self) -> u64 {
        let mut packed = 0_u64;
        let mut i = 0;
        while i < Resolution::COUNT {
            packed |= (self.0[i] as u64) << (60 - 4 * i);
            i += 1;
        }
        packed
    }

    /// The threshold for `resolution`.
    #[must_use]
    pub const fn get(&self, resolution: Resolution) -> u8 {
        self.0[resolution.index()]
    }

    /// Returns a copy with the threshold for `resolution` replaced.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in 4 bits.
    #[must_use]
    pub const fn with(mut self, resolution: Resolution, value: u8) -> Self {
        assert!(value <= 15, "Thresholds are 4-bit values");
        self.0[resolution.index()] = value;
        self
    }

    /// Replaces the threshold for `resolution`.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in 4 bits.
    pub fn set(&mut self, resolution: Resolution, value: u8) {
        *self = self.with(resolution, value);
    }
}

impl fmt::Debug for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thresholds({:#018x})", self.to_packed())
    }
}

impl From<u64> for Thresholds {
    fn from(packed: u64) -> Self {
        Self::from_packed(packed)
    }
}

impl From<Thresholds> for u64 {
    fn from(thresholds: Thresholds) -> Self {
        thresholds.to_packed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn packed_layout() {
        let t = Thresholds::from_packed(0x1234_5678_9abc_def0);
        assert_eq!(t.get(Resolution::MIN), 1);
        assert_eq!(t.get(Resolution::new(4)), 2);
        assert_eq!(t.get(Resolution::new(30)), 0xf);
        assert_eq!(t.get(Resolution::MAX), 0);
        assert_eq!(t.to_packed(), 0x1234_5678_9abc_def0);
        assert_eq!(Thresholds::from_packed(1).get(Resolution::MAX), 1);
    }

    #[test]
    fn with_and_set() {
        let mut t = Thresholds::NONE.with(Resolution::MAX, 7);
        assert_eq!(t.to_packed(), 7);
        t.set(Resolution::MIN, 15);
        assert_eq!(t.to_packed(), 0xf000_0000_0000_0007);
        assert_eq!(format!("{t:?}"), "Thresholds(0xf000000000000007)");
    }

    #[test]
    #[should_panic(expected = "Thresholds are 4-bit values")]
    fn with_rejects_wide_values() {
        let _ = Thresholds::NONE.with(Resolution::MIN, 16);
    }
}
