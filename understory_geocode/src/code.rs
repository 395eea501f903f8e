// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point codes: quantization, bit interleaving, and the hex text form.

use alloc::format;
use alloc::string::String;
use core::fmt;
use core::str::FromStr;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for `floor`

use crate::error::ParseError;
use crate::resolution::Resolution;

/// Degrees of latitude per quantized unit.
pub const DEGREES_PER_LAT_UNIT: f64 = 180.0 / 4_294_967_296.0;

/// Degrees of longitude per quantized unit.
pub const DEGREES_PER_LON_UNIT: f64 = 360.0 / 4_294_967_296.0;

const MAX_COORD: i64 = 0xffff_ffff;

/// A 64-bit Z-order code for a point or a cell.
///
/// The code interleaves the 32-bit quantized latitude and longitude, most
/// significant pair first, latitude bit before longitude bit. Each nibble
/// therefore selects one of 16 sub-cells, and the first `R / 2` nibbles
/// identify a cell at [`Resolution`] `R`. Codes of cells are normalized: the
/// bits below their resolution are zero.
///
/// ```
/// use understory_geocode::{GeoCode, Resolution};
///
/// let code = GeoCode::from_lat_lon(48.0, -4.5);
/// assert_eq!(code.to_hex(Resolution::MAX), "b570707070707071");
/// assert_eq!(code.to_hex(Resolution::new(8)), "b570");
/// assert_eq!(code.prefix(Resolution::new(8)).raw(), 0xb570_0000_0000_0000);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct GeoCode(u64);

/// Quantizes a latitude in degrees to a 32-bit coordinate.
///
/// Values above 90° clamp to `0xffff_ffff`. Values below -90° are not
/// clamped and keep the low 32 bits of their (negative) quantized value.
#[must_use]
pub fn quantize_lat(lat: f64) -> u32 {
    quantize(lat + 90.0, DEGREES_PER_LAT_UNIT)
}

/// Quantizes a longitude in degrees to a 32-bit coordinate.
///
/// See [`quantize_lat`] for the handling of out of range values.
#[must_use]
pub fn quantize_lon(lon: f64) -> u32 {
    quantize(lon + 180.0, DEGREES_PER_LON_UNIT)
}

/// Converts a quantized latitude back to degrees.
#[must_use]
pub fn dequantize_lat(lat: u32) -> f64 {
    f64::from(lat) * DEGREES_PER_LAT_UNIT - 90.0
}

/// Converts a quantized longitude back to degrees.
#[must_use]
pub fn dequantize_lon(lon: u32) -> f64 {
    f64::from(lon) * DEGREES_PER_LON_UNIT - 180.0
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "float casts saturate and negative values keep their low 32 bits"
)]
fn quantize(shifted: f64, unit: f64) -> u32 {
    let units = (shifted / unit + 0.5).floor() as i64;
    units.min(MAX_COORD) as u32
}

/// Spreads the 32 bits of `x` over the even bits of a `u64`.
const fn spread(x: u32) -> u64 {
    let mut x = x as u64;
    x = (x | (x << 16)) & 0x0000_ffff_0000_ffff;
    x = (x | (x << 8)) & 0x00ff_00ff_00ff_00ff;
    x = (x | (x << 4)) & 0x0f0f_0f0f_0f0f_0f0f;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Gathers the even bits of `x` into a `u32`.
#[expect(clippy::cast_possible_truncation, reason = "masked to 32 bits")]
const fn compact(x: u64) -> u32 {
    let mut x = x & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0f0f_0f0f_0f0f_0f0f;
    x = (x | (x >> 4)) & 0x00ff_00ff_00ff_00ff;
    x = (x | (x >> 8)) & 0x0000_ffff_0000_ffff;
    x = (x | (x >> 16)) & 0x0000_0000_ffff_ffff;
    x as u32
}

impl GeoCode {
    /// The code of the south-west corner of the globe.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw 64-bit code.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit code.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Encodes a point given in degrees at full resolution.
    #[must_use]
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self::from_coords(quantize_lat(lat), quantize_lon(lon), Resolution::MAX)
    }

    /// Builds a code from quantized coordinates, keeping only the top
    /// `resolution` bits of each.
    #[must_use]
    pub const fn from_coords(lat: u32, lon: u32, resolution: Resolution) -> Self {
        Self(((spread(lat) << 1) | spread(lon)) & resolution.code_prefix_mask())
    }

    /// Splits the code into quantized `(lat, lon)` coordinates.
    ///
    /// Only the top `resolution` bits of each coordinate are extracted; the
    /// rest are zero, so the result is the south-west corner of the cell.
    #[must_use]
    pub const fn coords(self, resolution: Resolution) -> (u32, u32) {
        let code = self.0 & resolution.code_prefix_mask();
        (compact(code >> 1), compact(code))
    }

    /// Decodes the south-west corner of the cell at `resolution` to degrees.
    #[must_use]
    pub fn to_lat_lon(self, resolution: Resolution) -> (f64, f64) {
        let (lat, lon) = self.coords(resolution);
        (dequantize_lat(lat), dequantize_lon(lon))
    }

    /// The code of the cell at `resolution` containing this code.
    #[must_use]
    pub const fn prefix(self, resolution: Resolution) -> Self {
        Self(self.0 & resolution.code_prefix_mask())
    }

    /// The sub-cell nibble selected at `resolution`, in `0..16`.
    ///
    /// This is the last significant nibble of the cell at `resolution`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "masked to 4 bits")]
    pub const fn offset(self, resolution: Resolution) -> u8 {
        ((self.0 >> resolution.code_shift()) & 0xf) as u8
    }

    /// The containing cell one resolution coarser, if any.
    #[must_use]
    pub const fn parent(self, resolution: Resolution) -> Option<Self> {
        match resolution.coarser() {
            Some(coarser) => Some(self.prefix(coarser)),
            None => None,
        }
    }

    /// The 16 cells one resolution finer inside the cell at `resolution`, in
    /// Z-order, or `None` at full resolution.
    #[must_use]
    pub fn children(self, resolution: Resolution) -> Option<[Self; 16]> {
        let finer = resolution.finer()?;
        let prefix = self.prefix(resolution).0;
        let shift = finer.code_shift();
        Some(core::array::from_fn(|nibble| Self(prefix | ((nibble as u64) << shift))))
    }

    /// The code of the center of the cell at `resolution`.
    ///
    /// At full resolution a cell is a single point and is its own center.
    #[must_use]
    pub const fn center(self, resolution: Resolution) -> Self {
        let prefix = self.prefix(resolution);
        if resolution.get() == Resolution::MAX.get() {
            prefix
        } else {
            Self(prefix.0 | (0xc << (resolution.code_shift() - 4)))
        }
    }

    /// Whether the cell at `resolution` identified by `self` contains `point`.
    #[must_use]
    pub const fn contains(self, resolution: Resolution, point: Self) -> bool {
        point.0 & resolution.code_prefix_mask() == self.0 & resolution.code_prefix_mask()
    }

    /// Formats the code as lowercase hex truncated to `resolution / 2` nibbles.
    #[must_use]
    pub fn to_hex(self, resolution: Resolution) -> String {
        let mut hex = format!("{:016x}", self.0);
        hex.truncate(resolution.nibbles());
        hex
    }

    /// Parses a hex code, padding it on the right with zeros to 16 nibbles.
    ///
    /// The number of digits gives the resolution of the cell the string
    /// denotes: `"f"` is `0xf000_0000_0000_0000`.
    pub fn from_hex(hex: &str) -> Result<Self, ParseError> {
        if hex.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut raw = 0_u64;
        for (position, digit) in hex.chars().enumerate() {
            if position >= 16 {
                return Err(ParseError::TooLong(hex.into()));
            }
            let value = digit
                .to_digit(16)
                .ok_or(ParseError::InvalidDigit { digit, position })?;
            raw = (raw << 4) | u64::from(value);
        }
        let nibbles = hex.len();
        if nibbles < 16 {
            raw <<= 4 * (16 - nibbles);
        }
        Ok(Self(raw))
    }

    /// Returns the full hex code followed by the hex prefix at each
    /// resolution from `lo` to `hi`, space separated.
    ///
    /// These are the terms a search index stores for a point so that cell
    /// queries at any of those resolutions become prefix term lookups.
    ///
    /// ```
    /// use understory_geocode::{GeoCode, Resolution};
    ///
    /// let code = GeoCode::from_raw(0x0123_4567_89ab_cdef);
    /// assert_eq!(
    ///     code.to_indexable_string(Resolution::new(2), Resolution::new(4)),
    ///     "0123456789abcdef 0 01",
    /// );
    /// ```
    #[must_use]
    pub fn to_indexable_string(self, lo: Resolution, hi: Resolution) -> String {
        let full = self.to_hex(Resolution::MAX);
        let mut out = String::with_capacity(64);
        out.push_str(&full);
        for resolution in Resolution::all().filter(|r| *r >= lo && *r <= hi) {
            out.push(' ');
            out.push_str(&full[..resolution.nibbles()]);
        }
        out
    }
}

impl fmt::Debug for GeoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoCode({:#018x})", self.0)
    }
}

impl fmt::Display for GeoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for GeoCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<GeoCode> for u64 {
    fn from(code: GeoCode) -> Self {
        code.0
    }
}

impl From<u64> for GeoCode {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_points() {
        assert_eq!(GeoCode::from_lat_lon(0.0, 0.0).raw(), 0xc000_0000_0000_0000);
        assert_eq!(GeoCode::from_lat_lon(-90.0, -180.0).raw(), 0);
        assert_eq!(GeoCode::from_lat_lon(90.0, 180.0).raw(), u64::MAX);
        assert_eq!(
            GeoCode::from_lat_lon(48.0, -4.5).raw(),
            0xb570_7070_7070_7071
        );
    }

    #[test]
    fn encode_clamps_above_range() {
        assert_eq!(GeoCode::from_lat_lon(91.0, 181.0).raw(), u64::MAX);
        assert_eq!(quantize_lat(1000.0), 0xffff_ffff);
    }

    #[test]
    fn interleave_inverts() {
        let (lat, lon) = (0x8765_4321, 0x0fed_cba9);
        let code = GeoCode::from_coords(lat, lon, Resolution::MAX);
        assert_eq!(code.coords(Resolution::MAX), (lat, lon));
        let lat_only = GeoCode::from_coords(0xffff_ffff, 0, Resolution::MAX);
        let lon_only = GeoCode::from_coords(0, 0xffff_ffff, Resolution::MAX);
        assert_eq!(lat_only.raw(), 0xaaaa_aaaa_aaaa_aaaa);
        assert_eq!(lon_only.raw(), 0x5555_5555_5555_5555);
    }

    #[test]
    fn build_keeps_top_bits_left_justified() {
        let r = Resolution::new(4);
        let code = GeoCode::from_coords(0xffff_ffff, 0xffff_ffff, r);
        assert_eq!(code.raw(), 0xff00_0000_0000_0000);
        assert_eq!(code.coords(r), (0xf000_0000, 0xf000_0000));
    }

    #[test]
    fn decode_to_degrees() {
        let (lat, lon) = GeoCode::from_raw(0xc000_0000_0000_0000).to_lat_lon(Resolution::MIN);
        assert_eq!((lat, lon), (0.0, 0.0));
        let (lat, lon) = GeoCode::ZERO.to_lat_lon(Resolution::MAX);
        assert_eq!((lat, lon), (-90.0, -180.0));
    }

    #[test]
    fn hex_truncates_to_resolution() {
        let code = GeoCode::from_raw(0x1234_5678_9abc_def0);
        assert_eq!(code.to_hex(Resolution::MIN), "1");
        assert_eq!(code.to_hex(Resolution::new(16)), "12345678");
        assert_eq!(code.to_hex(Resolution::MAX), "123456789abcdef0");
        assert_eq!(
            GeoCode::from_raw(0xf).to_hex(Resolution::MAX),
            "000000000000000f"
        );
    }

    #[test]
    fn hex_parse_pads_right() {
        assert_eq!(
            GeoCode::from_hex("f").map(GeoCode::raw),
            Ok(0xf000_0000_0000_0000)
        );
        assert_eq!(
            "b570".parse::<GeoCode>().map(GeoCode::raw),
            Ok(0xb570_0000_0000_0000)
        );
        assert_eq!(
            GeoCode::from_hex("123456789ABCDEF0").map(GeoCode::raw),
            Ok(0x1234_5678_9abc_def0)
        );
    }

    #[test]
    fn hex_parse_errors() {
        assert_eq!(GeoCode::from_hex(""), Err(ParseError::Empty));
        assert_eq!(
            GeoCode::from_hex("0123456789abcdef0"),
            Err(ParseError::TooLong("0123456789abcdef0".into()))
        );
        assert_eq!(
            GeoCode::from_hex("12g4"),
            Err(ParseError::InvalidDigit {
                digit: 'g',
                position: 2
            })
        );
    }

    #[test]
    fn prefix_offset_parent_center() {
        let code = GeoCode::from_raw(0x1234_5678_9abc_def0);
        let r = Resolution::new(8);
        assert_eq!(code.prefix(r).raw(), 0x1234_0000_0000_0000);
        assert_eq!(code.offset(r), 4);
        assert_eq!(
            code.parent(r).map(GeoCode::raw),
            Some(0x1230_0000_0000_0000)
        );
        assert_eq!(code.parent(Resolution::MIN), None);
        assert_eq!(code.center(r).raw(), 0x1234_c000_0000_0000);
        assert_eq!(code.center(Resolution::MAX), code);
        assert!(code.prefix(r).contains(r, code));
        assert!(!code.prefix(r).contains(r, GeoCode::ZERO));
    }

    #[test]
    fn indexable_string_lists_prefixes() {
        let code = GeoCode::from_raw(0x0123_4567_89ab_cdef);
        assert_eq!(
            code.to_indexable_string(Resolution::new(6), Resolution::new(10)),
            "0123456789abcdef 012 0123 01234"
        );
        assert_eq!(
            code.to_indexable_string(Resolution::new(10), Resolution::new(6)),
            "0123456789abcdef"
        );
    }

    #[test]
    fn display_and_debug() {
        let code = GeoCode::from_raw(0xab);
        assert_eq!(format!("{code}"), "00000000000000ab");
        assert_eq!(format!("{code:?}"), "GeoCode(0x00000000000000ab)");
    }
}
