// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for checked construction and text parsing.

use alloc::string::String;

/// Error returned by [`Resolution::try_new`](crate::Resolution::try_new).
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("resolution {0} is not an even value in 2..=32")]
pub struct ResolutionError(pub u8);

/// Error returned when parsing a hex geocode or a coverage string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input contained no hex digits.
    #[error("empty geocode")]
    Empty,
    /// The input is longer than the 16 nibbles of a 64-bit code.
    #[error("geocode `{0}` is longer than 16 nibbles")]
    TooLong(String),
    /// The input contains a character that is not a hex digit.
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit {
        /// The offending character.
        digit: char,
        /// Its character index within the token.
        position: usize,
    },
}

/// Error returned by [`GeoCell::from_raw`](crate::GeoCell::from_raw).
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("geocell {0:#018x} has no resolution tag")]
pub struct GeoCellError(pub u64);
