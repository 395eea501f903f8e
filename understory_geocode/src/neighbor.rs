// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Navigation between adjacent cells.
//!
//! Moves operate on the full-precision coordinates of a code: the cell width
//! at the requested resolution is added to or subtracted from the latitude,
//! the longitude, or both, with 32-bit wraparound, and the code is rebuilt.
//! Bits below the resolution are carried along unchanged, so a normalized
//! cell code stays normalized.
//!
//! Wraparound applies on both axes. Moving north from the top row lands in
//! the bottom row, which is a torus rather than a sphere; callers that need
//! polar behavior must check the latitude themselves.

use crate::code::GeoCode;
use crate::resolution::Resolution;

/// One of the eight compass directions to an adjacent cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Latitude increases.
    North,
    /// Latitude and longitude increase.
    NorthEast,
    /// Longitude increases.
    East,
    /// Latitude decreases, longitude increases.
    SouthEast,
    /// Latitude decreases.
    South,
    /// Latitude and longitude decrease.
    SouthWest,
    /// Longitude decreases.
    West,
    /// Latitude increases, longitude decreases.
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// Sign of the latitude and longitude steps, each in `-1..=1`.
    #[must_use]
    pub const fn steps(self) -> (i8, i8) {
        match self {
            Self::North => (1, 0),
            Self::NorthEast => (1, 1),
            Self::East => (0, 1),
            Self::SouthEast => (-1, 1),
            Self::South => (-1, 0),
            Self::SouthWest => (-1, -1),
            Self::West => (0, -1),
            Self::NorthWest => (1, -1),
        }
    }
}

const fn step(coord: u32, sign: i8, width: u32) -> u32 {
    match sign {
        1 => coord.wrapping_add(width),
        -1 => coord.wrapping_sub(width),
        _ => coord,
    }
}

impl GeoCode {
    /// The adjacent code in `direction` at `resolution`.
    ///
    /// ```
    /// use understory_geocode::{Direction, GeoCode, Resolution};
    ///
    /// let origin = GeoCode::ZERO;
    /// let up = origin.neighbor(Direction::North, Resolution::MIN);
    /// assert_eq!(up.raw(), 0x2000_0000_0000_0000);
    /// assert_eq!(up.neighbor(Direction::South, Resolution::MIN), origin);
    /// ```
    #[must_use]
    pub const fn neighbor(self, direction: Direction, resolution: Resolution) -> Self {
        let (lat, lon) = self.coords(Resolution::MAX);
        let (dlat, dlon) = direction.steps();
        let width = resolution.cell_width();
        Self::from_coords(
            step(lat, dlat, width),
            step(lon, dlon, width),
            Resolution::MAX,
        )
    }

    /// All eight adjacent codes, in the order of [`Direction::ALL`].
    #[must_use]
    pub fn neighbors(self, resolution: Resolution) -> [Self; 8] {
        Direction::ALL.map(|direction| self.neighbor(direction, resolution))
    }

    /// The adjacent code to the north.
    #[must_use]
    pub const fn north(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::North, resolution)
    }

    /// The adjacent code to the north-east.
    #[must_use]
    pub const fn north_east(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::NorthEast, resolution)
    }

    /// The adjacent code to the east.
    #[must_use]
    pub const fn east(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::East, resolution)
    }

    /// The adjacent code to the south-east.
    #[must_use]
    pub const fn south_east(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::SouthEast, resolution)
    }

    /// The adjacent code to the south.
    #[must_use]
    pub const fn south(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::South, resolution)
    }

    /// The adjacent code to the south-west.
    #[must_use]
    pub const fn south_west(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::SouthWest, resolution)
    }

    /// The adjacent code to the west.
    #[must_use]
    pub const fn west(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::West, resolution)
    }

    /// The adjacent code to the north-west.
    #[must_use]
    pub const fn north_west(self, resolution: Resolution) -> Self {
        self.neighbor(Direction::NorthWest, resolution)
    }
}
