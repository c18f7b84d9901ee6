#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::IVec2;

pub const NORTH: IVec2 = IVec2 { x: 0, y: 1 };
pub const NORTH_EAST: IVec2 = IVec2 { x: 1, y: 1 };
pub const NORTH_WEST: IVec2 = IVec2 { x: -1, y: 1 };
pub const EAST: IVec2 = IVec2 { x: 1, y: 0 };
pub const SOUTH: IVec2 = IVec2 { x: 0, y: -1 };
pub const SOUTH_EAST: IVec2 = IVec2 { x: 1, y: -1 };
pub const SOUTH_WEST: IVec2 = IVec2 { x: -1, y: -1 };
pub const WEST: IVec2 = IVec2 { x: -1, y: 0 };

/// Terminator byte appended to the raw code encoding of a route.
pub const DIR_END: u8 = 255;

/// A movement direction on the grid.
///
/// The discriminants are a stable wire encoding: diagonals are exactly the
/// odd codes, and `code ^ 4` is the opposite direction.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    /// All eight directions, in code order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four cardinal directions, in code order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the wire code for this direction.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Direction> {
        match code {
            0 => Some(Direction::North),
            1 => Some(Direction::NorthEast),
            2 => Some(Direction::East),
            3 => Some(Direction::SouthEast),
            4 => Some(Direction::South),
            5 => Some(Direction::SouthWest),
            6 => Some(Direction::West),
            7 => Some(Direction::NorthWest),
            _ => None,
        }
    }

    /// Returns the opposite direction, equivalent to `code ^ 4`.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Returns the unit vector for this direction.
    #[inline]
    #[must_use]
    pub const fn unit(self) -> IVec2 {
        match self {
            Direction::North => NORTH,
            Direction::NorthEast => NORTH_EAST,
            Direction::NorthWest => NORTH_WEST,
            Direction::East => EAST,
            Direction::South => SOUTH,
            Direction::SouthEast => SOUTH_EAST,
            Direction::SouthWest => SOUTH_WEST,
            Direction::West => WEST,
        }
    }

    /// Returns true if this direction is cardinal (N, E, S, W).
    #[inline]
    #[must_use]
    pub const fn is_cardinal(self) -> bool {
        self.code() & 1 == 0
    }

    /// Returns true if this direction is diagonal (NE, SE, SW, NW).
    #[inline]
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.code() & 1 == 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
        assert_eq!(Direction::from_code(8), None);
        assert_eq!(Direction::from_code(DIR_END), None);
    }

    #[test]
    fn test_opposite_is_xor_4() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().code(), dir.code() ^ 4);
        }
    }

    #[test]
    fn test_opposite_unit_is_negated() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().unit(), -dir.unit());
        }
    }

    #[test]
    fn test_diagonals_are_odd_codes() {
        assert!(Direction::North.is_cardinal());
        assert!(Direction::East.is_cardinal());
        assert!(Direction::NorthEast.is_diagonal());
        assert!(Direction::SouthWest.is_diagonal());
        for dir in Direction::ALL {
            assert_ne!(dir.is_cardinal(), dir.is_diagonal());
        }
        for dir in Direction::CARDINAL {
            assert!(dir.is_cardinal());
        }
    }
}
