use serde::{Deserialize, Serialize};

/// Orthogonal neighbour offsets: north, south, east, west.
pub const FOUR_DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// All eight surrounding offsets, orthogonals first.
pub const EIGHT_DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (1, 0),
    (-1, 0),
    (1, -1),
    (-1, -1),
    (-1, 1),
    (1, 1),
];

/// The 3x3 block around a cell, the cell itself included.
pub const NINE_DIRECTIONS: [(i32, i32); 9] = [
    (0, -1),
    (0, 1),
    (1, 0),
    (-1, 0),
    (1, -1),
    (-1, -1),
    (-1, 1),
    (1, 1),
    (0, 0),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardinalDirection {
    North,
    East,
    West,
    South,
}

impl CardinalDirection {
    pub const ALL: [CardinalDirection; 4] = [
        CardinalDirection::North,
        CardinalDirection::East,
        CardinalDirection::West,
        CardinalDirection::South,
    ];

    /// Grid offset for one step; y grows downward.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            CardinalDirection::North => (0, -1),
            CardinalDirection::South => (0, 1),
            CardinalDirection::East => (1, 0),
            CardinalDirection::West => (-1, 0),
        }
    }

    pub fn reverse(&self) -> CardinalDirection {
        match self {
            CardinalDirection::North => CardinalDirection::South,
            CardinalDirection::South => CardinalDirection::North,
            CardinalDirection::East => CardinalDirection::West,
            CardinalDirection::West => CardinalDirection::East,
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, CardinalDirection::North | CardinalDirection::South)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_cancels_offset() {
        for dir in CardinalDirection::ALL {
            let (dx, dy) = dir.offset();
            let (rx, ry) = dir.reverse().offset();
            assert_eq!((dx + rx, dy + ry), (0, 0));
            assert_eq!(dir.reverse().reverse(), dir);
        }
    }

    #[test]
    fn tables_have_no_duplicates() {
        for (i, a) in NINE_DIRECTIONS.iter().enumerate() {
            for b in NINE_DIRECTIONS.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(EIGHT_DIRECTIONS.iter().all(|d| *d != (0, 0)));
        assert_eq!(&EIGHT_DIRECTIONS[..4], &FOUR_DIRECTIONS[..]);
    }
}
