// Core value types shared by the board, the win scan, and the game state.
//
// `Piece` is a closed two-value enum; raw bytes from the wire go through
// `Piece::from_wire`, so an out-of-range piece number can never reach the
// board. `Field` is what a board query returns, including `Invalid` for
// coordinates off the board. `Invalid` compares unequal to every occupied
// field, which is what lets the win scan run off the edge without special
// cases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two players' pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    One = 1,
    Two = 2,
}

impl Piece {
    /// Convert a wire byte (1 or 2) into a piece. Anything else is `None`.
    pub fn from_wire(value: u8) -> Option<Piece> {
        match value {
            1 => Some(Piece::One),
            2 => Some(Piece::Two),
            _ => None,
        }
    }

    /// The wire/engine number of this piece (1 or 2).
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The other player's piece.
    pub fn opponent(self) -> Piece {
        match self {
            Piece::One => Piece::Two,
            Piece::Two => Piece::One,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

/// Contents of a board position as seen by a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Empty,
    Occupied(Piece),
    /// The queried coordinate is off the board.
    Invalid,
}

impl Field {
    /// Integer encoding used by the local engine interface:
    /// 0 = empty, 1/2 = piece, -1 = invalid coordinate.
    pub fn as_i8(self) -> i8 {
        match self {
            Field::Empty => 0,
            Field::Occupied(piece) => piece.number() as i8,
            Field::Invalid => -1,
        }
    }

    pub fn piece(self) -> Option<Piece> {
        match self {
            Field::Occupied(piece) => Some(piece),
            Field::Empty | Field::Invalid => None,
        }
    }
}

/// A board position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub column: usize,
    pub row: usize,
}

impl CellCoord {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Draw,
    Won(Piece),
}
