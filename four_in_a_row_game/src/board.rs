// Column-major grid for a four-in-a-row board.
//
// Cells are stored as a flat `Vec<Option<Piece>>` indexed by
// `column * rows + row`, so one column is a contiguous slice and gravity
// placement is a scan for the first `None`. Placement is the only mutation,
// which keeps every column packed from row 0 upward (no floating pieces).
//
// Queries take signed coordinates and return `Field::Invalid` off the board
// instead of panicking. The win scan in `win.rs` relies on this to walk past
// the edges freely.
//
// Deserialization goes through `BoardCells` and rejects storage that does
// not match the dimensions or has a gap below a piece.
//
// See also: `game.rs`, which owns the board and enforces turn order on top
// of these raw placement rules.

use serde::{Deserialize, Serialize};

use crate::types::{Field, Piece};

/// A `columns × rows` four-in-a-row board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardCells")]
pub struct Board {
    /// Flat storage: index = column * rows + row.
    cells: Vec<Option<Piece>>,
    columns: usize,
    rows: usize,
}

impl Board {
    /// Create an empty board.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            cells: vec![None; columns * rows],
            columns,
            rows,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Check whether a coordinate is on the board.
    pub fn in_bounds(&self, column: i32, row: i32) -> bool {
        column >= 0 && row >= 0 && (column as usize) < self.columns && (row as usize) < self.rows
    }

    fn column_slice(&self, column: usize) -> &[Option<Piece>] {
        &self.cells[column * self.rows..(column + 1) * self.rows]
    }

    /// Drop `piece` into `column`. Returns the row it landed in, or `None`
    /// (and leaves the board untouched) if the column is out of range or
    /// already full.
    pub fn place_piece(&mut self, column: usize, piece: Piece) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        let row = self.column_slice(column).iter().position(Option::is_none)?;
        self.cells[column * self.rows + row] = Some(piece);
        Some(row)
    }

    /// Read a position. Off-board coordinates yield `Field::Invalid`.
    pub fn get_field(&self, column: i32, row: i32) -> Field {
        if !self.in_bounds(column, row) {
            return Field::Invalid;
        }
        match self.cells[column as usize * self.rows + row as usize] {
            Some(piece) => Field::Occupied(piece),
            None => Field::Empty,
        }
    }

    /// True when every column's top slot is occupied.
    pub fn is_full(&self) -> bool {
        (0..self.columns).all(|column| self.is_column_full(column))
    }

    /// True when the column's top slot is occupied. Out-of-range columns
    /// count as full since nothing can be placed there.
    pub fn is_column_full(&self, column: usize) -> bool {
        if column >= self.columns {
            return true;
        }
        self.column_slice(column).last().is_none_or(Option::is_some)
    }

    /// Highest occupied row in `column`, or `None` if the column is empty or
    /// out of range.
    pub fn last_placed_row(&self, column: usize) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        self.column_slice(column).iter().rposition(Option::is_some)
    }
}

/// Unchecked serialized form of a `Board`.
#[derive(Deserialize)]
struct BoardCells {
    cells: Vec<Option<Piece>>,
    columns: usize,
    rows: usize,
}

impl TryFrom<BoardCells> for Board {
    type Error = String;

    fn try_from(raw: BoardCells) -> Result<Self, Self::Error> {
        let BoardCells {
            cells,
            columns,
            rows,
        } = raw;
        if columns.checked_mul(rows) != Some(cells.len()) {
            return Err(format!(
                "{} cells do not fill a {columns} x {rows} board",
                cells.len()
            ));
        }
        if rows > 0 {
            for (column, slice) in cells.chunks(rows).enumerate() {
                let filled = slice.iter().take_while(|cell| cell.is_some()).count();
                if slice[filled..].iter().any(Option::is_some) {
                    return Err(format!("column {column} has a piece above an empty cell"));
                }
            }
        }
        Ok(Self {
            cells,
            columns,
            rows,
        })
    }
}

impl Default for Board {
    /// The standard 7 × 6 board.
    fn default() -> Self {
        Self::new(7, 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_is_empty() {
        let board = Board::new(7, 6);
        for column in 0..7 {
            for row in 0..6 {
                assert_eq!(board.get_field(column, row), Field::Empty);
            }
        }
        assert!(!board.is_full());
    }

    #[test]
    fn pieces_stack_from_the_bottom() {
        let mut board = Board::new(7, 6);
        assert_eq!(board.place_piece(3, Piece::One), Some(0));
        assert_eq!(board.place_piece(3, Piece::Two), Some(1));
        assert_eq!(board.get_field(3, 0), Field::Occupied(Piece::One));
        assert_eq!(board.get_field(3, 1), Field::Occupied(Piece::Two));
        assert_eq!(board.get_field(3, 2), Field::Empty);
    }

    #[test]
    fn successive_rows_strictly_increase_until_full() {
        for rows in 1..8 {
            let mut board = Board::new(4, rows);
            let mut last = None;
            for i in 0..rows {
                let piece = if i % 2 == 0 { Piece::One } else { Piece::Two };
                let row = board.place_piece(2, piece).expect("column has room");
                if let Some(prev) = last {
                    assert!(row > prev);
                }
                last = Some(row);
            }
            assert_eq!(board.place_piece(2, Piece::One), None);
            assert!(board.is_column_full(2));
        }
    }

    #[test]
    fn full_column_rejects_without_mutation() {
        let mut board = Board::new(3, 2);
        board.place_piece(0, Piece::One).unwrap();
        board.place_piece(0, Piece::Two).unwrap();
        let before = board.clone();
        assert_eq!(board.place_piece(0, Piece::One), None);
        assert_eq!(board, before);
    }

    #[test]
    fn out_of_range_column_rejected() {
        let mut board = Board::new(7, 6);
        let before = board.clone();
        assert_eq!(board.place_piece(7, Piece::One), None);
        assert_eq!(board.place_piece(usize::MAX, Piece::One), None);
        assert_eq!(board, before);
    }

    #[test]
    fn out_of_bounds_queries_are_invalid() {
        let board = Board::new(7, 6);
        assert_eq!(board.get_field(-1, 0), Field::Invalid);
        assert_eq!(board.get_field(0, -1), Field::Invalid);
        assert_eq!(board.get_field(7, 0), Field::Invalid);
        assert_eq!(board.get_field(0, 6), Field::Invalid);
        assert_eq!(board.get_field(i32::MIN, i32::MAX), Field::Invalid);
    }

    #[test]
    fn is_full_only_when_every_top_slot_taken() {
        let mut board = Board::new(2, 2);
        board.place_piece(0, Piece::One).unwrap();
        board.place_piece(0, Piece::Two).unwrap();
        board.place_piece(1, Piece::One).unwrap();
        assert!(!board.is_full());
        board.place_piece(1, Piece::Two).unwrap();
        assert!(board.is_full());
    }

    #[test]
    fn last_placed_row_tracks_column_height() {
        let mut board = Board::new(7, 6);
        assert_eq!(board.last_placed_row(0), None);
        board.place_piece(0, Piece::One).unwrap();
        assert_eq!(board.last_placed_row(0), Some(0));
        board.place_piece(0, Piece::Two).unwrap();
        assert_eq!(board.last_placed_row(0), Some(1));
        assert_eq!(board.last_placed_row(1), None);
        assert_eq!(board.last_placed_row(99), None);
    }

    #[test]
    fn default_board_is_seven_by_six() {
        let board = Board::default();
        assert_eq!(board.columns(), 7);
        assert_eq!(board.rows(), 6);
    }

    #[test]
    fn deserialize_accepts_serialized_board() {
        let mut board = Board::new(3, 2);
        board.place_piece(1, Piece::Two).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn deserialize_rejects_cells_not_matching_dimensions() {
        let json = r#"{"cells":[null,null,null],"columns":7,"rows":6}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());

        let json = r#"{"cells":[],"columns":18446744073709551615,"rows":2}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_floating_piece() {
        let json = r#"{"cells":[null,"One"],"columns":1,"rows":2}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());
    }
}
