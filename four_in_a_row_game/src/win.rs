// Four-in-a-row detection around a freshly placed piece.
//
// Only the piece that was just dropped can complete a new line, so instead
// of scanning the whole board we look at the four lines through that cell.
// For each direction there are exactly four 4-cell windows containing the
// cell (it can sit at window offset 0, 1, 2 or 3); a window wins when all
// four fields hold the placed piece. Off-board fields read as
// `Field::Invalid` and so never match.
//
// Scan order is fixed: horizontal, vertical, rising diagonal, falling
// diagonal; within a direction, windows are tried from the one furthest
// "behind" the cell forward. The first winning window is returned. This only
// matters when one placement completes two lines at once, and then it picks
// which four cells get highlighted.

use crate::board::Board;
use crate::types::{CellCoord, Field};

/// Line directions as (column step, row step), in scan order.
const DIRECTIONS: [(i32, i32); 4] = [
    // horizontal
    (1, 0),
    // vertical
    (0, 1),
    // rising diagonal
    (1, 1),
    // falling diagonal (left and up)
    (-1, 1),
];

/// Number of pieces in a winning line.
pub const LINE_LENGTH: i32 = 4;

/// Look for a four-in-a-row through the piece at `(column, row)`.
///
/// Returns the four winning coordinates in line order, or `None` if the cell
/// is empty, off the board, or not part of a winning line.
pub fn find_win(board: &Board, column: usize, row: usize) -> Option<[CellCoord; 4]> {
    let (Ok(column), Ok(row)) = (i32::try_from(column), i32::try_from(row)) else {
        return None;
    };
    let target = board.get_field(column, row);
    if !matches!(target, Field::Occupied(_)) {
        return None;
    }

    for (dc, dr) in DIRECTIONS {
        for start in (1 - LINE_LENGTH)..=0 {
            let cells: [(i32, i32); 4] = std::array::from_fn(|k| {
                let step = start + k as i32;
                (column + dc * step, row + dr * step)
            });
            if cells.iter().all(|&(c, r)| board.get_field(c, r) == target) {
                // Every cell matched an occupied field, so all are in bounds.
                return Some(cells.map(|(c, r)| CellCoord::new(c as usize, r as usize)));
            }
        }
    }
    None
}
