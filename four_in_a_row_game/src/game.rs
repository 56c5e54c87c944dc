// Authoritative state of one four-in-a-row game.
//
// `GameState` wraps a `Board` and adds the rules around it: whose turn it is,
// whether the game is over, who won, and which four cells won it. All
// mutation goes through `place_piece` (and `new_game`, which starts over), so
// the invariants below hold after every call:
//
// - While the game is running, `winner()` is `None` and `winning_cells()` is
//   empty.
// - `current_player()` flips after every accepted placement that does not end
//   the game, and never changes once the game has ended.
//
// A rejected placement (game over, wrong piece, bad or full column) is a
// plain `false` with no state change. Rejections are expected during network
// play, when both players act at once, so they are data rather than errors.
//
// See also: `win.rs` for the scan run after each placement, `event.rs` for
// the observer hooks used by `place_piece_observed`.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::event::GameObserver;
use crate::types::{CellCoord, Field, GameResult, Piece};
use crate::win::find_win;

/// Standard board width.
pub const DEFAULT_COLUMNS: usize = 7;
/// Standard board height.
pub const DEFAULT_ROWS: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Piece,
    winner: Option<GameResult>,
    winning_cells: Vec<CellCoord>,
}

impl GameState {
    /// Start a game on an empty `columns × rows` board. Player one moves
    /// first.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            board: Board::new(columns, rows),
            current_player: Piece::One,
            winner: None,
            winning_cells: Vec::new(),
        }
    }

    /// Throw the current board away and start over with the same
    /// dimensions.
    pub fn new_game(&mut self) {
        *self = Self::new(self.board.columns(), self.board.rows());
    }

    /// Try to place `piece` in `column`. Returns `true` if the move was
    /// accepted.
    ///
    /// Rejected (returns `false`, nothing changes) when the game has ended,
    /// when it is not `piece`'s turn, or when the board refuses the column.
    pub fn place_piece(&mut self, column: usize, piece: Piece) -> bool {
        if self.has_ended() || piece != self.current_player {
            return false;
        }
        let Some(row) = self.board.place_piece(column, piece) else {
            return false;
        };

        if let Some(cells) = find_win(&self.board, column, row) {
            self.winner = Some(GameResult::Won(piece));
            self.winning_cells = cells.to_vec();
        } else if self.board.is_full() {
            self.winner = Some(GameResult::Draw);
        } else {
            self.current_player = piece.opponent();
        }
        true
    }

    /// Whether `place_piece(column, piece)` would be accepted right now.
    pub fn is_legal_move(&self, column: usize, piece: Piece) -> bool {
        !self.has_ended() && piece == self.current_player && !self.board.is_column_full(column)
    }

    /// `place_piece` for raw wire values. Piece numbers other than 1 and 2
    /// are rejected like any other illegal move.
    pub fn place_wire_move(&mut self, column: u8, piece: u8) -> bool {
        match Piece::from_wire(piece) {
            Some(piece) => self.place_piece(usize::from(column), piece),
            None => false,
        }
    }

    /// `place_piece`, then tell `observer` what changed.
    pub fn place_piece_observed(
        &mut self,
        column: usize,
        piece: Piece,
        observer: &mut impl GameObserver,
    ) -> bool {
        if !self.place_piece(column, piece) {
            return false;
        }
        observer.on_board_changed();
        if let Some(result) = self.winner {
            observer.on_game_ended(result);
        }
        true
    }

    /// The piece that moves next (or moved last, once the game has ended).
    pub fn current_player(&self) -> Piece {
        self.current_player
    }

    pub fn has_ended(&self) -> bool {
        self.winner.is_some()
    }

    /// `None` while the game is running.
    pub fn winner(&self) -> Option<GameResult> {
        self.winner
    }

    /// The four cells of the winning line; empty unless the game was won.
    pub fn winning_cells(&self) -> &[CellCoord] {
        &self.winning_cells
    }

    pub fn get_field(&self, column: i32, row: i32) -> Field {
        self.board.get_field(column, row)
    }

    pub fn columns(&self) -> usize {
        self.board.columns()
    }

    pub fn rows(&self) -> usize {
        self.board.rows()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}
