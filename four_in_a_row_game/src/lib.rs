// four_in_a_row_game: pure game rules for four-in-a-row.
//
// This crate holds everything the referee needs to judge a game and nothing
// about networking. Both the server (authoritative copy) and each client
// (local mirror) run the same code, so a move accepted on one side is
// accepted on the other.
//
// Module overview:
// - `types.rs`:  Piece, Field, CellCoord, GameResult.
// - `board.rs`:  Column-major grid with gravity placement and bounds-safe
//                queries.
// - `win.rs`:    Four-in-a-row scan around the piece that was just placed.
// - `game.rs`:   GameState: turn order, end detection, winning cells. The
//                single mutation point for a game.
// - `event.rs`:  GameEvent + GameObserver, the callback surface a UI hooks
//                into.
//
// Coordinates: columns run left-to-right from 0, rows bottom-to-top from 0.
// Pieces fall to the lowest empty row of their column.

pub mod board;
pub mod event;
pub mod game;
pub mod types;
pub mod win;

pub use board::Board;
pub use event::{GameEvent, GameObserver};
pub use game::{DEFAULT_COLUMNS, DEFAULT_ROWS, GameState};
pub use types::{CellCoord, Field, GameResult, Piece};
pub use win::find_win;
