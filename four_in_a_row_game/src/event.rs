// Game events for whoever renders the board.
//
// The rules code never calls into a UI directly. Instead, placement through
// `GameState::place_piece_observed` reports to a `GameObserver`: one
// `on_board_changed` per accepted placement, followed by `on_game_ended`
// when that placement finished the game.
//
// Two ready-made observers: `Vec<GameEvent>` records events (handy in tests
// and for batching), and an mpsc `Sender<GameEvent>` forwards them to another
// thread.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::types::GameResult;

/// Something a UI should react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    BoardChanged,
    GameEnded(GameResult),
}

/// Callback surface for board changes.
pub trait GameObserver {
    fn on_board_changed(&mut self);
    fn on_game_ended(&mut self, result: GameResult);
}

impl GameObserver for Vec<GameEvent> {
    fn on_board_changed(&mut self) {
        self.push(GameEvent::BoardChanged);
    }

    fn on_game_ended(&mut self, result: GameResult) {
        self.push(GameEvent::GameEnded(result));
    }
}

impl GameObserver for Sender<GameEvent> {
    // A dropped receiver just means nobody is watching any more.
    fn on_board_changed(&mut self) {
        let _ = self.send(GameEvent::BoardChanged);
    }

    fn on_game_ended(&mut self, result: GameResult) {
        let _ = self.send(GameEvent::GameEnded(result));
    }
}

/// Observer that ignores everything.
impl GameObserver for () {
    fn on_board_changed(&mut self) {}

    fn on_game_ended(&mut self, _result: GameResult) {}
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::types::Piece;

    #[test]
    fn sender_observer_forwards_events() {
        let (mut tx, rx) = mpsc::channel();
        tx.on_board_changed();
        tx.on_game_ended(GameResult::Won(Piece::One));
        assert_eq!(rx.try_recv(), Ok(GameEvent::BoardChanged));
        assert_eq!(
            rx.try_recv(),
            Ok(GameEvent::GameEnded(GameResult::Won(Piece::One)))
        );
    }

    #[test]
    fn sender_observer_tolerates_dropped_receiver() {
        let (mut tx, rx) = mpsc::channel::<GameEvent>();
        drop(rx);
        tx.on_board_changed();
        tx.on_game_ended(GameResult::Draw);
    }
}
