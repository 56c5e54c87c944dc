// Test-only player for multiplayer integration tests.
//
// Wraps the real `GameClient` (from `four_in_a_row_server::client`) in a
// synchronous, test-friendly API: blocking waits for a particular incoming
// action, with every board event the client fires recorded on the side.
// All networking and rules code is the same code a real player runs.
//
// See also: `tests/full_game.rs` for the scenarios.

use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

use four_in_a_row_game::{GameEvent, GameState, Piece};
use four_in_a_row_protocol::{Action, ExitKind};
use four_in_a_row_server::GameClient;

/// Default timeout for blocking poll operations.
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep duration between poll attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time for the server's dispatch thread to seat a new connection.
const SEAT_DELAY: Duration = Duration::from_millis(100);

pub struct TestPlayer {
    client: GameClient,
    /// Every board event the client has fired, oldest first.
    pub events: Vec<GameEvent>,
    /// Every action received so far, oldest first.
    pub received: Vec<Action>,
}

impl TestPlayer {
    /// Connect (which sends Join) and wait until the server has seated us.
    pub fn connect(addr: SocketAddr, name: &str, piece: Piece) -> Self {
        let client = GameClient::connect(addr, name, piece).expect("TestPlayer::connect failed");
        Self::seated(client)
    }

    /// Like `connect`, for a server running a non-default board.
    pub fn connect_with_board(
        addr: SocketAddr,
        name: &str,
        piece: Piece,
        (columns, rows): (usize, usize),
    ) -> Self {
        let client = GameClient::connect_with_board(addr, name, piece, columns, rows)
            .expect("TestPlayer::connect_with_board failed");
        Self::seated(client)
    }

    fn seated(client: GameClient) -> Self {
        thread::sleep(SEAT_DELAY);
        Self {
            client,
            events: Vec::new(),
            received: Vec::new(),
        }
    }

    pub fn game(&self) -> &GameState {
        self.client.game()
    }

    pub fn piece(&self) -> Piece {
        self.client.piece()
    }

    /// Place our own piece. Returns whether the local board accepted it.
    pub fn place(&mut self, column: usize) -> bool {
        self.client
            .place_move(column, &mut self.events)
            .expect("send move failed")
    }

    pub fn say(&mut self, destination: &str, text: &str) {
        self.client
            .send_message(destination, text)
            .expect("send_message failed");
    }

    pub fn request_new_game(&mut self) {
        self.client
            .request_new_game(&mut self.events)
            .expect("request_new_game failed");
    }

    pub fn exit(self) {
        self.client.exit().expect("exit failed");
    }

    /// Poll once without blocking; returns what arrived.
    pub fn poll(&mut self) -> Vec<Action> {
        let actions = self.client.poll(&mut self.events);
        self.received.extend(actions.iter().cloned());
        actions
    }

    /// Blocking poll until an action matching `wanted` arrives. Actions
    /// before it are applied and recorded as usual; actions after it in the
    /// same batch are kept in `received` too.
    pub fn poll_until(&mut self, what: &str, mut wanted: impl FnMut(&Action) -> bool) -> Action {
        let start = Instant::now();
        loop {
            assert!(start.elapsed() < POLL_TIMEOUT, "timed out waiting for {what}");
            if let Some(found) = self.poll().into_iter().find(|action| wanted(action)) {
                return found;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Wait for the opponent's next move and return `(column, piece)`.
    pub fn poll_until_move(&mut self) -> (u8, u8) {
        match self.poll_until("Move", |a| matches!(a, Action::Move { .. })) {
            Action::Move { column, piece } => (column, piece),
            other => unreachable!("poll_until returned {other:?}"),
        }
    }

    /// Wait for an Exit and return `(name, kind)`.
    pub fn poll_until_exit(&mut self) -> (String, ExitKind) {
        match self.poll_until("Exit", |a| matches!(a, Action::Exit { .. })) {
            Action::Exit { name, kind } => (name, kind),
            other => unreachable!("poll_until returned {other:?}"),
        }
    }

    /// Wait for an Error frame and return the action it rejects.
    pub fn poll_until_error(&mut self) -> Action {
        match self.poll_until("Error", |a| matches!(a, Action::Error { .. })) {
            Action::Error { causing_action } => *causing_action,
            other => unreachable!("poll_until returned {other:?}"),
        }
    }

    /// Poll for `duration` and return everything that arrived.
    pub fn poll_for(&mut self, duration: Duration) -> Vec<Action> {
        let start = Instant::now();
        let mut actions = Vec::new();
        while start.elapsed() < duration {
            actions.extend(self.poll());
            thread::sleep(POLL_INTERVAL);
        }
        actions
    }

    /// Wait until the server has closed our connection.
    pub fn wait_disconnected(&mut self) {
        let start = Instant::now();
        while self.client.is_connected() {
            assert!(start.elapsed() < POLL_TIMEOUT, "still connected");
            thread::sleep(POLL_INTERVAL);
        }
        self.poll();
    }
}
