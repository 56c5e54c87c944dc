// GameServer: the authoritative two-player game and its dispatch rules.
//
// `GameServer` owns the `GameState` and up to two `Session`s. Everything
// here runs on the single dispatch thread driven by `server.rs`, so there
// is no locking: readers only ever hand actions over through their inbox.
//
// `poll_once` is one round-robin pass over the two slots, taking at most
// one action from each session. Dispatch rules:
// - Join: rename the sender's session, relay.
// - Move: the piece must be the sender's own (slot 0 plays piece one, slot
//   1 piece two) and the move must pass `GameState`. Relay if accepted,
//   otherwise send `Error{Move}` back to the sender only.
// - NewGame: relay, then reset the board.
// - Exit: relay, close the sender. A server-closed exit shuts the whole
//   server down (without a second round of exit frames).
// - Message: relay verbatim.
// - Error: clients have no business sending these; logged and dropped.
//
// A session whose reader has stopped is only treated as lost once its inbox
// is empty, so every action it managed to send is still dispatched. Losing
// a session frees its slot and tells the peer with `Exit{name, ServerClosed}`.
//
// See also: `server.rs` (threads and accept loop), `session.rs`.

use std::net::TcpStream;

use four_in_a_row_game::{GameState, Piece};
use four_in_a_row_protocol::{Action, ExitKind, SERVER_NAME};
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::session::{Session, SessionRegistry};

/// Number of players in one game.
pub const PLAYER_SLOTS: usize = 2;

/// The piece a slot plays with.
pub fn piece_for_slot(slot: usize) -> Option<Piece> {
    match slot {
        0 => Some(Piece::One),
        1 => Some(Piece::Two),
        _ => None,
    }
}

/// Coarse lifecycle of a `GameServer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerPhase {
    /// Fewer than two active sessions.
    Lobby,
    InProgress,
    /// The game is decided; connections stay open for NewGame or Exit.
    Ended,
    Closed,
}

pub struct GameServer {
    game: GameState,
    slots: [Option<Session>; PLAYER_SLOTS],
    registry: SessionRegistry,
    closed: bool,
}

impl GameServer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            game: GameState::new(columns, rows),
            slots: [None, None],
            registry: SessionRegistry::new(),
            closed: false,
        }
    }

    /// Seat a freshly accepted connection in the first free slot. Returns
    /// the slot index.
    pub fn add_connection(&mut self, stream: TcpStream) -> Result<usize, ServerError> {
        if self.closed {
            return Err(ServerError::Closed);
        }
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(ServerError::Full)?;
        let session = self.registry.open(stream)?;
        info!(
            session = %session.name(),
            peer = ?session.peer_addr(),
            slot,
            "player connected"
        );
        self.slots[slot] = Some(session);
        Ok(slot)
    }

    /// One round-robin pass over the slots. Returns whether anything
    /// happened, so the caller can back off when idle.
    pub fn poll_once(&mut self) -> bool {
        let mut progressed = false;
        for slot in 0..PLAYER_SLOTS {
            if self.closed {
                break;
            }
            let Some(session) = &self.slots[slot] else {
                continue;
            };
            // Read the flag before polling: once the reader is seen as
            // stopped, everything it queued is already in the inbox.
            let alive = session.is_active();
            match session.poll_action() {
                Some(action) => {
                    progressed = true;
                    self.dispatch(slot, action);
                }
                None if !alive => {
                    progressed = true;
                    self.drop_lost_session(slot);
                }
                None => {}
            }
        }
        progressed
    }

    fn dispatch(&mut self, slot: usize, action: Action) {
        match &action {
            Action::Join { player_name } => {
                if let Some(session) = self.slots[slot].as_mut() {
                    info!(session = %session.name(), name = %player_name, "player joined");
                    session.set_name(player_name.clone());
                }
                self.relay(slot, &action);
            }
            Action::Move { column, piece } => {
                let own_piece = piece_for_slot(slot).is_some_and(|p| p.number() == *piece);
                if own_piece && self.game.place_wire_move(*column, *piece) {
                    debug!(slot, column, piece, "move accepted");
                    self.relay(slot, &action);
                    if let Some(result) = self.game.winner() {
                        info!(?result, "game over");
                    }
                } else {
                    warn!(
                        session = %self.session_name(slot).unwrap_or_default(),
                        column,
                        piece,
                        own_piece,
                        "move rejected"
                    );
                    self.send_to(slot, &Action::error(action));
                }
            }
            Action::NewGame => {
                self.relay(slot, &action);
                self.game.new_game();
                info!(slot, "new game started");
            }
            Action::Exit { name, kind } => {
                info!(slot, name = %name, ?kind, "player exited");
                self.relay(slot, &action);
                self.close_slot(slot);
                if *kind == ExitKind::ServerClosed {
                    self.shutdown(false);
                }
            }
            Action::Message { .. } => self.relay(slot, &action),
            Action::Error { causing_action } => {
                warn!(
                    slot,
                    causing = %causing_action.action_type(),
                    "ignoring error action from client"
                );
            }
        }
    }

    /// Send `action` to every seated session other than `from`.
    fn relay(&mut self, from: usize, action: &Action) {
        let mut delivered = false;
        for (slot, session) in self.slots.iter_mut().enumerate() {
            if slot == from {
                continue;
            }
            if let Some(session) = session {
                delivered = true;
                if let Err(e) = session.send(action) {
                    warn!(session = %session.name(), error = %e, "relay failed");
                }
            }
        }
        if !delivered {
            debug!(action_type = %action.action_type(), "no peer to relay to");
        }
    }

    fn send_to(&mut self, slot: usize, action: &Action) {
        if let Some(session) = self.slots[slot].as_mut()
            && let Err(e) = session.send(action)
        {
            warn!(session = %session.name(), error = %e, "send failed");
        }
    }

    fn close_slot(&mut self, slot: usize) -> Option<String> {
        let mut session = self.slots[slot].take()?;
        session.close();
        Some(session.name().to_owned())
    }

    fn drop_lost_session(&mut self, slot: usize) {
        let Some(name) = self.close_slot(slot) else {
            return;
        };
        warn!(session = %name, slot, "connection lost");
        self.relay(slot, &Action::exit(name, ExitKind::ServerClosed));
    }

    /// Tell every connected player the server is going away, then close all
    /// sessions. Idempotent.
    pub fn close(&mut self) {
        self.shutdown(true);
    }

    fn shutdown(&mut self, notify: bool) {
        if self.closed {
            return;
        }
        self.closed = true;
        let farewell = Action::exit(SERVER_NAME, ExitKind::ServerClosed);
        for slot in 0..PLAYER_SLOTS {
            if notify {
                self.send_to(slot, &farewell);
            }
            self.close_slot(slot);
        }
        info!("server closed");
    }

    pub fn phase(&self) -> ServerPhase {
        if self.closed {
            ServerPhase::Closed
        } else if self.active_sessions() < PLAYER_SLOTS {
            ServerPhase::Lobby
        } else if self.game.has_ended() {
            ServerPhase::Ended
        } else {
            ServerPhase::InProgress
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Seated sessions whose reader is still running.
    pub fn active_sessions(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|session| session.is_active())
            .count()
    }

    pub fn session_name(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot)?.as_ref().map(Session::name)
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }
}
