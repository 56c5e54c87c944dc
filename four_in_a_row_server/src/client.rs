// Client end of the wire.
//
// `GameClient` is what a player process uses: it connects, announces itself
// with a Join, and keeps a local `GameState` mirror so a UI can render the
// board and refuse illegal moves without a round trip. Own moves are checked
// and applied locally before they are sent; the opponent's moves and
// NewGame requests are applied as they come in through `poll`.
//
// The server stays authoritative. If it answers one of our moves with an
// Error, the mirror has drifted from the server's board; that is logged
// and the Error is handed back to the caller like any other action.

use std::io::BufWriter;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use four_in_a_row_game::{DEFAULT_COLUMNS, DEFAULT_ROWS, GameObserver, GameState, Piece};
use four_in_a_row_protocol::{Action, ExitKind, write_action};
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::reader::ConnectionReader;

pub struct GameClient {
    name: String,
    piece: Piece,
    game: GameState,
    reader: ConnectionReader,
    writer: BufWriter<TcpStream>,
    local_addr: Option<SocketAddr>,
}

impl GameClient {
    /// Connect on the default 7x6 board.
    pub fn connect(
        addr: impl ToSocketAddrs,
        name: &str,
        piece: Piece,
    ) -> Result<Self, ClientError> {
        Self::connect_with_board(addr, name, piece, DEFAULT_COLUMNS, DEFAULT_ROWS)
    }

    /// Connect, send Join, and start the reader thread. `columns` and `rows`
    /// must match the server's board.
    pub fn connect_with_board(
        addr: impl ToSocketAddrs,
        name: &str,
        piece: Piece,
        columns: usize,
        rows: usize,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).map_err(ClientError::Connect)?;
        let local_addr = stream.local_addr().ok();
        let reader = ConnectionReader::for_tcp(name, &stream)?;
        let mut client = Self {
            name: name.to_owned(),
            piece,
            game: GameState::new(columns, rows),
            reader,
            writer: BufWriter::new(stream),
            local_addr,
        };
        client.send(&Action::join(name))?;
        info!(name, %piece, "connected");
        Ok(client)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Whether the connection is still being read. Queued actions can still
    /// be polled after this turns false.
    pub fn is_connected(&self) -> bool {
        self.reader.is_active()
    }

    /// Try our own move. Returns `Ok(false)` without sending anything if the
    /// local board rejects it. On a send error the local board is left
    /// untouched.
    pub fn place_move(
        &mut self,
        column: usize,
        observer: &mut impl GameObserver,
    ) -> Result<bool, ClientError> {
        let Ok(wire_column) = u8::try_from(column) else {
            return Ok(false);
        };
        if !self.game.is_legal_move(column, self.piece) {
            return Ok(false);
        }
        // Only a move the server has been sent may reach the mirror.
        self.send(&Action::Move {
            column: wire_column,
            piece: self.piece.number(),
        })?;
        Ok(self.game.place_piece_observed(column, self.piece, observer))
    }

    /// Drain everything the server has sent, applying opponent moves and
    /// NewGame to the local board. Returns the actions in arrival order.
    pub fn poll(&mut self, observer: &mut impl GameObserver) -> Vec<Action> {
        let mut received = Vec::new();
        while let Some(action) = self.reader.poll_action() {
            self.apply_remote(&action, observer);
            received.push(action);
        }
        received
    }

    fn apply_remote(&mut self, action: &Action, observer: &mut impl GameObserver) {
        match action {
            Action::Move { column, piece } => match Piece::from_wire(*piece) {
                Some(piece) if piece != self.piece => {
                    if !self
                        .game
                        .place_piece_observed(usize::from(*column), piece, observer)
                    {
                        warn!(client = %self.name, column, %piece, "relayed move does not fit local board");
                    }
                }
                _ => warn!(client = %self.name, column, piece, "ignoring move for our own piece"),
            },
            Action::NewGame => {
                self.game.new_game();
                observer.on_board_changed();
            }
            Action::Error { causing_action } => {
                warn!(client = %self.name, causing = ?causing_action, "server rejected our action");
            }
            Action::Exit { name, kind } => {
                info!(client = %self.name, peer = %name, ?kind, "peer left");
            }
            Action::Join { .. } | Action::Message { .. } => {}
        }
    }

    pub fn send_message(
        &mut self,
        destination: &str,
        text: &str,
    ) -> Result<(), ClientError> {
        let message = Action::message(self.name.as_str(), destination, text);
        self.send(&message)
    }

    /// Ask for a fresh board. The local mirror resets right away.
    pub fn request_new_game(
        &mut self,
        observer: &mut impl GameObserver,
    ) -> Result<(), ClientError> {
        self.send(&Action::NewGame)?;
        self.game.new_game();
        observer.on_board_changed();
        Ok(())
    }

    /// Say goodbye and close the connection.
    pub fn exit(mut self) -> Result<(), ClientError> {
        let result = self.send(&Action::exit(self.name.as_str(), ExitKind::PlayerExit));
        debug!(client = %self.name, "closing");
        self.reader.close();
        result
    }

    fn send(&mut self, action: &Action) -> Result<(), ClientError> {
        write_action(&mut self.writer, action)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::{Duration, Instant};

    use four_in_a_row_game::{Field, GameEvent};
    use four_in_a_row_protocol::{encode_frame, read_action};

    /// A client connected to a bare listener standing in for the server.
    fn connected(piece: Piece) -> (GameClient, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = GameClient::connect(addr, "Ada", piece).unwrap();
        let (server, _) = listener.accept().unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        (client, server)
    }

    fn poll_until_some(client: &mut GameClient, events: &mut Vec<GameEvent>) -> Vec<Action> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let actions = client.poll(events);
            if !actions.is_empty() {
                return actions;
            }
            assert!(Instant::now() < deadline, "nothing arrived");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn join_is_sent_on_connect() {
        let (client, server) = connected(Piece::One);
        let mut reader = BufReader::new(server);
        assert_eq!(read_action(&mut reader).unwrap(), Some(Action::join("Ada")));
        assert_eq!(client.name(), "Ada");
        assert!(client.is_connected());
    }

    #[test]
    fn local_move_is_applied_then_sent() {
        let (mut client, server) = connected(Piece::One);
        let mut events = Vec::new();

        assert!(client.place_move(2, &mut events).unwrap());
        assert_eq!(events, vec![GameEvent::BoardChanged]);
        assert_eq!(client.game().current_player(), Piece::Two);

        let mut reader = BufReader::new(server);
        assert_eq!(read_action(&mut reader).unwrap(), Some(Action::join("Ada")));
        assert_eq!(
            read_action(&mut reader).unwrap(),
            Some(Action::Move { column: 2, piece: 1 })
        );
    }

    #[test]
    fn failed_send_leaves_mirror_untouched() {
        let (mut client, _server) = connected(Piece::One);
        let mut events = Vec::new();
        client
            .writer
            .get_ref()
            .shutdown(std::net::Shutdown::Write)
            .unwrap();

        assert!(client.place_move(3, &mut events).is_err());
        assert!(events.is_empty());
        assert_eq!(client.game().get_field(3, 0), Field::Empty);
        assert_eq!(client.game().current_player(), Piece::One);
    }

    #[test]
    fn illegal_local_moves_are_not_sent() {
        let (mut client, server) = connected(Piece::Two);
        let mut events = Vec::new();

        // Not our turn, then a column that cannot exist.
        assert!(!client.place_move(0, &mut events).unwrap());
        assert!(!client.place_move(300, &mut events).unwrap());
        assert!(events.is_empty());

        // Only the Join went out.
        client.exit().unwrap();
        let mut reader = BufReader::new(server);
        assert_eq!(read_action(&mut reader).unwrap(), Some(Action::join("Ada")));
        assert_eq!(
            read_action(&mut reader).unwrap(),
            Some(Action::exit("Ada", ExitKind::PlayerExit))
        );
        assert_eq!(read_action(&mut reader).unwrap(), None);
    }

    #[test]
    fn opponent_move_and_new_game_update_mirror() {
        let (mut client, mut server) = connected(Piece::Two);
        let mut events = Vec::new();

        server
            .write_all(&encode_frame(&Action::Move { column: 5, piece: 1 }).unwrap())
            .unwrap();
        let actions = poll_until_some(&mut client, &mut events);
        assert_eq!(actions, vec![Action::Move { column: 5, piece: 1 }]);
        assert_eq!(client.game().get_field(5, 0).piece(), Some(Piece::One));
        assert_eq!(client.game().current_player(), Piece::Two);

        server
            .write_all(&encode_frame(&Action::NewGame).unwrap())
            .unwrap();
        poll_until_some(&mut client, &mut events);
        assert!(client.game().get_field(5, 0).piece().is_none());
        assert_eq!(
            events,
            vec![GameEvent::BoardChanged, GameEvent::BoardChanged]
        );
    }

    #[test]
    fn messages_carry_our_name() {
        let (mut client, server) = connected(Piece::One);
        client.send_message("Bob", "hello").unwrap();

        let mut reader = BufReader::new(server);
        read_action(&mut reader).unwrap();
        assert_eq!(
            read_action(&mut reader).unwrap(),
            Some(Action::message("Ada", "Bob", "hello"))
        );
    }
}
