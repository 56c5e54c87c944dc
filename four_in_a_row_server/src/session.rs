// One connected peer, as seen by the server.
//
// A `Session` pairs a `ConnectionReader` (background thread, inbox of
// decoded actions) with a buffered write half of the same `TcpStream`. The
// dispatch loop in `dispatch.rs` is the only writer, so writes never race
// each other. Write errors are returned to the caller, which logs them and
// leaves loss detection to the reader thread.
//
// Sessions are named `Connection-<n>` until a Join renames them. The number
// comes from `SessionRegistry`, which counts every connection the server
// has ever opened, so names stay unique across reconnects (the counter
// wraps after `u32::MAX`).

use std::io::{self, BufWriter};
use std::net::{SocketAddr, TcpStream};

use four_in_a_row_protocol::{Action, EncodeError, write_action};
use tracing::debug;

use crate::reader::ConnectionReader;

pub struct Session {
    index: u32,
    name: String,
    peer_addr: Option<SocketAddr>,
    reader: ConnectionReader,
    writer: BufWriter<TcpStream>,
}

impl Session {
    pub fn new(index: u32, stream: TcpStream) -> io::Result<Self> {
        let name = default_name(index);
        let peer_addr = stream.peer_addr().ok();
        let reader = ConnectionReader::for_tcp(name.clone(), &stream)?;
        Ok(Self {
            index,
            name,
            peer_addr,
            reader,
            writer: BufWriter::new(stream),
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    pub fn is_active(&self) -> bool {
        self.reader.is_active()
    }

    pub fn poll_action(&self) -> Option<Action> {
        self.reader.poll_action()
    }

    /// Write one frame to the peer.
    pub fn send(&mut self, action: &Action) -> Result<(), EncodeError> {
        write_action(&mut self.writer, action)
    }

    /// Shut the connection down. The reader thread exits on its own.
    pub fn close(&mut self) {
        debug!(session = %self.name, index = self.index, "closing session");
        self.reader.close();
    }
}

fn default_name(index: u32) -> String {
    format!("Connection-{index}")
}

/// Hands out session numbers.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_index: u32,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a freshly accepted stream in a numbered session.
    pub fn open(&mut self, stream: TcpStream) -> io::Result<Session> {
        let index = self.next_index;
        self.next_index = self.next_index.wrapping_add(1);
        Session::new(index, stream)
    }

    /// How many sessions have been opened so far (modulo `u32`).
    pub fn opened(&self) -> u32 {
        self.next_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::{Duration, Instant};

    use four_in_a_row_protocol::{ExitKind, encode_frame, read_action};

    fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    fn recv_action(reader: &mut BufReader<TcpStream>) -> Action {
        read_action(reader).unwrap().expect("stream closed")
    }

    #[test]
    fn registry_numbers_sessions() {
        let mut registry = SessionRegistry::new();
        let (_c0, s0) = tcp_pair();
        let (_c1, s1) = tcp_pair();

        let first = registry.open(s0).unwrap();
        let second = registry.open(s1).unwrap();

        assert_eq!(first.index(), 0);
        assert_eq!(first.name(), "Connection-0");
        assert_eq!(second.index(), 1);
        assert_eq!(second.name(), "Connection-1");
        assert_eq!(registry.opened(), 2);
        assert!(first.peer_addr().is_some());
    }

    #[test]
    fn registry_counter_wraps_instead_of_overflowing() {
        let mut registry = SessionRegistry {
            next_index: u32::MAX,
        };
        let (_c0, s0) = tcp_pair();
        let (_c1, s1) = tcp_pair();

        let last = registry.open(s0).unwrap();
        let wrapped = registry.open(s1).unwrap();
        assert_eq!(last.name(), "Connection-4294967295");
        assert_eq!(wrapped.name(), "Connection-0");
    }

    #[test]
    fn set_name_replaces_default() {
        let (_client, server) = tcp_pair();
        let mut session = SessionRegistry::new().open(server).unwrap();
        session.set_name("Ada");
        assert_eq!(session.name(), "Ada");
    }

    #[test]
    fn send_reaches_peer() {
        let (client, server) = tcp_pair();
        let mut session = SessionRegistry::new().open(server).unwrap();

        session.send(&Action::NewGame).unwrap();
        session
            .send(&Action::message("Server", "Ada", "welcome"))
            .unwrap();

        let mut reader = BufReader::new(client);
        assert_eq!(recv_action(&mut reader), Action::NewGame);
        assert_eq!(
            recv_action(&mut reader),
            Action::message("Server", "Ada", "welcome")
        );
    }

    #[test]
    fn poll_returns_peer_actions() {
        let (mut client, server) = tcp_pair();
        let session = SessionRegistry::new().open(server).unwrap();

        client
            .write_all(&encode_frame(&Action::exit("Ada", ExitKind::PlayerExit)).unwrap())
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let action = loop {
            if let Some(action) = session.poll_action() {
                break action;
            }
            assert!(Instant::now() < deadline, "no action arrived");
            thread::sleep(Duration::from_millis(2));
        };
        assert_eq!(action, Action::exit("Ada", ExitKind::PlayerExit));
    }

    #[test]
    fn close_ends_the_connection() {
        let (client, server) = tcp_pair();
        let mut session = SessionRegistry::new().open(server).unwrap();
        session.close();

        // Peer sees a clean EOF.
        let mut reader = BufReader::new(client);
        assert!(read_action(&mut reader).unwrap().is_none());

        let deadline = Instant::now() + Duration::from_secs(5);
        while session.is_active() {
            assert!(Instant::now() < deadline, "reader did not stop");
            thread::sleep(Duration::from_millis(2));
        }
    }
}
