// four_in_a_row_server: network side of four-in-a-row.
//
// The server hosts exactly one game between two TCP connections. It is
// authoritative: every Move is checked against its own `GameState` before
// being relayed, and rejected moves are answered with an Error frame to the
// sender only. Clients keep a local mirror of the board for rendering.
//
// Module overview:
// - `reader.rs`:   `ConnectionReader`, a thread per connection that decodes
//                  frames into an mpsc inbox.
// - `session.rs`:  `Session` (reader + buffered writer + display name) and
//                  the `SessionRegistry` that numbers connections.
// - `dispatch.rs`: `GameServer`, the two-slot dispatch state machine.
// - `server.rs`:   Listener and dispatch threads (`start_server`).
// - `client.rs`:   `GameClient`, the player end of the connection.
// - `config.rs`:   `ServerConfig`, JSON-loadable with defaults.
// - `error.rs`:    `ServerError`, `ClientError`.
//
// Dependencies: `four_in_a_row_game` for the rules and
// `four_in_a_row_protocol` for the wire format. Logging goes through
// `tracing`; only the `server` binary installs a subscriber.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod reader;
pub mod server;
pub mod session;

pub use client::GameClient;
pub use config::{ConfigError, ServerConfig};
pub use dispatch::{GameServer, PLAYER_SLOTS, ServerPhase, piece_for_slot};
pub use error::{ClientError, ServerError};
pub use server::{ServerHandle, start_server};
