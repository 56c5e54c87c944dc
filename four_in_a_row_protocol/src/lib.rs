// four_in_a_row_protocol: wire protocol between players and the game server.
//
// Shared by the server and by clients. It knows how to turn an `Action`
// into bytes and back, and nothing about game rules or sockets beyond
// `std::io::Read`/`Write`.
//
// Module overview:
// - `types.rs`:   Frozen ordinals (`ActionType`, `ExitKind`), default port.
// - `action.rs`:  The `Action` enum, the whole protocol vocabulary.
// - `framing.rs`: `[type][len][payload][0x00]` framing, the push-style
//                 `FrameDecoder`, and blocking `read_action`/`write_action`.
// - `error.rs`:   `EncodeError` and `DecodeError`.
//
// Design decisions:
// - **Custom binary framing.** One byte of type and one of length keep every
//   frame tiny; the cost is a 255-byte payload limit, enforced on encode.
// - **Bad frames are data.** A malformed or unknown frame comes back as a
//   recoverable `DecodeError` and the stream stays usable; only a stream that
//   ends mid-frame or fails at the I/O level is fatal.
// - **No async runtime.** Plain blocking `std::io`, one reader thread per
//   connection on the server side.

pub mod action;
pub mod error;
pub mod framing;
pub mod types;

pub use action::Action;
pub use error::{DecodeError, EncodeError};
pub use framing::{
    FRAME_TERMINATOR, FrameDecoder, MAX_PAYLOAD_LEN, decode_payload, encode_frame, encode_payload,
    read_action, write_action,
};
pub use types::{ActionType, DEFAULT_PORT, ExitKind, SERVER_NAME};
