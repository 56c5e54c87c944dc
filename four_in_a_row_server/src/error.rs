// Error types for the server and client halves of the crate.
//
// Config errors live in `config.rs` next to the loader. Protocol-level
// encode/decode errors come from `four_in_a_row_protocol`.

use std::io;

use four_in_a_row_protocol::EncodeError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("both player slots are taken")]
    Full,
    #[error("server is closed")]
    Closed,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
    #[error("failed to send: {0}")]
    Send(#[from] EncodeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
