// Encode and decode failures for the frame codec.
//
// Decode errors split into two groups. `MalformedFrame`, `UnknownActionType`
// and `InvalidPayload` describe a single bad frame: the decoder has already
// consumed it completely and is back at a frame boundary, so the reader logs
// it and carries on (`is_recoverable`). `TruncatedStream` and `Io` mean the
// stream itself is gone and the connection has to close.

use std::io;

use thiserror::Error;

use crate::types::ActionType;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{action_type} payload is {len} bytes (max 255)")]
    PayloadTooLarge { action_type: ActionType, len: usize },
    #[error("message {field} is {len} bytes (max 255)")]
    FieldTooLong { field: &'static str, len: usize },
    #[error("an error action cannot wrap another error action")]
    NestedError,
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame terminator was {terminator:#04x}, expected 0x00")]
    MalformedFrame { terminator: u8 },
    #[error("unknown action type {0}")]
    UnknownActionType(u8),
    #[error("invalid {action_type} payload: {reason}")]
    InvalidPayload {
        action_type: ActionType,
        reason: String,
    },
    #[error("stream ended in the middle of a frame")]
    TruncatedStream,
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// True when only the current frame was lost and the stream is still
    /// positioned at a frame boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DecodeError::MalformedFrame { .. }
                | DecodeError::UnknownActionType(_)
                | DecodeError::InvalidPayload { .. }
        )
    }

    pub(crate) fn invalid(action_type: ActionType, reason: impl Into<String>) -> Self {
        DecodeError::InvalidPayload {
            action_type,
            reason: reason.into(),
        }
    }
}
