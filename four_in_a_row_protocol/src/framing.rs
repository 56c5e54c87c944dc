// Frame codec: `Action` <-> bytes.
//
// Every frame is
//
//     [type: 1 byte][length: 1 byte][payload: length bytes][terminator: 0x00]
//
// where `type` is the `ActionType` ordinal. Payloads per variant:
//
// - Join:    UTF-8 player name.
// - Move:    two bytes, column then piece.
// - NewGame: empty.
// - Exit:    one exit-kind byte, then the UTF-8 name.
// - Message: source, destination, text; each a 1-byte length then UTF-8.
// - Error:   the causing action's own `[type][length][payload]`, without a
//            terminator of its own.
//
// Decoding is a three-state machine (`FrameDecoder`): awaiting the type
// byte, awaiting the length byte, accumulating the payload. The byte after
// a complete payload is the terminator: 0x00 accepts the frame, anything
// else throws it away and the machine starts over at the next byte. A bad
// frame never leaks into the next one because all state is replaced at each
// frame boundary.
//
// `FrameDecoder` is push-based and does no I/O. `read_action` and
// `write_action` wrap it for blocking `std::io` streams; the server's
// connection readers are built on `read_action`.

use std::io::{self, Read, Write};

use crate::action::Action;
use crate::error::{DecodeError, EncodeError};
use crate::types::{ActionType, ExitKind};

/// Last byte of every well-formed frame.
pub const FRAME_TERMINATOR: u8 = 0x00;

/// Largest payload a single length byte can describe.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Encode just the payload of `action`.
pub fn encode_payload(action: &Action) -> Result<Vec<u8>, EncodeError> {
    let payload = match action {
        Action::Join { player_name } => player_name.as_bytes().to_vec(),
        Action::Move { column, piece } => vec![*column, *piece],
        Action::NewGame => Vec::new(),
        Action::Exit { name, kind } => {
            let mut payload = Vec::with_capacity(1 + name.len());
            payload.push(kind.as_byte());
            payload.extend_from_slice(name.as_bytes());
            payload
        }
        Action::Message {
            source,
            destination,
            text,
        } => {
            let mut payload = Vec::with_capacity(3 + source.len() + destination.len() + text.len());
            for (field, value) in [
                ("source", source),
                ("destination", destination),
                ("text", text),
            ] {
                let len = u8::try_from(value.len()).map_err(|_| EncodeError::FieldTooLong {
                    field,
                    len: value.len(),
                })?;
                payload.push(len);
                payload.extend_from_slice(value.as_bytes());
            }
            payload
        }
        Action::Error { causing_action } => {
            if matches!(**causing_action, Action::Error { .. }) {
                return Err(EncodeError::NestedError);
            }
            let inner = encode_payload(causing_action)?;
            let mut payload = Vec::with_capacity(2 + inner.len());
            payload.push(causing_action.action_type().as_byte());
            payload.push(payload_len(causing_action.action_type(), &inner)?);
            payload.extend_from_slice(&inner);
            payload
        }
    };
    payload_len(action.action_type(), &payload)?;
    Ok(payload)
}

fn payload_len(action_type: ActionType, payload: &[u8]) -> Result<u8, EncodeError> {
    u8::try_from(payload.len()).map_err(|_| EncodeError::PayloadTooLarge {
        action_type,
        len: payload.len(),
    })
}

/// Encode `action` as one complete frame, terminator included.
pub fn encode_frame(action: &Action) -> Result<Vec<u8>, EncodeError> {
    let action_type = action.action_type();
    let payload = encode_payload(action)?;
    let len = payload_len(action_type, &payload)?;

    let mut frame = Vec::with_capacity(payload.len() + 3);
    frame.push(action_type.as_byte());
    frame.push(len);
    frame.extend_from_slice(&payload);
    frame.push(FRAME_TERMINATOR);
    Ok(frame)
}

/// Turn a frame's type byte and payload back into an `Action`.
pub fn decode_payload(type_byte: u8, payload: &[u8]) -> Result<Action, DecodeError> {
    let action_type =
        ActionType::from_byte(type_byte).ok_or(DecodeError::UnknownActionType(type_byte))?;

    match action_type {
        ActionType::Join => Ok(Action::Join {
            player_name: utf8(action_type, payload)?,
        }),
        ActionType::Move => match payload {
            [column, piece] => Ok(Action::Move {
                column: *column,
                piece: *piece,
            }),
            _ => Err(DecodeError::invalid(
                action_type,
                format!("expected 2 bytes, got {}", payload.len()),
            )),
        },
        ActionType::NewGame => {
            if payload.is_empty() {
                Ok(Action::NewGame)
            } else {
                Err(DecodeError::invalid(
                    action_type,
                    format!("expected no payload, got {} bytes", payload.len()),
                ))
            }
        }
        ActionType::Exit => {
            let (&kind_byte, name) = payload
                .split_first()
                .ok_or_else(|| DecodeError::invalid(action_type, "missing exit kind"))?;
            let kind = ExitKind::from_byte(kind_byte).ok_or_else(|| {
                DecodeError::invalid(action_type, format!("unknown exit kind {kind_byte}"))
            })?;
            Ok(Action::Exit {
                name: utf8(action_type, name)?,
                kind,
            })
        }
        ActionType::Message => {
            let mut rest = payload;
            let source = take_prefixed(&mut rest, "source")?;
            let destination = take_prefixed(&mut rest, "destination")?;
            let text = take_prefixed(&mut rest, "text")?;
            if !rest.is_empty() {
                return Err(DecodeError::invalid(
                    action_type,
                    format!("{} trailing bytes", rest.len()),
                ));
            }
            Ok(Action::Message {
                source,
                destination,
                text,
            })
        }
        ActionType::Error => {
            let [inner_type, inner_len, inner @ ..] = payload else {
                return Err(DecodeError::invalid(
                    action_type,
                    "missing wrapped action header",
                ));
            };
            if usize::from(*inner_len) != inner.len() {
                return Err(DecodeError::invalid(
                    action_type,
                    format!(
                        "wrapped length {inner_len} does not match {} remaining bytes",
                        inner.len()
                    ),
                ));
            }
            if *inner_type == ActionType::Error.as_byte() {
                return Err(DecodeError::invalid(action_type, "nested error action"));
            }
            Ok(Action::error(decode_payload(*inner_type, inner)?))
        }
    }
}

fn utf8(action_type: ActionType, bytes: &[u8]) -> Result<String, DecodeError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::invalid(action_type, e.to_string()))
}

/// Split one length-prefixed string off the front of a Message payload.
fn take_prefixed(rest: &mut &[u8], field: &str) -> Result<String, DecodeError> {
    let Some((&len, tail)) = rest.split_first() else {
        return Err(DecodeError::invalid(
            ActionType::Message,
            format!("missing {field} length"),
        ));
    };
    let len = usize::from(len);
    if tail.len() < len {
        return Err(DecodeError::invalid(
            ActionType::Message,
            format!("{field} needs {len} bytes, {} left", tail.len()),
        ));
    }
    let (value, tail) = tail.split_at(len);
    *rest = tail;
    utf8(ActionType::Message, value)
}

#[derive(Debug, Default)]
enum DecodeState {
    #[default]
    AwaitingType,
    AwaitingLength {
        type_byte: u8,
    },
    /// Collecting `len` payload bytes; the byte after the last one is the
    /// terminator.
    AccumulatingPayload {
        type_byte: u8,
        len: usize,
        payload: Vec<u8>,
    },
}

/// Incremental frame decoder. Feed it bytes one at a time with `push`.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    state: DecodeState,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one byte. Returns `Some` when that byte finished a frame:
    /// `Ok` with the decoded action, or a recoverable `DecodeError` if the
    /// frame was discarded. Either way the decoder is then waiting for the
    /// next frame's type byte.
    pub fn push(&mut self, byte: u8) -> Option<Result<Action, DecodeError>> {
        match std::mem::take(&mut self.state) {
            DecodeState::AwaitingType => {
                self.state = DecodeState::AwaitingLength { type_byte: byte };
                None
            }
            DecodeState::AwaitingLength { type_byte } => {
                let len = usize::from(byte);
                self.state = DecodeState::AccumulatingPayload {
                    type_byte,
                    len,
                    payload: Vec::with_capacity(len),
                };
                None
            }
            DecodeState::AccumulatingPayload {
                type_byte,
                len,
                mut payload,
            } => {
                if payload.len() < len {
                    payload.push(byte);
                    self.state = DecodeState::AccumulatingPayload {
                        type_byte,
                        len,
                        payload,
                    };
                    None
                } else if byte != FRAME_TERMINATOR {
                    Some(Err(DecodeError::MalformedFrame { terminator: byte }))
                } else {
                    Some(decode_payload(type_byte, &payload))
                }
            }
        }
    }

    /// True when some bytes of a frame have been consumed but the frame is
    /// not finished yet.
    pub fn is_mid_frame(&self) -> bool {
        !matches!(self.state, DecodeState::AwaitingType)
    }
}

/// Encode `action` and write it as one frame, then flush.
pub fn write_action<W: Write>(writer: &mut W, action: &Action) -> Result<(), EncodeError> {
    let frame = encode_frame(action)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read exactly one frame from `reader`.
///
/// Returns `Ok(None)` if the stream ends cleanly before the first byte of a
/// frame, and `TruncatedStream` if it ends inside one. A discarded frame is
/// reported as its recoverable `DecodeError`; the stream is left at the next
/// frame boundary, so calling again continues with the following frame.
///
/// Reads one byte at a time; wrap sockets in a `BufReader`.
pub fn read_action<R: Read>(reader: &mut R) -> Result<Option<Action>, DecodeError> {
    let mut decoder = FrameDecoder::new();
    loop {
        let Some(byte) = next_byte(reader)? else {
            return if decoder.is_mid_frame() {
                Err(DecodeError::TruncatedStream)
            } else {
                Ok(None)
            };
        };
        if let Some(result) = decoder.push(byte) {
            return result.map(Some);
        }
    }
}

fn next_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
