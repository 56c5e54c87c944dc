// Fixed wire identifiers: action type ordinals and exit kinds.
//
// The type byte at the start of every frame is the `ActionType` ordinal.
// The numbering is frozen; both ends must agree on it and there is no
// version negotiation. Ordinal 2 belonged to an "undo" action that was never
// implemented. It stays reserved so the remaining numbers keep their values,
// and a frame carrying it decodes as an unknown type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default TCP port of the game server.
pub const DEFAULT_PORT: u16 = 46841;

/// Name used in `Exit` frames that originate from the server itself.
pub const SERVER_NAME: &str = "Server";

/// Frame type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActionType {
    Join = 0,
    Move = 1,
    Exit = 3,
    NewGame = 4,
    Message = 5,
    Error = 6,
}

impl ActionType {
    /// Ordinal 2, formerly "undo". Never produced.
    pub const RESERVED_UNDO: u8 = 2;

    pub fn from_byte(byte: u8) -> Option<ActionType> {
        match byte {
            0 => Some(ActionType::Join),
            1 => Some(ActionType::Move),
            3 => Some(ActionType::Exit),
            4 => Some(ActionType::NewGame),
            5 => Some(ActionType::Message),
            6 => Some(ActionType::Error),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionType::Join => "join",
            ActionType::Move => "move",
            ActionType::Exit => "exit",
            ActionType::NewGame => "new-game",
            ActionType::Message => "message",
            ActionType::Error => "error",
        };
        f.write_str(name)
    }
}

/// Why someone left: a player quitting, or the server shutting down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ExitKind {
    PlayerExit = 0,
    ServerClosed = 1,
}

impl ExitKind {
    pub fn from_byte(byte: u8) -> Option<ExitKind> {
        match byte {
            0 => Some(ExitKind::PlayerExit),
            1 => Some(ExitKind::ServerClosed),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_frozen() {
        assert_eq!(ActionType::Join.as_byte(), 0);
        assert_eq!(ActionType::Move.as_byte(), 1);
        assert_eq!(ActionType::Exit.as_byte(), 3);
        assert_eq!(ActionType::NewGame.as_byte(), 4);
        assert_eq!(ActionType::Message.as_byte(), 5);
        assert_eq!(ActionType::Error.as_byte(), 6);
    }

    #[test]
    fn byte_conversion_roundtrips_and_rejects_unknown() {
        for byte in 0..=u8::MAX {
            match ActionType::from_byte(byte) {
                Some(t) => assert_eq!(t.as_byte(), byte),
                None => assert!(byte == ActionType::RESERVED_UNDO || byte > 6),
            }
        }
    }

    #[test]
    fn exit_kind_bytes() {
        assert_eq!(ExitKind::from_byte(0), Some(ExitKind::PlayerExit));
        assert_eq!(ExitKind::from_byte(1), Some(ExitKind::ServerClosed));
        assert_eq!(ExitKind::from_byte(2), None);
    }
}
