// Protocol actions: everything two players and the server say to each other.
//
// `Action` is a closed enum. Each variant carries only what is needed to
// rebuild the game-relevant event on the other side; equality is structural.
// `Error` wraps the action that the server refused (today only ever a
// `Move`) and is sent back to the player who sent it.
//
// Wire encoding lives in `framing.rs`. Move fields stay raw bytes here on
// purpose: a frame with column 200 or piece 9 is syntactically fine, and it
// is the game state, not the decoder, that turns it down.

use serde::{Deserialize, Serialize};

use crate::types::{ActionType, ExitKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// A player announces its display name.
    Join { player_name: String },
    /// Drop `piece` (1 or 2) into `column`.
    Move { column: u8, piece: u8 },
    /// Start over on an empty board.
    NewGame,
    /// `name` is leaving.
    Exit { name: String, kind: ExitKind },
    /// Free-form text, passed through untouched.
    Message {
        source: String,
        destination: String,
        text: String,
    },
    /// The wrapped action was rejected.
    Error { causing_action: Box<Action> },
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::Join { .. } => ActionType::Join,
            Action::Move { .. } => ActionType::Move,
            Action::NewGame => ActionType::NewGame,
            Action::Exit { .. } => ActionType::Exit,
            Action::Message { .. } => ActionType::Message,
            Action::Error { .. } => ActionType::Error,
        }
    }

    /// Shorthand for `Action::Error` around `causing_action`.
    pub fn error(causing_action: Action) -> Action {
        Action::Error {
            causing_action: Box::new(causing_action),
        }
    }

    pub fn join(player_name: impl Into<String>) -> Action {
        Action::Join {
            player_name: player_name.into(),
        }
    }

    pub fn exit(name: impl Into<String>, kind: ExitKind) -> Action {
        Action::Exit {
            name: name.into(),
            kind,
        }
    }

    pub fn message(
        source: impl Into<String>,
        destination: impl Into<String>,
        text: impl Into<String>,
    ) -> Action {
        Action::Message {
            source: source.into(),
            destination: destination.into(),
            text: text.into(),
        }
    }
}
