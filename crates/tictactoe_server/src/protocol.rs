//! JSON messages exchanged over the game socket.
//!
//! Every message is an object with a `type` discriminator.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::VariantNames;
use tictactoe_rules::{GameSnapshot, JoinError, Outcome};

/// Message sent by a client.
///
/// [`VariantNames::VARIANTS`] lists every `type` tag a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::VariantNames)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the room's state to be broadcast.
    GetState,
    /// Place the sender's symbol at `(x, y)`.
    MakeMove {
        /// Column, 0-2.
        x: i64,
        /// Row, 0-2.
        y: i64,
    },
}

impl ClientMessage {
    /// Decodes an inbound text frame.
    ///
    /// Unknown tags are reported separately from malformed payloads so the
    /// caller can log them apart; both are dropped by the session.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?;
        if !Self::VARIANTS.contains(&tag) {
            return Err(ProtocolError::UnknownType(tag.to_string()));
        }
        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// Message sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full view of the room's game.
    State(GameSnapshot),
    /// The round ended; `winner` is a name or the draw label.
    GameOver {
        /// Winner's name, or the configured draw label.
        winner: String,
    },
    /// Join rejected; the connection closes right after.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

impl ServerMessage {
    /// Builds the `game_over` notice, substituting `draw_label` for a draw.
    pub fn game_over(outcome: &Outcome, draw_label: &str) -> Self {
        let winner = match outcome {
            Outcome::Winner(name) => name.clone(),
            Outcome::Draw => draw_label.to_string(),
        };
        ServerMessage::GameOver { winner }
    }

    /// Serializes to the JSON text sent on the wire.
    pub fn to_text(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

impl From<JoinError> for ServerMessage {
    fn from(err: JoinError) -> Self {
        ServerMessage::Error {
            error: err.to_string(),
        }
    }
}

/// Why a frame could not be handled.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProtocolError {
    /// The text is not JSON.
    #[display("Invalid JSON: {}", _0)]
    InvalidJson(String),
    /// The object has no string `type` field.
    #[display("Message has no type")]
    MissingType,
    /// The `type` is not one the server understands.
    #[display("Unknown message type {:?}", _0)]
    UnknownType(String),
    /// Known `type` with missing or mistyped fields.
    #[display("Malformed message: {}", _0)]
    Malformed(String),
    /// An outbound message could not be serialized.
    #[display("Failed to encode message: {}", _0)]
    Encode(String),
}

impl std::error::Error for ProtocolError {}
