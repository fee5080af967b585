use actix::Message;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::room::Side;

/// Message sent from client to server, keyed by its `type` field
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        #[serde(rename = "roomId", deserialize_with = "room_key")]
        room_id: String,
    },
    JoinRoom {
        #[serde(rename = "roomId", deserialize_with = "room_key")]
        room_id: String,
    },
    LeaveRoom,
    Move {
        /// Opaque to the server; forwarded verbatim
        #[serde(rename = "move", default)]
        payload: Value,
    },
    Chat {
        #[serde(default)]
        message: String,
    },
    RestartRequest,
    RestartAccept,
    Ping,
    /// Any `type` this server does not know about
    #[serde(other)]
    Unknown,
}

/// Room ids arrive as strings or as bare numbers from a numeric input box;
/// a number is keyed by its decimal text, so `42` and `"42"` are one room.
fn room_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "roomId must be a string or number, got {other}"
        ))),
    }
}

/// Message sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Error {
        message: String,
    },
    RoomCreated {
        #[serde(rename = "roomId")]
        room_id: String,
        color: Side,
    },
    JoinAccepted {
        #[serde(rename = "roomId")]
        room_id: String,
        color: Side,
    },
    OpponentJoined {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    GameStart {
        message: String,
    },
    OpponentDisconnected {
        message: String,
    },
    Move {
        #[serde(rename = "move")]
        payload: Value,
    },
    Chat {
        message: String,
        from: ChatOrigin,
    },
    RestartRequest,
    RestartAccepted,
    Pong,
}

/// Who a forwarded chat line came from, from the receiver's point of view
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatOrigin {
    Opponent,
}

impl ServerMessage {
    pub fn error(reason: impl ToString) -> Self {
        ServerMessage::Error {
            message: reason.to_string(),
        }
    }

    /// The wire name of this message, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Error { .. } => "error",
            ServerMessage::RoomCreated { .. } => "room_created",
            ServerMessage::JoinAccepted { .. } => "join_accepted",
            ServerMessage::OpponentJoined { .. } => "opponent_joined",
            ServerMessage::GameStart { .. } => "game_start",
            ServerMessage::OpponentDisconnected { .. } => "opponent_disconnected",
            ServerMessage::Move { .. } => "move",
            ServerMessage::Chat { .. } => "chat",
            ServerMessage::RestartRequest => "restart_request",
            ServerMessage::RestartAccepted => "restart_accepted",
            ServerMessage::Pong => "pong",
        }
    }
}

/// Serialized frame pushed to a session actor for delivery to its client
#[derive(Message)]
#[rtype(result = "()")]
pub struct RelayFrame(pub String);
