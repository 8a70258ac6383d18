//! WebSocket protocol messages for CogniSpy.

use cognispy_core::{FeedbackKind, SessionEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Identify the player; `locale` is "en" or "ru"
    Hello { username: String, locale: String },

    /// Open a game by route name (e.g. "numbers", "houses", "keys")
    SelectGame { game: String },

    /// Start a stage of the selected game
    Start { stage: u32 },

    /// Click an item, dot index, end slot index or spot id
    Click { item_id: String },

    /// Continue after a completed stage
    NextStage,

    /// Replay the current stage
    Retry,

    /// Go back to the menu
    LeaveGame,

    /// Turn feedback tones on or off
    SetSound { enabled: bool },

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned connection ID
    Welcome { connection_id: Uuid },

    /// A game was opened
    GameSelected { game: String },

    /// Full state of the open game
    State { state: serde_json::Value },

    /// Events produced by the last action
    Events { events: Vec<SessionEvent> },

    /// Play a feedback tone
    Feedback { kind: FeedbackKind },

    /// Completion screen text; provisional text may be replaced once
    Completion { message: String, provisional: bool },

    /// Show the game menu
    Menu,

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}
