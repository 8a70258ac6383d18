//! Actions a player can take and the events they produce.
//!
//! Every activity (board games and mini-games alike) consumes the same
//! `SessionAction` set and answers with a list of `SessionEvent`s. An empty
//! list means the action was stale input and nothing changed.

use serde::{Deserialize, Serialize};

/// All possible player actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionAction {
    /// Build a fresh round for a stage (1-based)
    Start { stage: u32 },
    /// Click an item, dot, end slot or spot by id
    Click { item_id: String },
    /// Advance to the next stage after completing the current one
    NextStage,
    /// Replay the current stage with a fresh round
    Retry,
    /// Leave the game and return to the menu
    Exit,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new round is accepting clicks
    StageStarted {
        stage: u32,
        total: usize,
    },

    /// A target was found
    Correct {
        item_id: String,
        found: usize,
        total: usize,
        score: u32,
    },

    /// A non-target was clicked
    Incorrect {
        item_id: String,
        score: u32,
    },

    /// Every target found; the round is over
    StageComplete {
        stage: u32,
        score: u32,
        found: usize,
        elapsed_ms: i64,
    },

    /// Path progress was lost after a wrong dot
    ProgressReset,

    /// The player left the game
    ReturnedToMenu,
}

impl SessionEvent {
    pub fn is_completion(&self) -> bool {
        matches!(self, SessionEvent::StageComplete { .. })
    }
}
