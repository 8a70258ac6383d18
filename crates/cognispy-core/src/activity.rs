//! One entry point for every game on the menu.
//!
//! Board games and mini-games are all `Playable`; `Activity` picks the right
//! one from a route name and forwards actions to it.

use crate::actions::{SessionAction, SessionEvent};
use crate::advisory::{AdvisoryRequest, Locale, RoundToken};
use crate::maze::{MazeGame, MazeKind, MazeSnapshot};
use crate::policy::GameType;
use crate::scene::{BearsGame, SceneSnapshot};
use crate::session::{Playable, Progress, Session, SessionError, SessionSnapshot};
use crate::trace::{TraceGame, TraceKind, TraceSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which game an activity runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "kind", rename_all = "snake_case")]
pub enum ActivityKind {
    Board(GameType),
    Trace(TraceKind),
    Maze(MazeKind),
    Bears,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Unknown activity: {0}")]
pub struct ParseActivityError(pub String);

impl From<ParseActivityError> for SessionError {
    fn from(e: ParseActivityError) -> Self {
        SessionError::UnknownGame(e.0)
    }
}

impl ActivityKind {
    pub fn route(&self) -> &'static str {
        match self {
            ActivityKind::Board(game) => game.as_str(),
            ActivityKind::Trace(TraceKind::Arrows) => "arrows",
            ActivityKind::Trace(TraceKind::Shapes) => "shapes",
            ActivityKind::Maze(MazeKind::Keys) => "keys",
            ActivityKind::Maze(MazeKind::Threads) => "threads",
            ActivityKind::Bears => "bears",
        }
    }

    /// Every activity on the menu
    pub fn all() -> Vec<ActivityKind> {
        let mut kinds: Vec<ActivityKind> =
            GameType::ALL.into_iter().map(ActivityKind::Board).collect();
        kinds.extend([
            ActivityKind::Trace(TraceKind::Arrows),
            ActivityKind::Trace(TraceKind::Shapes),
            ActivityKind::Maze(MazeKind::Keys),
            ActivityKind::Maze(MazeKind::Threads),
            ActivityKind::Bears,
        ]);
        kinds
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

impl FromStr for ActivityKind {
    type Err = ParseActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(game) = s.parse::<GameType>() {
            return Ok(ActivityKind::Board(game));
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "arrows" => Ok(ActivityKind::Trace(TraceKind::Arrows)),
            "shapes" => Ok(ActivityKind::Trace(TraceKind::Shapes)),
            "keys" => Ok(ActivityKind::Maze(MazeKind::Keys)),
            "threads" => Ok(ActivityKind::Maze(MazeKind::Threads)),
            "bears" => Ok(ActivityKind::Bears),
            _ => Err(ParseActivityError(s.to_string())),
        }
    }
}

/// A running game of any kind
#[derive(Debug, Clone)]
pub enum Activity {
    Board(Session),
    Trace(TraceGame),
    Maze(MazeGame),
    Bears(BearsGame),
}

impl Activity {
    pub fn new(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Board(game) => Activity::Board(Session::new(game)),
            ActivityKind::Trace(kind) => Activity::Trace(TraceGame::new(kind)),
            ActivityKind::Maze(kind) => Activity::Maze(MazeGame::new(kind)),
            ActivityKind::Bears => Activity::Bears(BearsGame::new()),
        }
    }

    /// Activity whose random layouts are reproducible from `seed`
    pub fn with_seed(kind: ActivityKind, seed: u64) -> Self {
        match kind {
            ActivityKind::Board(game) => Activity::Board(Session::with_seed(game, seed)),
            ActivityKind::Maze(kind) => Activity::Maze(MazeGame::with_seed(kind, seed)),
            other => Activity::new(other),
        }
    }

    /// Activity for a route name; unknown names are a configuration error
    pub fn from_name(name: &str, seed: Option<u64>) -> Result<Self, SessionError> {
        let kind = name.parse::<ActivityKind>()?;
        Ok(match seed {
            Some(seed) => Activity::with_seed(kind, seed),
            None => Activity::new(kind),
        })
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::Board(session) => ActivityKind::Board(session.game_type()),
            Activity::Trace(game) => ActivityKind::Trace(game.kind()),
            Activity::Maze(game) => ActivityKind::Maze(game.kind()),
            Activity::Bears(_) => ActivityKind::Bears,
        }
    }

    fn playable(&self) -> &dyn Playable {
        match self {
            Activity::Board(session) => session,
            Activity::Trace(game) => game,
            Activity::Maze(game) => game,
            Activity::Bears(game) => game,
        }
    }

    fn playable_mut(&mut self) -> &mut dyn Playable {
        match self {
            Activity::Board(session) => session,
            Activity::Trace(game) => game,
            Activity::Maze(game) => game,
            Activity::Bears(game) => game,
        }
    }

    pub fn apply(&mut self, action: SessionAction) -> Result<Vec<SessionEvent>, SessionError> {
        self.playable_mut().apply(action)
    }

    pub fn progress(&self) -> &Progress {
        self.playable().progress()
    }

    pub fn advisory_request(
        &self,
        username: &str,
        locale: Locale,
    ) -> Option<(RoundToken, AdvisoryRequest)> {
        self.playable().advisory_request(username, locale)
    }

    pub fn accept_advisory(&mut self, token: RoundToken, text: &str) -> bool {
        self.playable_mut().accept_advisory(token, text)
    }

    pub fn completion_message(&self, username: &str, locale: Locale) -> String {
        self.playable().completion_message(username, locale)
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        match self {
            Activity::Board(session) => ActivitySnapshot::Board(session.snapshot()),
            Activity::Trace(game) => ActivitySnapshot::Trace(game.snapshot()),
            Activity::Maze(game) => ActivitySnapshot::Maze(game.snapshot()),
            Activity::Bears(game) => ActivitySnapshot::Bears(game.snapshot()),
        }
    }

    /// Snapshot as a JSON value for clients
    pub fn state_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

/// Serializable state of any activity
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "activity", rename_all = "snake_case")]
pub enum ActivitySnapshot {
    Board(SessionSnapshot),
    Trace(TraceSnapshot),
    Maze(MazeSnapshot),
    Bears(SceneSnapshot),
}
