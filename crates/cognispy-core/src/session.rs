//! Game session state machine.
//!
//! A session is created once per game-type selection and mutated in place
//! across stages:
//!
//! ```text
//! Idle --start--> Active --last target--> Complete --next/retry--> Active
//!   ^                |                        |
//!   +------exit------+-----------exit---------+
//! ```
//!
//! Stale input (unknown ids, found targets, clicks outside `Active`) is never
//! an error; it yields an empty event list.

use crate::actions::{SessionAction, SessionEvent};
use crate::advisory::{fallback_message, AdvisoryRequest, Locale, RoundToken};
use crate::board::{Board, BoardBuilder, ClickResult};
use crate::policy::{GameType, UnknownGameType, MAX_STAGE};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Points awarded for each target found
pub const POINTS_PER_TARGET: u32 = 10;

/// Points removed for each wrong click (score never drops below zero)
pub const MISS_PENALTY: u32 = 5;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No round in play
    #[default]
    Idle,
    /// Round in play, accepting clicks
    Active,
    /// Round finished, awaiting next stage, retry or exit
    Complete,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SessionError {
    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Invalid stage: {0}")]
    InvalidStage(u32),

    #[error("Unknown game: {0}")]
    UnknownGame(String),
}

impl From<UnknownGameType> for SessionError {
    fn from(e: UnknownGameType) -> Self {
        SessionError::UnknownGame(e.0)
    }
}

/// Stage, score, timing and round bookkeeping shared by every activity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progress {
    pub stage: u32,
    pub score: u32,
    pub phase: SessionPhase,
    /// Incremented on every start and exit
    pub round: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Remote congratulation accepted for this round
    pub advisory: Option<String>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a fresh round of `stage`
    pub fn begin(&mut self, stage: u32) -> Result<(), SessionError> {
        if stage == 0 || stage > MAX_STAGE {
            return Err(SessionError::InvalidStage(stage));
        }
        self.stage = stage;
        self.score = 0;
        self.phase = SessionPhase::Active;
        self.round += 1;
        self.started_at = Some(Utc::now());
        self.ended_at = None;
        self.advisory = None;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    pub fn award(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub fn penalize(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_sub(points);
        self.score
    }

    /// Mark the round complete and return its duration
    pub fn finish(&mut self) -> i64 {
        self.phase = SessionPhase::Complete;
        self.ended_at = Some(Utc::now());
        self.elapsed_ms().unwrap_or(0)
    }

    /// Drop the round and return to the menu
    pub fn leave(&mut self) {
        self.phase = SessionPhase::Idle;
        self.round += 1;
        self.started_at = None;
        self.ended_at = None;
        self.advisory = None;
    }

    pub fn elapsed_ms(&self) -> Option<i64> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }

    /// Stage to start for `NextStage`
    pub fn next_stage(&self) -> Result<u32, SessionError> {
        match self.phase {
            SessionPhase::Complete => self
                .stage
                .checked_add(1)
                .filter(|next| *next <= MAX_STAGE)
                .ok_or(SessionError::InvalidStage(self.stage.saturating_add(1))),
            _ => Err(SessionError::InvalidPhase),
        }
    }

    /// Stage to start for `Retry`
    pub fn retry_stage(&self) -> Result<u32, SessionError> {
        match self.phase {
            SessionPhase::Active | SessionPhase::Complete => Ok(self.stage),
            SessionPhase::Idle => Err(SessionError::InvalidPhase),
        }
    }

    pub fn token(&self) -> RoundToken {
        RoundToken(self.round)
    }

    /// Store remote text if it belongs to the current, still complete round
    pub fn accept_advisory(&mut self, token: RoundToken, text: &str) -> bool {
        let text = text.trim();
        if token != self.token() || !self.is_complete() || text.is_empty() {
            debug!(?token, round = self.round, "discarding stale advisory text");
            return false;
        }
        self.advisory = Some(text.to_string());
        true
    }

    /// Accepted remote text, or the canned message for the locale
    pub fn completion_message(&self, username: &str, locale: Locale) -> String {
        self.advisory
            .clone()
            .unwrap_or_else(|| fallback_message(username, locale))
    }
}

/// A stage-based activity driven by `SessionAction`s.
///
/// Implementors provide round construction and click handling; phase
/// transitions, scoring resets and advisory bookkeeping come from `Progress`.
pub trait Playable {
    fn progress(&self) -> &Progress;

    fn progress_mut(&mut self) -> &mut Progress;

    /// Lay out a fresh round for `stage` and return how many targets it holds
    fn new_round(&mut self, stage: u32) -> usize;

    /// Handle a click while the round is active
    fn handle_click(&mut self, item_id: &str) -> Vec<SessionEvent>;

    /// Label for the current stage in completion messages
    fn stage_label(&self) -> String;

    /// Drop round state when leaving the game
    fn clear_round(&mut self) {}

    fn start(&mut self, stage: u32) -> Result<Vec<SessionEvent>, SessionError> {
        self.progress_mut().begin(stage)?;
        let total = self.new_round(stage);
        Ok(vec![SessionEvent::StageStarted { stage, total }])
    }

    /// Click by id. Clicks outside an active round are stale and ignored.
    fn click(&mut self, item_id: &str) -> Vec<SessionEvent> {
        if !self.progress().is_active() {
            return Vec::new();
        }
        self.handle_click(item_id)
    }

    fn exit(&mut self) -> Vec<SessionEvent> {
        self.clear_round();
        self.progress_mut().leave();
        vec![SessionEvent::ReturnedToMenu]
    }

    fn apply(&mut self, action: SessionAction) -> Result<Vec<SessionEvent>, SessionError> {
        match action {
            SessionAction::Start { stage } => self.start(stage),
            SessionAction::Click { item_id } => Ok(self.click(&item_id)),
            SessionAction::NextStage => {
                let stage = self.progress().next_stage()?;
                self.start(stage)
            }
            SessionAction::Retry => {
                let stage = self.progress().retry_stage()?;
                self.start(stage)
            }
            SessionAction::Exit => Ok(self.exit()),
        }
    }

    /// Request for remote congratulation text, available once the round is complete
    fn advisory_request(
        &self,
        username: &str,
        locale: Locale,
    ) -> Option<(RoundToken, AdvisoryRequest)> {
        let progress = self.progress();
        if !progress.is_complete() {
            return None;
        }
        let request = AdvisoryRequest {
            score: progress.score,
            stage_label: self.stage_label(),
            username: username.to_string(),
            locale,
        };
        Some((progress.token(), request))
    }

    fn accept_advisory(&mut self, token: RoundToken, text: &str) -> bool {
        self.progress_mut().accept_advisory(token, text)
    }

    fn completion_message(&self, username: &str, locale: Locale) -> String {
        self.progress().completion_message(username, locale)
    }
}

/// One player's run through a board game type
#[derive(Debug, Clone)]
pub struct Session {
    game_type: GameType,
    board: Option<Board>,
    found_count: usize,
    progress: Progress,
    rng: StdRng,
}

impl Session {
    pub fn new(game_type: GameType) -> Self {
        Self::with_rng(game_type, StdRng::from_entropy())
    }

    /// Session whose boards are reproducible from `seed`
    pub fn with_seed(game_type: GameType, seed: u64) -> Self {
        Self::with_rng(game_type, StdRng::seed_from_u64(seed))
    }

    fn with_rng(game_type: GameType, rng: StdRng) -> Self {
        Self {
            game_type,
            board: None,
            found_count: 0,
            progress: Progress::new(),
            rng,
        }
    }

    /// Session for a game named by route
    pub fn from_name(name: &str) -> Result<Self, SessionError> {
        Ok(Self::new(name.parse::<GameType>()?))
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.progress.phase
    }

    pub fn is_active(&self) -> bool {
        self.progress.is_active()
    }

    pub fn stage(&self) -> u32 {
        self.progress.stage
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn found_count(&self) -> usize {
        self.found_count
    }

    pub fn total_target_count(&self) -> usize {
        self.board.as_ref().map_or(0, |b| b.total_target_count)
    }

    /// JSON-friendly view for renderers
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game_type: self.game_type,
            found_count: self.found_count,
            total_target_count: self.total_target_count(),
            elapsed_ms: self.progress.elapsed_ms(),
            progress: self.progress.clone(),
            board: self.board.clone(),
        }
    }
}

impl Playable for Session {
    fn progress(&self) -> &Progress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    fn new_round(&mut self, stage: u32) -> usize {
        let params = self
            .game_type
            .stage_params(self.game_type.policy_index(stage));
        let board = BoardBuilder::new(self.game_type, stage)
            .with_params(params)
            .build(&mut self.rng);
        let total = board.total_target_count;
        self.board = Some(board);
        self.found_count = 0;

        debug!(game = %self.game_type, stage, total, "stage started");
        total
    }

    fn handle_click(&mut self, item_id: &str) -> Vec<SessionEvent> {
        let Some(board) = self.board.as_mut() else {
            return Vec::new();
        };

        match board.mark_found(item_id) {
            ClickResult::Unknown | ClickResult::AlreadyFound => Vec::new(),
            ClickResult::Miss => {
                let score = self.progress.penalize(MISS_PENALTY);
                vec![SessionEvent::Incorrect {
                    item_id: item_id.to_string(),
                    score,
                }]
            }
            ClickResult::Hit => {
                self.found_count += 1;
                let total = board.total_target_count;
                let score = self.progress.award(POINTS_PER_TARGET);
                let mut events = vec![SessionEvent::Correct {
                    item_id: item_id.to_string(),
                    found: self.found_count,
                    total,
                    score,
                }];

                if self.found_count == total {
                    let elapsed_ms = self.progress.finish();
                    info!(
                        game = %self.game_type,
                        stage = self.progress.stage,
                        score,
                        elapsed_ms,
                        "stage complete"
                    );
                    events.push(SessionEvent::StageComplete {
                        stage: self.progress.stage,
                        score,
                        found: self.found_count,
                        elapsed_ms,
                    });
                }
                events
            }
        }
    }

    fn stage_label(&self) -> String {
        match &self.board {
            Some(board) => self
                .game_type
                .stage_label(self.progress.stage, &board.target_signature),
            None => format!("{} {}", self.game_type.title(), self.progress.stage),
        }
    }

    fn clear_round(&mut self) {
        self.board = None;
        self.found_count = 0;
    }
}

/// Serializable session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub game_type: GameType,
    pub found_count: usize,
    pub total_target_count: usize,
    pub elapsed_ms: Option<i64>,
    #[serde(flatten)]
    pub progress: Progress,
    pub board: Option<Board>,
}
