//! Maze mini-game: follow a tangled line from a start item to its end.
//!
//! Each start slot is wired to a distinct end slot through a random
//! permutation. The player gets one answer per round; a wrong answer leaves
//! the round `Missed` until it is retried.

use crate::actions::SessionEvent;
use crate::session::{Playable, Progress, POINTS_PER_TARGET};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Line colours, assigned by start slot
pub const MAZE_COLORS: [&str; 5] = ["#E53935", "#1E88E5", "#43A047", "#FB8C00", "#8E24AA"];

/// Most start/end pairs a maze ever has
pub const MAX_MAZE_ITEMS: usize = 5;

const LOCK: &str = "🔒";
const KEY: &str = "🔑";
const SPOOLS: [&str; MAX_MAZE_ITEMS] = ["🧵", "🪡", "🎀", "🧶", "🪢"];
const BALLS: [&str; MAX_MAZE_ITEMS] = ["🔴", "🔵", "🟢", "🟠", "🟣"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MazeKind {
    /// One lock, several keys
    Keys,
    /// Spools wired to balls of yarn
    Threads,
}

/// `min(3 + stage / 2, 5)`
pub fn maze_item_count(stage: u32) -> usize {
    (3 + stage as usize / 2).min(MAX_MAZE_ITEMS)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLine {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MazePhase {
    #[default]
    Choosing,
    Solved,
    /// Wrong answer given; no more answers until retry
    Missed,
}

#[derive(Debug, Clone)]
pub struct MazeGame {
    kind: MazeKind,
    lines: Vec<MazeLine>,
    start_items: Vec<&'static str>,
    end_items: Vec<&'static str>,
    target_start: usize,
    correct_end: usize,
    answer: Option<usize>,
    maze_phase: MazePhase,
    progress: Progress,
    rng: StdRng,
}

impl MazeGame {
    pub fn new(kind: MazeKind) -> Self {
        Self::with_rng(kind, StdRng::from_entropy())
    }

    pub fn with_seed(kind: MazeKind, seed: u64) -> Self {
        Self::with_rng(kind, StdRng::seed_from_u64(seed))
    }

    fn with_rng(kind: MazeKind, rng: StdRng) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            start_items: Vec::new(),
            end_items: Vec::new(),
            target_start: 0,
            correct_end: 0,
            answer: None,
            maze_phase: MazePhase::Choosing,
            progress: Progress::new(),
            rng,
        }
    }

    pub fn kind(&self) -> MazeKind {
        self.kind
    }

    pub fn lines(&self) -> &[MazeLine] {
        &self.lines
    }

    pub fn target_start(&self) -> usize {
        self.target_start
    }

    pub fn correct_end(&self) -> usize {
        self.correct_end
    }

    pub fn maze_phase(&self) -> MazePhase {
        self.maze_phase
    }

    pub fn snapshot(&self) -> MazeSnapshot {
        MazeSnapshot {
            kind: self.kind,
            start_items: self.start_items.iter().map(|s| s.to_string()).collect(),
            end_items: self.end_items.iter().map(|s| s.to_string()).collect(),
            lines: self.lines.clone(),
            target_start: self.target_start,
            answer: self.answer,
            maze_phase: self.maze_phase,
            // The answer is only revealed once the round is over
            correct_end: (self.maze_phase != MazePhase::Choosing).then_some(self.correct_end),
            progress: self.progress.clone(),
        }
    }
}

impl Playable for MazeGame {
    fn progress(&self) -> &Progress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    fn new_round(&mut self, stage: u32) -> usize {
        let count = maze_item_count(stage);
        let mut ends: Vec<usize> = (0..count).collect();
        ends.shuffle(&mut self.rng);

        self.lines = ends
            .iter()
            .enumerate()
            .map(|(start, &end)| MazeLine {
                id: format!("line-{}", start),
                start,
                end,
                color: MAZE_COLORS[start % MAZE_COLORS.len()].to_string(),
            })
            .collect();

        match self.kind {
            MazeKind::Keys => {
                self.start_items = vec![LOCK];
                self.end_items = vec![KEY; count];
                self.target_start = 0;
            }
            MazeKind::Threads => {
                self.start_items = SPOOLS[..count].to_vec();
                self.end_items = BALLS[..count].to_vec();
                self.target_start = self.rng.gen_range(0..count);
            }
        }
        self.correct_end = ends[self.target_start];
        self.answer = None;
        self.maze_phase = MazePhase::Choosing;

        debug!(kind = ?self.kind, stage, count, "maze built");
        1
    }

    fn handle_click(&mut self, item_id: &str) -> Vec<SessionEvent> {
        if self.maze_phase != MazePhase::Choosing {
            return Vec::new();
        }
        let Ok(end) = item_id.trim().parse::<usize>() else {
            return Vec::new();
        };
        if end >= self.end_items.len() {
            return Vec::new();
        }

        self.answer = Some(end);
        if end != self.correct_end {
            self.maze_phase = MazePhase::Missed;
            return vec![SessionEvent::Incorrect {
                item_id: item_id.to_string(),
                score: self.progress.score,
            }];
        }

        self.maze_phase = MazePhase::Solved;
        let score = self.progress.award(POINTS_PER_TARGET);
        let elapsed_ms = self.progress.finish();
        info!(kind = ?self.kind, stage = self.progress.stage, score, "maze solved");
        vec![
            SessionEvent::Correct {
                item_id: item_id.to_string(),
                found: 1,
                total: 1,
                score,
            },
            SessionEvent::StageComplete {
                stage: self.progress.stage,
                score,
                found: 1,
                elapsed_ms,
            },
        ]
    }

    fn stage_label(&self) -> String {
        let name = match self.kind {
            MazeKind::Keys => "Keys",
            MazeKind::Threads => "Threads",
        };
        format!("{} {}", name, self.progress.stage)
    }

    fn clear_round(&mut self) {
        self.lines.clear();
        self.start_items.clear();
        self.end_items.clear();
        self.answer = None;
        self.maze_phase = MazePhase::Choosing;
    }
}

/// Serializable maze state
#[derive(Debug, Clone, Serialize)]
pub struct MazeSnapshot {
    pub kind: MazeKind,
    pub start_items: Vec<String>,
    pub end_items: Vec<String>,
    pub lines: Vec<MazeLine>,
    pub target_start: usize,
    pub answer: Option<usize>,
    pub maze_phase: MazePhase,
    pub correct_end: Option<usize>,
    #[serde(flatten)]
    pub progress: Progress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SessionAction;
    use crate::session::SessionPhase;
    use std::collections::HashSet;

    #[test]
    fn test_item_count_is_capped() {
        assert_eq!(maze_item_count(1), 3);
        assert_eq!(maze_item_count(2), 4);
        assert_eq!(maze_item_count(4), 5);
        assert_eq!(maze_item_count(40), 5);
    }

    #[test]
    fn test_lines_form_a_permutation() {
        let mut game = MazeGame::with_seed(MazeKind::Threads, 4);
        for stage in 1..8 {
            game.apply(SessionAction::Start { stage }).unwrap();
            let ends: HashSet<usize> = game.lines().iter().map(|l| l.end).collect();
            assert_eq!(ends.len(), maze_item_count(stage));
            assert!(game.target_start() < maze_item_count(stage));
            assert_eq!(game.correct_end(), game.lines()[game.target_start()].end);
        }
    }

    #[test]
    fn test_keys_always_start_at_the_lock() {
        let mut game = MazeGame::with_seed(MazeKind::Keys, 10);
        game.apply(SessionAction::Start { stage: 3 }).unwrap();
        assert_eq!(game.target_start(), 0);
        assert_eq!(game.snapshot().start_items, vec!["🔒".to_string()]);
        assert_eq!(game.snapshot().end_items.len(), 4);
    }

    #[test]
    fn test_correct_answer_completes() {
        let mut game = MazeGame::with_seed(MazeKind::Keys, 1);
        game.apply(SessionAction::Start { stage: 1 }).unwrap();
        let answer = game.correct_end().to_string();

        let events = game.click(&answer);
        assert!(events.iter().any(SessionEvent::is_completion));
        assert_eq!(game.progress().phase, SessionPhase::Complete);
        assert_eq!(game.progress().score, 10);
        assert_eq!(game.maze_phase(), MazePhase::Solved);
    }

    #[test]
    fn test_wrong_answer_blocks_until_retry() {
        let mut game = MazeGame::with_seed(MazeKind::Threads, 2);
        game.apply(SessionAction::Start { stage: 1 }).unwrap();
        let wrong = (game.correct_end() + 1) % 3;
        let right = game.correct_end().to_string();

        let events = game.click(&wrong.to_string());
        assert!(matches!(events[0], SessionEvent::Incorrect { .. }));
        assert_eq!(game.maze_phase(), MazePhase::Missed);
        assert!(game.click(&right).is_empty());
        assert_eq!(game.snapshot().correct_end, Some(game.correct_end()));

        game.apply(SessionAction::Retry).unwrap();
        assert_eq!(game.maze_phase(), MazePhase::Choosing);
        assert_eq!(game.snapshot().correct_end, None);
    }

    #[test]
    fn test_out_of_range_answer_is_ignored() {
        let mut game = MazeGame::with_seed(MazeKind::Threads, 2);
        game.apply(SessionAction::Start { stage: 1 }).unwrap();
        assert!(game.click("7").is_empty());
        assert!(game.click("left").is_empty());
        assert_eq!(game.maze_phase(), MazePhase::Choosing);
    }
}
