//! Path-tracing mini-game.
//!
//! The player copies a pattern by clicking dots on a 5x5 grid in order:
//!
//! ```text
//!  0  1  2  3  4
//!  5  6  7  8  9
//! 10 11 12 13 14
//! 15 16 17 18 19
//! 20 21 22 23 24
//! ```
//!
//! A wrong dot loses all progress on the current pattern.

use crate::actions::SessionEvent;
use crate::session::{Playable, Progress, POINTS_PER_TARGET};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Dots per side of the tracing grid
pub const TRACE_GRID_SIZE: u8 = 5;

/// A named sequence of dot indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TracePattern {
    pub name: &'static str,
    pub dots: &'static [u8],
}

const ARROW_PATTERNS: [TracePattern; 4] = [
    TracePattern {
        name: "line",
        dots: &[10, 11, 12, 13, 14],
    },
    TracePattern {
        name: "vertical",
        dots: &[2, 7, 12, 17, 22],
    },
    TracePattern {
        name: "diagonal",
        dots: &[0, 6, 12, 18, 24],
    },
    TracePattern {
        name: "L",
        dots: &[2, 7, 12, 17, 22, 23, 24],
    },
];

const SHAPE_PATTERNS: [TracePattern; 4] = [
    TracePattern {
        name: "square",
        dots: &[6, 7, 8, 13, 18, 17, 16, 11, 6],
    },
    TracePattern {
        name: "triangle",
        dots: &[2, 22, 4, 2],
    },
    TracePattern {
        name: "plus",
        dots: &[2, 7, 12, 10, 11, 12, 14, 13, 12, 17, 22],
    },
    TracePattern {
        name: "diamond",
        dots: &[2, 8, 22, 16, 2],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Arrows,
    Shapes,
}

impl TraceKind {
    pub fn patterns(&self) -> &'static [TracePattern] {
        match self {
            TraceKind::Arrows => &ARROW_PATTERNS,
            TraceKind::Shapes => &SHAPE_PATTERNS,
        }
    }

    /// Pattern for a stage, cycling through the set
    pub fn pattern_for(&self, stage: u32) -> TracePattern {
        let patterns = self.patterns();
        patterns[stage.saturating_sub(1) as usize % patterns.len()]
    }
}

/// Row and column of a dot index
pub fn dot_coords(index: u8) -> (u8, u8) {
    (index / TRACE_GRID_SIZE, index % TRACE_GRID_SIZE)
}

#[derive(Debug, Clone)]
pub struct TraceGame {
    kind: TraceKind,
    pattern: TracePattern,
    step: usize,
    path: Vec<u8>,
    progress: Progress,
}

impl TraceGame {
    pub fn new(kind: TraceKind) -> Self {
        Self {
            kind,
            pattern: kind.pattern_for(1),
            step: 0,
            path: Vec::new(),
            progress: Progress::new(),
        }
    }

    pub fn kind(&self) -> TraceKind {
        self.kind
    }

    pub fn pattern(&self) -> TracePattern {
        self.pattern
    }

    /// The dot that must be clicked next, if any remain
    pub fn expected_dot(&self) -> Option<u8> {
        self.pattern.dots.get(self.step).copied()
    }

    pub fn snapshot(&self) -> TraceSnapshot {
        TraceSnapshot {
            kind: self.kind,
            grid_size: TRACE_GRID_SIZE,
            pattern: self.pattern,
            step: self.step,
            path: self.path.clone(),
            progress: self.progress.clone(),
        }
    }
}

impl Playable for TraceGame {
    fn progress(&self) -> &Progress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    fn new_round(&mut self, stage: u32) -> usize {
        self.pattern = self.kind.pattern_for(stage);
        self.step = 0;
        self.path.clear();
        self.pattern.dots.len()
    }

    fn handle_click(&mut self, item_id: &str) -> Vec<SessionEvent> {
        let Ok(dot) = item_id.trim().parse::<u8>() else {
            return Vec::new();
        };
        if dot >= TRACE_GRID_SIZE * TRACE_GRID_SIZE {
            return Vec::new();
        }
        let Some(expected) = self.expected_dot() else {
            return Vec::new();
        };

        if dot != expected {
            self.step = 0;
            self.path.clear();
            return vec![
                SessionEvent::Incorrect {
                    item_id: item_id.to_string(),
                    score: self.progress.score,
                },
                SessionEvent::ProgressReset,
            ];
        }

        self.step += 1;
        self.path.push(dot);
        let total = self.pattern.dots.len();
        if self.step < total {
            return vec![SessionEvent::Correct {
                item_id: item_id.to_string(),
                found: self.step,
                total,
                score: self.progress.score,
            }];
        }

        let score = self.progress.award(POINTS_PER_TARGET);
        let elapsed_ms = self.progress.finish();
        info!(kind = ?self.kind, pattern = self.pattern.name, score, "pattern traced");
        vec![
            SessionEvent::Correct {
                item_id: item_id.to_string(),
                found: self.step,
                total,
                score,
            },
            SessionEvent::StageComplete {
                stage: self.progress.stage,
                score,
                found: self.step,
                elapsed_ms,
            },
        ]
    }

    fn stage_label(&self) -> String {
        format!("{} {}", self.pattern.name, self.progress.stage)
    }

    fn clear_round(&mut self) {
        self.step = 0;
        self.path.clear();
    }
}

/// Serializable trace state
#[derive(Debug, Clone, Serialize)]
pub struct TraceSnapshot {
    pub kind: TraceKind,
    pub grid_size: u8,
    pub pattern: TracePattern,
    pub step: usize,
    pub path: Vec<u8>,
    #[serde(flatten)]
    pub progress: Progress,
}
