//! Game types and their difficulty curves.
//!
//! Every board game is described by one `StageParams` record per stage: how
//! items are laid out, how many there are, how many are targets, and how much
//! rotation and overlap noise is added. All quantities are non-decreasing in
//! the stage number.

use crate::layout::{GridSpec, MAX_OVERLAP_RADIUS};
use crate::variant::{
    HouseConfig, ShoeVariant, SymbolSet, TargetSignature, TransportType, Variant, VariantDomain,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Digit sets scanned for in the numbers game, one per level
pub const NUMBER_LEVELS: [(&str, [u8; 3]); 3] = [
    ("Beginner Scan", [1, 2, 3]),
    ("Mid-Range Focus", [4, 5, 6]),
    ("Complex Search", [7, 8, 9]),
];

/// Overlap decoy probability added per transport stage
pub const OVERLAP_PROBABILITY_PER_STAGE: f64 = 0.05;

/// Overlap decoy probability never exceeds this
pub const MAX_OVERLAP_PROBABILITY: f64 = 0.3;

/// Rotation range added per transport stage, in degrees
pub const ROTATION_PER_STAGE: f64 = 5.0;

/// Transport rotation never exceeds this, in degrees
pub const MAX_TRANSPORT_ROTATION: f64 = 45.0;

/// Shoes switch from a grid to a free scatter at this stage
pub const SHOE_SCATTER_STAGE: u32 = 3;

/// Highest playable stage; difficulty stops growing here
pub const MAX_STAGE: u32 = 50;

/// Board game types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Numbers,
    Weather,
    Emotion,
    Fruits,
    House,
    Transport,
    Shoes,
}

/// The requested game type does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown game type: {0}")]
pub struct UnknownGameType(pub String);

impl GameType {
    pub const ALL: [GameType; 7] = [
        GameType::Numbers,
        GameType::Weather,
        GameType::Emotion,
        GameType::Fruits,
        GameType::House,
        GameType::Transport,
        GameType::Shoes,
    ];

    /// Route name of this game type
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Numbers => "numbers",
            GameType::Weather => "weather",
            GameType::Emotion => "emotion",
            GameType::Fruits => "fruits",
            GameType::House => "house",
            GameType::Transport => "transport",
            GameType::Shoes => "shoes",
        }
    }

    /// Human readable title
    pub fn title(&self) -> &'static str {
        match self {
            GameType::Numbers => "Numbers",
            GameType::Weather => "Spy Weather",
            GameType::Emotion => "Emotions",
            GameType::Fruits => "Fruits",
            GameType::House => "Where is my House?",
            GameType::Transport => "I Spy Transport",
            GameType::Shoes => "Odd Shoe Out",
        }
    }

    /// Prefix for item ids on this game's boards
    pub fn id_prefix(&self) -> &'static str {
        match self {
            GameType::Numbers => "n",
            GameType::Weather => "w",
            GameType::Emotion => "e",
            GameType::Fruits => "f",
            GameType::House => "h",
            GameType::Transport => "t",
            GameType::Shoes => "s",
        }
    }

    /// Domain items are drawn from
    pub fn domain(&self) -> VariantDomain {
        match self {
            GameType::Numbers => VariantDomain::Digits,
            GameType::Weather => VariantDomain::Symbols(SymbolSet::Weather),
            GameType::Emotion => VariantDomain::Symbols(SymbolSet::Emotion),
            GameType::Fruits => VariantDomain::Symbols(SymbolSet::Fruit),
            GameType::House => VariantDomain::Houses,
            GameType::Transport => VariantDomain::Transport,
            GameType::Shoes => VariantDomain::Shoes,
        }
    }

    /// Draw the target signature for one board.
    ///
    /// Digit sets and symbols follow the stage; houses, vehicles and shoes are
    /// a single random draw.
    pub fn target_for<R: Rng>(&self, stage: u32, rng: &mut R) -> TargetSignature {
        match self {
            GameType::Numbers => TargetSignature::AnyOf(
                number_level(stage)
                    .1
                    .iter()
                    .map(|&d| Variant::Digit(d))
                    .collect(),
            ),
            GameType::Weather | GameType::Emotion | GameType::Fruits => {
                let set = self.symbol_set().unwrap_or(SymbolSet::Weather);
                TargetSignature::Single(Variant::Symbol(set.target_for_stage(stage)))
            }
            GameType::House => TargetSignature::Single(Variant::House(HouseConfig::random(rng))),
            GameType::Transport => TargetSignature::Single(Variant::Transport(
                TransportType::ALL[rng.gen_range(0..TransportType::ALL.len())],
            )),
            GameType::Shoes => TargetSignature::Single(Variant::Shoe(ShoeVariant::random(rng))),
        }
    }

    fn symbol_set(&self) -> Option<SymbolSet> {
        match self.domain() {
            VariantDomain::Symbols(set) => Some(set),
            _ => None,
        }
    }

    /// Label for a stage, used in completion messages
    pub fn stage_label(&self, stage: u32, target: &TargetSignature) -> String {
        match (self, target) {
            (GameType::Numbers, _) => number_level(stage).0.to_string(),
            (_, TargetSignature::Single(Variant::Symbol(symbol))) => self
                .symbol_set()
                .and_then(|set| set.name_of(symbol))
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} {}", self.title(), stage)),
            _ => format!("{} {}", self.title(), stage),
        }
    }

    /// Row of the difficulty table used for a session stage.
    ///
    /// House and transport tables start at row 0, the calm board without
    /// rotation or decoys, which session stage 1 plays.
    pub fn policy_index(&self, stage: u32) -> u32 {
        match self {
            GameType::House | GameType::Transport => stage.saturating_sub(1),
            _ => stage,
        }
    }

    /// The difficulty record for a table row, clamped to `MAX_STAGE`
    pub fn stage_params(&self, stage: u32) -> StageParams {
        let stage = stage.min(MAX_STAGE);
        let s = stage as usize;
        match self {
            GameType::Numbers => {
                let target_count = 3 * (3 + s);
                let item_count = 25 + 3 * s;
                let cols = 6;
                let rows = (5 + stage / 2).max(div_ceil(item_count, cols as usize) as u32);
                StageParams {
                    layout: Layout::Grid(GridSpec {
                        cols,
                        rows,
                        padding: 8.0,
                        jitter: 3.0,
                        stagger: true,
                    }),
                    item_count,
                    target_count,
                    max_rotation: 6.0,
                    overlap: None,
                }
            }
            GameType::Weather | GameType::Emotion | GameType::Fruits => {
                let grid = GridSpec {
                    cols: 5,
                    rows: 4 + stage / 3,
                    padding: 10.0,
                    jitter: 4.0,
                    stagger: true,
                };
                StageParams {
                    item_count: grid.capacity().min(20 + 2 * s),
                    target_count: 5 + s,
                    layout: Layout::Grid(grid),
                    max_rotation: 7.5,
                    overlap: None,
                }
            }
            GameType::House | GameType::Transport => {
                let cols = 6 + stage / 2;
                let rows = 4 + (stage + 1) / 2;
                let grid = GridSpec {
                    cols,
                    rows,
                    padding: 8.0,
                    jitter: 2.0,
                    stagger: false,
                };
                if *self == GameType::House {
                    StageParams {
                        layout: Layout::Grid(grid),
                        item_count: grid.capacity(),
                        target_count: (rows as usize).max(4 + s),
                        max_rotation: 0.0,
                        overlap: None,
                    }
                } else {
                    StageParams {
                        layout: Layout::Grid(grid),
                        item_count: grid.capacity(),
                        target_count: (rows as usize).max(5 + s),
                        max_rotation: transport_max_rotation(stage),
                        overlap: (stage > 0).then(|| OverlapPolicy {
                            probability: transport_overlap_probability(stage),
                            radius: MAX_OVERLAP_RADIUS / 2.0,
                            rotation_jitter: 15.0,
                        }),
                    }
                }
            }
            GameType::Shoes => {
                let item_count = 24 + 6 * s;
                let layout = if stage >= SHOE_SCATTER_STAGE {
                    Layout::Scatter { padding: 6.0 }
                } else {
                    Layout::Grid(GridSpec {
                        cols: 6,
                        rows: div_ceil(item_count, 6) as u32,
                        padding: 6.0,
                        jitter: 2.0,
                        stagger: false,
                    })
                };
                StageParams {
                    layout,
                    item_count,
                    target_count: 2,
                    max_rotation: 0.0,
                    overlap: None,
                }
            }
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = UnknownGameType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numbers" => Ok(GameType::Numbers),
            "weather" => Ok(GameType::Weather),
            "emotion" | "emotions" => Ok(GameType::Emotion),
            "fruits" | "fruit" => Ok(GameType::Fruits),
            "house" | "houses" => Ok(GameType::House),
            "transport" => Ok(GameType::Transport),
            "shoes" => Ok(GameType::Shoes),
            _ => Err(UnknownGameType(s.to_string())),
        }
    }
}

/// Level name and digit set for a numbers stage (clamped to the last level)
pub fn number_level(stage: u32) -> (&'static str, [u8; 3]) {
    let index = (stage.saturating_sub(1) as usize).min(NUMBER_LEVELS.len() - 1);
    NUMBER_LEVELS[index]
}

/// `min(0.3, 0.05 * stage)`
pub fn transport_overlap_probability(stage: u32) -> f64 {
    (stage as f64 * OVERLAP_PROBABILITY_PER_STAGE).min(MAX_OVERLAP_PROBABILITY)
}

/// `min(45, 5 * stage)` degrees
pub fn transport_max_rotation(stage: u32) -> f64 {
    (stage as f64 * ROTATION_PER_STAGE).min(MAX_TRANSPORT_ROTATION)
}

fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// How primary item positions are allocated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// One item per grid cell, no overlap
    Grid(GridSpec),
    /// Independent uniform points, overlap allowed
    Scatter { padding: f64 },
}

impl Layout {
    pub fn padding(&self) -> f64 {
        match self {
            Layout::Grid(grid) => grid.padding,
            Layout::Scatter { padding } => *padding,
        }
    }
}

/// Near-duplicate decoys stacked on top of primary items
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapPolicy {
    /// Chance that a primary item receives a decoy
    pub probability: f64,
    /// Maximum distance of the decoy from its primary item
    pub radius: f64,
    /// Extra rotation applied to the decoy, in degrees either way
    pub rotation_jitter: f64,
}

/// Difficulty record for one stage of one game type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageParams {
    pub layout: Layout,
    /// Primary items on the board (targets plus distractors, decoys excluded)
    pub item_count: usize,
    pub target_count: usize,
    /// Rotations are drawn from `[-max_rotation, max_rotation]`
    pub max_rotation: f64,
    pub overlap: Option<OverlapPolicy>,
}

impl StageParams {
    pub fn distractor_count(&self) -> usize {
        self.item_count.saturating_sub(self.target_count)
    }
}
