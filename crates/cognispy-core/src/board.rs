//! Board representation and the generic board builder.
//!
//! A board is built in one pass from a game type's `StageParams`: pick the
//! target signature, allocate positions, assign the first slots as targets and
//! the rest as distractors, optionally add overlap decoys, then sort by
//! stacking order.

use crate::layout::{scatter, scatter_around, spread, Point};
use crate::policy::{GameType, Layout, StageParams};
use crate::variant::{TargetSignature, Variant};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Lowest z-index given to targets
pub const TARGET_Z_BASE: i32 = 100;

/// Lowest z-index given to distractors
pub const DISTRACTOR_Z_BASE: i32 = 10;

/// Width of the random z-index band above each base
const Z_SPREAD: i32 = 5;

/// A positioned, valued item on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub value: Variant,
    pub is_target: bool,
    pub is_found: bool,
    /// Horizontal position in percent of the canvas
    pub x: f64,
    /// Vertical position in percent of the canvas
    pub y: f64,
    /// Rotation in degrees
    pub rotation: f64,
    pub z_index: i32,
}

impl Item {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Outcome of marking an item on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResult {
    /// No item with that id
    Unknown,
    /// Target that was already found
    AlreadyFound,
    /// Target newly found
    Hit,
    /// Not a target
    Miss,
}

/// The full set of items for one round of play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub game_type: GameType,
    pub stage: u32,
    /// Items in render order (ascending z-index)
    pub items: Vec<Item>,
    pub target_signature: TargetSignature,
    pub total_target_count: usize,
    /// Difficulty record the board was built from
    pub params: StageParams,
}

impl Board {
    /// Build a fresh board with a provided RNG, for reproducible layouts
    pub fn generate_with_rng<R: Rng>(game_type: GameType, stage: u32, rng: &mut R) -> Self {
        BoardBuilder::new(game_type, stage).build(rng)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_target)
    }

    pub fn found_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_found).count()
    }

    /// Every target has been found
    pub fn is_cleared(&self) -> bool {
        self.targets().all(|item| item.is_found)
    }

    /// Mark an item as clicked. Only unfound targets change state.
    pub fn mark_found(&mut self, id: &str) -> ClickResult {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return ClickResult::Unknown;
        };

        match (item.is_target, item.is_found) {
            (false, _) => ClickResult::Miss,
            (true, true) => ClickResult::AlreadyFound,
            (true, false) => {
                item.is_found = true;
                ClickResult::Hit
            }
        }
    }
}

/// Composes variant generation and position allocation into a board
#[derive(Debug, Clone)]
pub struct BoardBuilder {
    game_type: GameType,
    stage: u32,
    params: StageParams,
    target: Option<TargetSignature>,
}

impl BoardBuilder {
    pub fn new(game_type: GameType, stage: u32) -> Self {
        Self {
            game_type,
            stage,
            params: game_type.stage_params(stage),
            target: None,
        }
    }

    /// Use a fixed target signature instead of drawing one
    pub fn with_target(mut self, target: TargetSignature) -> Self {
        self.target = Some(target);
        self
    }

    /// Override the stage's difficulty record
    pub fn with_params(mut self, params: StageParams) -> Self {
        self.params = params;
        self
    }

    pub fn build<R: Rng>(self, rng: &mut R) -> Board {
        let BoardBuilder {
            game_type,
            stage,
            params,
            target,
        } = self;

        let target = match target {
            Some(signature) if signature.member(0).is_some() => signature,
            _ => game_type.target_for(stage, rng),
        };
        let domain = game_type.domain();
        let prefix = game_type.id_prefix();
        let padding = params.layout.padding();

        let positions = match params.layout {
            Layout::Grid(grid) => grid.allocate(params.item_count, rng),
            Layout::Scatter { padding } => scatter(params.item_count, padding, rng),
        };
        let target_count = params.target_count.clamp(1, positions.len().max(1));

        let mut items = Vec::with_capacity(positions.len());
        for (i, position) in positions.into_iter().enumerate() {
            let is_target = i < target_count;
            let value = if is_target {
                target.member(i).cloned()
            } else {
                domain.distractor_of(&target, rng)
            };
            let Some(value) = value else {
                warn!(game = %game_type, stage, slot = i, "no distractor differs from target, slot left empty");
                continue;
            };

            let z_base = if is_target {
                TARGET_Z_BASE
            } else {
                DISTRACTOR_Z_BASE
            };
            items.push(Item {
                id: format!("{}-{}", prefix, i),
                value,
                is_target,
                is_found: false,
                x: position.x,
                y: position.y,
                rotation: spread(rng, params.max_rotation * 2.0),
                z_index: z_base + rng.gen_range(0..Z_SPREAD),
            });
        }

        if let Some(overlap) = params.overlap {
            let probability = overlap.probability.clamp(0.0, 1.0);
            let mut decoys = Vec::new();
            for (i, primary) in items.iter().enumerate() {
                if !rng.gen_bool(probability) {
                    continue;
                }
                let Some(value) = domain.distractor_of(&target, rng) else {
                    continue;
                };
                let position = scatter_around(primary.position(), overlap.radius, padding, rng);
                let rotation = (primary.rotation + spread(rng, overlap.rotation_jitter * 2.0))
                    .clamp(-params.max_rotation, params.max_rotation);
                // Decoys sit just above their primary but never above the target band
                let z_index = if primary.is_target {
                    TARGET_Z_BASE - 1
                } else {
                    primary.z_index + 1
                };
                decoys.push(Item {
                    id: format!("{}-ov-{}", prefix, i),
                    value,
                    is_target: false,
                    is_found: false,
                    x: position.x,
                    y: position.y,
                    rotation,
                    z_index,
                });
            }
            items.extend(decoys);
        }

        items.sort_by_key(|item| item.z_index);
        let total_target_count = items.iter().filter(|item| item.is_target).count();

        debug!(
            game = %game_type,
            stage,
            items = items.len(),
            targets = total_target_count,
            "board built"
        );

        Board {
            game_type,
            stage,
            items,
            target_signature: target,
            total_target_count,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Door, HouseConfig, TransportType, Windows};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_target_count_matches_formula() {
        let mut rng = StdRng::seed_from_u64(42);
        for game in GameType::ALL {
            for stage in 1..=8 {
                let board = Board::generate_with_rng(game, stage, &mut rng);
                let expected = game.stage_params(stage).target_count;
                assert_eq!(board.total_target_count, expected, "{} stage {}", game, stage);
                assert_eq!(board.targets().count(), expected);
            }
        }
    }

    #[test]
    fn test_is_target_iff_value_matches() {
        let mut rng = StdRng::seed_from_u64(7);
        for game in GameType::ALL {
            let board = Board::generate_with_rng(game, 4, &mut rng);
            for item in &board.items {
                assert_eq!(
                    item.is_target,
                    board.target_signature.matches(&item.value),
                    "{} item {}",
                    game,
                    item.id
                );
            }
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(3);
        let board = Board::generate_with_rng(GameType::Transport, 6, &mut rng);
        let ids: HashSet<&str> = board.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), board.items.len());
    }

    #[test]
    fn test_items_sorted_by_z_and_targets_on_top() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let board = Board::generate_with_rng(GameType::Transport, 6, &mut rng);
            assert!(board.items.windows(2).all(|w| w[0].z_index <= w[1].z_index));
            for item in &board.items {
                if item.is_target {
                    assert!(item.z_index >= TARGET_Z_BASE);
                } else {
                    assert!(item.z_index < TARGET_Z_BASE);
                }
            }
        }
    }

    #[test]
    fn test_numbers_targets_spread_across_digit_set() {
        let mut rng = StdRng::seed_from_u64(5);
        let board = Board::generate_with_rng(GameType::Numbers, 1, &mut rng);
        for digit in 1..=3u8 {
            let count = board
                .targets()
                .filter(|item| item.value == Variant::Digit(digit))
                .count();
            assert_eq!(count, 4, "digit {} should appear 4 times", digit);
        }
    }

    #[test]
    fn test_fixed_target_is_respected() {
        let mut rng = StdRng::seed_from_u64(1);
        let target = TargetSignature::Single(Variant::House(HouseConfig::new(
            Door::Left,
            Windows::Split,
            false,
        )));
        let board = BoardBuilder::new(GameType::House, 2)
            .with_target(target.clone())
            .build(&mut rng);
        assert_eq!(board.target_signature, target);
    }

    #[test]
    fn test_empty_target_set_falls_back_to_drawn_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = BoardBuilder::new(GameType::Numbers, 1)
            .with_target(TargetSignature::AnyOf(vec![]))
            .build(&mut rng);
        assert!(board.total_target_count >= 1);
    }

    #[test]
    fn test_degenerate_domain_skips_distractors() {
        let mut rng = StdRng::seed_from_u64(1);
        let everything = TargetSignature::AnyOf(
            TransportType::ALL.into_iter().map(Variant::Transport).collect(),
        );
        let board = BoardBuilder::new(GameType::Transport, 0)
            .with_target(everything)
            .build(&mut rng);
        assert_eq!(board.items.len(), board.total_target_count);
    }

    #[test]
    fn test_transport_stage_zero_has_no_decoys() {
        let mut rng = StdRng::seed_from_u64(21);
        let board = Board::generate_with_rng(GameType::Transport, 0, &mut rng);
        assert!(board.items.iter().all(|item| !item.id.contains("-ov-")));
        assert!(board.items.iter().all(|item| item.rotation == 0.0));
    }

    #[test]
    fn test_mark_found() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut board = Board::generate_with_rng(GameType::Weather, 1, &mut rng);
        let target_id = board.targets().next().map(|i| i.id.clone()).unwrap();
        let miss_id = board
            .items
            .iter()
            .find(|i| !i.is_target)
            .map(|i| i.id.clone())
            .unwrap();

        assert_eq!(board.mark_found(&target_id), ClickResult::Hit);
        assert_eq!(board.mark_found(&target_id), ClickResult::AlreadyFound);
        assert_eq!(board.mark_found(&miss_id), ClickResult::Miss);
        assert_eq!(board.mark_found("nope"), ClickResult::Unknown);
        assert_eq!(board.found_count(), 1);
        assert!(!board.is_cleared());
    }
}
