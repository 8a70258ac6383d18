//! Spot-the-difference scene with two bears.

use crate::actions::SessionEvent;
use crate::session::{Playable, Progress, POINTS_PER_TARGET};
use serde::{Deserialize, Serialize};
use tracing::info;

/// From this stage the scarf and skates also differ
pub const EXTRA_SPOTS_STAGE: u32 = 2;

/// Hit area size of every difference spot, in percent
const SPOT_SIZE: f64 = 10.0;

/// Drawing parameters for one bear scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearScene {
    pub hat_color: String,
    pub scarf_color: String,
    pub has_snowflakes: bool,
    pub has_star: bool,
    pub drum_pattern: String,
    pub skate_color: String,
}

impl BearScene {
    /// The unchanged left-hand scene
    pub fn base() -> Self {
        Self {
            hat_color: "#8B4513".to_string(),
            scarf_color: "#228B22".to_string(),
            has_snowflakes: true,
            has_star: false,
            drum_pattern: "zigzag".to_string(),
            skate_color: "#4169E1".to_string(),
        }
    }

    /// The right-hand scene with the stage's differences applied
    pub fn altered(stage: u32) -> Self {
        let mut scene = Self {
            hat_color: "#DC143C".to_string(),
            has_star: true,
            drum_pattern: "stripes".to_string(),
            ..Self::base()
        };
        if stage >= EXTRA_SPOTS_STAGE {
            scene.scarf_color = "#FF8C00".to_string();
            scene.skate_color = "#FFD700".to_string();
        }
        scene
    }
}

/// A clickable area where the two scenes differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffSpot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub found: bool,
}

impl DiffSpot {
    fn new(id: &str, x: f64, y: f64) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            size: SPOT_SIZE,
            found: false,
        }
    }
}

/// Difference spots for a stage
pub fn diff_spots(stage: u32) -> Vec<DiffSpot> {
    let mut spots = vec![
        DiffSpot::new("hat", 50.0, 18.0),
        DiffSpot::new("star", 85.0, 8.0),
        DiffSpot::new("drum", 50.0, 62.0),
    ];
    if stage >= EXTRA_SPOTS_STAGE {
        spots.push(DiffSpot::new("scarf", 50.0, 45.0));
        spots.push(DiffSpot::new("skate", 50.0, 82.0));
    }
    spots
}

#[derive(Debug, Clone)]
pub struct BearsGame {
    left: BearScene,
    right: BearScene,
    spots: Vec<DiffSpot>,
    progress: Progress,
}

impl BearsGame {
    pub fn new() -> Self {
        Self {
            left: BearScene::base(),
            right: BearScene::base(),
            spots: Vec::new(),
            progress: Progress::new(),
        }
    }

    pub fn spots(&self) -> &[DiffSpot] {
        &self.spots
    }

    pub fn found_count(&self) -> usize {
        self.spots.iter().filter(|s| s.found).count()
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            left: self.left.clone(),
            right: self.right.clone(),
            spots: self.spots.clone(),
            found_count: self.found_count(),
            progress: self.progress.clone(),
        }
    }
}

impl Default for BearsGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Playable for BearsGame {
    fn progress(&self) -> &Progress {
        &self.progress
    }

    fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }

    fn new_round(&mut self, stage: u32) -> usize {
        self.left = BearScene::base();
        self.right = BearScene::altered(stage);
        self.spots = diff_spots(stage);
        self.spots.len()
    }

    fn handle_click(&mut self, item_id: &str) -> Vec<SessionEvent> {
        let Some(spot) = self.spots.iter_mut().find(|s| s.id == item_id) else {
            return Vec::new();
        };
        if spot.found {
            return Vec::new();
        }
        spot.found = true;

        let found = self.found_count();
        let total = self.spots.len();
        let score = self.progress.award(POINTS_PER_TARGET);
        let mut events = vec![SessionEvent::Correct {
            item_id: item_id.to_string(),
            found,
            total,
            score,
        }];

        if found == total {
            let elapsed_ms = self.progress.finish();
            info!(stage = self.progress.stage, score, "all differences found");
            events.push(SessionEvent::StageComplete {
                stage: self.progress.stage,
                score,
                found,
                elapsed_ms,
            });
        }
        events
    }

    fn stage_label(&self) -> String {
        format!("Bears {}", self.progress.stage)
    }

    fn clear_round(&mut self) {
        self.spots.clear();
    }
}

/// Serializable scene state
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub left: BearScene,
    pub right: BearScene,
    pub spots: Vec<DiffSpot>,
    pub found_count: usize,
    #[serde(flatten)]
    pub progress: Progress,
}
