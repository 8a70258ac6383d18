//! Placement of items on the normalized play canvas.
//!
//! Coordinates are percentages of a fixed-aspect canvas, so every position
//! lies in `[0, 100]` on both axes. Two placement policies are provided:
//! - `GridSpec::allocate`: one item per cell of a padded grid, centred with a
//!   little jitter and optionally staggered, in shuffled order
//! - `scatter` / `scatter_around`: independent uniform points, used where some
//!   visual clutter is wanted, plus near-duplicate decoys around a primary item

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest canvas extent, in percent
pub const CANVAS_EXTENT: f64 = 100.0;

/// Vertical offset of odd columns in a staggered grid, as a fraction of cell height
pub const STAGGER_FRACTION: f64 = 0.4;

/// Jitter may never exceed this fraction of the smaller cell dimension
const MAX_JITTER_FRACTION: f64 = 0.5;

/// Overlap decoys are never placed further than this from their primary item
pub const MAX_OVERLAP_RADIUS: f64 = 6.0;

/// A point on the canvas in percentage coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Clamp into the padded square `[padding, 100 - padding]`
    pub fn clamped(self, padding: f64) -> Point {
        let low = padding;
        let high = CANVAS_EXTENT - padding;
        Point::new(self.x.clamp(low, high), self.y.clamp(low, high))
    }
}

/// A grid of equally sized cells over the padded canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    /// Empty margin on every side of the canvas
    pub padding: f64,
    /// Full width of the random offset applied to each cell centre
    pub jitter: f64,
    /// Shift odd columns down by `STAGGER_FRACTION` of a cell
    pub stagger: bool,
}

impl GridSpec {
    pub fn cell_width(&self) -> f64 {
        (CANVAS_EXTENT - self.padding * 2.0) / self.cols.max(1) as f64
    }

    pub fn cell_height(&self) -> f64 {
        (CANVAS_EXTENT - self.padding * 2.0) / self.rows.max(1) as f64
    }

    /// Number of cells in the grid
    pub fn capacity(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Jitter actually applied, kept small enough that neighbours cannot touch
    pub fn effective_jitter(&self) -> f64 {
        let limit = self.cell_width().min(self.cell_height()) * MAX_JITTER_FRACTION;
        self.jitter.clamp(0.0, limit)
    }

    /// Centre of a cell before jitter, including stagger
    pub fn cell_center(&self, col: u32, row: u32) -> Point {
        let cell_w = self.cell_width();
        let cell_h = self.cell_height();
        let stagger = if self.stagger && col % 2 == 1 {
            cell_h * STAGGER_FRACTION
        } else {
            0.0
        };

        Point::new(
            self.padding + col as f64 * cell_w + cell_w / 2.0,
            self.padding + row as f64 * cell_h + cell_h / 2.0 + stagger,
        )
    }

    /// Allocate up to `count` positions, one per cell.
    ///
    /// All cells are generated row-major, shuffled, then truncated so that
    /// position on the canvas is independent of the order items are assigned.
    pub fn allocate<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<Point> {
        let jitter = self.effective_jitter();
        let mut positions = Vec::with_capacity(self.capacity());

        for row in 0..self.rows {
            for col in 0..self.cols {
                let center = self.cell_center(col, row);
                let point = Point::new(
                    center.x + spread(rng, jitter),
                    center.y + spread(rng, jitter),
                );
                positions.push(point.clamped(self.padding));
            }
        }

        positions.shuffle(rng);
        positions.truncate(count);
        positions
    }
}

/// Uniform offset in `[-width / 2, width / 2)`
pub fn spread<R: Rng>(rng: &mut R, width: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * width
}

/// Independent uniform points inside the padded canvas
pub fn scatter<R: Rng>(count: usize, padding: f64, rng: &mut R) -> Vec<Point> {
    let span = CANVAS_EXTENT - padding * 2.0;
    (0..count)
        .map(|_| {
            Point::new(
                padding + rng.gen::<f64>() * span,
                padding + rng.gen::<f64>() * span,
            )
        })
        .collect()
}

/// A point within `radius` of `anchor`, kept inside the padded canvas
pub fn scatter_around<R: Rng>(anchor: Point, radius: f64, padding: f64, rng: &mut R) -> Point {
    let radius = radius.clamp(0.0, MAX_OVERLAP_RADIUS);
    let angle = rng.gen::<f64>() * std::f64::consts::TAU;
    let distance = rng.gen::<f64>() * radius;

    Point::new(
        anchor.x + angle.cos() * distance,
        anchor.y + angle.sin() * distance,
    )
    .clamped(padding)
}
