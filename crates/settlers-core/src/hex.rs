//! Hex geometry for the 3/4/5/4/3 board.
//!
//! This module provides the geometry the graph builder works from:
//! - `HexPosition`: row/column of a tile in the fixed row layout
//! - pixel centres and corner points for each tile
//! - `PointKey`: an integer-quantized corner coordinate used as a deduplication key
//!
//! Hexes are pointy-top. Rows are spaced one and a half radii apart and hexes
//! within a row one hex-width apart, with every row centred on the board, so
//! neighbouring rows interlock and share corners.

use serde::{Deserialize, Serialize};

/// Number of hexes in each row, top to bottom
pub const HEX_ROWS: [usize; 5] = [3, 4, 5, 4, 3];

/// Corner radius of a hex in pixels
pub const HEX_SIZE: f64 = 38.0;

/// Pixel position of the centre of the middle row
pub const BOARD_CENTER: (f64, f64) = (210.0, 220.0);

/// Quantization steps per pixel for corner keys
const KEY_SCALE: f64 = 100.0;

/// Total number of tiles in the layout
pub const fn tile_count() -> usize {
    let mut total = 0;
    let mut row = 0;
    while row < HEX_ROWS.len() {
        total += HEX_ROWS[row];
        row += 1;
    }
    total
}

/// A corner coordinate snapped to a fixed integer grid.
///
/// Two corners computed from different tiles land on the same key even though
/// their floating-point values may differ in the last few bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointKey {
    pub x: i64,
    pub y: i64,
}

impl PointKey {
    /// Quantize a pixel coordinate
    pub fn quantize((x, y): (f64, f64)) -> Self {
        Self {
            x: (x * KEY_SCALE).round() as i64,
            y: (y * KEY_SCALE).round() as i64,
        }
    }
}

/// Location of a tile in the row layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexPosition {
    /// Row index, 0 at the top
    pub row: usize,
    /// Column index within the row, 0 at the left
    pub col: usize,
}

impl HexPosition {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Every position in row-major order. The index in this list is the tile id.
    pub fn all() -> Vec<HexPosition> {
        HEX_ROWS
            .iter()
            .enumerate()
            .flat_map(|(row, &cols)| (0..cols).map(move |col| HexPosition::new(row, col)))
            .collect()
    }

    /// Pixel centre of this hex
    pub fn center(&self) -> (f64, f64) {
        let width = 3.0_f64.sqrt() * HEX_SIZE;
        let middle_row = (HEX_ROWS.len() / 2) as f64;
        let cols = HEX_ROWS[self.row] as f64;

        let x = BOARD_CENTER.0 - (cols - 1.0) * width / 2.0 + self.col as f64 * width;
        let y = BOARD_CENTER.1 + (self.row as f64 - middle_row) * 1.5 * HEX_SIZE;
        (x, y)
    }

    /// The six corners, clockwise from the upper-right one
    pub fn corners(&self) -> [(f64, f64); 6] {
        let center = self.center();
        std::array::from_fn(|i| corner(center, HEX_SIZE, i))
    }
}

/// Corner `i` of a pointy-top hex (angle `60°·i − 30°` from the centre)
pub fn corner((cx, cy): (f64, f64), size: f64, i: usize) -> (f64, f64) {
    let angle = (60.0 * i as f64 - 30.0).to_radians();
    (cx + size * angle.cos(), cy + size * angle.sin())
}
