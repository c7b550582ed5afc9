#![forbid(unsafe_code)]

//! Cell geometry shared by the layouts.

use deck_core::{Point, Rect};

/// Fixed-size cells separated by a gap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cells {
    pub width: f64,
    pub height: f64,
    pub gap: f64,
}

impl Default for Cells {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            gap: 10.0,
        }
    }
}

impl Cells {
    #[must_use]
    pub const fn new(width: f64, height: f64, gap: f64) -> Self {
        Self { width, height, gap }
    }

    /// Distance between the starts of neighbouring cells.
    #[inline]
    #[must_use]
    pub fn pitch(&self) -> Point {
        Point::new(self.width + self.gap, self.height + self.gap)
    }

    /// How many whole cells fit across `extent` (at least one).
    #[must_use]
    pub fn fit(&self, extent: f64) -> usize {
        let pitch = self.width + self.gap;
        if pitch <= 0.0 || extent < self.width {
            return 1;
        }
        // n cells need n * width + (n - 1) * gap.
        (((extent + self.gap) / pitch).floor() as usize).max(1)
    }

    /// Rectangle of the cell at `(column, row)` measured from `origin`.
    #[must_use]
    pub fn rect(&self, origin: Point, column: usize, row: usize) -> Rect {
        let pitch = self.pitch();
        Rect::new(
            origin.x + column as f64 * pitch.x,
            origin.y + row as f64 * pitch.y,
            self.width,
            self.height,
        )
    }
}

/// Row and column of display slot `slot` in a grid `columns` wide.
#[inline]
#[must_use]
pub fn grid_position(slot: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    (slot % columns, slot / columns)
}
