// ============================================================================
// POINTER → CELL RESOLUTION
// ============================================================================
//
// A cell is split into five regions. The four corner regions are the small
// triangles cut off by the lines fx+fy = 0.5, fx+fy = 1.5, fx-fy = ±0.5
// (fx, fy = position inside the cell, 0..1). Everything else is Center.
// Comparisons are strict, so points exactly on a cut line belong to Center.

use crate::grid::{CellState, Corner};

/// One of the five sub-areas of a cell the pointer can occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Region {
    /// Classify a position inside the unit cell.
    pub fn classify(fx: f32, fy: f32) -> Region {
        let sum = fx + fy;
        let diff = fx - fy;
        if sum < 0.5 {
            Region::TopLeft
        } else if sum > 1.5 {
            Region::BottomRight
        } else if diff > 0.5 {
            Region::TopRight
        } else if diff < -0.5 {
            Region::BottomLeft
        } else {
            Region::Center
        }
    }

    pub fn corner(self) -> Option<Corner> {
        match self {
            Region::TopLeft => Some(Corner::TopLeft),
            Region::TopRight => Some(Corner::TopRight),
            Region::BottomLeft => Some(Corner::BottomLeft),
            Region::BottomRight => Some(Corner::BottomRight),
            Region::Center => None,
        }
    }

    /// The cell state a pointer press in this region paints.
    pub fn paint_mode(self) -> CellState {
        match self.corner() {
            Some(corner) => CellState::Triangle(corner),
            None => CellState::Filled,
        }
    }
}

/// Result of resolving a pointer position against the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellHit {
    pub row: usize,
    pub col: usize,
    pub region: Region,
}

impl CellHit {
    pub fn cell(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

/// Map a pixel offset (relative to the grid's top-left corner) to a cell and
/// region. Returns `None` outside the grid.
pub fn resolve(x: f32, y: f32, cell_size: f32, grid_size: usize) -> Option<CellHit> {
    if !(x.is_finite() && y.is_finite()) || !(cell_size > 0.0) || x < 0.0 || y < 0.0 {
        return None;
    }

    let col = (x / cell_size).floor();
    let row = (y / cell_size).floor();
    if col >= grid_size as f32 || row >= grid_size as f32 {
        return None;
    }

    let fx = (x % cell_size) / cell_size;
    let fy = (y % cell_size) / cell_size;

    Some(CellHit {
        row: row as usize,
        col: col as usize,
        region: Region::classify(fx, fy),
    })
}
