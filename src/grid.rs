use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Grid dimension used when nothing else is configured.
pub const DEFAULT_GRID_SIZE: usize = 26;
/// Largest grid dimension accepted from resize, settings or loaded files.
pub const MAX_GRID_SIZE: usize = 256;

// ============================================================================
// CELL STATE
// ============================================================================

/// Which corner a triangle cell is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub fn all() -> &'static [Corner] {
        &[Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight]
    }

    /// Point reflection through the cell centre.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Contents of one grid cell. A triangle covers the half of the cell that
/// contains its corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Empty,
    Filled,
    Triangle(Corner),
}

impl CellState {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellState::Empty)
    }

    /// Fill/empty swap; triangles flip to the complementary half.
    pub fn inverted(self) -> CellState {
        match self {
            CellState::Empty => CellState::Filled,
            CellState::Filled => CellState::Empty,
            CellState::Triangle(corner) => CellState::Triangle(corner.opposite()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CellState::Empty => "Erase",
            CellState::Filled => "Fill",
            CellState::Triangle(Corner::TopLeft) => "Triangle ◤",
            CellState::Triangle(Corner::TopRight) => "Triangle ◥",
            CellState::Triangle(Corner::BottomLeft) => "Triangle ◣",
            CellState::Triangle(Corner::BottomRight) => "Triangle ◢",
        }
    }
}

// ============================================================================
// GRID
// ============================================================================

/// Direction for a whole-grid wraparound shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ShiftDirection {
    pub fn parse(s: &str) -> Option<ShiftDirection> {
        match s.to_lowercase().as_str() {
            "up" => Some(ShiftDirection::Up),
            "down" => Some(ShiftDirection::Down),
            "left" => Some(ShiftDirection::Left),
            "right" => Some(ShiftDirection::Right),
            _ => None,
        }
    }
}

/// Square matrix of cells stored row-major. Every row has `size` cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<CellState>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl Grid {
    /// Create an all-empty grid. The dimension is clamped to `1..=MAX_GRID_SIZE`.
    pub fn new(size: usize) -> Self {
        let size = size.clamp(1, MAX_GRID_SIZE);
        Self {
            size,
            cells: vec![CellState::Empty; size * size],
        }
    }

    /// Build a grid from nested rows. Returns `None` unless the rows form a
    /// non-empty square no larger than `MAX_GRID_SIZE`.
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> Option<Self> {
        let size = rows.len();
        if size == 0 || size > MAX_GRID_SIZE || rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a grid from a row-major cell list whose length is `size * size`.
    pub fn from_cells(size: usize, cells: Vec<CellState>) -> Option<Self> {
        if size == 0 || size > MAX_GRID_SIZE || cells.len() != size * size {
            return None;
        }
        Some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// Returns `true` when the cell changed.
    pub fn set(&mut self, row: usize, col: usize, state: CellState) -> bool {
        if row >= self.size || col >= self.size {
            return false;
        }
        let slot = &mut self.cells[row * self.size + col];
        if *slot == state {
            return false;
        }
        *slot = state;
        true
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.size)
    }

    pub fn to_rows(&self) -> Vec<Vec<CellState>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// `(row, col, state)` for every cell, row-major.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, state)| (i / size, i % size, *state))
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellState::is_empty)
    }

    /// Copy of this grid at a new dimension. The overlapping top-left region
    /// is kept; new cells are empty.
    pub fn resized(&self, new_size: usize) -> Grid {
        let mut out = Grid::new(new_size);
        let keep = self.size.min(out.size);
        for row in 0..keep {
            for col in 0..keep {
                out.cells[row * out.size + col] = self.cells[row * self.size + col];
            }
        }
        out
    }

    /// Move every cell one step in `direction`, wrapping at the edges.
    pub fn shifted(&self, direction: ShiftDirection) -> Grid {
        let n = self.size;
        let (dr, dc) = match direction {
            ShiftDirection::Up => (n - 1, 0),
            ShiftDirection::Down => (1, 0),
            ShiftDirection::Left => (0, n - 1),
            ShiftDirection::Right => (0, 1),
        };
        let mut out = Grid::new(n);
        for (row, col, state) in self.iter_cells() {
            let r = (row + dr) % n;
            let c = (col + dc) % n;
            out.cells[r * n + c] = state;
        }
        out
    }

    pub fn inverted(&self) -> Grid {
        Grid {
            size: self.size,
            cells: self.cells.iter().map(|c| c.inverted()).collect(),
        }
    }
}

// ============================================================================
// GRID STORE
// ============================================================================

/// Redraw hook invoked with the new snapshot after every mutation.
pub type ChangeCallback = Box<dyn FnMut(&Arc<Grid>)>;

/// Sole owner of the live grid. Mutations are copy-on-write so snapshots
/// handed out earlier (e.g. to history) never change underneath their holder.
pub struct GridStore {
    grid: Arc<Grid>,
    on_change: Option<ChangeCallback>,
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

impl GridStore {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid: Arc::new(grid),
            on_change: None,
        }
    }

    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Immutable snapshot suitable for archiving in history.
    pub fn snapshot(&self) -> Arc<Grid> {
        Arc::clone(&self.grid)
    }

    /// Out-of-range coordinates and no-op writes are ignored silently.
    /// Returns `true` when the grid changed.
    pub fn set_cell(&mut self, row: usize, col: usize, state: CellState) -> bool {
        match self.grid.get(row, col) {
            Some(current) if current != state => {
                Arc::make_mut(&mut self.grid).set(row, col, state);
                self.notify();
                true
            }
            _ => false,
        }
    }

    pub fn replace_grid(&mut self, grid: impl Into<Arc<Grid>>) {
        self.grid = grid.into();
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.grid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn grid_with(size: usize, cells: &[(usize, usize, CellState)]) -> Grid {
        let mut g = Grid::new(size);
        for &(r, c, s) in cells {
            g.set(r, c, s);
        }
        g
    }

    #[test]
    fn every_state_has_its_own_label() {
        let states = [CellState::Empty, CellState::Filled]
            .into_iter()
            .chain(Corner::all().iter().map(|&c| CellState::Triangle(c)))
            .collect::<Vec<_>>();
        let mut labels: Vec<_> = states.iter().map(|s| s.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 6);
        assert_eq!(CellState::Filled.label(), "Fill");
    }

    #[test]
    fn new_grid_is_square_and_empty() {
        let g = Grid::new(4);
        assert_eq!(g.size(), 4);
        assert_eq!(g.cells().len(), 16);
        assert!(g.is_blank());
        assert_eq!(g.rows().count(), 4);
        assert!(g.rows().all(|r| r.len() == 4));
    }

    #[test]
    fn new_grid_clamps_dimension() {
        assert_eq!(Grid::new(0).size(), 1);
        assert_eq!(Grid::new(MAX_GRID_SIZE + 10).size(), MAX_GRID_SIZE);
    }

    #[test]
    fn from_rows_rejects_ragged_and_empty() {
        assert!(Grid::from_rows(vec![]).is_none());
        let ragged = vec![vec![CellState::Empty; 2], vec![CellState::Empty; 3]];
        assert!(Grid::from_rows(ragged).is_none());
        let tall = vec![vec![CellState::Empty; 2]; 3];
        assert!(Grid::from_rows(tall).is_none());
    }

    #[test]
    fn resize_shrink_keeps_top_left() {
        let mut big = Grid::new(5);
        for r in 0..5 {
            for c in 0..5 {
                if (r + c) % 2 == 0 {
                    big.set(r, c, CellState::Filled);
                }
            }
        }
        let small = big.resized(3);
        assert_eq!(small.size(), 3);
        for r in 0..3 {
            for c in 0..3 {
                assert_eq!(small.get(r, c), big.get(r, c));
            }
        }
    }

    #[test]
    fn resize_grow_pads_with_empty() {
        let small = grid_with(
            3,
            &[
                (0, 0, CellState::Filled),
                (2, 2, CellState::Triangle(Corner::BottomLeft)),
            ],
        );
        let big = small.resized(5);
        assert_eq!(big.size(), 5);
        for r in 0..5 {
            for c in 0..5 {
                let expected = if r < 3 && c < 3 {
                    small.get(r, c).unwrap()
                } else {
                    CellState::Empty
                };
                assert_eq!(big.get(r, c), Some(expected), "cell ({r}, {c})");
            }
        }
    }

    #[test]
    fn shift_wraps_around() {
        let g = grid_with(3, &[(0, 0, CellState::Filled)]);
        assert_eq!(g.shifted(ShiftDirection::Up).get(2, 0), Some(CellState::Filled));
        assert_eq!(g.shifted(ShiftDirection::Left).get(0, 2), Some(CellState::Filled));
        assert_eq!(g.shifted(ShiftDirection::Down).get(1, 0), Some(CellState::Filled));
        assert_eq!(g.shifted(ShiftDirection::Right).get(0, 1), Some(CellState::Filled));
    }

    #[test]
    fn shift_full_cycle_is_identity() {
        let g = grid_with(
            4,
            &[(1, 2, CellState::Filled), (3, 0, CellState::Triangle(Corner::TopRight))],
        );
        for dir in [ShiftDirection::Up, ShiftDirection::Down, ShiftDirection::Left, ShiftDirection::Right] {
            let mut cur = g.clone();
            for _ in 0..4 {
                cur = cur.shifted(dir);
            }
            assert_eq!(cur, g);
        }
    }

    #[test]
    fn invert_swaps_fill_and_reflects_corners() {
        let g = grid_with(
            2,
            &[
                (0, 0, CellState::Filled),
                (0, 1, CellState::Triangle(Corner::TopLeft)),
                (1, 0, CellState::Triangle(Corner::TopRight)),
            ],
        );
        let inv = g.inverted();
        assert_eq!(inv.get(0, 0), Some(CellState::Empty));
        assert_eq!(inv.get(0, 1), Some(CellState::Triangle(Corner::BottomRight)));
        assert_eq!(inv.get(1, 0), Some(CellState::Triangle(Corner::BottomLeft)));
        assert_eq!(inv.get(1, 1), Some(CellState::Filled));
        assert_eq!(inv.inverted(), g);
    }

    #[test]
    fn store_ignores_out_of_bounds_and_noop_writes() {
        let calls = Rc::new(Cell::new(0));
        let mut store = GridStore::new(Grid::new(3));
        let counter = Rc::clone(&calls);
        store.set_on_change(Box::new(move |_| counter.set(counter.get() + 1)));

        assert!(!store.set_cell(3, 0, CellState::Filled));
        assert!(!store.set_cell(0, 0, CellState::Empty));
        assert_eq!(calls.get(), 0);

        assert!(store.set_cell(1, 1, CellState::Filled));
        assert_eq!(calls.get(), 1);

        store.replace_grid(Grid::new(4));
        assert_eq!(calls.get(), 2);
        assert_eq!(store.size(), 4);
    }

    #[test]
    fn snapshots_survive_later_mutation() {
        let mut store = GridStore::new(Grid::new(3));
        let before = store.snapshot();
        store.set_cell(0, 0, CellState::Filled);
        let after = store.snapshot();

        assert_eq!(before.get(0, 0), Some(CellState::Empty));
        assert_eq!(after.get(0, 0), Some(CellState::Filled));
        assert_eq!(store.grid().get(0, 0), Some(CellState::Filled));
    }

    #[test]
    fn callback_receives_new_contents() {
        let seen = Rc::new(Cell::new(CellState::Empty));
        let mut store = GridStore::new(Grid::new(2));
        let sink = Rc::clone(&seen);
        store.set_on_change(Box::new(move |g| sink.set(g.get(1, 0).unwrap())));
        store.set_cell(1, 0, CellState::Triangle(Corner::BottomRight));
        assert_eq!(seen.get(), CellState::Triangle(Corner::BottomRight));
    }
}
