use std::path::PathBuf;
use std::sync::Arc;

use crate::components::history::HistoryManager;
use crate::grid::{Grid, GridStore, MAX_GRID_SIZE, ShiftDirection};
use crate::log_info;

/// Whole-grid edits triggered from the toolbar, keyboard or CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditAction {
    Undo,
    Redo,
    Shift(ShiftDirection),
    Invert,
    Grow,
    Shrink,
    Clear,
}

impl EditAction {
    pub fn label(&self) -> &'static str {
        match self {
            EditAction::Undo => "Undo",
            EditAction::Redo => "Redo",
            EditAction::Shift(ShiftDirection::Up) => "Shift up",
            EditAction::Shift(ShiftDirection::Down) => "Shift down",
            EditAction::Shift(ShiftDirection::Left) => "Shift left",
            EditAction::Shift(ShiftDirection::Right) => "Shift right",
            EditAction::Invert => "Invert",
            EditAction::Grow => "Grow",
            EditAction::Shrink => "Shrink",
            EditAction::Clear => "Clear",
        }
    }
}

/// Single open document.
pub struct Project {
    pub store: GridStore,
    pub history: HistoryManager,
    /// File the grid was last loaded from, if any.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,
}

impl Project {
    pub fn new(grid_size: usize, history_capacity: usize) -> Self {
        Self::from_grid(Grid::new(grid_size), history_capacity, None)
    }

    pub fn from_grid(grid: Grid, history_capacity: usize, path: Option<PathBuf>) -> Self {
        let store = GridStore::new(grid);
        let mut history = HistoryManager::new(history_capacity);
        history.push(store.snapshot());
        Self {
            store,
            history,
            path,
            is_dirty: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        self.store.grid()
    }

    /// Record the current grid as one undo step. Returns `true` if it differed
    /// from the last recorded state.
    pub fn commit(&mut self) -> bool {
        let stored = self.history.push(self.store.snapshot());
        if stored {
            self.mark_dirty();
        }
        stored
    }

    /// Replace the grid wholesale and record it.
    pub fn replace(&mut self, grid: impl Into<Arc<Grid>>) -> bool {
        self.store.replace_grid(grid);
        self.commit()
    }

    /// Adopt a loaded grid as an undoable edit.
    pub fn load(&mut self, grid: Grid, path: Option<PathBuf>) {
        log_info!("Loaded {}×{} grid from {:?}", grid.size(), grid.size(), path);
        self.path = path;
        self.replace(grid);
    }

    /// Returns `true` when the grid changed.
    pub fn apply(&mut self, action: EditAction) -> bool {
        let size = self.grid().size();
        match action {
            EditAction::Undo => self.restore(|h| h.undo()),
            EditAction::Redo => self.restore(|h| h.redo()),
            EditAction::Shift(dir) => {
                let next = self.grid().shifted(dir);
                self.replace(next)
            }
            EditAction::Invert => {
                let next = self.grid().inverted();
                self.replace(next)
            }
            EditAction::Grow if size < MAX_GRID_SIZE => {
                let next = self.grid().resized(size + 1);
                self.replace(next)
            }
            EditAction::Shrink if size > 1 => {
                let next = self.grid().resized(size - 1);
                self.replace(next)
            }
            EditAction::Grow | EditAction::Shrink => false,
            EditAction::Clear => self.replace(Grid::new(size)),
        }
    }

    fn restore(&mut self, step: impl FnOnce(&mut HistoryManager) -> Option<Arc<Grid>>) -> bool {
        match step(&mut self.history) {
            Some(grid) => {
                self.store.replace_grid(grid);
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());
        let n = self.grid().size();
        if self.is_dirty {
            format!("{}* ({}×{})", name, n, n)
        } else {
            format!("{} ({}×{})", name, n, n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellState;

    #[test]
    fn new_project_has_one_history_entry() {
        let p = Project::new(5, 10);
        assert_eq!(p.history.len(), 1);
        assert!(!p.history.can_undo());
        assert!(!p.is_dirty);
    }

    #[test]
    fn commit_only_records_changes() {
        let mut p = Project::new(3, 10);
        assert!(!p.commit());
        p.store.set_cell(0, 0, CellState::Filled);
        assert!(p.commit());
        assert!(!p.commit());
        assert_eq!(p.history.len(), 2);
        assert!(p.is_dirty);
    }

    #[test]
    fn resize_actions_are_undoable() {
        let mut p = Project::new(5, 10);
        p.store.set_cell(4, 4, CellState::Filled);
        p.commit();
        assert!(p.apply(EditAction::Shrink));
        assert_eq!(p.grid().size(), 4);
        assert!(p.apply(EditAction::Undo));
        assert_eq!(p.grid().size(), 5);
        assert_eq!(p.grid().get(4, 4), Some(CellState::Filled));
        assert!(p.apply(EditAction::Redo));
        assert_eq!(p.grid().size(), 4);
    }

    #[test]
    fn shrink_stops_at_one() {
        let mut p = Project::new(1, 10);
        assert!(!p.apply(EditAction::Shrink));
        assert_eq!(p.grid().size(), 1);
    }

    #[test]
    fn invert_twice_restores_and_records_both() {
        let mut p = Project::new(3, 10);
        p.store.set_cell(1, 2, CellState::Filled);
        p.commit();
        let before = p.grid().clone();
        p.apply(EditAction::Invert);
        p.apply(EditAction::Invert);
        assert_eq!(p.grid(), &before);
        assert_eq!(p.history.len(), 4);
    }

    #[test]
    fn clear_on_blank_grid_is_not_recorded() {
        let mut p = Project::new(3, 10);
        assert!(!p.apply(EditAction::Clear));
        assert_eq!(p.history.len(), 1);
    }
}
