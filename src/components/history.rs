use eframe::egui;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::grid::Grid;

// ============================================================================
// HISTORY MANAGER — bounded ring of full-grid snapshots
// ============================================================================

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Undo/redo over whole-grid snapshots.
///
/// `entries[index]` is always the state currently on screen once the first
/// snapshot has been pushed. Entries after `index` are redo candidates.
pub struct HistoryManager {
    entries: VecDeque<Arc<Grid>>,
    index: usize,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a snapshot. Identical contents to the current entry are ignored.
    /// Returns `true` when a new entry was stored.
    pub fn push(&mut self, grid: Arc<Grid>) -> bool {
        if let Some(current) = self.entries.get(self.index)
            && **current == *grid
        {
            return false;
        }

        // Drop the redo branch
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }

        self.entries.push_back(grid);
        self.index = self.entries.len() - 1;

        // Evict oldest snapshots beyond capacity
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.index = self.index.saturating_sub(1);
        }

        true
    }

    pub fn undo(&mut self) -> Option<Arc<Grid>> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index).cloned()
    }

    pub fn redo(&mut self) -> Option<Arc<Grid>> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The snapshot the history considers current.
    pub fn current(&self) -> Option<&Arc<Grid>> {
        self.entries.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn undo_count(&self) -> usize {
        self.index
    }

    pub fn redo_count(&self) -> usize {
        self.entries.len().saturating_sub(self.index + 1)
    }
}

// ============================================================================
// HISTORY PANEL
// ============================================================================

#[derive(Default)]
pub struct HistoryPanel;

impl HistoryPanel {
    pub fn show(&mut self, ui: &mut egui::Ui, history: &HistoryManager) {
        ui.label(format!(
            "Undo: {} | Redo: {} | {}/{}",
            history.undo_count(),
            history.redo_count(),
            history.len(),
            history.capacity()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellState;

    fn grid_marked(n: usize) -> Arc<Grid> {
        let mut g = Grid::new(16);
        g.set(n / 16, n % 16, CellState::Filled);
        Arc::new(g)
    }

    #[test]
    fn empty_history_has_nothing_to_undo() {
        let mut h = HistoryManager::new(10);
        assert!(h.is_empty());
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), None);
        assert!(h.current().is_none());
    }

    #[test]
    fn identical_push_is_ignored() {
        let mut h = HistoryManager::new(10);
        assert!(h.push(Arc::new(Grid::new(3))));
        assert!(!h.push(Arc::new(Grid::new(3))));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn undo_redo_walk_entries() {
        let mut h = HistoryManager::new(10);
        h.push(grid_marked(0));
        h.push(grid_marked(1));
        h.push(grid_marked(2));

        assert_eq!(h.undo().as_deref(), Some(&*grid_marked(1)));
        assert_eq!(h.undo().as_deref(), Some(&*grid_marked(0)));
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo().as_deref(), Some(&*grid_marked(1)));
        assert_eq!(h.redo().as_deref(), Some(&*grid_marked(2)));
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn push_after_undo_discards_redo_branch() {
        let mut h = HistoryManager::new(10);
        h.push(grid_marked(0));
        h.push(grid_marked(1));
        h.push(grid_marked(2));
        h.undo();
        h.undo();
        assert!(h.push(grid_marked(9)));
        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert_eq!(h.current().map(|g| &**g), Some(&*grid_marked(9)));
    }

    #[test]
    fn push_equal_to_current_after_undo_keeps_redo_branch() {
        let mut h = HistoryManager::new(10);
        h.push(grid_marked(0));
        h.push(grid_marked(1));
        h.undo();
        assert!(!h.push(grid_marked(0)));
        assert!(h.can_redo());
    }

    #[test]
    fn capacity_evicts_oldest_and_keeps_index_on_latest() {
        let mut h = HistoryManager::new(5);
        for n in 0..12 {
            h.push(grid_marked(n));
            assert!(h.len() <= 5);
            assert_eq!(h.current().map(|g| &**g), Some(&*grid_marked(n)));
        }
        let mut undone = 0;
        while h.undo().is_some() {
            undone += 1;
        }
        assert_eq!(undone, 4);
        assert_eq!(h.current().map(|g| &**g), Some(&*grid_marked(7)));
        assert_eq!(h.undo(), None);
    }

    #[test]
    fn zero_capacity_behaves_as_one() {
        let mut h = HistoryManager::new(0);
        h.push(grid_marked(0));
        h.push(grid_marked(1));
        assert_eq!(h.len(), 1);
        assert_eq!(h.undo(), None);
    }
}
