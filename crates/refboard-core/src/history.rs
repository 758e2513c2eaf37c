//! Snapshot-based undo/redo for a single board.

use crate::board::Snapshot;
use std::collections::VecDeque;
use std::sync::Arc;

/// Maximum number of snapshots to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear history of board snapshots with a cursor.
///
/// The entry at the cursor mirrors the board's current items. Undo and redo
/// move the cursor and hand back the entry to install.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// History seeded with the board's current items.
    pub fn seeded(initial: Snapshot, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        history.entries.push_back(initial);
        history
    }

    /// Record a state after a completed change.
    ///
    /// A snapshot equal to the current entry is ignored. Otherwise any redo
    /// entries are dropped and the oldest entry is evicted past capacity.
    pub fn record(&mut self, snapshot: Snapshot) {
        if let Some(current) = self.entries.get(self.cursor) {
            if Arc::ptr_eq(current, &snapshot) || **current == *snapshot {
                return;
            }
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Entry at the cursor.
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{SceneItem, TextItem};
    use kurbo::Point;

    fn snap(contents: &[&str]) -> Snapshot {
        Arc::new(
            contents
                .iter()
                .enumerate()
                .map(|(i, c)| SceneItem::from(TextItem::new(i as u64 + 1, Point::ZERO, *c)))
                .collect(),
        )
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::seeded(snap(&[]), MAX_UNDO_HISTORY);
        history.record(snap(&["a"]));
        history.record(snap(&["a", "b"]));

        assert_eq!(history.undo(), Some(snap(&["a"])));
        assert_eq!(history.undo(), Some(snap(&[])));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(snap(&["a"])));
        assert_eq!(history.redo(), Some(snap(&["a", "b"])));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_record_truncates_redo() {
        let mut history = History::seeded(snap(&[]), MAX_UNDO_HISTORY);
        history.record(snap(&["a"]));
        history.record(snap(&["b"]));
        history.undo();
        history.record(snap(&["c"]));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(snap(&["a"])));
    }

    #[test]
    fn test_equal_snapshot_ignored() {
        let mut history = History::seeded(snap(&["a"]), MAX_UNDO_HISTORY);
        history.record(snap(&["a"]));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::seeded(snap(&["0"]), 3);
        for c in ["1", "2", "3"] {
            history.record(snap(&[c]));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(snap(&["2"])));
        assert_eq!(history.undo(), Some(snap(&["1"])));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_undo_then_redo_restores_state() {
        let mut history = History::seeded(snap(&[]), MAX_UNDO_HISTORY);
        let after = snap(&["x"]);
        history.record(Arc::clone(&after));
        history.undo();
        let redone = history.redo().unwrap();
        assert!(Arc::ptr_eq(&redone, &after));
    }
}
