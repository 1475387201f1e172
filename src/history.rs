use crate::layer::LayerId;
use crate::raster::Surface;
use crate::shape::Shape;

/// Maximum number of snapshots kept; older ones are evicted first
pub const MAX_HISTORY: usize = 30;

/// Captured state of one layer. The surface shares pixels with the live
/// layer until either side is drawn on.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSnapshot {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub surface: Surface,
}

/// Whole-document state at one point in time. Immutable once pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    pub layers: Vec<LayerSnapshot>,
    pub shapes: Vec<Shape>,
    pub active_layer: Option<LayerId>,
}

/// Bounded stack of snapshots with a cursor for undo/redo
#[derive(Debug, Clone)]
pub struct History {
    states: Vec<HistoryState>,
    cursor: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Pushes a snapshot, discarding any redo states and evicting the oldest
    /// entries beyond capacity. The cursor ends on the new snapshot.
    pub fn push(&mut self, state: HistoryState) {
        if !self.states.is_empty() {
            self.states.truncate(self.cursor + 1);
        }
        self.states.push(state);
        if self.states.len() > self.capacity {
            let excess = self.states.len() - self.capacity;
            self.states.drain(..excess);
        }
        self.cursor = self.states.len() - 1;
        log::debug!("History snapshot {} of {}", self.cursor + 1, self.states.len());
    }

    /// Steps back; `None` at the oldest snapshot
    pub fn undo(&mut self) -> Option<&HistoryState> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.states.get(self.cursor)
    }

    /// Steps forward; `None` at the newest snapshot
    pub fn redo(&mut self) -> Option<&HistoryState> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.states.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.states.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.states.is_empty() && self.cursor < self.states.len() - 1
    }

    pub fn current(&self) -> Option<&HistoryState> {
        self.states.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Clear the snapshot stack
    pub fn clear(&mut self) {
        self.states.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(active: u32) -> HistoryState {
        HistoryState {
            layers: Vec::new(),
            shapes: Vec::new(),
            active_layer: Some(LayerId(active)),
        }
    }

    #[test]
    fn test_undo_redo_at_boundaries_are_noops() {
        let mut history = History::new();
        assert!(history.undo().is_none());
        history.push(state(0));
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        let mut history = History::new();
        history.push(state(0));
        history.push(state(1));
        history.push(state(2));
        history.undo();
        history.undo();
        history.push(state(9));

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current().and_then(|s| s.active_layer), Some(LayerId(9)));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::with_capacity(3);
        for i in 0..5 {
            history.push(state(i));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.undo().and_then(|s| s.active_layer), Some(LayerId(3)));
        assert_eq!(history.undo().and_then(|s| s.active_layer), Some(LayerId(2)));
        assert!(history.undo().is_none());
    }
}
