//! Bounded undo/redo history of full snapshots
//!
//! Every entry is a complete owned copy. Pushing past capacity evicts the
//! oldest entry. Recording a new snapshot clears the redo stack.

use std::collections::VecDeque;

/// Two bounded stacks of snapshots
#[derive(Debug, Clone)]
pub struct History<T> {
    /// Most recent entry at the back
    undo: VecDeque<T>,
    /// Most recent entry at the back
    redo: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Push the pre-mutation snapshot and invalidate redo
    pub fn record(&mut self, snapshot: T) {
        push_bounded(&mut self.undo, snapshot, self.capacity);
        self.redo.clear();
    }

    /// Step back: returns the snapshot to restore, stashing `current` for redo
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        push_bounded(&mut self.redo, current, self.capacity);
        Some(previous)
    }

    /// Step forward: returns the snapshot to restore, stashing `current` for undo
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop_back()?;
        push_bounded(&mut self.undo, current, self.capacity);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

fn push_bounded<T>(stack: &mut VecDeque<T>, item: T, capacity: usize) {
    while stack.len() >= capacity {
        stack.pop_front();
    }
    stack.push_back(item);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new(10);
        // state 0 -> 1 -> 2
        history.record(0);
        history.record(1);
        let current = 2;

        let current = history.undo(current).unwrap();
        assert_eq!(current, 1);
        let current = history.undo(current).unwrap();
        assert_eq!(current, 0);
        assert!(history.undo(current).is_none());

        let current = history.redo(current).unwrap();
        assert_eq!(current, 1);
        let current = history.redo(current).unwrap();
        assert_eq!(current, 2);
        assert!(history.redo(current).is_none());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new(10);
        history.record("a");
        let restored = history.undo("b").unwrap();
        assert_eq!(restored, "a");
        assert!(history.can_redo());

        history.record("a");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(i);
        }
        assert_eq!(history.undo_len(), 3);

        let mut current = 5;
        let mut seen = vec![];
        while let Some(prev) = history.undo(current) {
            seen.push(prev);
            current = prev;
        }
        assert_eq!(seen, vec![4, 3, 2], "oldest entries 0 and 1 were evicted");
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = History::new(0);
        history.record(1);
        assert_eq!(history.capacity(), 1);
        assert!(history.can_undo());
    }
}
