//! Linear undo/redo history.
//!
//! Entries are shared behind [`Arc`] and never mutated after they are
//! recorded; undo and redo only move the cursor. Recording while the cursor is
//! not at the tail discards the redo branch.

use std::sync::Arc;

#[derive(Debug)]
pub struct HistoryStore<T> {
    entries: Vec<Arc<T>>,
    index: Option<usize>,
    max_entries: Option<usize>,
}

impl<T> HistoryStore<T> {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// History that keeps at most `max_entries` snapshots, dropping the oldest.
    pub fn with_limit(max_entries: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            index: None,
            max_entries: max_entries.filter(|&m| m > 0),
        }
    }

    /// Appends `entry` after the cursor and moves the cursor onto it.
    pub fn record(&mut self, entry: T) -> Arc<T> {
        let keep = self.index.map_or(0, |i| i + 1);
        self.entries.truncate(keep);

        let entry = Arc::new(entry);
        self.entries.push(Arc::clone(&entry));

        if let Some(max) = self.max_entries
            && self.entries.len() > max
        {
            self.entries.drain(..self.entries.len() - max);
        }

        self.index = self.entries.len().checked_sub(1);
        entry
    }

    /// Steps back one entry; `None` when already at the oldest.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if !self.can_undo() {
            return None;
        }
        let index = self.index? - 1;
        self.index = Some(index);
        self.entries.get(index).cloned()
    }

    /// Steps forward one entry; `None` when already at the newest.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        if !self.can_redo() {
            return None;
        }
        let index = self.index? + 1;
        self.index = Some(index);
        self.entries.get(index).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn current(&self) -> Option<&Arc<T>> {
        self.entries.get(self.index?)
    }

    /// Cursor position, `None` when empty.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.index = None;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.iter()
    }
}

impl<T> Default for HistoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
