//! Which variants of which results are marked for export.
//!
//! Keyed by [`ResultId`], not by position, so removing one result never
//! shifts another result's selection.

use std::collections::{BTreeMap, BTreeSet};

/// Stable identifier of a result within a batch.
pub type ResultId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Entry {
    len: usize,
    active: BTreeSet<usize>,
}

/// Active variant indices per result.
///
/// Every mutator is idempotent on an already-satisfied state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    entries: BTreeMap<ResultId, Entry>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new result with `variant_count` variants, all active.
    pub fn insert(&mut self, id: ResultId, variant_count: usize) {
        self.entries.insert(
            id,
            Entry {
                len: variant_count,
                active: (0..variant_count).collect(),
            },
        );
    }

    /// Forget a result. Other results keep their selections.
    pub fn remove(&mut self, id: ResultId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn contains(&self, id: ResultId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Flip one variant. Returns its new state, or `None` if the result or
    /// index is unknown.
    pub fn toggle(&mut self, id: ResultId, index: usize) -> Option<bool> {
        let entry = self.entries.get_mut(&id)?;
        if index >= entry.len {
            return None;
        }
        if entry.active.remove(&index) {
            Some(false)
        } else {
            entry.active.insert(index);
            Some(true)
        }
    }

    /// Set one variant's state explicitly.
    pub fn set(&mut self, id: ResultId, index: usize, active: bool) -> Option<bool> {
        let entry = self.entries.get_mut(&id)?;
        if index >= entry.len {
            return None;
        }
        if active {
            entry.active.insert(index);
        } else {
            entry.active.remove(&index);
        }
        Some(active)
    }

    pub fn select_all(&mut self, id: ResultId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.active = (0..entry.len).collect();
                true
            }
            None => false,
        }
    }

    pub fn deselect_all(&mut self, id: ResultId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.active.clear();
                true
            }
            None => false,
        }
    }

    pub fn select_all_across(&mut self) {
        for entry in self.entries.values_mut() {
            entry.active = (0..entry.len).collect();
        }
    }

    pub fn deselect_all_across(&mut self) {
        for entry in self.entries.values_mut() {
            entry.active.clear();
        }
    }

    pub fn is_active(&self, id: ResultId, index: usize) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|e| e.active.contains(&index))
    }

    /// Active indices of one result, ascending.
    pub fn active(&self, id: ResultId) -> Vec<usize> {
        self.entries
            .get(&id)
            .map(|e| e.active.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn active_count(&self, id: ResultId) -> usize {
        self.entries.get(&id).map_or(0, |e| e.active.len())
    }

    pub fn total_active(&self) -> usize {
        self.entries.values().map(|e| e.active.len()).sum()
    }

    pub fn is_fully_selected(&self, id: ResultId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|e| e.active.len() == e.len)
    }

    /// Immutable copy for readers that must not observe later mutations.
    pub fn snapshot(&self) -> SelectionState {
        self.clone()
    }
}
