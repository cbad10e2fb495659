use catalog_models::{ItemId, ListEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// An entry with the same id is already listed; nothing changed
    AlreadyPresent,
}

/// A user-curated list of movies, most recently added first.
///
/// Holds at most one entry per id. Used for both the starred and the
/// watch-later lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListStore {
    entries: Vec<ListEntry>,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ListEntry) -> AddOutcome {
        if self.contains(entry.id) {
            debug!("Entry {} already listed, ignoring add", entry.id);
            return AddOutcome::AlreadyPresent;
        }
        self.entries.insert(0, entry);
        AddOutcome::Added
    }

    /// Removes the first entry with `id`, returning it.
    pub fn remove(&mut self, id: ItemId) -> Option<ListEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Empties the list and reports how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn get(&self, id: ItemId) -> Option<&ListEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
