//! Merged view of files offered by connected peers

use crate::domain::{FileDescriptor, FileEntry, PeerId};
use std::collections::BTreeMap;

/// Owner-scoped file index. A name is unique within one owner's subset; the
/// same name may be offered by several owners.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Catalog {
    by_owner: BTreeMap<PeerId, BTreeMap<String, FileDescriptor>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `owner`'s whole subset. Repeated names keep their last entry.
    /// Returns whether anything changed.
    pub fn replace(&mut self, owner: &str, entries: Vec<FileEntry>) -> bool {
        let subset: BTreeMap<String, FileDescriptor> = entries
            .into_iter()
            .map(|entry| (entry.name.clone(), FileDescriptor::from_entry(entry, owner)))
            .collect();

        if subset.is_empty() {
            return self.by_owner.remove(owner).is_some();
        }
        match self.by_owner.get(owner) {
            Some(current) if *current == subset => false,
            _ => {
                self.by_owner.insert(owner.to_string(), subset);
                true
            }
        }
    }

    /// Removes every entry owned by `owner`; returns how many.
    pub fn evict(&mut self, owner: &str) -> usize {
        self.by_owner.remove(owner).map(|s| s.len()).unwrap_or(0)
    }

    pub fn get(&self, owner: &str, name: &str) -> Option<&FileDescriptor> {
        self.by_owner.get(owner)?.get(name)
    }

    pub fn files_of(&self, owner: &str) -> Vec<&FileDescriptor> {
        self.by_owner
            .get(owner)
            .map(|s| s.values().collect())
            .unwrap_or_default()
    }

    /// Every descriptor, ordered by owner then name.
    pub fn all(&self) -> Vec<&FileDescriptor> {
        self.by_owner.values().flat_map(|s| s.values()).collect()
    }

    /// Peers currently offering `name`.
    pub fn owners_of(&self, name: &str) -> Vec<&PeerId> {
        self.by_owner
            .iter()
            .filter(|(_, subset)| subset.contains_key(name))
            .map(|(owner, _)| owner)
            .collect()
    }

    pub fn owners(&self) -> Vec<&PeerId> {
        self.by_owner.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.by_owner.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_owner.clear();
    }
}
