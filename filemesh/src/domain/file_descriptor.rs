//! File metadata as advertised between peers

use super::PeerId;
use serde::{Deserialize, Serialize};

/// One entry of a `file-list` control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

/// A file offered by a specific peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub owner: PeerId,
}

impl FileDescriptor {
    pub fn new(name: &str, size: u64, owner: &str) -> Self {
        Self {
            name: name.to_string(),
            size,
            owner: owner.to_string(),
        }
    }

    pub fn from_entry(entry: FileEntry, owner: &str) -> Self {
        Self {
            name: entry.name,
            size: entry.size,
            owner: owner.to_string(),
        }
    }
}
