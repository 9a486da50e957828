use crate::transfer::CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Transfer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Bytes per chunk frame, at most 65536.
    pub chunk_size: usize,
    /// Where completed downloads are written. `None` keeps them in memory only.
    pub download_dir: Option<PathBuf>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            chunk_size: CHUNK_SIZE,
            download_dir: None,
        }
    }
}
