//! Keeps the catalog consistent with connection lifecycle and local changes.

use super::local_files::LocalFileSet;
use super::view::Catalog;
use crate::domain::FileEntry;
use crate::registry::{PeerConnection, PeerRegistry};
use crate::transfer::{ControlMessage, WireFrame};
use logging::Logger;
use std::io;

/// Every `file-list` carries the sender's complete set and the receiver
/// replaces that sender's subset wholesale.
pub struct CatalogSynchronizer {
    catalog: Catalog,
    logger: Logger,
}

impl CatalogSynchronizer {
    pub fn new(logger: Logger) -> Self {
        Self {
            catalog: Catalog::new(),
            logger,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn file_list(local_files: &LocalFileSet) -> WireFrame {
        WireFrame::control(ControlMessage::FileList {
            files: local_files.entries(),
        })
    }

    /// Sends the full local list to a connection that just opened.
    pub fn on_connected(
        &mut self,
        connection: &mut PeerConnection,
        local_files: &LocalFileSet,
    ) -> io::Result<()> {
        connection.send_frame(&Self::file_list(local_files))?;
        self.logger.info(&format!(
            "Sent file list ({} files) to {}",
            local_files.len(),
            connection.peer_id
        ));
        Ok(())
    }

    /// Sends the full local list to every connected peer; returns how many got it.
    pub fn broadcast(&mut self, registry: &mut PeerRegistry, local_files: &LocalFileSet) -> usize {
        let frame = Self::file_list(local_files);
        let mut delivered = 0;
        for peer_id in registry.connected_peer_ids() {
            let Some(connection) = registry.connected_mut(&peer_id) else {
                continue;
            };
            match connection.send_frame(&frame) {
                Ok(()) => delivered += 1,
                Err(e) => self
                    .logger
                    .warn(&format!("Could not send file list to {}: {}", peer_id, e)),
            }
        }
        self.logger.debug(&format!(
            "Broadcast file list ({} files) to {} peer(s)",
            local_files.len(),
            delivered
        ));
        delivered
    }

    /// Applies a peer's `file-list`. Returns whether the catalog changed.
    pub fn on_file_list(&mut self, owner: &str, files: Vec<FileEntry>) -> bool {
        let count = files.len();
        let changed = self.catalog.replace(owner, files);
        self.logger.info(&format!(
            "File list from {}: {} files{}",
            owner,
            count,
            if changed { "" } else { " (unchanged)" }
        ));
        changed
    }

    /// Drops everything `owner` offered.
    pub fn evict(&mut self, owner: &str) -> usize {
        let removed = self.catalog.evict(owner);
        if removed > 0 {
            self.logger
                .info(&format!("Evicted {} file(s) offered by {}", removed, owner));
        }
        removed
    }

    pub fn clear(&mut self) {
        self.catalog.clear();
    }
}
