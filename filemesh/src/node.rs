//! One FileMesh participant.
//!
//! [`FileMeshNode`] owns the orchestrator, catalog synchronizer, transfer
//! engine and local file set. Every inbound event is handled to completion
//! within the call that delivers it, including the cascades a lifecycle
//! change triggers: a new connection gets the local file list, a departed
//! one loses its catalog entries and transfer sessions.

use crate::catalog::{Catalog, CatalogSynchronizer, DiskFile, FileSource, LocalFileSet, MemoryFile};
use crate::config::TransferConfig;
use crate::domain::{ConnectionState, LinkId, NodeStatus, PeerId, Role};
use crate::error::{MeshError, Result};
use crate::event::MeshEvent;
use crate::orchestrator::{ConnectionOrchestrator, LinkOutcome, PeerLifecycle};
use crate::signaling::{RelayEvent, SignalingSink};
use crate::transfer::{ControlMessage, PumpReport, ReceivedFile, TransferEngine, WireFrame};
use crate::transport::{TransportEvent, TransportFactory};
use logging::Logger;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct FileMeshNode {
    orchestrator: ConnectionOrchestrator,
    catalog: CatalogSynchronizer,
    transfers: TransferEngine,
    local_files: LocalFileSet,
    download_dir: Option<PathBuf>,
    events: VecDeque<MeshEvent>,
    last_status: NodeStatus,
    logger: Logger,
}

impl FileMeshNode {
    pub fn new(
        local_id: &str,
        config: &TransferConfig,
        signaling: Box<dyn SignalingSink>,
        transports: Box<dyn TransportFactory>,
        logger: &Logger,
    ) -> Self {
        let orchestrator = ConnectionOrchestrator::new(
            local_id,
            transports,
            signaling,
            logger.for_component("Orchestrator"),
        );
        let last_status = orchestrator.status();

        Self {
            orchestrator,
            catalog: CatalogSynchronizer::new(logger.for_component("Catalog")),
            transfers: TransferEngine::new(config.chunk_size, logger.for_component("Transfer")),
            local_files: LocalFileSet::new(),
            download_dir: config.download_dir.clone(),
            events: VecDeque::new(),
            last_status,
            logger: logger.for_component("Node"),
        }
    }

    pub fn local_id(&self) -> &str {
        self.orchestrator.local_id()
    }

    // ===== Inbound events =====

    pub fn handle_relay_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::RosterSnapshot { peer_ids } => {
                self.orchestrator.on_roster_snapshot(&peer_ids)
            }
            RelayEvent::PeerJoined { peer_id } => self.orchestrator.on_peer_joined(&peer_id),
            RelayEvent::SignalRelayed {
                from_peer_id,
                signal,
            } => self.orchestrator.on_signal_relayed(&from_peer_id, &signal),
            RelayEvent::SignalReturned { peer_id, signal } => {
                self.orchestrator.on_signal_returned(&peer_id, &signal)
            }
            RelayEvent::PeerLeft { peer_id } => {
                if let Some(lifecycle) = self.orchestrator.on_peer_left(&peer_id) {
                    self.apply_lifecycle(lifecycle);
                }
            }
        }
        self.sync_status();
    }

    /// Decodes and handles one JSON relay message. Malformed text is logged and dropped.
    pub fn handle_relay_message(&mut self, text: &str) {
        match RelayEvent::from_json(text) {
            Ok(event) => self.handle_relay_event(event),
            Err(e) => self
                .logger
                .warn(&format!("Dropping relay message: {}", e)),
        }
    }

    pub fn handle_signaling_lost(&mut self) {
        self.orchestrator.on_signaling_lost();
        self.sync_status();
    }

    pub fn handle_transport_event(&mut self, link: &LinkId, event: TransportEvent) {
        match self.orchestrator.on_transport_event(link, event) {
            LinkOutcome::Nothing => {}
            LinkOutcome::Lifecycle(lifecycle) => self.apply_lifecycle(lifecycle),
            LinkOutcome::Data { peer_id, bytes } => self.dispatch_frame(&peer_id, &bytes),
        }
        self.sync_status();
    }

    // ===== Local files =====

    /// Shares `source` under `name`, replacing any file of the same name, and
    /// broadcasts the full list.
    pub fn add_local_file(&mut self, name: &str, source: Rc<dyn FileSource>) -> Result<u64> {
        let size = self.local_files.insert(name, source)?;
        self.logger
            .info(&format!("Sharing '{}' ({} bytes)", name, size));
        self.broadcast_file_list();
        Ok(size)
    }

    pub fn share_bytes(&mut self, name: &str, data: Vec<u8>) -> Result<u64> {
        self.add_local_file(name, Rc::new(MemoryFile::new(data)))
    }

    /// Shares a file from disk under its file name. Returns that name.
    pub fn share_path(&mut self, path: &Path) -> Result<String> {
        let file = DiskFile::open(path)?;
        let name = file.file_name().ok_or_else(|| {
            MeshError::FileNotFound(format!("{} has no usable file name", path.display()))
        })?;
        self.logger
            .debug(&format!("'{}' is read from {}", name, file.path().display()));
        self.add_local_file(&name, Rc::new(file))?;
        Ok(name)
    }

    /// Stops sharing `name`. Uploads already in progress keep their handle.
    pub fn remove_local_file(&mut self, name: &str) -> bool {
        if !self.local_files.remove(name) {
            return false;
        }
        self.logger.info(&format!("Stopped sharing '{}'", name));
        self.broadcast_file_list();
        true
    }

    pub fn local_files(&self) -> &LocalFileSet {
        &self.local_files
    }

    // ===== Transfers =====

    /// Asks `owner` for `name`. The result arrives as [`MeshEvent::FileReceived`].
    ///
    /// Asking again before any data arrived re-sends the request.
    pub fn request_file(&mut self, name: &str, owner: &str) -> Result<()> {
        self.transfers
            .request_file(self.orchestrator.registry_mut(), owner, name)
    }

    /// Forgets the download of `name` from `owner` so it can be requested
    /// afresh. Returns whether one was pending.
    pub fn cancel_request(&mut self, name: &str, owner: &str) -> bool {
        self.transfers.cancel_request(owner, name)
    }

    /// Advances every upload by one chunk.
    pub fn pump_transfers(&mut self) -> PumpReport {
        let report = self.transfers.pump(self.orchestrator.registry_mut());
        for aborted in &report.aborted {
            self.events.push_back(MeshEvent::UploadAborted {
                peer_id: aborted.peer_id.clone(),
                name: aborted.name.clone(),
                reason: aborted.reason.clone(),
            });
        }
        report
    }

    pub fn has_pending_uploads(&self) -> bool {
        self.transfers.has_pending_uploads()
    }

    pub fn is_receiving(&self, owner: &str, name: &str) -> bool {
        self.transfers.is_receiving(owner, name)
    }

    // ===== Queries =====

    pub fn poll_event(&mut self) -> Option<MeshEvent> {
        self.events.pop_front()
    }

    pub fn drain_events(&mut self) -> Vec<MeshEvent> {
        self.events.drain(..).collect()
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog.catalog()
    }

    pub fn status(&self) -> NodeStatus {
        self.orchestrator.status()
    }

    pub fn connection_state(&self, peer_id: &str) -> Option<ConnectionState> {
        self.orchestrator.registry().state_of(peer_id)
    }

    pub fn connection_role(&self, peer_id: &str) -> Option<Role> {
        self.orchestrator.registry().role_of(peer_id)
    }

    /// Peers with a connection in any state.
    pub fn known_peers(&self) -> Vec<PeerId> {
        self.orchestrator.registry().peer_ids()
    }

    /// Peers with a usable connection.
    pub fn peers(&self) -> Vec<PeerId> {
        self.orchestrator.registry().connected_peer_ids()
    }

    /// Closes every connection and forgets all remote state.
    pub fn shutdown(&mut self) {
        for peer_id in self.orchestrator.shutdown() {
            self.events.push_back(MeshEvent::PeerDisconnected {
                peer_id,
                state: ConnectionState::Closed,
            });
        }
        self.transfers.clear();
        if !self.catalog.catalog().is_empty() {
            self.catalog.clear();
            self.events.push_back(MeshEvent::CatalogUpdated);
        }
        self.logger.info("Node shut down");
    }

    // ===== Internals =====

    fn apply_lifecycle(&mut self, lifecycle: PeerLifecycle) {
        match lifecycle {
            PeerLifecycle::Connected(peer_id) => {
                if let Some(connection) = self.orchestrator.registry_mut().get_mut(&peer_id)
                    && let Err(e) = self.catalog.on_connected(connection, &self.local_files)
                {
                    self.logger.warn(&format!(
                        "Could not send file list to {}: {}",
                        peer_id, e
                    ));
                }
                self.events.push_back(MeshEvent::PeerConnected(peer_id));
            }
            PeerLifecycle::Departed { peer_id, state } => {
                let evicted = self.catalog.evict(&peer_id);
                self.transfers.abandon_peer(&peer_id);
                self.events
                    .push_back(MeshEvent::PeerDisconnected { peer_id, state });
                if evicted > 0 {
                    self.events.push_back(MeshEvent::CatalogUpdated);
                }
            }
        }
    }

    fn dispatch_frame(&mut self, peer_id: &str, bytes: &[u8]) {
        let frame = match WireFrame::from_bytes(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                self.logger
                    .warn(&format!("Dropping frame from {}: {}", peer_id, e));
                return;
            }
        };

        match frame {
            WireFrame::Control(ControlMessage::FileList { files }) => {
                if self.catalog.on_file_list(peer_id, files) {
                    self.events.push_back(MeshEvent::CatalogUpdated);
                }
            }
            WireFrame::Control(ControlMessage::FileRequest { name }) => {
                self.transfers
                    .on_file_request(peer_id, &name, &self.local_files);
            }
            WireFrame::Control(ControlMessage::FileDone { name }) => {
                if let Some(file) = self.transfers.on_file_done(peer_id, &name) {
                    let saved_to = self.save_download(&file);
                    self.events
                        .push_back(MeshEvent::FileReceived { file, saved_to });
                }
            }
            WireFrame::Chunk { name, data } => self.transfers.on_chunk(peer_id, &name, data),
        }
    }

    fn save_download(&self, file: &ReceivedFile) -> Option<PathBuf> {
        let dir = self.download_dir.as_ref()?;
        match file.save_to(dir) {
            Ok(path) => {
                self.logger
                    .info(&format!("Saved '{}' to {}", file.name, path.display()));
                Some(path)
            }
            Err(e) => {
                self.logger.error(&format!(
                    "Could not save '{}' to {}: {}",
                    file.name,
                    dir.display(),
                    e
                ));
                None
            }
        }
    }

    fn broadcast_file_list(&mut self) {
        self.catalog
            .broadcast(self.orchestrator.registry_mut(), &self.local_files);
    }

    fn sync_status(&mut self) {
        let status = self.orchestrator.status();
        if status != self.last_status {
            self.last_status = status;
            self.logger.info(&format!("Status: {}", status));
            self.events.push_back(MeshEvent::StatusChanged(status));
        }
    }
}
