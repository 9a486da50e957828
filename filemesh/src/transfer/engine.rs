//! Transfer engine: receive sessions, the outbound queue and its pump.

use super::control_message::ControlMessage;
use super::frame::{CHUNK_SIZE, WireFrame};
use super::outgoing::OutgoingTransfer;
use super::received::ReceivedFile;
use super::session::{Direction, TransferSession};
use crate::catalog::LocalFileSet;
use crate::domain::PeerId;
use crate::error::{MeshError, Result};
use crate::registry::PeerRegistry;
use logging::Logger;
use std::collections::{HashMap, VecDeque};

/// An upload that stopped because reading the local file or sending a frame failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortedUpload {
    pub peer_id: PeerId,
    pub name: String,
    pub reason: String,
}

/// What one pump step did.
#[derive(Debug, Default)]
pub struct PumpReport {
    pub frames_sent: usize,
    pub completed: Vec<(PeerId, String)>,
    pub aborted: Vec<AbortedUpload>,
}

impl PumpReport {
    pub fn is_idle(&self) -> bool {
        self.frames_sent == 0 && self.completed.is_empty() && self.aborted.is_empty()
    }
}

pub struct TransferEngine {
    chunk_size: usize,
    incoming: HashMap<(PeerId, String), TransferSession>,
    outgoing: VecDeque<OutgoingTransfer>,
    logger: Logger,
}

impl TransferEngine {
    /// `chunk_size` is clamped to `1..=CHUNK_SIZE`.
    pub fn new(chunk_size: usize, logger: Logger) -> Self {
        Self {
            chunk_size: chunk_size.clamp(1, CHUNK_SIZE),
            incoming: HashMap::new(),
            outgoing: VecDeque::new(),
            logger,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Opens a receive session for `name` and asks `owner` for it.
    ///
    /// A session that has not received any chunk yet is asked for again,
    /// since the owner drops requests for files it does not hold. Once bytes
    /// are arriving the request is refused until the session completes or is
    /// cancelled.
    pub fn request_file(
        &mut self,
        registry: &mut PeerRegistry,
        owner: &str,
        name: &str,
    ) -> Result<()> {
        let connection = registry
            .connected_mut(owner)
            .ok_or_else(|| MeshError::PeerUnavailable(owner.to_string()))?;

        let key = (owner.to_string(), name.to_string());
        let repeat = match self.incoming.get(&key) {
            Some(session) if session.chunk_count() > 0 => {
                return Err(MeshError::TransferInProgress {
                    peer_id: owner.to_string(),
                    name: name.to_string(),
                });
            }
            Some(_) => true,
            None => false,
        };

        let request = WireFrame::control(ControlMessage::FileRequest {
            name: name.to_string(),
        });
        connection
            .send_frame(&request)
            .map_err(|e| MeshError::PeerTransportFailed {
                peer_id: owner.to_string(),
                reason: e.to_string(),
            })?;

        if repeat {
            self.logger
                .info(&format!("Requested '{}' from {} again", name, owner));
        } else {
            self.incoming
                .insert(key, TransferSession::new(owner, name, Direction::Receive));
            self.logger
                .info(&format!("Requested '{}' from {}", name, owner));
        }
        Ok(())
    }

    /// Drops the receive session for `name` from `owner`. Chunks still in
    /// flight for it are discarded on arrival.
    pub fn cancel_request(&mut self, owner: &str, name: &str) -> bool {
        let key = (owner.to_string(), name.to_string());
        let Some(session) = self.incoming.remove(&key) else {
            return false;
        };
        self.logger.info(&format!(
            "Cancelled '{}' from {} after {} bytes",
            name, owner, session.offset
        ));
        true
    }

    /// Queues `name` for streaming to `peer_id` if it is held locally.
    ///
    /// Unknown names are dropped without any reply to the requester.
    pub fn on_file_request(&mut self, peer_id: &str, name: &str, local_files: &LocalFileSet) {
        let Some(file) = local_files.get(name) else {
            self.logger.warn(
                &MeshError::FileNotFound(format!("'{}' requested by {}", name, peer_id))
                    .to_string(),
            );
            return;
        };

        if self
            .outgoing
            .iter()
            .any(|t| t.peer_id() == peer_id && t.file_name() == name)
        {
            self.logger.debug(&format!(
                "Ignoring repeated request for '{}' from {} while it is being sent",
                name, peer_id
            ));
            return;
        }

        self.logger.info(&format!(
            "Serving '{}' ({} bytes) to {}",
            name,
            file.size(),
            peer_id
        ));
        self.outgoing.push_back(OutgoingTransfer::new(
            peer_id,
            name,
            file.source(),
            file.size(),
            self.chunk_size,
        ));
    }

    pub fn on_chunk(&mut self, peer_id: &str, name: &str, data: Vec<u8>) {
        let key = (peer_id.to_string(), name.to_string());
        match self.incoming.get_mut(&key) {
            Some(session) => {
                session.append(data);
                self.logger.debug(&format!(
                    "Chunk {} of '{}' from {} ({} bytes so far)",
                    session.chunk_count(),
                    name,
                    peer_id,
                    session.offset
                ));
            }
            None => self.logger.warn(&format!(
                "Dropping {}-byte chunk of '{}' from {}: no transfer in progress",
                data.len(),
                name,
                peer_id
            )),
        }
    }

    /// Closes the receive session and returns the reconstructed file.
    pub fn on_file_done(&mut self, peer_id: &str, name: &str) -> Option<ReceivedFile> {
        let key = (peer_id.to_string(), name.to_string());
        let Some(session) = self.incoming.remove(&key) else {
            self.logger.warn(&format!(
                "file-done for '{}' from {} without a transfer in progress",
                name, peer_id
            ));
            return None;
        };

        let data = session.assemble();
        self.logger.info(&format!(
            "Received '{}' from {} ({} bytes)",
            name,
            peer_id,
            data.len()
        ));
        Some(ReceivedFile {
            peer_id: peer_id.to_string(),
            name: name.to_string(),
            data,
        })
    }

    /// Advances every queued upload by one read.
    ///
    /// Each chunk is sent before the next read of that file is issued. A
    /// finished file gets its `file-done`; a failed read ends the upload with
    /// nothing further sent, as does a frame that cannot be sent.
    pub fn pump(&mut self, registry: &mut PeerRegistry) -> PumpReport {
        let mut report = PumpReport::default();

        for _ in 0..self.outgoing.len() {
            let Some(mut transfer) = self.outgoing.pop_front() else {
                break;
            };

            let Some(connection) = registry.connected_mut(transfer.peer_id()) else {
                self.logger.info(&format!(
                    "Dropping upload of '{}': {} is gone",
                    transfer.file_name(),
                    transfer.peer_id()
                ));
                continue;
            };

            let frame = match transfer.read_next_chunk() {
                Ok(Some(chunk)) => WireFrame::chunk(transfer.file_name(), chunk),
                Ok(None) => WireFrame::control(ControlMessage::FileDone {
                    name: transfer.file_name().to_string(),
                }),
                Err(e) => {
                    let err = MeshError::TransferAborted {
                        name: transfer.file_name().to_string(),
                        reason: e.to_string(),
                    };
                    self.logger
                        .warn(&format!("{} (peer {})", err, transfer.peer_id()));
                    report.aborted.push(AbortedUpload {
                        peer_id: transfer.peer_id().to_string(),
                        name: transfer.file_name().to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let done = matches!(frame, WireFrame::Control(_));
            if let Err(e) = connection.send_frame(&frame) {
                self.logger.warn(&format!(
                    "Send of '{}' to {} failed, dropping upload: {}",
                    transfer.file_name(),
                    transfer.peer_id(),
                    e
                ));
                report.aborted.push(AbortedUpload {
                    peer_id: transfer.peer_id().to_string(),
                    name: transfer.file_name().to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
            report.frames_sent += 1;

            if done {
                self.logger.info(&format!(
                    "Finished sending '{}' to {} ({} bytes)",
                    transfer.file_name(),
                    transfer.peer_id(),
                    transfer.total_size
                ));
                report
                    .completed
                    .push((transfer.peer_id().to_string(), transfer.file_name().to_string()));
            } else {
                self.outgoing.push_back(transfer);
            }
        }

        report
    }

    /// Forgets every session, in either direction, involving `peer_id`.
    pub fn abandon_peer(&mut self, peer_id: &str) -> usize {
        let before = self.incoming.len() + self.outgoing.len();
        self.incoming.retain(|(peer, _), _| peer != peer_id);
        self.outgoing.retain(|t| t.peer_id() != peer_id);
        let abandoned = before - self.incoming.len() - self.outgoing.len();
        if abandoned > 0 {
            self.logger.info(&format!(
                "Abandoned {} transfer(s) with {}",
                abandoned, peer_id
            ));
        }
        abandoned
    }

    pub fn clear(&mut self) {
        self.incoming.clear();
        self.outgoing.clear();
    }

    pub fn is_receiving(&self, peer_id: &str, name: &str) -> bool {
        self.incoming
            .contains_key(&(peer_id.to_string(), name.to_string()))
    }

    pub fn pending_receives(&self) -> usize {
        self.incoming.len()
    }

    pub fn active_uploads(&self) -> usize {
        self.outgoing.len()
    }

    pub fn has_pending_uploads(&self) -> bool {
        !self.outgoing.is_empty()
    }
}
