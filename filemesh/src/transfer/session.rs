//! Per-file transfer state

use crate::domain::PeerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

/// One file moving between this node and `peer_id`.
///
/// Receive sessions buffer chunks in arrival order; chunks carry no offset,
/// so arrival order is the file order.
#[derive(Debug)]
pub struct TransferSession {
    pub peer_id: PeerId,
    pub file_name: String,
    pub direction: Direction,
    /// Bytes sent or received so far
    pub offset: u64,
    buffer: Vec<Vec<u8>>,
}

impl TransferSession {
    pub fn new(peer_id: &str, file_name: &str, direction: Direction) -> Self {
        Self {
            peer_id: peer_id.to_string(),
            file_name: file_name.to_string(),
            direction,
            offset: 0,
            buffer: Vec::new(),
        }
    }

    pub fn append(&mut self, chunk: Vec<u8>) {
        self.offset += chunk.len() as u64;
        self.buffer.push(chunk);
    }

    pub fn chunk_count(&self) -> usize {
        self.buffer.len()
    }

    /// Concatenates the buffered chunks.
    pub fn assemble(self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.offset as usize);
        for chunk in self.buffer {
            data.extend_from_slice(&chunk);
        }
        data
    }
}
