//! Sender side of a transfer

use super::session::{Direction, TransferSession};
use crate::catalog::FileSource;
use std::io;
use std::rc::Rc;

/// A file being streamed to a peer, one chunk per read.
pub struct OutgoingTransfer {
    pub session: TransferSession,
    pub total_size: u64,
    chunk_size: usize,
    source: Rc<dyn FileSource>,
}

impl OutgoingTransfer {
    pub fn new(
        peer_id: &str,
        file_name: &str,
        source: Rc<dyn FileSource>,
        total_size: u64,
        chunk_size: usize,
    ) -> Self {
        Self {
            session: TransferSession::new(peer_id, file_name, Direction::Send),
            total_size,
            chunk_size,
            source,
        }
    }

    pub fn peer_id(&self) -> &str {
        &self.session.peer_id
    }

    pub fn file_name(&self) -> &str {
        &self.session.file_name
    }

    pub fn is_finished(&self) -> bool {
        self.session.offset >= self.total_size
    }

    /// Reads the next chunk, or `None` once every byte has been read.
    ///
    /// Short reads are retried until the chunk is full, so every chunk but
    /// the last is exactly `chunk_size` bytes. A source that ends before the
    /// advertised size is an error.
    pub fn read_next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.is_finished() {
            return Ok(None);
        }

        let remaining = (self.total_size - self.session.offset) as usize;
        let mut buffer = vec![0u8; remaining.min(self.chunk_size)];
        let mut filled = 0;

        while filled < buffer.len() {
            let offset = self.session.offset + filled as u64;
            let read = self.source.read_at(offset, &mut buffer[filled..])?;
            if read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "source ended at byte {} of {}",
                        offset, self.total_size
                    ),
                ));
            }
            filled += read;
        }

        self.session.offset += filled as u64;
        Ok(Some(buffer))
    }
}
