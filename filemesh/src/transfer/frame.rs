//! Data-channel framing
//!
//! Every frame starts with a kind byte:
//!
//! ```text
//! Control: [0x01] [UTF-8 JSON control message]
//! Chunk:   [0x02] [name_len: u16 BE] [name: UTF-8] [payload: <= 65536 bytes]
//! ```

use super::control_message::ControlMessage;
use crate::error::{MeshError, Result};
use std::io;

/// Size of every chunk except possibly the last one of a file.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Longest file name, in UTF-8 bytes, a chunk frame can carry.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    Control(ControlMessage),
    Chunk { name: String, data: Vec<u8> },
}

impl WireFrame {
    const KIND_CONTROL: u8 = 0x01;
    const KIND_CHUNK: u8 = 0x02;

    pub fn control(message: ControlMessage) -> Self {
        WireFrame::Control(message)
    }

    pub fn chunk(name: &str, data: Vec<u8>) -> Self {
        WireFrame::Chunk {
            name: name.to_string(),
            data,
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        match self {
            WireFrame::Control(message) => {
                let json = serde_json::to_vec(message)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                let mut buf = Vec::with_capacity(1 + json.len());
                buf.push(Self::KIND_CONTROL);
                buf.extend_from_slice(&json);
                Ok(buf)
            }
            WireFrame::Chunk { name, data } => {
                let name_bytes = name.as_bytes();
                let name_len = u16::try_from(name_bytes.len()).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "File name too long")
                })?;
                if data.len() > CHUNK_SIZE {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "Chunk larger than 65536 bytes",
                    ));
                }
                let mut buf = Vec::with_capacity(3 + name_bytes.len() + data.len());
                buf.push(Self::KIND_CHUNK);
                buf.extend_from_slice(&name_len.to_be_bytes());
                buf.extend_from_slice(name_bytes);
                buf.extend_from_slice(data);
                Ok(buf)
            }
        }
    }

    /// Parse from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (&kind, body) = data
            .split_first()
            .ok_or_else(|| MeshError::ProtocolParse("Empty frame".to_string()))?;
        match kind {
            Self::KIND_CONTROL => Self::parse_control(body),
            Self::KIND_CHUNK => Self::parse_chunk(body),
            other => Err(MeshError::ProtocolParse(format!(
                "Unknown frame kind 0x{:02x}",
                other
            ))),
        }
    }

    fn parse_control(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map(WireFrame::Control)
            .map_err(|e| MeshError::ProtocolParse(format!("Bad control message: {}", e)))
    }

    fn parse_chunk(body: &[u8]) -> Result<Self> {
        if body.len() < 2 {
            return Err(MeshError::ProtocolParse("Chunk header too short".to_string()));
        }
        let name_len = u16::from_be_bytes([body[0], body[1]]) as usize;
        let name_bytes = body
            .get(2..2 + name_len)
            .ok_or_else(|| MeshError::ProtocolParse("Chunk name truncated".to_string()))?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| MeshError::ProtocolParse("Chunk name is not UTF-8".to_string()))?;
        let payload = &body[2 + name_len..];
        if payload.len() > CHUNK_SIZE {
            return Err(MeshError::ProtocolParse(format!(
                "Chunk payload of {} bytes exceeds {}",
                payload.len(),
                CHUNK_SIZE
            )));
        }
        Ok(WireFrame::chunk(name, payload.to_vec()))
    }
}
