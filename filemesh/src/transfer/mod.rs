//! Chunked file transfer over an established connection.
//!
//! A requester opens a receive session and sends `file-request`. The owner
//! streams the file as chunk frames, one read per pump step, and finishes
//! with `file-done`. Chunks carry the file name, so several transfers can
//! share one connection without mixing their buffers.

mod control_message;
mod engine;
mod frame;
mod outgoing;
mod received;
mod session;

pub use control_message::ControlMessage;
pub use engine::{AbortedUpload, PumpReport, TransferEngine};
pub use frame::{CHUNK_SIZE, MAX_NAME_LEN, WireFrame};
pub use outgoing::OutgoingTransfer;
pub use received::ReceivedFile;
pub use session::{Direction, TransferSession};
