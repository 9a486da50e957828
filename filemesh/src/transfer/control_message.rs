//! Text control messages exchanged between connected peers

use crate::domain::FileEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlMessage {
    /// The sender's complete current file set
    FileList { files: Vec<FileEntry> },
    /// Ask the receiver to stream a file it advertised
    FileRequest { name: String },
    /// Every chunk of `name` has been sent
    FileDone { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_list_json_shape() {
        let msg = ControlMessage::FileList {
            files: vec![FileEntry {
                name: "a.txt".to_string(),
                size: 3,
            }],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"file-list","files":[{"name":"a.txt","size":3}]}"#);
    }

    #[test]
    fn test_parse_file_request() {
        let msg: ControlMessage =
            serde_json::from_str(r#"{"type":"file-request","name":"b.png"}"#).unwrap();
        assert_eq!(
            msg,
            ControlMessage::FileRequest {
                name: "b.png".to_string()
            }
        );
    }
}
