use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque signaling payload (SDP offer/answer or candidate).
///
/// The mesh only routes it; its content belongs to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(pub Value);

impl Signal {
    pub fn new(value: Value) -> Self {
        Signal(value)
    }

    /// Canonical text form, used to recognise duplicate relay deliveries.
    pub fn fingerprint(&self) -> String {
        self.0.to_string()
    }

    /// The `type` field, when the payload carries one.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Signal::new(json!({"type": "offer", "sdp": "v=0"}));
        let b = Signal::new(json!({"type": "offer", "sdp": "v=0"}));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.kind(), Some("offer"));
    }
}
