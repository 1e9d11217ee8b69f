//! Display-surface protocol.
//!
//! Inbound: `{"text": "..."}` from the surface. Outbound: `{"text": "..."}`
//! for a tutor reply, `{"error": "..."}` when a turn failed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Reply { text: String },
    Error { error: String },
}

impl OutboundMessage {
    pub fn reply(text: impl Into<String>) -> Self {
        OutboundMessage::Reply { text: text.into() }
    }

    pub fn error(error: impl Into<String>) -> Self {
        OutboundMessage::Error {
            error: error.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OutboundMessage::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_wire_format() {
        let msg: InboundMessage = serde_json::from_str(r#"{"text":"why does it crash?"}"#).unwrap();
        assert_eq!(msg, InboundMessage::new("why does it crash?"));
    }

    #[test]
    fn test_outbound_reply_wire_format() {
        let json = serde_json::to_string(&OutboundMessage::reply("What is 1/0?")).unwrap();
        assert_eq!(json, r#"{"text":"What is 1/0?"}"#);
    }

    #[test]
    fn test_outbound_error_wire_format() {
        let msg = OutboundMessage::error("provider unavailable");
        assert!(msg.is_error());
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"error":"provider unavailable"}"#);

        let decoded: OutboundMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, msg);
    }
}
