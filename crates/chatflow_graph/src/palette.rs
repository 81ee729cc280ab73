// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drag payloads produced by the node palette.

use serde::{Deserialize, Serialize};

/// Payload type tag for a message block
pub const MESSAGE_NODE_TYPE: &str = "MESSAGE_NODE";

/// Data carried from the palette to the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPayload {
    /// Kind of block being dropped
    #[serde(rename = "type")]
    pub node_type: String,
    /// Initial message text
    #[serde(default)]
    pub content: String,
}

impl DropPayload {
    /// Payload for a new message block
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            node_type: MESSAGE_NODE_TYPE.to_string(),
            content: content.into(),
        }
    }

    /// Encode as the JSON the palette puts on the drag
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decide what a drop of `raw` drag data creates.
    ///
    /// Returns the content of the message node to add, or `None` when the
    /// drop carries nothing for the canvas. Data that cannot be parsed still
    /// yields an empty message node.
    pub fn resolve(raw: Option<&str>) -> Option<String> {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                tracing::debug!("No drag data found");
                return None;
            }
        };

        match serde_json::from_str::<DropPayload>(raw) {
            Ok(payload) if payload.node_type == MESSAGE_NODE_TYPE => Some(payload.content),
            Ok(payload) => {
                tracing::debug!(node_type = %payload.node_type, "Ignoring drop of unknown block type");
                None
            }
            Err(err) => {
                tracing::warn!("Error parsing drag data: {err}");
                Some(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_payload_resolves() {
        let json = DropPayload::message("").to_json().unwrap();
        assert_eq!(json, r#"{"type":"MESSAGE_NODE","content":""}"#);
        assert_eq!(DropPayload::resolve(Some(&json)), Some(String::new()));

        let json = r#"{"type":"MESSAGE_NODE","content":"Welcome!"}"#;
        assert_eq!(DropPayload::resolve(Some(json)).as_deref(), Some("Welcome!"));

        let json = r#"{"type":"MESSAGE_NODE"}"#;
        assert_eq!(DropPayload::resolve(Some(json)).as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_payload_falls_back_to_empty_node() {
        assert_eq!(DropPayload::resolve(Some("MESSAGE_NODE")).as_deref(), Some(""));
        assert_eq!(DropPayload::resolve(Some("{\"type\":")).as_deref(), Some(""));
    }

    #[test]
    fn test_missing_or_foreign_payload_creates_nothing() {
        assert_eq!(DropPayload::resolve(None), None);
        assert_eq!(DropPayload::resolve(Some("   ")), None);
        assert_eq!(DropPayload::resolve(Some(r#"{"type":"IMAGE_NODE","content":"x"}"#)), None);
    }
}
