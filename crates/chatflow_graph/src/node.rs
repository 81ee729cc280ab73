// SPDX-License-Identifier: MIT OR Apache-2.0
//! Message node definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a random node ID outside any graph.
    ///
    /// Ids of nodes stored in a [`FlowGraph`](crate::FlowGraph) come from its
    /// [`IdGenerator`](crate::IdGenerator); this is for detached values such as
    /// test fixtures.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A message block in the flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Position on the canvas
    pub position: [f32; 2],
    /// Message text, possibly empty
    pub content: String,
    /// Set by the last validation pass when this node is part of the failure
    #[serde(default)]
    pub has_error: bool,
}

impl Node {
    /// Create a node with empty content at the origin
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            position: [0.0, 0.0],
            content: String::new(),
            has_error: false,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set the message text
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Whether the message is blank once surrounding whitespace is ignored
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Merge a partial update into this node
    pub fn apply(&mut self, update: NodeUpdate) {
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
    }
}

/// Partial update of a node's editable fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    /// New position
    #[serde(default)]
    pub position: Option<[f32; 2]>,
    /// New message text
    #[serde(default)]
    pub content: Option<String>,
}

impl NodeUpdate {
    /// Update only the position
    pub fn position(position: [f32; 2]) -> Self {
        Self {
            position: Some(position),
            content: None,
        }
    }

    /// Update only the content
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            position: None,
            content: Some(content.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content() {
        let node = Node::new(NodeId::new());
        assert!(node.is_blank());
        assert!(node.clone().with_content("  \n\t").is_blank());
        assert!(!node.with_content(" Hi ").is_blank());
    }

    #[test]
    fn test_apply_merges_only_given_fields() {
        let mut node = Node::new(NodeId::new())
            .with_position(20.0, 40.0)
            .with_content("Hello");

        node.apply(NodeUpdate::content("Bye"));
        assert_eq!(node.content, "Bye");
        assert_eq!(node.position, [20.0, 40.0]);

        node.apply(NodeUpdate::position([60.0, 80.0]));
        assert_eq!(node.content, "Bye");
        assert_eq!(node.position, [60.0, 80.0]);

        node.apply(NodeUpdate::default());
        assert_eq!(node.content, "Bye");
    }
}
