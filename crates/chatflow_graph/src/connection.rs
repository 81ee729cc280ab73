// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the flow.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a random connection ID outside any graph.
    ///
    /// Ids of connections stored in a [`FlowGraph`](crate::FlowGraph) come from its
    /// [`IdGenerator`](crate::IdGenerator); this is for detached values such as
    /// test fixtures.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A directed edge: `source` is followed by `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Node the edge leaves
    pub source: NodeId,
    /// Node the edge enters
    pub target: NodeId,
}

impl Connection {
    /// Create a new connection
    pub fn new(id: ConnectionId, source: NodeId, target: NodeId) -> Self {
        Self { id, source, target }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Check if this connection joins `source` to `target` in that direction
    pub fn joins(&self, source: NodeId, target: NodeId) -> bool {
        self.source == source && self.target == target
    }
}
