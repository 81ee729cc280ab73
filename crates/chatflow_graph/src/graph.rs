// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flow graph containing message nodes and connections.

use crate::connection::{Connection, ConnectionId};
use crate::id::{IdGenerator, RandomIds};
use crate::node::{Node, NodeId, NodeUpdate};
use crate::validation::ValidationReport;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A chatbot conversation flow
#[derive(Debug)]
pub struct FlowGraph {
    /// Nodes in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Connections in creation order
    connections: IndexMap<ConnectionId, Connection>,
    /// Id source for new nodes and connections
    ids: Box<dyn IdGenerator>,
}

impl FlowGraph {
    /// Create a new empty graph with random ids
    pub fn new() -> Self {
        Self::with_ids(RandomIds)
    }

    /// Create a new empty graph drawing ids from `ids`
    pub fn with_ids(ids: impl IdGenerator + 'static) -> Self {
        Self {
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            ids: Box::new(ids),
        }
    }

    /// Add a message node and return its id
    pub fn add_node(&mut self, position: [f32; 2], content: impl Into<String>) -> NodeId {
        let id = self.fresh_node_id();
        let node = Node::new(id)
            .with_position(position[0], position[1])
            .with_content(content);
        self.nodes.insert(id, node);
        id
    }

    // The generator may hand out ids already present after a snapshot load
    fn fresh_node_id(&mut self) -> NodeId {
        loop {
            let id = NodeId(self.ids.next_uuid());
            if !self.nodes.contains_key(&id) {
                break id;
            }
        }
    }

    fn fresh_connection_id(&mut self) -> ConnectionId {
        loop {
            let id = ConnectionId(self.ids.next_uuid());
            if !self.connections.contains_key(&id) {
                break id;
            }
        }
    }

    /// Merge `update` into the node. Unknown ids are ignored.
    pub fn update_node(&mut self, node_id: NodeId, update: NodeUpdate) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.apply(update);
        }
    }

    /// Move a node. Callers snap the position first when grid alignment is wanted.
    pub fn move_node(&mut self, node_id: NodeId, position: [f32; 2]) {
        self.update_node(node_id, NodeUpdate::position(position));
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Connect `source` to `target`.
    ///
    /// Rejected when either node is missing, when the edge would be a
    /// self-loop, when the same edge already exists, or when `source`
    /// already has its single outgoing edge.
    pub fn add_connection(
        &mut self,
        source: NodeId,
        target: NodeId,
    ) -> Result<ConnectionId, ConnectionError> {
        self.check_connection(source, target)?;

        let id = self.fresh_connection_id();
        self.connections.insert(id, Connection::new(id, source, target));
        tracing::debug!(%source, %target, connection = %id, "Connected nodes");
        Ok(id)
    }

    /// Check whether `source -> target` could be added right now
    pub fn check_connection(&self, source: NodeId, target: NodeId) -> Result<(), ConnectionError> {
        if !self.nodes.contains_key(&source) {
            return Err(ConnectionError::NodeNotFound(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(ConnectionError::NodeNotFound(target));
        }
        if source == target {
            return Err(ConnectionError::SelfLoop);
        }
        if self.has_connection(source, target) {
            return Err(ConnectionError::AlreadyExists { from: source, to: target });
        }
        if self.has_outgoing(source) {
            return Err(ConnectionError::OutgoingTaken(source));
        }
        Ok(())
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The single outgoing connection of a node, if any
    pub fn outgoing(&self, node_id: NodeId) -> Option<&Connection> {
        self.connections.values().find(|c| c.source == node_id)
    }

    /// Connections entering a node
    pub fn incoming(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.target == node_id)
    }

    /// Whether the node already owns an outgoing connection
    pub fn has_outgoing(&self, node_id: NodeId) -> bool {
        self.outgoing(node_id).is_some()
    }

    /// Whether `source -> target` exists
    pub fn has_connection(&self, source: NodeId, target: NodeId) -> bool {
        self.connections.values().any(|c| c.joins(source, target))
    }

    /// Reset the error flag on every node
    pub fn clear_errors(&mut self) {
        for node in self.nodes.values_mut() {
            node.has_error = false;
        }
    }

    /// Flag exactly the given nodes; other flags are left untouched
    pub fn set_errors_on<'a>(&mut self, node_ids: impl IntoIterator<Item = &'a NodeId>) {
        for node_id in node_ids {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.has_error = true;
            }
        }
    }

    /// Replace all error flags with the ones attributed by `report`
    pub fn apply_report(&mut self, report: &ValidationReport) {
        self.clear_errors();
        self.set_errors_on(&report.error_nodes);
    }

    /// Copy out the current nodes and connections
    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            connections: self.connections.values().copied().collect(),
        }
    }

    /// Rebuild a graph from a snapshot, re-checking every connection rule.
    ///
    /// Error flags stored in the snapshot are dropped.
    pub fn from_snapshot(
        snapshot: FlowSnapshot,
        ids: impl IdGenerator + 'static,
    ) -> Result<Self, SnapshotError> {
        let mut graph = Self::with_ids(ids);

        for mut node in snapshot.nodes {
            node.has_error = false;
            let id = node.id;
            if graph.nodes.insert(id, node).is_some() {
                return Err(SnapshotError::DuplicateNode(id));
            }
        }

        for connection in snapshot.connections {
            if graph.connections.contains_key(&connection.id) {
                return Err(SnapshotError::DuplicateConnection(connection.id));
            }
            graph
                .check_connection(connection.source, connection.target)
                .map_err(|source| SnapshotError::InvalidConnection {
                    id: connection.id,
                    source,
                })?;
            graph.connections.insert(connection.id, connection);
        }

        Ok(graph)
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable copy of a flow, handed to save sinks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    /// All nodes
    pub nodes: Vec<Node>,
    /// All connections
    pub connections: Vec<Connection>,
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// The same edge already exists
    #[error("Connection already exists between {from} and {to}")]
    AlreadyExists {
        /// Source node
        from: NodeId,
        /// Target node
        to: NodeId,
    },

    /// The source node already has its outgoing edge
    #[error("Node {0} already has an outgoing connection")]
    OutgoingTaken(NodeId),
}

/// Error when loading a snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Two nodes share an id
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Two connections share an id
    #[error("Duplicate connection id: {0}")]
    DuplicateConnection(ConnectionId),

    /// A connection breaks a connection rule
    #[error("Invalid connection {id}: {source}")]
    InvalidConnection {
        /// Offending connection
        id: ConnectionId,
        /// Rule it breaks
        source: ConnectionError,
    },

    /// Snapshot text could not be parsed
    #[error("Failed to parse flow snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FlowSnapshot {
    /// Parse a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
