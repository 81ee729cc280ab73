// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection authoring: the press-drag-release gesture that draws one edge.
//!
//! The machine is driven by [`PointerEvent`] values. Whatever input layer
//! sits on top is responsible for hit-testing and telling the machine which
//! handle, if any, lies under the pointer.

use crate::connection::ConnectionId;
use crate::graph::{ConnectionError, FlowGraph};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Message shown after a connection is drawn
pub const CONNECTION_CREATED_MESSAGE: &str = "Connection created successfully!";

/// Which interaction zone of a node was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleKind {
    /// Outgoing handle; connections start here
    Source,
    /// Incoming handle; connections end here
    Target,
}

/// A handle under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleHit {
    /// Node owning the handle
    pub node: NodeId,
    /// Handle kind
    pub kind: HandleKind,
}

impl HandleHit {
    /// Hit on a node's source handle
    pub fn source(node: NodeId) -> Self {
        Self {
            node,
            kind: HandleKind::Source,
        }
    }

    /// Hit on a node's target handle
    pub fn target(node: NodeId) -> Self {
        Self {
            node,
            kind: HandleKind::Target,
        }
    }
}

/// Pointer gesture fed into the authoring machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Button pressed
    Press {
        /// Canvas position
        pos: [f32; 2],
        /// Handle under the pointer
        hit: Option<HandleHit>,
    },
    /// Pointer moved
    Move {
        /// Canvas position
        pos: [f32; 2],
    },
    /// Button released
    Release {
        /// Canvas position
        pos: [f32; 2],
        /// Handle under the pointer
        hit: Option<HandleHit>,
    },
    /// Gesture aborted (e.g. Escape)
    Cancel,
}

/// Current authoring state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AuthoringState {
    /// No edge being drawn
    #[default]
    Idle,
    /// Drawing an edge out of `source`
    Drawing {
        /// Node the edge starts from
        source: NodeId,
        /// Last pointer position, for the preview curve
        pointer: [f32; 2],
    },
}

/// Why a gesture was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthoringRejection {
    /// The pressed node already has its outgoing connection
    #[error("Error: Each node can only have one outgoing connection!")]
    OutgoingTaken(NodeId),

    /// The released-on edge already exists
    #[error("Connection already exists between these nodes!")]
    AlreadyExists {
        /// Source node
        from: NodeId,
        /// Target node
        to: NodeId,
    },
}

/// Result of feeding one event to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringOutcome {
    /// Event had no effect
    Ignored,
    /// Drawing started from a node
    Started(NodeId),
    /// Preview position updated
    Moved,
    /// Drawing ended without an edge and without feedback
    Cancelled,
    /// An edge was added to the graph
    Created(ConnectionId),
    /// The gesture was refused
    Rejected(AuthoringRejection),
}

impl AuthoringOutcome {
    /// User-facing feedback for this outcome, if any
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Created(_) => Some(CONNECTION_CREATED_MESSAGE.to_string()),
            Self::Rejected(rejection) => Some(rejection.to_string()),
            Self::Ignored | Self::Started(_) | Self::Moved | Self::Cancelled => None,
        }
    }
}

/// State machine for drawing connections
#[derive(Debug, Clone, Default)]
pub struct ConnectionAuthoring {
    state: AuthoringState,
}

impl ConnectionAuthoring {
    /// Create an idle machine
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> AuthoringState {
        self.state
    }

    /// Node an edge is currently being drawn from
    pub fn drawing_from(&self) -> Option<NodeId> {
        match self.state {
            AuthoringState::Drawing { source, .. } => Some(source),
            AuthoringState::Idle => None,
        }
    }

    /// Whether an edge is being drawn
    pub fn is_drawing(&self) -> bool {
        self.drawing_from().is_some()
    }

    /// Feed a pointer event
    pub fn handle(&mut self, event: PointerEvent, graph: &mut FlowGraph) -> AuthoringOutcome {
        match event {
            PointerEvent::Press {
                pos,
                hit: Some(HandleHit {
                    node,
                    kind: HandleKind::Source,
                }),
            } => self.begin_at(graph, node, pos),
            PointerEvent::Press { .. } => AuthoringOutcome::Ignored,
            PointerEvent::Move { pos } => match &mut self.state {
                AuthoringState::Drawing { pointer, .. } => {
                    *pointer = pos;
                    AuthoringOutcome::Moved
                }
                AuthoringState::Idle => AuthoringOutcome::Ignored,
            },
            PointerEvent::Release {
                hit: Some(HandleHit {
                    node,
                    kind: HandleKind::Target,
                }),
                ..
            } => self.complete(graph, node),
            PointerEvent::Release { .. } | PointerEvent::Cancel => self.cancel(),
        }
    }

    /// Start drawing from `node`'s source handle
    pub fn begin(&mut self, graph: &FlowGraph, node: NodeId) -> AuthoringOutcome {
        let pointer = graph.node(node).map_or([0.0, 0.0], |n| n.position);
        self.begin_at(graph, node, pointer)
    }

    fn begin_at(&mut self, graph: &FlowGraph, node: NodeId, pointer: [f32; 2]) -> AuthoringOutcome {
        self.state = AuthoringState::Idle;

        if graph.node(node).is_none() {
            return AuthoringOutcome::Ignored;
        }
        if graph.has_outgoing(node) {
            tracing::debug!(%node, "Refused to draw a second outgoing connection");
            return AuthoringOutcome::Rejected(AuthoringRejection::OutgoingTaken(node));
        }

        tracing::debug!(%node, "Started drawing connection");
        self.state = AuthoringState::Drawing {
            source: node,
            pointer,
        };
        AuthoringOutcome::Started(node)
    }

    /// Finish the current edge on `target`'s target handle
    pub fn complete(&mut self, graph: &mut FlowGraph, target: NodeId) -> AuthoringOutcome {
        let AuthoringState::Drawing { source, .. } = std::mem::take(&mut self.state) else {
            return AuthoringOutcome::Ignored;
        };

        if source == target {
            return AuthoringOutcome::Cancelled;
        }

        match graph.add_connection(source, target) {
            Ok(id) => {
                tracing::info!(%source, %target, "Connection created");
                AuthoringOutcome::Created(id)
            }
            Err(ConnectionError::AlreadyExists { from, to }) => {
                tracing::debug!(%from, %to, "Refused duplicate connection");
                AuthoringOutcome::Rejected(AuthoringRejection::AlreadyExists { from, to })
            }
            Err(ConnectionError::OutgoingTaken(node)) => {
                AuthoringOutcome::Rejected(AuthoringRejection::OutgoingTaken(node))
            }
            Err(err @ (ConnectionError::NodeNotFound(_) | ConnectionError::SelfLoop)) => {
                tracing::debug!("Dropped connection gesture: {err}");
                AuthoringOutcome::Cancelled
            }
        }
    }

    /// Abandon the current gesture
    pub fn cancel(&mut self) -> AuthoringOutcome {
        match std::mem::take(&mut self.state) {
            AuthoringState::Drawing { source, .. } => {
                tracing::debug!(%source, "Cancelled connection drawing");
                AuthoringOutcome::Cancelled
            }
            AuthoringState::Idle => AuthoringOutcome::Ignored,
        }
    }
}
