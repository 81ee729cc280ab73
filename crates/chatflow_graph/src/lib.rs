// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flow graph core for the chatbot flow builder.
//!
//! This crate provides everything the editor needs that is not rendering:
//! - Message nodes and directed connections
//! - Creation-time connection rules (one outgoing edge, no duplicates, no self-loops)
//! - Whole-flow validation with per-node error attribution
//! - The connection authoring state machine
//! - Grid snapping, status messages and palette drop payloads
//!
//! ## Architecture
//!
//! The [`FlowGraph`] owns all nodes and connections. Validation is a pure
//! function over a graph; its report is applied back onto the graph by the
//! caller. The [`ConnectionAuthoring`] machine consumes [`PointerEvent`]
//! values and mutates the graph only when a gesture completes successfully.

pub mod authoring;
pub mod connection;
pub mod graph;
pub mod id;
pub mod layout;
pub mod node;
pub mod palette;
pub mod status;
pub mod validation;

pub use authoring::{AuthoringOutcome, AuthoringRejection, AuthoringState, ConnectionAuthoring, HandleHit, HandleKind, PointerEvent};
pub use connection::{Connection, ConnectionId};
pub use graph::{ConnectionError, FlowGraph, FlowSnapshot, SnapshotError};
pub use id::{IdGenerator, RandomIds, SequentialIds};
pub use layout::{snap, snap_position, DEFAULT_GRID_SIZE};
pub use node::{Node, NodeId, NodeUpdate};
pub use palette::DropPayload;
pub use status::{StatusBar, StatusKind, StatusMessage};
pub use validation::{validate, ValidationIssue, ValidationMode, ValidationReport, Validator};
