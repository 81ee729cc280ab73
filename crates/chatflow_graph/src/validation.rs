// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-flow validation.
//!
//! Rules run in a fixed order and the first failing rule decides the report:
//!
//! 1. the flow has at least one node
//! 2. with two or more nodes, at most one node lacks an incoming connection
//! 3. with two or more nodes, at most one node lacks an outgoing connection
//! 4. with two or more nodes, every node takes part in some connection
//! 5. in [`ValidationMode::Strict`], the connections form one simple path
//! 6. every node has non-blank content
//!
//! Validation is pure. Applying the result to node error flags is left to
//! [`FlowGraph::apply_report`](crate::FlowGraph::apply_report).

use crate::connection::Connection;
use crate::graph::FlowGraph;
use crate::node::{Node, NodeId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Message shown when every rule passes
pub const SUCCESS_MESSAGE: &str = "Success: Flow saved successfully!";

/// How strictly the flow topology is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Entry/exit counting and isolation checks only
    #[default]
    Compatible,
    /// Additionally require the flow to be a single simple path
    Strict,
}

/// The rule a flow failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    /// There are no nodes at all
    #[error("Error: No nodes in the flow!")]
    EmptyFlow,

    /// More than one node has no incoming connection
    #[error("Error: Multiple nodes have empty target handles (no incoming connections)!")]
    MultipleEntryPoints,

    /// More than one node has no outgoing connection
    #[error("Error: You have unconnected steps!")]
    MultipleExitPoints,

    /// Some nodes take part in no connection
    #[error("Error: Some nodes are not connected to the flow!")]
    IsolatedNodes,

    /// Following the connections from the entry does not visit every node exactly once
    #[error("Error: The flow is not a single path!")]
    NotSinglePath,

    /// Some nodes have blank content
    #[error("Error: Some nodes have empty messages!")]
    EmptyMessages,
}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Whether every rule passed
    pub valid: bool,
    /// Human-readable status line
    pub message: String,
    /// Nodes to highlight, in graph order
    pub error_nodes: IndexSet<NodeId>,
    /// The failing rule, if any
    pub issue: Option<ValidationIssue>,
}

impl ValidationReport {
    /// A passing report
    pub fn success() -> Self {
        Self {
            valid: true,
            message: SUCCESS_MESSAGE.to_string(),
            error_nodes: IndexSet::new(),
            issue: None,
        }
    }

    /// A failing report attributing `issue` to `error_nodes`
    pub fn failure(issue: ValidationIssue, error_nodes: IndexSet<NodeId>) -> Self {
        Self {
            valid: false,
            message: issue.to_string(),
            error_nodes,
            issue: Some(issue),
        }
    }
}

/// Flow validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    /// Topology strictness
    pub mode: ValidationMode,
}

impl Validator {
    /// Create a validator with the given mode
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    /// Validate the nodes and connections of a graph
    pub fn validate_graph(&self, graph: &FlowGraph) -> ValidationReport {
        self.validate(graph.nodes(), graph.connections())
    }

    /// Validate a set of nodes and connections
    pub fn validate<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a Node>,
        connections: impl IntoIterator<Item = &'a Connection>,
    ) -> ValidationReport {
        let nodes: Vec<&Node> = nodes.into_iter().collect();
        let connections: Vec<&Connection> = connections.into_iter().collect();

        if nodes.is_empty() {
            return ValidationReport::failure(ValidationIssue::EmptyFlow, IndexSet::new());
        }

        if nodes.len() > 1 {
            if let Some(report) = self.check_topology(&nodes, &connections) {
                return report;
            }
        }

        let blank: IndexSet<NodeId> = nodes.iter().filter(|n| n.is_blank()).map(|n| n.id).collect();
        if !blank.is_empty() {
            return ValidationReport::failure(ValidationIssue::EmptyMessages, blank);
        }

        ValidationReport::success()
    }

    fn check_topology(&self, nodes: &[&Node], connections: &[&Connection]) -> Option<ValidationReport> {
        let sources: HashSet<NodeId> = connections.iter().map(|c| c.source).collect();
        let targets: HashSet<NodeId> = connections.iter().map(|c| c.target).collect();

        let entries: IndexSet<NodeId> = nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !targets.contains(id))
            .collect();
        if entries.len() > 1 {
            return Some(ValidationReport::failure(ValidationIssue::MultipleEntryPoints, entries));
        }

        let exits: IndexSet<NodeId> = nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !sources.contains(id))
            .collect();
        if exits.len() > 1 {
            return Some(ValidationReport::failure(ValidationIssue::MultipleExitPoints, exits));
        }

        let isolated: IndexSet<NodeId> = nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !sources.contains(id) && !targets.contains(id))
            .collect();
        if !isolated.is_empty() {
            return Some(ValidationReport::failure(ValidationIssue::IsolatedNodes, isolated));
        }

        if self.mode == ValidationMode::Strict {
            let off_path = off_path_nodes(nodes, connections, entries.first().copied());
            if !off_path.is_empty() {
                return Some(ValidationReport::failure(ValidationIssue::NotSinglePath, off_path));
            }
        }

        None
    }
}

/// Nodes that break the single-path shape: those not reached by walking
/// from `entry`, plus any cycle the walk runs into.
fn off_path_nodes(nodes: &[&Node], connections: &[&Connection], entry: Option<NodeId>) -> IndexSet<NodeId> {
    let Some(entry) = entry else {
        // Every node has a predecessor, so the flow is closed into cycles
        return nodes.iter().map(|n| n.id).collect();
    };

    let mut next: IndexMap<NodeId, NodeId> = IndexMap::new();
    for connection in connections {
        next.entry(connection.source).or_insert(connection.target);
    }

    let mut walk: IndexSet<NodeId> = IndexSet::new();
    let mut cycle_start = None;
    let mut current = Some(entry);
    while let Some(node_id) = current {
        if !walk.insert(node_id) {
            cycle_start = Some(node_id);
            break;
        }
        current = next.get(&node_id).copied();
    }

    let mut off_path: IndexSet<NodeId> = nodes
        .iter()
        .map(|n| n.id)
        .filter(|id| !walk.contains(id))
        .collect();

    if let Some(start) = cycle_start {
        if let Some(index) = walk.get_index_of(&start) {
            off_path.extend(walk.iter().skip(index).copied());
        }
    }

    off_path
}

/// Validate a graph with the default [`ValidationMode::Compatible`] rules
pub fn validate(graph: &FlowGraph) -> ValidationReport {
    Validator::default().validate_graph(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;

    fn graph() -> FlowGraph {
        FlowGraph::with_ids(SequentialIds::new())
    }

    #[test]
    fn test_empty_flow() {
        let report = validate(&graph());
        assert!(!report.valid);
        assert_eq!(report.issue, Some(ValidationIssue::EmptyFlow));
        assert_eq!(report.message, "Error: No nodes in the flow!");
        assert!(report.error_nodes.is_empty());
    }

    #[test]
    fn test_lone_node_skips_topology() {
        let mut graph = graph();
        let a = graph.add_node([0.0, 0.0], "Hi");
        assert!(validate(&graph).valid);

        graph.update_node(a, crate::NodeUpdate::content("   "));
        let report = validate(&graph);
        assert_eq!(report.issue, Some(ValidationIssue::EmptyMessages));
        assert_eq!(report.error_nodes.iter().copied().collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_multiple_entry_points_win_over_later_rules() {
        let mut graph = graph();
        let a = graph.add_node([0.0, 0.0], "");
        let b = graph.add_node([0.0, 0.0], "");
        let c = graph.add_node([0.0, 0.0], "");
        graph.add_connection(a, c).unwrap();
        graph.add_connection(b, c).unwrap();

        let report = validate(&graph);
        assert_eq!(report.issue, Some(ValidationIssue::MultipleEntryPoints));
        assert_eq!(
            report.message,
            "Error: Multiple nodes have empty target handles (no incoming connections)!"
        );
        assert_eq!(report.error_nodes.iter().copied().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_multiple_exit_points() {
        // A -> B, A -> C is impossible through add_connection, so feed raw parts
        let a = Node::new(NodeId::new()).with_content("A");
        let b = Node::new(NodeId::new()).with_content("B");
        let c = Node::new(NodeId::new()).with_content("C");
        let connections = [
            Connection::new(crate::ConnectionId::new(), a.id, b.id),
            Connection::new(crate::ConnectionId::new(), a.id, c.id),
        ];

        let report = Validator::default().validate([&a, &b, &c], &connections);
        assert_eq!(report.issue, Some(ValidationIssue::MultipleExitPoints));
        assert_eq!(report.message, "Error: You have unconnected steps!");
        assert_eq!(report.error_nodes.iter().copied().collect::<Vec<_>>(), vec![b.id, c.id]);
    }

    #[test]
    fn test_cycle_passes_compatible_but_not_strict() {
        // A -> B -> C -> B: one entry, no exit, nothing isolated
        let mut graph = graph();
        let a = graph.add_node([0.0, 0.0], "A");
        let b = graph.add_node([0.0, 0.0], "B");
        let c = graph.add_node([0.0, 0.0], "C");
        graph.add_connection(a, b).unwrap();
        graph.add_connection(b, c).unwrap();
        graph.add_connection(c, b).unwrap();

        assert!(validate(&graph).valid);

        let report = Validator::new(ValidationMode::Strict).validate_graph(&graph);
        assert_eq!(report.issue, Some(ValidationIssue::NotSinglePath));
        assert_eq!(report.error_nodes.iter().copied().collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn test_strict_flags_detached_cycle() {
        // A -> B plus a separate C <-> D loop
        let mut graph = graph();
        let a = graph.add_node([0.0, 0.0], "A");
        let b = graph.add_node([0.0, 0.0], "B");
        let c = graph.add_node([0.0, 0.0], "C");
        let d = graph.add_node([0.0, 0.0], "D");
        graph.add_connection(a, b).unwrap();
        graph.add_connection(c, d).unwrap();
        graph.add_connection(d, c).unwrap();

        assert!(validate(&graph).valid);

        let report = Validator::new(ValidationMode::Strict).validate_graph(&graph);
        assert_eq!(report.issue, Some(ValidationIssue::NotSinglePath));
        assert_eq!(report.error_nodes.iter().copied().collect::<Vec<_>>(), vec![c, d]);
    }

    #[test]
    fn test_strict_closed_loop_flags_everything() {
        let mut graph = graph();
        let a = graph.add_node([0.0, 0.0], "A");
        let b = graph.add_node([0.0, 0.0], "B");
        graph.add_connection(a, b).unwrap();
        graph.add_connection(b, a).unwrap();

        let report = Validator::new(ValidationMode::Strict).validate_graph(&graph);
        assert_eq!(report.issue, Some(ValidationIssue::NotSinglePath));
        assert_eq!(report.error_nodes.len(), 2);
    }

    #[test]
    fn test_strict_accepts_chain() {
        let mut graph = graph();
        let a = graph.add_node([0.0, 0.0], "Hi");
        let b = graph.add_node([0.0, 0.0], "How are you?");
        let c = graph.add_node([0.0, 0.0], "Bye");
        graph.add_connection(a, b).unwrap();
        graph.add_connection(b, c).unwrap();

        let report = Validator::new(ValidationMode::Strict).validate_graph(&graph);
        assert_eq!(report, ValidationReport::success());
    }

    #[test]
    fn test_apply_report_replaces_flags() {
        let mut graph = graph();
        let a = graph.add_node([0.0, 0.0], "Hi");
        let b = graph.add_node([0.0, 0.0], "");
        graph.add_connection(a, b).unwrap();

        let report = validate(&graph);
        graph.apply_report(&report);
        assert!(!graph.node(a).unwrap().has_error);
        assert!(graph.node(b).unwrap().has_error);

        graph.update_node(b, crate::NodeUpdate::content("Bye"));
        let report = validate(&graph);
        assert!(report.valid);
        graph.apply_report(&report);
        assert!(graph.nodes().all(|n| !n.has_error));
    }
}
