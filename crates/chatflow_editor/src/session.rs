// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor session state.
//!
//! The session ties the flow graph to the interaction state around it:
//! selection, the connection authoring machine, the status line and the
//! sink that receives saved flows. Every input is handled to completion
//! before the next one arrives.

use crate::settings::EditorSettings;
use crate::sink::{FlowSink, SinkError};
use chatflow_graph::{
    snap_position, AuthoringOutcome, AuthoringRejection, ConnectionAuthoring, DropPayload,
    FlowGraph, NodeId, NodeUpdate, PointerEvent, StatusBar, StatusKind, ValidationReport,
    Validator,
};
use std::time::{Duration, Instant};

/// One editing session over a flow
pub struct EditorSession<S = Box<dyn FlowSink>> {
    /// The flow being edited
    graph: FlowGraph,
    /// In-progress connection gesture
    authoring: ConnectionAuthoring,
    /// Status line
    status: StatusBar,
    /// Node shown in the settings panel
    selected: Option<NodeId>,
    /// Editor settings
    settings: EditorSettings,
    /// Flow validator built from the settings
    validator: Validator,
    /// Destination for saved flows
    sink: S,
}

impl<S: FlowSink> EditorSession<S> {
    /// Start a session with an empty flow
    pub fn new(settings: EditorSettings, sink: S) -> Self {
        Self::with_graph(FlowGraph::new(), settings, sink)
    }

    /// Start a session on an existing flow
    pub fn with_graph(graph: FlowGraph, settings: EditorSettings, sink: S) -> Self {
        let validator = Validator::new(settings.validation_mode);
        Self {
            graph,
            authoring: ConnectionAuthoring::new(),
            status: StatusBar::new(),
            selected: None,
            settings,
            validator,
            sink,
        }
    }

    /// The flow being edited
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// The status line
    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    /// The connection authoring machine
    pub fn authoring(&self) -> &ConnectionAuthoring {
        &self.authoring
    }

    /// Selected node, if any
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Whether the settings panel replaces the node palette
    pub fn settings_panel_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Editor settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// The save sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn place(&self, pos: [f32; 2]) -> [f32; 2] {
        if self.settings.snap_to_grid {
            snap_position(pos, self.settings.grid_size)
        } else {
            pos
        }
    }

    /// A palette drag began; stale feedback goes away
    pub fn begin_palette_drag(&mut self) {
        self.status.clear();
    }

    /// Drop palette data at a canvas position. The new node is selected.
    pub fn drop_node(&mut self, payload: Option<&str>, pos: [f32; 2]) -> Option<NodeId> {
        let content = DropPayload::resolve(payload)?;
        let position = self.place(pos);
        let node_id = self.graph.add_node(position, content);
        tracing::debug!(node = %node_id, ?position, "Dropped message node");
        self.select_node(node_id);
        Some(node_id)
    }

    /// Select a node and open its settings
    pub fn select_node(&mut self, node_id: NodeId) {
        if self.graph.node(node_id).is_some() {
            self.selected = Some(node_id);
        }
    }

    /// Clear the selection (e.g. click on the canvas background)
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Replace a node's message text
    pub fn edit_content(&mut self, node_id: NodeId, content: impl Into<String>) {
        self.graph.update_node(node_id, NodeUpdate::content(content));
    }

    /// Move a node, snapping when enabled
    pub fn drag_node(&mut self, node_id: NodeId, pos: [f32; 2]) {
        let position = self.place(pos);
        self.graph.move_node(node_id, position);
    }

    /// Delete a node and everything attached to it
    pub fn delete_node(&mut self, node_id: NodeId) -> bool {
        if self.authoring.drawing_from() == Some(node_id) {
            self.authoring.cancel();
        }
        if self.selected == Some(node_id) {
            self.selected = None;
        }
        self.graph.remove_node(node_id).is_some()
    }

    /// Feed a pointer gesture to the connection authoring machine
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> AuthoringOutcome {
        let outcome = self.authoring.handle(event, &mut self.graph);

        if let Some(message) = outcome.message() {
            let timings = &self.settings.status;
            let (kind, delay) = match outcome {
                AuthoringOutcome::Rejected(AuthoringRejection::OutgoingTaken(_)) => {
                    (StatusKind::Error, timings.rejection())
                }
                AuthoringOutcome::Rejected(AuthoringRejection::AlreadyExists { .. }) => {
                    (StatusKind::Error, timings.connection())
                }
                _ => (StatusKind::Success, timings.connection()),
            };
            self.status.show(message, kind, delay, now);
        }

        outcome
    }

    /// Validate the flow and hand it to the sink if it passes.
    ///
    /// Node error flags are rewritten from the report. A sink failure leaves
    /// an error on the status line and is returned.
    pub fn save(&mut self, now: Instant) -> Result<ValidationReport, SinkError> {
        let report = self.validator.validate_graph(&self.graph);
        self.graph.apply_report(&report);

        if !report.valid {
            tracing::warn!(issue = ?report.issue, nodes = report.error_nodes.len(), "{}", report.message);
            self.show(report.message.clone(), StatusKind::Error, self.settings.status.failure(), now);
            return Ok(report);
        }

        if let Err(err) = self.sink.persist(&self.graph.snapshot()) {
            tracing::error!(sink = self.sink.name(), "Failed to save flow: {err}");
            self.show(
                format!("Error: Failed to save flow: {err}"),
                StatusKind::Error,
                self.settings.status.failure(),
                now,
            );
            return Err(err);
        }

        self.show(report.message.clone(), StatusKind::Success, self.settings.status.success(), now);
        Ok(report)
    }

    fn show(&mut self, text: String, kind: StatusKind, delay: Duration, now: Instant) {
        self.status.show(text, kind, delay, now);
    }

    /// Dismiss the status message once its time is up
    pub fn tick(&mut self, now: Instant) {
        self.status.tick(now);
    }
}
