// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted editing sessions.
//!
//! A script is a RON list of user actions. Nodes are referred to by the
//! order in which they were dropped (0 is the first node), so scripts do
//! not depend on generated ids. Time only advances through `Wait` steps.
//!
//! ```ron
//! Script(steps: [
//!     Drop(payload: Some("{\"type\":\"MESSAGE_NODE\",\"content\":\"\"}"), at: (100.0, 40.0)),
//!     Edit(0, "Hi"),
//!     Save,
//! ])
//! ```

use crate::session::EditorSession;
use crate::sink::{FlowSink, SinkError};
use chatflow_graph::{AuthoringOutcome, HandleHit, NodeId, PointerEvent, ValidationReport};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// One user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// The palette drag started
    PaletteDrag,
    /// Drop palette data on the canvas
    Drop {
        /// Raw drag data
        payload: Option<String>,
        /// Canvas position
        at: (f32, f32),
    },
    /// Click a node
    Select(usize),
    /// Click the canvas background
    Deselect,
    /// Type into the settings panel
    Edit(usize, String),
    /// Drag a node to a position
    Drag(usize, (f32, f32)),
    /// Delete a node
    Delete(usize),
    /// Press on a node's source handle
    PressSource(usize),
    /// Press on a node's target handle
    PressTarget(usize),
    /// Move the pointer
    MoveTo(f32, f32),
    /// Release on a node's target handle
    ReleaseOnTarget(usize),
    /// Release on a node's source handle
    ReleaseOnSource(usize),
    /// Release over empty canvas
    ReleaseOnCanvas,
    /// Press on one node's source and release on another's target
    Connect(usize, usize),
    /// Abort the current gesture
    Cancel,
    /// Let time pass
    Wait(u64),
    /// Click Save
    Save,
}

/// A sequence of user actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Steps in order
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Parse a script from RON text
    pub fn from_ron(text: &str) -> Result<Self, ScriptError> {
        Ok(ron::from_str(text)?)
    }

    /// Load a script file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }
}

/// What happened during a replay
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    /// Steps executed
    pub steps: usize,
    /// Connections created by gestures
    pub connections_created: usize,
    /// Gestures refused by the authoring rules
    pub gestures_rejected: usize,
    /// Report of every save, in order
    pub saves: Vec<ValidationReport>,
    /// Status line after the last step
    pub final_status: Option<String>,
}

/// Run a script against a session, starting the virtual clock at `start`
pub fn replay<S: FlowSink>(
    session: &mut EditorSession<S>,
    script: &Script,
    start: Instant,
) -> Result<ReplaySummary, ScriptError> {
    let mut summary = ReplaySummary::default();
    let mut dropped: Vec<NodeId> = Vec::new();
    let mut now = start;
    let mut pointer = [0.0, 0.0];

    for (index, step) in script.steps.iter().enumerate() {
        let gesture = match step {
            ScriptStep::PaletteDrag => {
                session.begin_palette_drag();
                None
            }
            ScriptStep::Drop { payload, at } => {
                if let Some(id) = session.drop_node(payload.as_deref(), [at.0, at.1]) {
                    dropped.push(id);
                }
                None
            }
            ScriptStep::Select(n) => {
                session.select_node(node_at(&dropped, index, *n)?);
                None
            }
            ScriptStep::Deselect => {
                session.deselect();
                None
            }
            ScriptStep::Edit(n, text) => {
                session.edit_content(node_at(&dropped, index, *n)?, text.clone());
                None
            }
            ScriptStep::Drag(n, at) => {
                session.drag_node(node_at(&dropped, index, *n)?, [at.0, at.1]);
                None
            }
            ScriptStep::Delete(n) => {
                session.delete_node(node_at(&dropped, index, *n)?);
                None
            }
            ScriptStep::PressSource(n) => {
                let hit = HandleHit::source(node_at(&dropped, index, *n)?);
                Some(vec![press(pointer, hit)])
            }
            ScriptStep::PressTarget(n) => {
                let hit = HandleHit::target(node_at(&dropped, index, *n)?);
                Some(vec![press(pointer, hit)])
            }
            ScriptStep::MoveTo(x, y) => {
                pointer = [*x, *y];
                Some(vec![PointerEvent::Move { pos: pointer }])
            }
            ScriptStep::ReleaseOnTarget(n) => {
                let hit = HandleHit::target(node_at(&dropped, index, *n)?);
                Some(vec![release(pointer, Some(hit))])
            }
            ScriptStep::ReleaseOnSource(n) => {
                let hit = HandleHit::source(node_at(&dropped, index, *n)?);
                Some(vec![release(pointer, Some(hit))])
            }
            ScriptStep::ReleaseOnCanvas => Some(vec![release(pointer, None)]),
            ScriptStep::Connect(from, to) => {
                let source = HandleHit::source(node_at(&dropped, index, *from)?);
                let target = HandleHit::target(node_at(&dropped, index, *to)?);
                Some(vec![press(pointer, source), release(pointer, Some(target))])
            }
            ScriptStep::Cancel => Some(vec![PointerEvent::Cancel]),
            ScriptStep::Wait(ms) => {
                now += Duration::from_millis(*ms);
                session.tick(now);
                None
            }
            ScriptStep::Save => {
                summary.saves.push(session.save(now)?);
                None
            }
        };

        for event in gesture.into_iter().flatten() {
            match session.handle_pointer(event, now) {
                AuthoringOutcome::Created(_) => summary.connections_created += 1,
                AuthoringOutcome::Rejected(_) => summary.gestures_rejected += 1,
                _ => {}
            }
        }

        summary.steps += 1;
    }

    summary.final_status = session.status().text().map(str::to_string);
    Ok(summary)
}

fn node_at(dropped: &[NodeId], step: usize, node: usize) -> Result<NodeId, ScriptError> {
    dropped
        .get(node)
        .copied()
        .ok_or(ScriptError::UnknownNode { step, node })
}

fn press(pos: [f32; 2], hit: HandleHit) -> PointerEvent {
    PointerEvent::Press { pos, hit: Some(hit) }
}

fn release(pos: [f32; 2], hit: Option<HandleHit>) -> PointerEvent {
    PointerEvent::Release { pos, hit }
}

/// Error running a script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Script file could not be read
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),

    /// Script text is not valid
    #[error("Failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A step names a node that was never dropped
    #[error("Step {step} refers to node {node}, which does not exist")]
    UnknownNode {
        /// Step index
        step: usize,
        /// Node index
        node: usize,
    },

    /// Saving failed
    #[error(transparent)]
    Save(#[from] SinkError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EditorSettings;
    use crate::sink::MemorySink;
    use chatflow_graph::{FlowGraph, SequentialIds, ValidationIssue};

    const SCRIPT: &str = r#"
        Script(steps: [
            PaletteDrag,
            Drop(payload: Some("{\"type\":\"MESSAGE_NODE\",\"content\":\"\"}"), at: (103.0, 38.0)),
            Drop(payload: Some("{\"type\":\"MESSAGE_NODE\",\"content\":\"Bye\"}"), at: (100.0, 200.0)),
            Drop(payload: Some("not json"), at: (100.0, 400.0)),
            Edit(0, "Hi"),
            Connect(0, 1),
            Connect(0, 2),
            Save,
            Wait(5000),
            PressSource(1),
            MoveTo(120.0, 380.0),
            ReleaseOnTarget(2),
            Edit(2, "See you"),
            Save,
        ])
    "#;

    fn session() -> EditorSession<MemorySink> {
        EditorSession::with_graph(
            FlowGraph::with_ids(SequentialIds::new()),
            EditorSettings::default(),
            MemorySink::default(),
        )
    }

    #[test]
    fn test_replay_script() {
        let script = Script::from_ron(SCRIPT).unwrap();
        let mut session = session();
        let summary = replay(&mut session, &script, Instant::now()).unwrap();

        assert_eq!(summary.steps, script.steps.len());
        assert_eq!(summary.connections_created, 2);
        assert_eq!(summary.gestures_rejected, 1);

        assert_eq!(summary.saves.len(), 2);
        assert_eq!(summary.saves[0].issue, Some(ValidationIssue::MultipleEntryPoints));
        assert!(summary.saves[1].valid);
        assert_eq!(summary.final_status.as_deref(), Some("Success: Flow saved successfully!"));

        assert_eq!(session.sink().saved.len(), 1);
        let first = session.graph().nodes().next().unwrap();
        assert_eq!(first.position, [100.0, 40.0]);
        assert_eq!(first.content, "Hi");
    }

    #[test]
    fn test_wait_dismisses_status() {
        let script = Script {
            steps: vec![ScriptStep::Save, ScriptStep::Wait(4999)],
        };
        let mut session = session();
        let summary = replay(&mut session, &script, Instant::now()).unwrap();
        assert_eq!(summary.final_status.as_deref(), Some("Error: No nodes in the flow!"));

        let script = Script {
            steps: vec![ScriptStep::Save, ScriptStep::Wait(5000)],
        };
        let summary = replay(&mut session, &script, Instant::now()).unwrap();
        assert_eq!(summary.final_status, None);
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let script = Script {
            steps: vec![ScriptStep::Edit(3, "Hi".to_string())],
        };
        let err = replay(&mut session(), &script, Instant::now()).unwrap_err();
        assert!(matches!(err, ScriptError::UnknownNode { step: 0, node: 3 }));
    }

    #[test]
    fn test_bad_script_text() {
        assert!(matches!(Script::from_ron("Script(steps: [Jump])"), Err(ScriptError::Parse(_))));
    }
}
