// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line operations.

use crate::script::{replay, ReplaySummary, Script, ScriptError};
use crate::session::EditorSession;
use crate::settings::{EditorSettings, SaveFormat};
use crate::sink::{FileSink, FlowSink, LogSink};
use chatflow_graph::{FlowGraph, FlowSnapshot, RandomIds, SnapshotError, ValidationReport, Validator};
use std::path::Path;
use std::time::Instant;

/// Read a flow snapshot, choosing JSON or RON by file extension
pub fn load_snapshot(path: &Path) -> Result<FlowSnapshot, CommandError> {
    let text = std::fs::read_to_string(path)?;
    let snapshot = match SaveFormat::from_path(path) {
        SaveFormat::Json => FlowSnapshot::from_json(&text)?,
        SaveFormat::Ron => ron::from_str(&text)?,
    };
    Ok(snapshot)
}

/// Validate a flow file with the configured rules
pub fn validate_file(path: &Path, settings: &EditorSettings) -> Result<ValidationReport, CommandError> {
    let graph = FlowGraph::from_snapshot(load_snapshot(path)?, RandomIds)?;
    tracing::debug!(
        nodes = graph.node_count(),
        connections = graph.connection_count(),
        "Validating {:?}",
        path
    );
    Ok(Validator::new(settings.validation_mode).validate_graph(&graph))
}

/// Replay a script; saves go to `out` when given, otherwise to the log
pub fn replay_file(
    script_path: &Path,
    out: Option<&Path>,
    settings: &EditorSettings,
) -> Result<ReplaySummary, CommandError> {
    let script = Script::load(script_path)?;

    let sink: Box<dyn FlowSink> = match out {
        Some(path) => {
            let format = if path.extension().is_some() {
                SaveFormat::from_path(path)
            } else {
                settings.save_format
            };
            Box::new(FileSink::new(path, format))
        }
        None => Box::new(LogSink),
    };

    let mut session = EditorSession::new(settings.clone(), sink);
    let summary = replay(&mut session, &script, Instant::now())?;
    tracing::info!(
        steps = summary.steps,
        saves = summary.saves.len(),
        "Replayed {:?}",
        script_path
    );
    Ok(summary)
}

/// Human-readable rendering of a validation report
pub fn describe(report: &ValidationReport) -> String {
    let mut out = report.message.clone();
    for node in &report.error_nodes {
        out.push_str(&format!("\n  - node {node}"));
    }
    out
}

/// Error running a command
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Flow file is malformed or breaks a connection rule
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// RON flow file could not be parsed
    #[error("Failed to parse flow: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Script failed
    #[error(transparent)]
    Script(#[from] ScriptError),
}
