// SPDX-License-Identifier: MIT OR Apache-2.0
//! Destinations for saved flows.

use crate::settings::SaveFormat;
use chatflow_graph::FlowSnapshot;
use std::path::PathBuf;

/// Receives the complete flow on every successful save
pub trait FlowSink {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Store the snapshot
    fn persist(&mut self, snapshot: &FlowSnapshot) -> Result<(), SinkError>;
}

impl<S: FlowSink + ?Sized> FlowSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn persist(&mut self, snapshot: &FlowSnapshot) -> Result<(), SinkError> {
        (**self).persist(snapshot)
    }
}

/// Encode a snapshot in the given format
pub fn encode(snapshot: &FlowSnapshot, format: SaveFormat) -> Result<String, SinkError> {
    match format {
        SaveFormat::Json => Ok(snapshot.to_json()?),
        SaveFormat::Ron => Ok(ron::ser::to_string_pretty(
            snapshot,
            ron::ser::PrettyConfig::default(),
        )?),
    }
}

/// Writes the flow to the log instead of storing it
#[derive(Debug, Default)]
pub struct LogSink;

impl FlowSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn persist(&mut self, snapshot: &FlowSnapshot) -> Result<(), SinkError> {
        let json = encode(snapshot, SaveFormat::Json)?;
        tracing::info!(
            nodes = snapshot.nodes.len(),
            connections = snapshot.connections.len(),
            "Saving flow:\n{json}"
        );
        Ok(())
    }
}

/// Writes the flow to a file, replacing previous contents
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    format: SaveFormat,
}

impl FileSink {
    /// Sink writing `format` to `path`
    pub fn new(path: impl Into<PathBuf>, format: SaveFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

impl FlowSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn persist(&mut self, snapshot: &FlowSnapshot) -> Result<(), SinkError> {
        let contents = encode(snapshot, self.format)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        tracing::info!("Saved flow to {:?}", self.path);
        Ok(())
    }
}

/// Keeps every saved snapshot in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Snapshots in save order
    pub saved: Vec<FlowSnapshot>,
    /// Fail every save when set
    pub fail: bool,
}

#[cfg(test)]
impl FlowSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn persist(&mut self, snapshot: &FlowSnapshot) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "storage unavailable",
            )));
        }
        self.saved.push(snapshot.clone());
        Ok(())
    }
}

/// Error storing a flow
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Destination could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed
    #[error("Failed to encode flow as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// RON encoding failed
    #[error("Failed to encode flow as RON: {0}")]
    Ron(#[from] ron::Error),
}
