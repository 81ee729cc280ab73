// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless editor for the chatbot flow builder.
//!
//! Wraps the `chatflow_graph` core in an editing session:
//! - Selection, drops and content edits
//! - Connection gestures with status feedback
//! - Save through an injected [`sink::FlowSink`]
//! - RON settings and scripted session replay

pub mod commands;
pub mod script;
pub mod session;
pub mod settings;
pub mod sink;

pub use session::EditorSession;
pub use settings::{EditorSettings, SaveFormat, StatusTimings};
pub use sink::{FileSink, FlowSink, LogSink, SinkError};
