// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transient status line shown above the canvas.
//!
//! Only one message is visible at a time. Each message carries its own
//! dismissal deadline, checked whenever the host calls [`StatusBar::tick`].

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Visual treatment of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    /// Success or informational feedback
    Success,
    /// Failure feedback
    Error,
}

/// A message and when it should disappear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Text to show
    pub text: String,
    /// Visual treatment
    pub kind: StatusKind,
    /// When the message was shown
    pub shown_at: Instant,
    /// How long it stays visible
    pub dismiss_after: Duration,
}

impl StatusMessage {
    /// Whether the message should be gone by `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.dismiss_after
    }
}

/// Holder for the current status message
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    current: Option<StatusMessage>,
}

impl StatusBar {
    /// Create an empty status bar
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current message
    pub fn show(
        &mut self,
        text: impl Into<String>,
        kind: StatusKind,
        dismiss_after: Duration,
        now: Instant,
    ) {
        self.current = Some(StatusMessage {
            text: text.into(),
            kind,
            shown_at: now,
            dismiss_after,
        });
    }

    /// Remove the current message
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the message if its time is up. Returns true if one was dismissed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|m| m.is_expired(now)) {
            self.current = None;
            return true;
        }
        false
    }

    /// The visible message, if any
    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    /// Text of the visible message
    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|m| m.text.as_str())
    }
}
