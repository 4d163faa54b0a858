//! User-visible notices.
//!
//! The household controller reports failed mutations through a [`Notifier`]
//! rather than printing, so the front end decides how an alert looks.

use std::io::Write;

use crate::error::{Error, ErrorKind};

/// The controller operation a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Adding a member.
    Add,
    /// Toggling a member's presence.
    Toggle,
    /// Deleting a member.
    Delete,
}

impl Operation {
    fn headline(self) -> &'static str {
        match self {
            Self::Add => "Error adding member",
            Self::Toggle => "Error updating status",
            Self::Delete => "Error deleting member",
        }
    }
}

/// A message that must reach the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Operation that failed.
    pub operation: Operation,
    /// Kind of the failure.
    pub kind: ErrorKind,
    /// Text to show.
    pub message: String,
}

impl Notice {
    /// Build the notice for a failed operation.
    #[must_use]
    pub fn failure(operation: Operation, error: &Error) -> Self {
        Self {
            operation,
            kind: error.kind(),
            message: format!("{}: {error}", operation.headline()),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives notices raised by the controller.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Show `notice` to the user. Returns once the notice has been delivered.
    fn notify(&self, notice: &Notice);
}

/// Writes notices to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: &Notice) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "error: {notice}");
        let _ = stderr.flush();
    }
}

/// Keeps notices in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    notices: std::sync::Mutex<Vec<Notice>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
