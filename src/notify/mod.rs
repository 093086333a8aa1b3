//! The notification sink capability.
//!
//! The session controller never surfaces errors to its caller; every
//! outcome the user should see becomes a [`Notice`] handed to an injected
//! [`Notifier`]. The trait keeps the controller independent of whatever
//! actually renders the notification (a toast system, a log, a test).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{info, warn};

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    /// Failures and destructive state transitions.
    Error,
}

/// A short user-facing notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Error,
        }
    }
}

/// Capability for surfacing notices to the user. Fire-and-forget; no
/// acknowledgment flows back to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice);
}

/// Shared handle to the injected notifier implementation.
pub type NotifierHandle = Arc<dyn Notifier>;

/// Drops every notice. Useful when no UI is attached.
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _notice: Notice) {}
}

/// Emits every notice as a structured log line.
#[derive(Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => info!(title = %notice.title, body = %notice.body, "Notice"),
            Severity::Error => warn!(title = %notice.title, body = %notice.body, "Notice"),
        }
    }
}

/// Captures notices for assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices captured so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    /// Number of captured notices whose title matches exactly.
    pub fn count_titled(&self, title: &str) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|notice| notice.title == title)
            .count()
    }
}
