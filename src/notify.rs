//! Notification sink boundary
//!
//! Human-readable audit/status messages, delivered fire-and-forget: a
//! sink failure is logged and never propagated into engine results.

use crate::core::types::{Severity, Timestamp};
use std::sync::Mutex;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, body: &str, severity: Severity, timestamp: Timestamp);
}

/// Default sink: structured log lines
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, title: &str, body: &str, severity: Severity, timestamp: Timestamp) {
        match severity {
            Severity::Info => tracing::info!(title, body, timestamp, "notification"),
            Severity::Warning => tracing::warn!(title, body, timestamp, "notification"),
            Severity::Critical => tracing::error!(title, body, timestamp, "notification"),
        }
    }
}

/// Captured notification, for assertions
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub timestamp: Timestamp,
}

/// Test sink that records everything it is handed
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<Notification>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Notification> {
        self.messages.lock().expect("sink poisoned").clone()
    }

    pub fn titled(&self, title: &str) -> Vec<Notification> {
        self.messages()
            .into_iter()
            .filter(|n| n.title == title)
            .collect()
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&self, title: &str, body: &str, severity: Severity, timestamp: Timestamp) {
        self.messages.lock().expect("sink poisoned").push(Notification {
            title: title.to_string(),
            body: body.to_string(),
            severity,
            timestamp,
        });
    }
}
