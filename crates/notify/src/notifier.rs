//! User-facing alert sink.
//!
//! The dispatcher reports terminal failures of user-facing messages through
//! a [`UserNotifier`]. The HTTP layer uses a [`RecordingNotifier`] per
//! request and returns the collected messages to the client.

use std::sync::{Mutex, MutexGuard};

/// Receives blocking, user-visible alert messages.
pub trait UserNotifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes alerts to the log. Used where no user is attached to the call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl UserNotifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(message, "User alert raised");
    }
}

/// Collects alerts in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of all alerts raised so far.
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Remove and return all alerts raised so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }
}

impl UserNotifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        tracing::debug!(message, "Recording user alert");
        self.lock().push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
