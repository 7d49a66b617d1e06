//! In-memory wizard sessions.
//!
//! Each started booking gets a [`WizardSession`] keyed by a random UUID.
//! Sessions are never persisted: they are dropped on successful submission,
//! on explicit abandonment, or by the [`SessionReaper`] once idle longer
//! than the configured TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::controller::BookingWizard;

/// How often the reaper scans for idle sessions.
const REAP_INTERVAL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// WizardSession
// ---------------------------------------------------------------------------

/// One client's wizard plus its last activity time.
#[derive(Debug)]
pub struct WizardSession {
    pub id: Uuid,
    pub wizard: BookingWizard,
    touched_at: Instant,
}

impl WizardSession {
    /// Record activity, postponing expiry.
    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.touched_at) > ttl
    }
}

/// Shared handle to a single session.
pub type SessionHandle = Arc<Mutex<WizardSession>>;

// ---------------------------------------------------------------------------
// WizardSessions
// ---------------------------------------------------------------------------

/// Registry of live wizard sessions.
#[derive(Debug)]
pub struct WizardSessions {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    ttl: Duration,
    success_path: String,
}

impl WizardSessions {
    pub fn new(ttl: Duration, success_path: impl Into<String>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            success_path: success_path.into(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a new wizard on step 1.
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(WizardSession {
            id,
            wizard: BookingWizard::new(self.success_path.clone()),
            touched_at: Instant::now(),
        }));
        self.sessions.write().await.insert(id, Arc::clone(&handle));
        tracing::debug!(session_id = %id, "Wizard session created");
        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drop a session. Returns `false` when it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "Wizard session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every session idle for longer than the TTL as of `now`.
    ///
    /// Sessions locked by an in-flight request are in use and kept.
    pub async fn purge_expired(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.is_expired(now, self.ttl),
            Err(_) => true,
        });
        before - sessions.len()
    }
}

// ---------------------------------------------------------------------------
// SessionReaper
// ---------------------------------------------------------------------------

/// Background task that discards idle wizard sessions.
pub struct SessionReaper {
    sessions: Arc<WizardSessions>,
    interval: Duration,
}

impl SessionReaper {
    pub fn new(sessions: Arc<WizardSessions>) -> Self {
        Self {
            sessions,
            interval: REAP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Session reaper cancelled");
                    break;
                }
                _ = interval.tick() => {
                    let purged = self.sessions.purge_expired(Instant::now()).await;
                    if purged > 0 {
                        tracing::info!(purged, "Expired wizard sessions removed");
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
